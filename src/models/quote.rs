use serde::Serialize;

/// Normalized price snapshot for one coin. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub coin: String,
    pub display_name: String,
    pub symbol: String,
    pub price: f64,
    // percent
    pub change_24h: f64,
}

/// Shape of one entry in the `/api/prices` response.
#[derive(Debug, Clone, Serialize)]
pub struct PriceView {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub change: f64,
}

impl From<&Quote> for PriceView {
    fn from(q: &Quote) -> Self {
        Self {
            name: q.display_name.clone(),
            symbol: q.symbol.clone(),
            price: q.price,
            change: q.change_24h,
        }
    }
}
