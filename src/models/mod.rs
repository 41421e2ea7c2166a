pub mod alert;
pub mod quote;

pub use alert::{Alert, AlertCondition, NewAlert};
pub use quote::{PriceView, Quote};
