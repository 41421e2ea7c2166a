use handlebars::Handlebars;
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

pub const ALERT_EMAIL: &str = "email/alert";

pub fn build_handlebars() -> Hbs {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);

    // Embedded so the binary does not depend on its working directory
    hb.register_template_string(ALERT_EMAIL, include_str!("../templates/email/alert.hbs"))
        .expect("template email/alert");

    Arc::new(hb)
}
