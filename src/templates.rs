use handlebars::Handlebars;
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

/// Build the mail template registry. Templates are embedded at compile
/// time and registered under the keys [`crate::services::dispatch::TemplateKind`]
/// resolves to; rendering is pure placeholder substitution.
pub fn build_mail_templates() -> Hbs {
    let mut hb = Handlebars::new();

    hb.register_template_string("mail/welcome", include_str!("../templates/mail/welcome.hbs"))
        .expect("template mail/welcome");

    hb.register_template_string(
        "mail/news_digest",
        include_str!("../templates/mail/news_digest.hbs"),
    )
    .expect("template mail/news_digest");

    hb.register_template_string(
        "mail/alert_above",
        include_str!("../templates/mail/alert_above.hbs"),
    )
    .expect("template mail/alert_above");

    hb.register_template_string(
        "mail/alert_below",
        include_str!("../templates/mail/alert_below.hbs"),
    )
    .expect("template mail/alert_below");

    Arc::new(hb)
}
