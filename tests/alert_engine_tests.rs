use mongodb::bson::oid::ObjectId;

use marketpulse::models::{Alert, AlertKind, User};
use marketpulse::services::alert_engine::{alert_job, crossing_met, group_by_symbol};
use marketpulse::services::dispatch::TemplateKind;

fn alert(symbol: &str, kind: AlertKind, target_price: f64) -> Alert {
    Alert {
        id: ObjectId::new(),
        user_id: ObjectId::new(),
        symbol: symbol.to_string(),
        company: format!("{symbol} Inc"),
        kind,
        target_price,
        created_at: 1_700_000_000,
        triggered: false,
        triggered_at: None,
    }
}

fn user(email: &str) -> User {
    User {
        id: ObjectId::new(),
        email: email.to_string(),
        username: Some("ada".to_string()),
    }
}

#[test]
fn above_triggers_at_or_over_the_target() {
    assert!(crossing_met(AlertKind::Above, 150.0, 151.2));
    assert!(crossing_met(AlertKind::Above, 150.0, 150.0));
    assert!(!crossing_met(AlertKind::Above, 150.0, 149.99));
}

#[test]
fn below_triggers_at_or_under_the_target() {
    assert!(crossing_met(AlertKind::Below, 150.0, 148.0));
    assert!(crossing_met(AlertKind::Below, 150.0, 150.0));
    assert!(!crossing_met(AlertKind::Below, 150.0, 150.01));
}

#[test]
fn grouping_bounds_quote_calls_to_distinct_symbols() {
    let alerts = vec![
        alert("AAPL", AlertKind::Above, 150.0),
        alert("AAPL", AlertKind::Below, 120.0),
        alert("MSFT", AlertKind::Above, 400.0),
    ];

    let by_symbol = group_by_symbol(alerts);

    assert_eq!(by_symbol.len(), 2);
    assert_eq!(by_symbol["AAPL"].len(), 2);
    assert_eq!(by_symbol["MSFT"].len(), 1);
}

#[test]
fn above_alert_builds_an_alert_above_job() {
    let a = alert("AAPL", AlertKind::Above, 150.0);
    let u = user("ada@example.com");

    let job = alert_job(&u, &a, 151.2);

    assert_eq!(job.template, TemplateKind::AlertAbove);
    assert_eq!(job.recipient, "ada@example.com");
    assert!(job.subject.contains("AAPL"));
    assert!(job.subject.contains("$150.00"));
    assert_eq!(job.substitutions["symbol"], "AAPL");
    assert_eq!(job.substitutions["target_price"], "$150.00");
    assert_eq!(job.substitutions["current_price"], "$151.20");
}

#[test]
fn below_alert_builds_an_alert_below_job() {
    let a = alert("TSLA", AlertKind::Below, 200.0);
    let u = user("ada@example.com");

    let job = alert_job(&u, &a, 198.5);

    assert_eq!(job.template, TemplateKind::AlertBelow);
    assert!(job.subject.contains("dropped below"));
    assert_eq!(job.substitutions["current_price"], "$198.50");
}
