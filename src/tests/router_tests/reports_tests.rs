use crate::api::CrmApi;
use crate::domain::{CallCounters, NewCallSession};
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_string, get, TestApp};
use chrono::{TimeZone, Utc};
use std::io::Read;

fn seed_session(app: &TestApp, user_id: &str, day: u32, calls: usize, answered: u32) {
    let viewed = (0..calls).map(|i| format!("b{i}")).collect();
    app.crm
        .create_call_session(&NewCallSession {
            user_id: user_id.to_string(),
            development_id: Some("dev-1".into()),
            start_time: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            end_time: Some(Utc.with_ymd_and_hms(2024, 5, day, 13, 0, 0).unwrap()),
            business_viewed: viewed,
            counters: CallCounters {
                answered_calls: answered,
                talked_calls: answered,
                ..Default::default()
            },
        })
        .unwrap();
}

#[test]
fn admin_report_sums_every_session() {
    let app = TestApp::new();
    seed_session(&app, "broker-1", 2, 4, 2);
    seed_session(&app, "broker-2", 3, 6, 1);
    let cookie = app.cookie_for("admin");

    let resp = handle(get("/reports", Some(&cookie)), &app.state).unwrap();

    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains(r#"<p class="big">10</p>"#));
    assert!(body.contains("2 sessions"));
    assert!(body.contains(r#"<p class="big">30%</p>"#));
}

#[test]
fn brokers_report_only_their_own_calls() {
    let app = TestApp::new();
    seed_session(&app, "broker-1", 2, 4, 2);
    seed_session(&app, "broker-2", 3, 6, 1);
    let cookie = app.cookie_for("broker-1");

    let req = get("/reports?broker=broker-2", Some(&cookie));
    let body = body_string(handle(req, &app.state).unwrap());

    assert!(body.contains(r#"<p class="big">4</p>"#));
    assert!(body.contains("1 sessions"));
}

#[test]
fn date_range_includes_both_ends() {
    let app = TestApp::new();
    seed_session(&app, "broker-1", 1, 1, 0);
    seed_session(&app, "broker-1", 2, 2, 0);
    seed_session(&app, "broker-1", 3, 4, 0);
    let cookie = app.cookie_for("admin");

    let body = body_string(
        handle(get("/reports?from=2024-05-02&to=2024-05-03", Some(&cookie)), &app.state).unwrap(),
    );

    assert!(body.contains(r#"<p class="big">6</p>"#));
}

#[test]
fn bad_date_shows_a_banner() {
    let app = TestApp::new();
    let cookie = app.cookie_for("admin");

    let resp = handle(get("/reports?from=yesterday", Some(&cookie)), &app.state).unwrap();

    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("not a valid start date"));
}

#[test]
fn export_downloads_a_workbook() {
    let app = TestApp::new();
    seed_session(&app, "broker-1", 2, 4, 2);
    let cookie = app.cookie_for("admin");

    let resp = handle(get("/reports/export?from=2024-05-01", Some(&cookie)), &app.state).unwrap();

    assert_eq!(resp.status(), 200);
    let disposition = resp.headers().get("Content-Disposition").unwrap().to_str().unwrap();
    assert!(disposition.contains("call-report.xlsx"));
    let mut bytes = Vec::new();
    resp.into_body().reader().read_to_end(&mut bytes).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn export_rejects_bad_dates() {
    let app = TestApp::new();
    let cookie = app.cookie_for("admin");

    let result = handle(get("/reports/export?to=31-05-2024", Some(&cookie)), &app.state);

    assert!(matches!(result, Err(ServerError::BadRequest(_))));
}
