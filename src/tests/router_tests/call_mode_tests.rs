use crate::api::CrmApi;
use crate::domain::BusinessStatus;
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_string, get, location, post_form, TestApp};
use chrono::{Duration, Utc};

/// Starts call mode for `cookie` and returns the screen path.
fn start(app: &TestApp, cookie: &str, status: &str) -> String {
    let resp = handle(
        post_form(
            "/call-mode/start",
            Some(cookie),
            &format!("development=dev-1&status={status}"),
        ),
        &app.state,
    )
    .unwrap();
    assert_eq!(resp.status(), 302);
    location(&resp).to_string()
}

#[test]
fn start_needs_development_and_status() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");

    let resp = handle(post_form("/call-mode/start", Some(&cookie), "q="), &app.state).unwrap();

    assert_eq!(resp.status(), 400);
    let body = body_string(resp);
    assert!(body.contains("select a development"));
    assert!(body.contains("select a status"));
    assert!(app.crm.list_call_sessions().unwrap().is_empty());
}

#[test]
fn empty_queue_does_not_open_a_session() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");

    let resp = handle(
        post_form("/call-mode/start", Some(&cookie), "development=dev-1&status=lost"),
        &app.state,
    )
    .unwrap();

    assert_eq!(resp.status(), 400);
    assert!(body_string(resp).contains("no businesses match"));
    assert!(app.crm.list_call_sessions().unwrap().is_empty());
}

#[test]
fn full_walk_holds_advances_and_stops() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::New);
    app.seed_business("l2", "Carlos Melo", "broker-1", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");

    let screen = start(&app, &cookie, "new");
    assert!(screen.starts_with("/call-mode/"));
    let first = body_string(handle(get(&screen, Some(&cookie)), &app.state).unwrap());
    assert!(first.contains("1 of 2"));

    // Unanswered in a queue of new businesses: same business again.
    let resp = handle(
        post_form(&format!("{screen}/next"), Some(&cookie), "outcome=no_answer"),
        &app.state,
    )
    .unwrap();
    assert_eq!(location(&resp), screen);
    let held = body_string(handle(get(&screen, Some(&cookie)), &app.state).unwrap());
    assert!(held.contains("1 of 2"));

    let resp = handle(
        post_form(&format!("{screen}/next"), Some(&cookie), "outcome=answered&talked=1"),
        &app.state,
    )
    .unwrap();
    assert_eq!(location(&resp), screen);
    let last = body_string(handle(get(&screen, Some(&cookie)), &app.state).unwrap());
    assert!(last.contains("2 of 2"));

    let resp = handle(
        post_form(
            &format!("{screen}/stop"),
            Some(&cookie),
            "outcome=scheduled&at=2024-06-01T10%3A00",
        ),
        &app.state,
    )
    .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("Session finished"));

    let sessions = app.crm.list_call_sessions().unwrap();
    assert_eq!(sessions.len(), 1);
    let s = &sessions[0];
    assert!(s.end_time.is_some());
    assert_eq!(s.business_viewed.len(), 3);
    assert_eq!(s.counters.answered_calls, 2);
    assert_eq!(s.counters.talked_calls, 2);
    assert_eq!(s.counters.scheduled_calls, 1);

    let scheduled: Vec<_> = app
        .crm
        .list_businesses()
        .unwrap()
        .into_iter()
        .filter(|b| b.status == BusinessStatus::Scheduled)
        .collect();
    assert_eq!(scheduled.len(), 1);
    assert!(scheduled[0].last_call_at.is_some());

    let gone = handle(get(&screen, Some(&cookie)), &app.state);
    assert!(matches!(gone, Err(ServerError::NotFound)));
}

#[test]
fn next_is_refused_on_the_last_business() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::Recall);
    let cookie = app.cookie_for("broker-1");
    let screen = start(&app, &cookie, "recall");

    let resp = handle(
        post_form(&format!("{screen}/next"), Some(&cookie), "outcome=voicemail"),
        &app.state,
    )
    .unwrap();

    assert_eq!(resp.status(), 400);
    assert!(body_string(resp).contains("last business"));
    assert_eq!(app.crm.list_businesses().unwrap()[0].last_call_at, None);
}

#[test]
fn missing_recall_date_keeps_the_call_open() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::New);
    app.seed_business("l2", "Carlos Melo", "broker-1", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");
    let screen = start(&app, &cookie, "new");

    let resp = handle(
        post_form(&format!("{screen}/next"), Some(&cookie), "outcome=recall&talked=1"),
        &app.state,
    )
    .unwrap();

    assert_eq!(resp.status(), 400);
    let body = body_string(resp);
    assert!(body.contains("choose a date and time"));
    assert!(body.contains("1 of 2"));
    assert!(app
        .crm
        .list_businesses()
        .unwrap()
        .iter()
        .all(|b| b.last_call_at.is_none()));
}

#[test]
fn lead_name_edit_is_saved_with_the_call() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::Whatsapp);
    let cookie = app.cookie_for("broker-1");
    let screen = start(&app, &cookie, "whatsapp");

    handle(
        post_form(
            &format!("{screen}/stop"),
            Some(&cookie),
            "outcome=whatsapp&lead_name=Ana+Souza+Prado",
        ),
        &app.state,
    )
    .unwrap();

    let lead = app.crm.list_leads().unwrap().remove(0);
    assert_eq!(lead.name, "Ana Souza Prado");
    assert!(lead.last_contact.is_some());

    let page = body_string(handle(get("/business", Some(&cookie)), &app.state).unwrap());
    assert!(page.contains("Ana Souza Prado"));
}

#[test]
fn walks_belong_to_their_user() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::New);
    let owner = app.cookie_for("broker-1");
    let screen = start(&app, &owner, "new");

    let other = app.cookie_for("admin");
    let result = handle(get(&screen, Some(&other)), &app.state);

    assert!(matches!(result, Err(ServerError::Forbidden(_))));
}

#[test]
fn starting_again_closes_the_previous_walk() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::New);
    app.seed_business("l2", "Carlos Melo", "broker-1", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");
    let admin = app.cookie_for("admin");

    let admin_screen = start(&app, &admin, "new");
    let screens: Vec<String> = (0..3).map(|_| start(&app, &cookie, "new")).collect();

    for old in &screens[..2] {
        let gone = handle(get(old, Some(&cookie)), &app.state);
        assert!(matches!(gone, Err(ServerError::NotFound)));
    }
    let current = handle(get(&screens[2], Some(&cookie)), &app.state).unwrap();
    assert_eq!(current.status(), 200);
    let other_user = handle(get(&admin_screen, Some(&admin)), &app.state).unwrap();
    assert_eq!(other_user.status(), 200);

    let sessions = app.crm.list_call_sessions().unwrap();
    assert_eq!(sessions.len(), 4);
    let closed: Vec<_> = sessions.iter().filter(|s| s.end_time.is_some()).collect();
    assert_eq!(closed.len(), 2);
    assert!(closed.iter().all(|s| s.user_id == "broker-1"));
}

#[test]
fn replaced_walk_keeps_the_calls_it_recorded() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::Recall);
    app.seed_business("l2", "Carlos Melo", "broker-1", BusinessStatus::Recall);
    let cookie = app.cookie_for("broker-1");

    let first = start(&app, &cookie, "recall");
    handle(
        post_form(&format!("{first}/next"), Some(&cookie), "outcome=voicemail"),
        &app.state,
    )
    .unwrap();
    start(&app, &cookie, "recall");

    let sid = first.trim_start_matches("/call-mode/");
    let old = app
        .crm
        .list_call_sessions()
        .unwrap()
        .into_iter()
        .find(|s| s.id == sid)
        .unwrap();
    assert!(old.end_time.is_some());
    assert_eq!(old.business_viewed.len(), 1);
    assert_eq!(old.counters.voicemail_calls, 1);

    let late = handle(
        post_form(&format!("{first}/stop"), Some(&cookie), "outcome=voicemail"),
        &app.state,
    );
    assert!(matches!(late, Err(ServerError::NotFound)));
}

#[test]
fn idle_walks_are_closed() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");
    let screen = start(&app, &cookie, "new");

    assert_eq!(app.state.close_idle_walks(Utc::now()).unwrap(), 0);
    let idle_for = Duration::minutes(app.state.config.walk_idle_minutes + 1);
    assert_eq!(app.state.close_idle_walks(Utc::now() + idle_for).unwrap(), 1);

    let gone = handle(get(&screen, Some(&cookie)), &app.state);
    assert!(matches!(gone, Err(ServerError::NotFound)));
    let sessions = app.crm.list_call_sessions().unwrap();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].end_time.is_some());
}

#[test]
fn call_notes_are_saved_as_typed() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::Recall);
    let cookie = app.cookie_for("broker-1");
    let screen = start(&app, &cookie, "recall");

    let resp = handle(
        post_form(
            &format!("{screen}/stop"),
            Some(&cookie),
            "outcome=voicemail&notes=++-+call+after+lunch%0A",
        ),
        &app.state,
    )
    .unwrap();
    assert_eq!(resp.status(), 200);

    let saved = app.crm.list_businesses().unwrap().remove(0);
    assert_eq!(saved.notes.as_deref(), Some("  - call after lunch\n"));
}
