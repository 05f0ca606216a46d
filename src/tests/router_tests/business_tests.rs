use crate::api::CrmApi;
use crate::domain::BusinessStatus;
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_string, get, location, post_form, TestApp};

#[test]
fn brokers_only_see_their_own_businesses() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::New);
    app.seed_business("l2", "Bruno Lima", "broker-2", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");

    let resp = handle(get("/business", Some(&cookie)), &app.state).unwrap();

    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("Ana Souza"));
    assert!(!body.contains("Bruno Lima"));
}

#[test]
fn admin_can_narrow_to_a_team() {
    let app = TestApp::new();
    app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::New);
    app.seed_business("l2", "Bruno Lima", "broker-2", BusinessStatus::New);
    let cookie = app.cookie_for("admin");

    let all = body_string(handle(get("/business", Some(&cookie)), &app.state).unwrap());
    assert!(all.contains("Ana Souza") && all.contains("Bruno Lima"));

    let req = get("/business?team=team-b", Some(&cookie));
    let team_b = body_string(handle(req, &app.state).unwrap());
    assert!(team_b.contains("Bruno Lima"));
    assert!(!team_b.contains("Ana Souza"));
}

#[test]
fn search_ignores_accents() {
    let app = TestApp::new();
    app.seed_business("l1", "João Conceição", "broker-1", BusinessStatus::New);
    app.seed_business("l2", "Maria", "broker-1", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");

    let body = body_string(handle(get("/business?q=joao", Some(&cookie)), &app.state).unwrap());
    assert!(body.contains("João Conceição"));
    assert!(!body.contains("Maria"));
}

#[test]
fn search_matches_decomposed_accents() {
    let app = TestApp::new();
    app.seed_business("l1", "Nun\u{303}ez", "broker-1", BusinessStatus::New);
    app.seed_business("l2", "José", "broker-1", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");

    let req = get("/business?q=nunez", Some(&cookie));
    let body = body_string(handle(req, &app.state).unwrap());
    assert!(body.contains("Nun\u{303}ez"));
    assert!(!body.contains("José"));

    let req = get("/business?q=Jose%CC%81", Some(&cookie));
    let body = body_string(handle(req, &app.state).unwrap());
    assert!(body.contains("José"));
}

#[test]
fn manual_status_change_is_saved_and_counted() {
    let app = TestApp::new();
    let b = app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");

    let resp = handle(
        post_form(&format!("/business/{}/status", b.id), Some(&cookie), "status=whatsapp"),
        &app.state,
    )
    .unwrap();

    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), "/business");
    let saved = app.crm.list_businesses().unwrap();
    assert_eq!(saved[0].status, BusinessStatus::Whatsapp);

    let sessions = app.crm.list_call_sessions().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].counters.whatsapp_calls, 1);
    assert_eq!(sessions[0].business_viewed, vec![b.id.clone()]);
    assert!(sessions[0].end_time.is_some());

    let page = body_string(handle(get("/business", Some(&cookie)), &app.state).unwrap());
    assert!(page.contains("badge whatsapp"));
}

#[test]
fn unchanged_status_is_not_counted_again() {
    let app = TestApp::new();
    let b = app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::Lost);
    let cookie = app.cookie_for("broker-1");

    handle(
        post_form(&format!("/business/{}/status", b.id), Some(&cookie), "status=lost"),
        &app.state,
    )
    .unwrap();

    assert!(app.crm.list_call_sessions().unwrap().is_empty());
}

#[test]
fn scheduling_without_a_date_is_rejected() {
    let app = TestApp::new();
    let b = app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");

    let resp = handle(
        post_form(&format!("/business/{}/status", b.id), Some(&cookie), "status=scheduled"),
        &app.state,
    )
    .unwrap();

    assert_eq!(resp.status(), 400);
    assert!(body_string(resp).contains("choose a date and time"));
    assert_eq!(app.crm.list_businesses().unwrap()[0].status, BusinessStatus::New);
}

#[test]
fn other_brokers_businesses_are_off_limits() {
    let app = TestApp::new();
    let b = app.seed_business("l2", "Bruno Lima", "broker-2", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");

    let result = handle(
        post_form(&format!("/business/{}/status", b.id), Some(&cookie), "status=lost"),
        &app.state,
    );

    assert!(matches!(result, Err(ServerError::Forbidden(_))));
}

#[test]
fn unknown_routes_are_not_found() {
    let app = TestApp::new();
    let cookie = app.cookie_for("admin");

    let result = handle(get("/nowhere", Some(&cookie)), &app.state);

    assert!(matches!(result, Err(ServerError::NotFound)));
}

#[test]
fn deleting_a_business_removes_it_from_the_table() {
    let app = TestApp::new();
    let ana = app.seed_business("l1", "Ana Souza", "broker-1", BusinessStatus::New);
    app.seed_business("l2", "Carlos Melo", "broker-1", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");
    handle(get("/business", Some(&cookie)), &app.state).unwrap();

    let resp = handle(
        post_form(&format!("/business/{}/delete", ana.id), Some(&cookie), ""),
        &app.state,
    )
    .unwrap();

    assert_eq!(location(&resp), "/business");
    let left = app.crm.list_businesses().unwrap();
    assert_eq!(left.len(), 1);
    assert_ne!(left[0].id, ana.id);
    let page = body_string(handle(get("/business", Some(&cookie)), &app.state).unwrap());
    assert!(!page.contains("Ana Souza"));
    assert!(page.contains("Carlos Melo"));

    let again = handle(
        post_form(&format!("/business/{}/delete", ana.id), Some(&cookie), ""),
        &app.state,
    );
    assert!(matches!(again, Err(ServerError::NotFound)));
}

#[test]
fn other_brokers_businesses_cannot_be_deleted() {
    let app = TestApp::new();
    let b = app.seed_business("l2", "Bruno Lima", "broker-2", BusinessStatus::New);
    let cookie = app.cookie_for("broker-1");

    let result = handle(
        post_form(&format!("/business/{}/delete", b.id), Some(&cookie), ""),
        &app.state,
    );

    assert!(matches!(result, Err(ServerError::Forbidden(_))));
    assert_eq!(app.crm.list_businesses().unwrap().len(), 1);
}
