use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_string, get, TestApp, PUSH_TOKEN};
use astra::Body;
use http::{Method, Request};

fn push(token: Option<&str>, json: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/events")
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(json.as_bytes().to_vec())).unwrap()
}

const NEW_LEAD: &str = r#"{"type":"NEW_LEAD","data":{
    "id":"pushed-lead","name":"Carla Dias","phone":"11912345678",
    "brokerId":"broker-1","createdAt":"2024-05-02T09:00:00Z","updatedAt":"2024-05-02T09:00:00Z"}}"#;

const NEW_BUSINESS: &str = r#"{"type":"NEW_BUSINESS","data":{
    "id":"pushed-business","leadId":"pushed-lead","developmentId":"dev-1",
    "brokerId":"broker-1","source":"website","status":"new",
    "createdAt":"2024-05-02T09:00:00Z","updatedAt":"2024-05-02T09:00:00Z"}}"#;

#[test]
fn events_need_the_shared_token() {
    let app = TestApp::new();

    let missing = handle(push(None, NEW_LEAD), &app.state);
    assert!(matches!(missing, Err(ServerError::Unauthorized(_))));

    let wrong = handle(push(Some("guess"), NEW_LEAD), &app.state);
    assert!(matches!(wrong, Err(ServerError::Unauthorized(_))));

    let prefix = &PUSH_TOKEN[..PUSH_TOKEN.len() - 1];
    let truncated = handle(push(Some(prefix), NEW_LEAD), &app.state);
    assert!(matches!(truncated, Err(ServerError::Unauthorized(_))));
}

#[test]
fn pushed_business_shows_up_without_refetch() {
    let app = TestApp::new();
    let cookie = app.cookie_for("admin");
    // Load the snapshot first; events only update a loaded one.
    handle(get("/business", Some(&cookie)), &app.state).unwrap();

    for event in [NEW_LEAD, NEW_BUSINESS] {
        let resp = handle(push(Some(PUSH_TOKEN), event), &app.state).unwrap();
        assert_eq!(resp.status(), 204);
    }

    let page = body_string(handle(get("/business", Some(&cookie)), &app.state).unwrap());
    assert!(page.contains("Carla Dias"));

    let req = get("/business?refresh=1", Some(&cookie));
    let refreshed = body_string(handle(req, &app.state).unwrap());
    assert!(!refreshed.contains("Carla Dias"));
}

#[test]
fn malformed_event_is_a_bad_request() {
    let app = TestApp::new();

    let result = handle(push(Some(PUSH_TOKEN), r#"{"type":"NEW_PLANET"}"#), &app.state);

    assert!(matches!(result, Err(ServerError::BadRequest(_))));
}
