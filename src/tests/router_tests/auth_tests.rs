use crate::router::handle;
use crate::tests::utils::{body_string, get, location, post_form, TestApp, PASSWORD};

#[test]
fn login_page_loads_successfully() {
    let app = TestApp::new();

    let resp = handle(get("/login", None), &app.state).expect("Failed to handle request");

    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("Sign in"));
    assert!(body.contains("form"));
}

#[test]
fn anonymous_visitors_are_sent_to_login() {
    let app = TestApp::new();

    for uri in ["/", "/business", "/reports"] {
        let resp = handle(get(uri, None), &app.state).unwrap();
        assert_eq!(resp.status(), 302, "{uri}");
        assert_eq!(location(&resp), "/login");
    }
}

#[test]
fn valid_credentials_set_a_session_cookie() {
    let app = TestApp::new();
    let form = format!("email=broker-1%40example.com&password={PASSWORD}");

    let resp = handle(post_form("/login", None, &form), &app.state).unwrap();

    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), "/business");
    let cookie = resp
        .headers()
        .get("Set-Cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    let session = cookie.split(';').next().unwrap();
    let page = handle(get("/business", Some(session)), &app.state).unwrap();
    assert_eq!(page.status(), 200);
}

#[test]
fn wrong_password_re_renders_login() {
    let app = TestApp::new();

    let resp = handle(
        post_form("/login", None, "email=broker-1%40example.com&password=nope"),
        &app.state,
    )
    .unwrap();

    assert_eq!(resp.status(), 401);
    let body = body_string(resp);
    assert!(body.contains("Invalid email or password"));
    assert!(body.contains("broker-1@example.com"));
}

#[test]
fn logout_revokes_the_session() {
    let app = TestApp::new();
    let cookie = app.cookie_for("broker-1");

    let resp = handle(post_form("/logout", Some(&cookie), ""), &app.state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), "/login");
    let cleared = resp.headers().get("Set-Cookie").unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let after = handle(get("/business", Some(&cookie)), &app.state).unwrap();
    assert_eq!(location(&after), "/login");
}

#[test]
fn linked_stylesheet_is_served_without_sign_in() {
    let app = TestApp::new();
    let login = body_string(handle(get("/login", None), &app.state).unwrap());
    assert!(login.contains(r#"href="/static/main.css""#));

    let resp = handle(get("/static/main.css", None), &app.state).unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "text/css; charset=utf-8"
    );
    assert!(body_string(resp).contains(".field-error"));
}
