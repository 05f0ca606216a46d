use crate::auth::sessions::{create_session, revoke_session, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::responses::{html_response, html_response_with_status, redirect_with_cookie, ResultResp};
use crate::router::{param, Params};
use crate::state::AppState;
use crate::templates::pages::login_page;
use chrono::Utc;

pub fn login_form() -> ResultResp {
    html_response(login_page("", None))
}

pub fn login(state: &AppState, form: &Params) -> ResultResp {
    let email = param(form, "email").unwrap_or("");
    let password = form.get("password").map(String::as_str).unwrap_or("");

    let user = match state.api.authenticate(email, password)? {
        Some(user) => user,
        None => {
            log::info!("Failed sign-in for {email}");
            return html_response_with_status(
                401,
                login_page(email, Some("Invalid email or password")),
            );
        }
    };

    let now = Utc::now().timestamp();
    let token = state
        .db
        .with_conn(|conn| create_session(conn, &user.id, now))?;
    log::info!("User {} signed in", user.id);

    let cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECS}"
    );
    redirect_with_cookie("/business", &cookie)
}

pub fn logout(state: &AppState, token: Option<&str>) -> ResultResp {
    if let Some(token) = token {
        let now = Utc::now().timestamp();
        state.db.with_conn(|conn| revoke_session(conn, token, now))?;
    }
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    redirect_with_cookie("/login", &cookie)
}
