use crate::auth::sessions::{load_user_id_from_session, SESSION_COOKIE};
use crate::domain::User;
use crate::errors::ServerError;
use crate::handlers;
use crate::responses::{css_response, redirect, ResultResp, MAIN_CSS};
use crate::state::AppState;
use astra::Request;
use chrono::Utc;
use std::collections::HashMap;
use std::io::Read;

/// Decoded query string or form body.
pub type Params = HashMap<String, String>;

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let query = parse_query(&req);
    let token = session_token(&req);
    let bearer = bearer_token(&req);
    let raw = if method == "POST" {
        read_body(req)?
    } else {
        Vec::new()
    };
    let form: Params = url::form_urlencoded::parse(&raw).into_owned().collect();

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    log::debug!("{method} {path}");

    // Routes open to anonymous callers.
    match (method.as_str(), segments.as_slice()) {
        ("GET", ["static", "main.css"]) => return css_response(MAIN_CSS),
        ("GET", ["login"]) => return handlers::auth::login_form(),
        ("POST", ["login"]) => return handlers::auth::login(state, &form),
        ("POST", ["logout"]) => return handlers::auth::logout(state, token.as_deref()),
        ("POST", ["events"]) => {
            let body = String::from_utf8_lossy(&raw);
            return handlers::events::receive(state, bearer.as_deref(), &body);
        }
        _ => {}
    }

    let actor = match current_user(state, token.as_deref())? {
        Some(user) => user,
        None => return redirect("/login"),
    };
    state.close_idle_walks(Utc::now())?;

    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => redirect("/business"),
        ("GET", ["business"]) => handlers::business::index(state, &actor, &query),
        ("POST", ["business", id, "status"]) => {
            handlers::business::update_status(state, &actor, id, &form)
        }
        ("POST", ["business", id, "delete"]) => handlers::business::delete(state, &actor, id),
        ("POST", ["call-mode", "start"]) => handlers::call_mode::start(state, &actor, &form),
        ("GET", ["call-mode", sid]) => handlers::call_mode::screen(state, &actor, sid),
        ("POST", ["call-mode", sid, "next"]) => {
            handlers::call_mode::next(state, &actor, sid, &form)
        }
        ("POST", ["call-mode", sid, "stop"]) => {
            handlers::call_mode::stop(state, &actor, sid, &form)
        }
        ("GET", ["reports"]) => handlers::reports::index(state, &actor, &query),
        ("GET", ["reports", "export"]) => handlers::reports::export(state, &actor, &query),
        ("GET", ["commissions"]) => handlers::commissions::index(state, &actor, &query),
        _ => Err(ServerError::NotFound),
    }
}

/// Signed-in, active user behind the session cookie.
fn current_user(state: &AppState, token: Option<&str>) -> Result<Option<User>, ServerError> {
    let Some(token) = token else {
        return Ok(None);
    };
    let now = Utc::now().timestamp();
    let user_id = state
        .db
        .with_conn(|conn| load_user_id_from_session(conn, token, now))?;

    match user_id {
        Some(id) => Ok(state.api.find_user(&id)?.filter(|u| u.active)),
        None => Ok(None),
    }
}

fn parse_query(req: &Request) -> Params {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn read_body(req: Request) -> Result<Vec<u8>, ServerError> {
    let mut raw = Vec::new();
    req.into_body()
        .reader()
        .read_to_end(&mut raw)
        .map_err(|e| ServerError::BadRequest(format!("unreadable body: {e}")))?;
    Ok(raw)
}

fn session_token(req: &Request) -> Option<String> {
    req.headers()
        .get_all("Cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

/// Trimmed, non-empty value of a parameter.
pub fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}
