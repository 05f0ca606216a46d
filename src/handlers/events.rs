use crate::api::events::PushEvent;
use crate::auth::token::{hash_token, hashes_equal};
use crate::errors::ServerError;
use crate::responses::ResultResp;
use crate::state::AppState;
use astra::{Body, ResponseBuilder};

/// Push notification from the CRM service; the body is the JSON event.
pub fn receive(state: &AppState, bearer: Option<&str>, body: &str) -> ResultResp {
    let expected = state
        .config
        .api_token()
        .ok_or_else(|| ServerError::Unauthorized("push events are not enabled".into()))?;
    if !token_matches(bearer, expected) {
        return Err(ServerError::Unauthorized("bad event token".into()));
    }

    let event = PushEvent::parse(body)?;
    state.apply_event(&event)?;
    log::debug!("Applied push event {event:?}");

    ResponseBuilder::new()
        .status(204)
        .body(Body::empty())
        .map_err(|_| ServerError::InternalError)
}

/// Compares digests so the time taken does not depend on where the tokens
/// differ.
fn token_matches(given: Option<&str>, expected: &str) -> bool {
    given.map_or(false, |given| {
        hashes_equal(&hash_token(given), &hash_token(expected))
    })
}
