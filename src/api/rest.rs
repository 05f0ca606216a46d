// src/api/rest.rs

use crate::api::CrmApi;
use crate::domain::{
    self, Business, CallModeSession, CallSessionPatch, Development, Lead, LeadUpdate,
    NewBusiness, NewCallSession, Sale, StatusUpdate, Team, User,
};
use crate::errors::ServerError;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;

/// Blocking JSON client for the CRM REST service.
pub struct RestClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn send(&self, req: RequestBuilder) -> Result<Response, ServerError> {
        let response = self.authorized(req).send()?;
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let text = response.text().unwrap_or_else(|_| "(no body)".to_string());
            Err(api_error(status, &text))
        }
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServerError> {
        let response = self.send(self.client.get(self.url(path)))?;
        decode(response)
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServerError> {
    response
        .json::<T>()
        .map_err(|e| ServerError::Api(format!("unexpected response body: {e}")))
}

/// Keeps the sessions that decode; the rest are logged and dropped.
pub fn decode_sessions(raw: Vec<serde_json::Value>) -> Vec<CallModeSession> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<CallModeSession>(value) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("Skipping malformed call-mode session: {e}");
                None
            }
        })
        .collect()
}

/// Maps a non-2xx reply to the error shown in the UI banner.
pub fn api_error(status: StatusCode, body: &str) -> ServerError {
    match status {
        StatusCode::NOT_FOUND => ServerError::NotFound,
        StatusCode::UNAUTHORIZED => ServerError::Unauthorized(body.to_string()),
        StatusCode::FORBIDDEN => ServerError::Forbidden(body.to_string()),
        _ => ServerError::Api(format!("{status} - {body}")),
    }
}

impl CrmApi for RestClient {
    fn list_businesses(&self) -> Result<Vec<Business>, ServerError> {
        self.get("business")
    }

    fn create_business(&self, new: &NewBusiness) -> Result<Business, ServerError> {
        decode(self.send(self.client.post(self.url("business")).json(new))?)
    }

    fn update_business(&self, id: &str, update: &StatusUpdate) -> Result<Business, ServerError> {
        let url = self.url(&format!("business/{id}"));
        decode(self.send(self.client.put(url).json(update))?)
    }

    fn delete_business(&self, id: &str) -> Result<(), ServerError> {
        self.send(self.client.delete(self.url(&format!("business/{id}"))))?;
        Ok(())
    }

    fn list_leads(&self) -> Result<Vec<Lead>, ServerError> {
        self.get("leads")
    }

    fn update_lead(&self, id: &str, update: &LeadUpdate) -> Result<Lead, ServerError> {
        let url = self.url(&format!("leads/{id}"));
        decode(self.send(self.client.put(url).json(update))?)
    }

    fn create_call_session(&self, new: &NewCallSession) -> Result<CallModeSession, ServerError> {
        decode(self.send(self.client.post(self.url("call-mode-sessions")).json(new))?)
    }

    fn update_call_session(&self, id: &str, patch: &CallSessionPatch) -> Result<(), ServerError> {
        let url = self.url(&format!("call-mode-sessions/{id}"));
        self.send(self.client.put(url).json(patch))?;
        Ok(())
    }

    fn list_call_sessions(&self) -> Result<Vec<CallModeSession>, ServerError> {
        let raw: Vec<serde_json::Value> = self.get("call-mode-sessions")?;
        Ok(decode_sessions(raw))
    }

    fn list_users(&self) -> Result<Vec<User>, ServerError> {
        self.get("users")
    }

    fn list_teams(&self) -> Result<Vec<Team>, ServerError> {
        self.get("teams")
    }

    fn list_developments(&self) -> Result<Vec<Development>, ServerError> {
        self.get("developments")
    }

    fn list_sales(&self) -> Result<Vec<Sale>, ServerError> {
        self.get("sales")
    }

    fn list_clients(&self) -> Result<Vec<domain::Client>, ServerError> {
        self.get("clients")
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, ServerError> {
        let body = json!({ "email": email, "password": password });
        match self.send(self.client.post(self.url("auth/login")).json(&body)) {
            Ok(response) => {
                #[derive(serde::Deserialize)]
                struct LoginReply {
                    user: User,
                }
                let reply: LoginReply = decode(response)?;
                Ok(Some(reply.user))
            }
            Err(ServerError::Unauthorized(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
