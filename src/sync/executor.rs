//! Protected command executor.
//!
//! Every authenticated mutating call - deposit, withdraw, blacklist toggle -
//! passes through `Executor::execute`, which attaches the credential,
//! translates 401 into a logout, and absorbs transport failures into the
//! shared status cell.

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::auth::SessionHandle;

use super::{StatusCell, MSG_NETWORK_ERROR, MSG_NOT_AUTHENTICATED, MSG_SESSION_EXPIRED};

/// Descriptor for one protected command: endpoint, verb, optional JSON
/// body, and any extra headers (which never override the authorization
/// value).
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl CommandRequest {
    pub fn post(url: String, body: Value) -> Self {
        Self {
            method: Method::POST,
            url,
            body: Some(body),
            headers: HeaderMap::new(),
        }
    }

    pub fn put(url: String) -> Self {
        Self {
            method: Method::PUT,
            url,
            body: None,
            headers: HeaderMap::new(),
        }
    }
}

/// Result of a protected command. `ok` mirrors whether the response was
/// 2xx; `data` is the parsed body when one could be parsed.
#[derive(Debug, Clone, Default)]
pub struct CommandOutcome {
    pub ok: bool,
    pub data: Option<Value>,
}

impl CommandOutcome {
    fn failed() -> Self {
        Self {
            ok: false,
            data: None,
        }
    }
}

pub struct Executor {
    session: SessionHandle,
    api: ApiClient,
    status: StatusCell,
}

impl Executor {
    pub fn new(session: SessionHandle, api: ApiClient, status: StatusCell) -> Self {
        Self {
            session,
            api,
            status,
        }
    }

    /// Run one protected command.
    ///
    /// The credential is read fresh here, immediately before the send, so
    /// a logout that already happened makes any retry fail locally. All
    /// failure modes come back as `{ok: false, data: None}` with the
    /// matching error recorded; nothing is thrown.
    pub async fn execute(&self, request: CommandRequest) -> CommandOutcome {
        self.status.clear_error();

        let Some(token) = self.session.token() else {
            // Kept for symmetry with the 401 path; state-wise a no-op.
            self.status.set_error(MSG_NOT_AUTHENTICATED);
            self.session.logout();
            return CommandOutcome::failed();
        };

        debug!(method = %request.method, url = %request.url, "Executing protected command");

        let api = self.api.with_token(token);
        let response = match api
            .send(
                request.method,
                &request.url,
                request.headers,
                request.body.as_ref(),
            )
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Protected command transport failure");
                self.status.set_error(MSG_NETWORK_ERROR);
                return CommandOutcome::failed();
            }
        };

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Protected command saw 401, logging out");
            self.status.set_error(MSG_SESSION_EXPIRED);
            self.session.logout();
            return CommandOutcome::failed();
        }

        let ok = response.status().is_success();
        let data = response.json::<Value>().await.ok();
        CommandOutcome { ok, data }
    }
}
