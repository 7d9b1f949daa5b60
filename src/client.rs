//! The `BankClient` composition root.
//!
//! Wires the session store, API client, aggregated fetcher, and command
//! executor together and exposes the operations a view layer consumes:
//! login/register/logout, refresh, deposit, withdraw, and the blacklist
//! toggle. The view only ever observes `{is_loading, error, snapshot}`.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::auth::{SessionHandle, SessionStore};
use crate::config::Config;
use crate::models::{parse_positive_amount, AccountSnapshot, Identity};
use crate::sync::{
    CommandOutcome, CommandRequest, Executor, FetchStatus, Fetcher, StatusCell,
    MSG_BLACKLIST_FAILED, MSG_DEPOSIT_FAILED, MSG_INVALID_AMOUNT, MSG_WITHDRAW_FAILED,
};

pub struct BankClient {
    config: Config,
    session: SessionHandle,
    api: ApiClient,
    fetcher: Fetcher,
    executor: Executor,
    status: StatusCell,
}

impl BankClient {
    /// Build the client from configuration, restoring any persisted
    /// session from disk. Persisted state is advisory: the backend will
    /// still answer 401 when the restored credential has gone stale.
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config).context("Failed to build HTTP client")?;

        let storage_dir = config.session_dir()?;
        let mut store = SessionStore::new(storage_dir);
        if store.load() {
            debug!("Persisted session restored");
        }
        let session = SessionHandle::new(store);

        let status = StatusCell::default();
        let fetcher = Fetcher::new(session.clone(), api.clone(), status.clone());
        let executor = Executor::new(session.clone(), api.clone(), status.clone());

        Ok(Self {
            config,
            session,
            api,
            fetcher,
            executor,
            status,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Sign in and open a session with the returned credential.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let auth = self
            .api
            .signin(username, password)
            .await
            .context("Sign-in failed")?;
        let (token, identity) = auth.into_parts();
        self.session.login(token, identity);
        self.remember_username(username);
        Ok(())
    }

    /// Register a new account; the response doubles as a login.
    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> Result<()> {
        let auth = self
            .api
            .signup(username, email, password)
            .await
            .context("Registration failed")?;
        let (token, identity) = auth.into_parts();
        self.session.login(token, identity);
        self.remember_username(username);
        Ok(())
    }

    pub fn logout(&mut self) {
        self.session.logout();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session.identity()
    }

    fn remember_username(&mut self, username: &str) {
        self.config.last_username = Some(username.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Rebuild the account snapshot. A no-op when logged out.
    pub async fn refresh(&mut self) {
        self.fetcher.refresh().await;
    }

    pub fn snapshot(&self) -> &AccountSnapshot {
        self.fetcher.snapshot()
    }

    pub fn status(&self) -> FetchStatus {
        self.status.get()
    }

    // =========================================================================
    // Protected commands
    // =========================================================================

    /// Deposit funds. The raw input is validated locally: non-numeric or
    /// non-positive amounts are rejected without a network call. Returns
    /// true when the deposit was applied (and the snapshot refreshed).
    pub async fn deposit(&mut self, amount: &str) -> bool {
        let Some(amount) = parse_positive_amount(amount) else {
            self.status.set_error(MSG_INVALID_AMOUNT);
            return false;
        };
        let request = CommandRequest::post(
            self.api.deposit_url(),
            serde_json::json!({ "amount": amount }),
        );
        self.run_command(request, MSG_DEPOSIT_FAILED).await
    }

    /// Withdraw funds. Same local validation and refresh behavior as
    /// `deposit`.
    pub async fn withdraw(&mut self, amount: &str) -> bool {
        let Some(amount) = parse_positive_amount(amount) else {
            self.status.set_error(MSG_INVALID_AMOUNT);
            return false;
        };
        let request = CommandRequest::post(
            self.api.withdraw_url(),
            serde_json::json!({ "amount": amount }),
        );
        self.run_command(request, MSG_WITHDRAW_FAILED).await
    }

    /// Flip a client's blacklist flag (privileged identities only, enforced
    /// server-side). `currently_blacklisted` is the state being toggled
    /// away from.
    pub async fn toggle_blacklist(&mut self, client_id: i64, currently_blacklisted: bool) -> bool {
        let url = self.api.blacklist_url(client_id, !currently_blacklisted);
        let request = CommandRequest::put(url);
        self.run_command(request, MSG_BLACKLIST_FAILED).await
    }

    /// Shared tail of every command: on success clear the error and run
    /// exactly one sequential refresh, so the new snapshot reflects the
    /// just-applied mutation; on failure surface the response message.
    async fn run_command(&mut self, request: CommandRequest, fallback: &str) -> bool {
        let outcome = self.executor.execute(request).await;
        if outcome.ok {
            self.status.clear_error();
            self.fetcher.refresh().await;
            info!("Command applied and snapshot refreshed");
            true
        } else {
            self.surface_command_error(outcome, fallback);
            false
        }
    }

    /// Prefer the response body's `message`; otherwise keep whatever
    /// specific error the executor already recorded (session expired,
    /// network), falling back to the per-operation default.
    fn surface_command_error(&self, outcome: CommandOutcome, fallback: &str) {
        let message = outcome
            .data
            .as_ref()
            .and_then(|data| data.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty());
        match message {
            Some(message) => self.status.set_error(message.to_string()),
            None => self.status.set_error_if_empty(fallback),
        }
    }
}
