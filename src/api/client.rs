//! API client for the Microbank backend services.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests against the client/identity service and the banking/ledger
//! service.

use std::time::Duration;

use reqwest::{header, Client, Method, Response, StatusCode};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::models::{AuthResponse, BalanceResponse, ClientRecord, Profile, Transaction};

use super::ApiError;

/// HTTP request timeout in seconds.
/// A bounded wait keeps a stuck backend from pinning `is_loading` forever;
/// a timed-out read settles as a failed outcome instead.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// API client for both Microbank services.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    client_base: String,
    banking_base: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client from the configured service base URLs.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            client_base: config.client_service_url.trim_end_matches('/').to_string(),
            banking_base: config.banking_service_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            http: self.http.clone(),
            client_base: self.client_base.clone(),
            banking_base: self.banking_base.clone(),
            token: Some(token),
        }
    }

    // ===== Authentication =====

    /// Sign in and obtain a bearer token plus the identity it belongs to.
    pub async fn signin(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let url = format!("{}/auth/signin", self.client_base);
        let body = serde_json::json!({ "username": username, "password": password });
        self.post_json(&url, &body).await
    }

    /// Register a new account. The response has the same shape as sign-in,
    /// so a successful registration doubles as a login.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let url = format!("{}/auth/signup", self.client_base);
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        self.post_json(&url, &body).await
    }

    // ===== Aggregated reads =====

    /// Fetch the authenticated user's profile from the identity service.
    pub async fn fetch_profile(&self) -> Result<Profile, ApiError> {
        let url = format!("{}/profile", self.client_base);
        self.get_json(&url).await
    }

    /// Fetch the current account balance from the banking service.
    pub async fn fetch_balance(&self) -> Result<Decimal, ApiError> {
        let url = format!("{}/balance", self.banking_base);
        let response: BalanceResponse = self.get_json(&url).await?;
        Ok(response.balance)
    }

    /// Fetch the transaction history, in backend order.
    pub async fn fetch_transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        let url = format!("{}/transactions", self.banking_base);
        self.get_json(&url).await
    }

    /// Fetch the full client roster (privileged identities only).
    pub async fn fetch_clients(&self) -> Result<Vec<ClientRecord>, ApiError> {
        let url = format!("{}/clients", self.client_base);
        self.get_json(&url).await
    }

    // ===== Command endpoint URLs =====

    pub fn deposit_url(&self) -> String {
        format!("{}/deposit", self.banking_base)
    }

    pub fn withdraw_url(&self) -> String {
        format!("{}/withdraw", self.banking_base)
    }

    pub fn blacklist_url(&self, client_id: i64, is_blacklisted: bool) -> String {
        format!(
            "{}/admin/blacklist/{}?isBlacklisted={}",
            self.client_base, client_id, is_blacklisted
        )
    }

    // ===== Request plumbing =====

    /// Send a request with the credential attached. Caller-supplied headers
    /// are applied first so the authorization value always wins.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        headers: header::HeaderMap,
        body: Option<&Value>,
    ) -> Result<Response, reqwest::Error> {
        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }
        request.send().await
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.http.get(url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!(url, "GET");
        let response = self.get(url).send().await?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(url, "POST");
        let mut request = self.http.post(url).json(body);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Check if a response is successful, folding failures into `ApiError`.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }
}
