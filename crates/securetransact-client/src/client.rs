use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use securetransact_types::api::{
    AuthResponse, CreateMessageRequest, CreateTransactionRequest, ErrorBody, HealthResponse,
    UpdateStatusRequest, UpdateUserRequest,
};
use securetransact_types::models::{Message, Transaction, TransactionStatus, User};

use crate::error::ClientError;
use crate::form::{LoginForm, RegistrationForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// API reachable and backed by a database.
    Connected,
    /// API reachable but running without a database.
    Degraded,
    Disconnected,
}

/// Holds the session token after a successful register or login.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(builder.bearer_auth(token))
    }

    // -- Diagnostics --

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let resp = self.http.get(self.url("/api/health")).send().await?;
        decode(resp).await
    }

    /// Never fails: an unreachable server is reported as `Disconnected`.
    pub async fn server_status(&self) -> ServerStatus {
        match self.health().await {
            Ok(h) if h.database == "Connected" => ServerStatus::Connected,
            Ok(_) => ServerStatus::Degraded,
            Err(e) => {
                debug!("Health check failed: {}", e);
                ServerStatus::Disconnected
            }
        }
    }

    // -- Auth --

    pub async fn register(&mut self, form: &RegistrationForm) -> Result<AuthResponse, ClientError> {
        let req = form.validate().map_err(ClientError::Form)?;
        let resp = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&req)
            .send()
            .await?;
        let auth: AuthResponse = decode(resp).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    pub async fn login(&mut self, form: &LoginForm) -> Result<AuthResponse, ClientError> {
        let req = form.validate().map_err(ClientError::Form)?;
        let resp = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&req)
            .send()
            .await?;
        let auth: AuthResponse = decode(resp).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    // -- Users --

    pub async fn user(&self, id: &str) -> Result<User, ClientError> {
        self.get(&format!("/api/users/{}", id)).await
    }

    pub async fn update_user(&self, id: &str, changes: &UpdateUserRequest) -> Result<User, ClientError> {
        self.send_json(self.http.put(self.url(&format!("/api/users/{}", id))), changes)
            .await
    }

    // -- Transactions --

    pub async fn transactions(&self) -> Result<Vec<Transaction>, ClientError> {
        self.get("/api/transactions").await
    }

    pub async fn user_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, ClientError> {
        self.get(&format!("/api/transactions/user/{}", user_id)).await
    }

    pub async fn create_transaction(
        &self,
        tx: &CreateTransactionRequest,
    ) -> Result<Transaction, ClientError> {
        self.send_json(self.http.post(self.url("/api/transactions")), tx)
            .await
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: TransactionStatus,
        dispute_reason: Option<String>,
    ) -> Result<Transaction, ClientError> {
        let body = UpdateStatusRequest {
            status,
            dispute_reason,
        };
        let url = self.url(&format!("/api/transactions/{}/status", id));
        self.send_json(self.http.put(url), &body).await
    }

    // -- Messages --

    pub async fn messages(&self, transaction_id: &str) -> Result<Vec<Message>, ClientError> {
        self.get(&format!("/api/transactions/{}/messages", transaction_id))
            .await
    }

    pub async fn send_message(&self, msg: &CreateMessageRequest) -> Result<Message, ClientError> {
        self.send_json(self.http.post(self.url("/api/messages")), msg)
            .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.authed(self.http.get(self.url(path)))?.send().await?;
        decode(resp).await
    }

    async fn send_json<B, T>(&self, builder: RequestBuilder, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.authed(builder)?.json(body).send().await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    let text = resp.text().await?;
    if status.is_success() {
        return Ok(serde_json::from_str(&text)?);
    }

    let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or_else(|_| ErrorBody {
        success: Some(false),
        error: if text.is_empty() {
            status.canonical_reason().unwrap_or("Request failed").to_string()
        } else {
            text
        },
        suggestion: None,
        code: None,
        details: None,
    });
    warn!("API error {}: {}", status, body.error);
    Err(ClientError::Api {
        status: status.as_u16(),
        body,
    })
}
