//! REST gateway to the help-desk backend.
//!
//! Every endpoint wraps its payload in the `{ success, data, message }`
//! envelope; unwrapping and status-code mapping happen here so callers only
//! deal with canonical models and `StoreError`.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use common::config;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    Comment, CreateComment, CreateTicket, Identity, Ticket, TicketStatus, TicketUpdate,
};
use crate::traits::TicketStore;
use crate::wire::{self, CommentDto, LoginDto, TicketDto};

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
}

impl<T> ApiEnvelope<T> {
    fn into_data(self) -> StoreResult<T> {
        if self.success {
            self.data.ok_or(StoreError::Api {
                message: "response envelope carried no data".to_string(),
            })
        } else {
            Err(StoreError::Api {
                message: self.message,
            })
        }
    }
}

pub struct RestTicketStore {
    client: Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl RestTicketStore {
    /// Builds the gateway against the configured base URL and timeout.
    pub fn from_config() -> StoreResult<Self> {
        let base = config::api_base_url();
        let timeout = Duration::from_secs(config::request_timeout_seconds());
        Self::new(&base, timeout)
    }

    pub fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        // Url::join drops the last path segment unless the base ends with a slash.
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).map_err(|_| StoreError::BadBaseUrl(base_url.to_string()))?;

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            token: RwLock::new(None),
        })
    }

    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.into());
        }
    }

    pub fn clear_token(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }

    /// Authenticates and installs the returned bearer token on this gateway.
    pub async fn login(&self, email: &str, password: &str) -> StoreResult<(Identity, Option<String>)> {
        let url = self.endpoint("auth/login")?;
        let body = json!({ "email": email, "password": password });
        let response = self.dispatch(Method::POST, url, Some(&body)).await?;
        let envelope: ApiEnvelope<LoginDto> = response.json().await?;
        let (identity, token) = envelope.into_data()?.normalize()?;

        if let Some(token) = &token {
            self.set_token(token.clone());
        }
        Ok((identity, token))
    }

    fn endpoint(&self, path: &str) -> StoreResult<Url> {
        self.base_url
            .join(path)
            .map_err(|_| StoreError::BadBaseUrl(format!("{}{}", self.base_url, path)))
    }

    async fn dispatch(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> StoreResult<reqwest::Response> {
        debug!(%method, %url, "dispatching backend request");

        let mut request = self.client.request(method, url);
        let token = self.token.read().ok().and_then(|guard| guard.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::UNAUTHORIZED => Err(StoreError::Unauthorized),
            StatusCode::FORBIDDEN => Err(StoreError::Forbidden),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound),
            _ => Ok(response),
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> StoreResult<T> {
        let url = self.endpoint(path)?;
        let response = self.dispatch(method, url, body).await?;
        let envelope: ApiEnvelope<T> = response.json().await?;
        envelope.into_data()
    }

    /// For endpoints whose success envelope carries no data (`delete`).
    async fn send_unit(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> StoreResult<()> {
        let url = self.endpoint(path)?;
        let response = self.dispatch(method, url, body).await?;
        let envelope: ApiEnvelope<Option<serde_json::Value>> = response.json().await?;
        if envelope.success {
            Ok(())
        } else {
            Err(StoreError::Api {
                message: envelope.message,
            })
        }
    }
}

#[async_trait]
impl TicketStore for RestTicketStore {
    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>> {
        let items: Vec<serde_json::Value> = self.send(Method::GET, "ticket", None).await?;
        Ok(wire::normalize_tickets(items))
    }

    async fn get_ticket(&self, ticket_id: i64) -> StoreResult<Ticket> {
        let dto: TicketDto = self
            .send(Method::GET, &format!("ticket/{ticket_id}"), None)
            .await?;
        Ok(dto.normalize()?)
    }

    async fn create_ticket(&self, payload: &CreateTicket) -> StoreResult<Ticket> {
        let body = serde_json::to_value(payload)?;
        let dto: TicketDto = self.send(Method::POST, "ticket", Some(&body)).await?;
        Ok(dto.normalize()?)
    }

    async fn update_ticket(&self, ticket_id: i64, changes: &TicketUpdate) -> StoreResult<Ticket> {
        let body = serde_json::to_value(changes)?;
        let dto: TicketDto = self
            .send(Method::PUT, &format!("ticket/{ticket_id}"), Some(&body))
            .await?;
        Ok(dto.normalize()?)
    }

    async fn close_ticket(&self, ticket_id: i64, closed_at: DateTime<Utc>) -> StoreResult<Ticket> {
        let changes = TicketUpdate {
            status: Some(TicketStatus::Closed.wire_label()),
            closed_at: Some(closed_at),
            ..Default::default()
        };
        self.update_ticket(ticket_id, &changes).await
    }

    async fn set_rating(&self, ticket_id: i64, rating: u8) -> StoreResult<Ticket> {
        let body = json!({ "rating": rating });
        let dto: TicketDto = self
            .send(
                Method::PATCH,
                &format!("ticket/{ticket_id}/rating"),
                Some(&body),
            )
            .await?;
        Ok(dto.normalize()?)
    }

    async fn delete_ticket(&self, ticket_id: i64) -> StoreResult<()> {
        self.send_unit(Method::DELETE, &format!("ticket/{ticket_id}"), None)
            .await
    }

    async fn comments_for(&self, ticket_id: i64) -> StoreResult<Vec<Comment>> {
        let items: Vec<serde_json::Value> = self
            .send(
                Method::GET,
                &format!("ticket-comment/ticket/{ticket_id}"),
                None,
            )
            .await?;
        Ok(wire::normalize_comments(items))
    }

    async fn add_comment(&self, payload: &CreateComment) -> StoreResult<Comment> {
        let body = serde_json::to_value(payload)?;
        let dto: CommentDto = self.send(Method::POST, "ticket-comment", Some(&body)).await?;
        Ok(dto.normalize()?)
    }

    async fn update_comment(&self, comment_id: i64, message: &str) -> StoreResult<Comment> {
        let body = json!({ "message": message });
        let dto: CommentDto = self
            .send(
                Method::PUT,
                &format!("ticket-comment/{comment_id}"),
                Some(&body),
            )
            .await?;
        Ok(dto.normalize()?)
    }

    async fn list_agents(&self) -> StoreResult<Vec<Identity>> {
        let mut url = self.endpoint("user")?;
        url.query_pairs_mut()
            .append_pair("role", &config::role_agent());

        let response = self.dispatch(Method::GET, url, None).await?;
        let envelope: ApiEnvelope<Vec<serde_json::Value>> = response.json().await?;
        Ok(wire::normalize_identities(envelope.into_data()?))
    }
}
