use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::models::{Comment, CreateComment, CreateTicket, Identity, Ticket, TicketUpdate};

/// Everything the engine needs from the backend, as one object-safe surface.
///
/// `RestTicketStore` is the production implementation; tests run against the
/// in-memory store in `test_utils`.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>>;

    async fn get_ticket(&self, ticket_id: i64) -> StoreResult<Ticket>;

    async fn create_ticket(&self, payload: &CreateTicket) -> StoreResult<Ticket>;

    async fn update_ticket(&self, ticket_id: i64, changes: &TicketUpdate) -> StoreResult<Ticket>;

    /// Persists the CLOSE transition: status flips to closed and `closed_at`
    /// is recorded. The caller (the lifecycle engine) owns every precondition.
    async fn close_ticket(&self, ticket_id: i64, closed_at: DateTime<Utc>) -> StoreResult<Ticket>;

    async fn set_rating(&self, ticket_id: i64, rating: u8) -> StoreResult<Ticket>;

    async fn delete_ticket(&self, ticket_id: i64) -> StoreResult<()>;

    /// Comments for one ticket, oldest first.
    async fn comments_for(&self, ticket_id: i64) -> StoreResult<Vec<Comment>>;

    async fn add_comment(&self, payload: &CreateComment) -> StoreResult<Comment>;

    async fn update_comment(&self, comment_id: i64, message: &str) -> StoreResult<Comment>;

    /// Directory of identities carrying the agent role, the candidate pool
    /// for automatic assignment.
    async fn list_agents(&self) -> StoreResult<Vec<Identity>>;
}
