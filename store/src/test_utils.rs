//! In-memory `TicketStore` and model builders for tests in this workspace.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{StoreError, StoreResult};
use crate::models::{
    Comment, CreateComment, CreateTicket, Identity, Role, Ticket, TicketStatus, TicketUpdate,
    UserRef,
};
use crate::traits::TicketStore;

pub fn sample_identity(id: i64, roles: &[Role]) -> Identity {
    Identity {
        id,
        name: format!("user{id}"),
        email: format!("user{id}@helpdesk.test"),
        roles: roles.to_vec(),
    }
}

pub fn sample_time(offset_minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + Duration::minutes(offset_minutes)
}

pub fn sample_ticket(id: i64, creator_id: i64, assignee_id: Option<i64>) -> Ticket {
    Ticket {
        id,
        title: format!("ticket {id}"),
        description: "something is broken".into(),
        status: TicketStatus::Open,
        priority: None,
        creator: Some(UserRef {
            id: creator_id,
            name: format!("user{creator_id}"),
            email: format!("user{creator_id}@helpdesk.test"),
        }),
        assignee: assignee_id.map(|id| UserRef {
            id,
            name: format!("user{id}"),
            email: format!("user{id}@helpdesk.test"),
        }),
        assigned_by: None,
        asset: None,
        created_at: sample_time(id),
        updated_at: sample_time(id),
        closed_at: None,
        rating: None,
    }
}

pub fn closed_ticket(id: i64, creator_id: i64, assignee_id: Option<i64>) -> Ticket {
    let mut ticket = sample_ticket(id, creator_id, assignee_id);
    ticket.status = TicketStatus::Closed;
    ticket.closed_at = Some(sample_time(id + 60));
    ticket
}

#[derive(Default)]
struct MemoryState {
    tickets: BTreeMap<i64, Ticket>,
    comments: Vec<Comment>,
    agents: Vec<Identity>,
    next_ticket_id: i64,
    next_comment_id: i64,
    fail_close: bool,
    fail_comments: bool,
}

/// Deterministic stand-in for the backend. Failure flags let lifecycle tests
/// drive the partial-outcome paths.
#[derive(Default)]
pub struct MemoryTicketStore {
    state: Mutex<MemoryState>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(agents: Vec<Identity>) -> Self {
        let store = Self::new();
        store.lock().agents = agents;
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store lock poisoned")
    }

    pub fn seed_ticket(&self, ticket: Ticket) {
        let mut state = self.lock();
        state.next_ticket_id = state.next_ticket_id.max(ticket.id);
        state.tickets.insert(ticket.id, ticket);
    }

    pub fn set_agents(&self, agents: Vec<Identity>) {
        self.lock().agents = agents;
    }

    pub fn set_fail_close(&self, fail: bool) {
        self.lock().fail_close = fail;
    }

    pub fn set_fail_comments(&self, fail: bool) {
        self.lock().fail_comments = fail;
    }

    /// Snapshot accessor for assertions.
    pub fn ticket(&self, ticket_id: i64) -> Option<Ticket> {
        self.lock().tickets.get(&ticket_id).cloned()
    }

    pub fn comment_count(&self, ticket_id: i64) -> usize {
        self.lock()
            .comments
            .iter()
            .filter(|c| c.ticket_id == ticket_id)
            .count()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn list_tickets(&self) -> StoreResult<Vec<Ticket>> {
        Ok(self.lock().tickets.values().cloned().collect())
    }

    async fn get_ticket(&self, ticket_id: i64) -> StoreResult<Ticket> {
        self.lock()
            .tickets
            .get(&ticket_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_ticket(&self, payload: &CreateTicket) -> StoreResult<Ticket> {
        let mut state = self.lock();
        state.next_ticket_id += 1;
        let id = state.next_ticket_id;

        let assignee = payload.assignee_id.map(|assignee_id| {
            state
                .agents
                .iter()
                .find(|a| a.id == assignee_id)
                .map(UserRef::from)
                .unwrap_or(UserRef {
                    id: assignee_id,
                    name: String::new(),
                    email: String::new(),
                })
        });

        let now = Utc::now();
        let ticket = Ticket {
            id,
            title: payload.title.clone(),
            description: payload.description.clone(),
            status: TicketStatus::Open,
            priority: payload.priority.clone().map(|name| crate::models::Priority {
                id: None,
                name,
            }),
            creator: Some(UserRef {
                id: payload.creator_id,
                name: format!("user{}", payload.creator_id),
                email: format!("user{}@helpdesk.test", payload.creator_id),
            }),
            assignee,
            assigned_by: payload.assigned_by,
            asset: None,
            created_at: now,
            updated_at: now,
            closed_at: None,
            rating: None,
        };
        state.tickets.insert(id, ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket(&self, ticket_id: i64, changes: &TicketUpdate) -> StoreResult<Ticket> {
        let mut state = self.lock();
        let Some(mut ticket) = state.tickets.get(&ticket_id).cloned() else {
            return Err(StoreError::NotFound);
        };

        if let Some(title) = &changes.title {
            ticket.title = title.clone();
        }
        if let Some(description) = &changes.description {
            ticket.description = description.clone();
        }
        if let Some(priority) = &changes.priority {
            ticket.priority = Some(crate::models::Priority {
                id: None,
                name: priority.clone(),
            });
        }
        if let Some(assignee_id) = changes.assignee_id {
            ticket.assignee = Some(UserRef {
                id: assignee_id,
                name: format!("user{assignee_id}"),
                email: format!("user{assignee_id}@helpdesk.test"),
            });
        }
        if let Some(assigned_by) = changes.assigned_by {
            ticket.assigned_by = Some(assigned_by);
        }
        if let Some(status) = &changes.status {
            ticket.status = TicketStatus::from_wire(status).ok_or(StoreError::Api {
                message: format!("unknown status `{status}`"),
            })?;
        }
        if let Some(closed_at) = changes.closed_at {
            ticket.closed_at = Some(closed_at);
        }
        ticket.updated_at = Utc::now();

        state.tickets.insert(ticket_id, ticket.clone());
        Ok(ticket)
    }

    async fn close_ticket(&self, ticket_id: i64, closed_at: DateTime<Utc>) -> StoreResult<Ticket> {
        {
            let state = self.lock();
            if state.fail_close {
                return Err(StoreError::Api {
                    message: "injected close failure".into(),
                });
            }
            if !state.tickets.contains_key(&ticket_id) {
                return Err(StoreError::NotFound);
            }
        }
        let changes = TicketUpdate {
            status: Some(TicketStatus::Closed.wire_label()),
            closed_at: Some(closed_at),
            ..Default::default()
        };
        self.update_ticket(ticket_id, &changes).await
    }

    async fn set_rating(&self, ticket_id: i64, rating: u8) -> StoreResult<Ticket> {
        let mut state = self.lock();
        let Some(ticket) = state.tickets.get_mut(&ticket_id) else {
            return Err(StoreError::NotFound);
        };
        ticket.rating = Some(rating);
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }

    async fn delete_ticket(&self, ticket_id: i64) -> StoreResult<()> {
        let mut state = self.lock();
        if state.tickets.remove(&ticket_id).is_none() {
            return Err(StoreError::NotFound);
        }
        state.comments.retain(|c| c.ticket_id != ticket_id);
        Ok(())
    }

    async fn comments_for(&self, ticket_id: i64) -> StoreResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .lock()
            .comments
            .iter()
            .filter(|c| c.ticket_id == ticket_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn add_comment(&self, payload: &CreateComment) -> StoreResult<Comment> {
        let mut state = self.lock();
        if state.fail_comments {
            return Err(StoreError::Api {
                message: "injected comment failure".into(),
            });
        }
        if !state.tickets.contains_key(&payload.ticket_id) {
            return Err(StoreError::NotFound);
        }

        state.next_comment_id += 1;
        let comment = Comment {
            id: state.next_comment_id,
            ticket_id: payload.ticket_id,
            author: Some(UserRef {
                id: payload.author_id,
                name: format!("user{}", payload.author_id),
                email: format!("user{}@helpdesk.test", payload.author_id),
            }),
            message: payload.message.clone(),
            created_at: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(&self, comment_id: i64, message: &str) -> StoreResult<Comment> {
        let mut state = self.lock();
        let Some(comment) = state.comments.iter_mut().find(|c| c.id == comment_id) else {
            return Err(StoreError::NotFound);
        };
        comment.message = message.to_string();
        Ok(comment.clone())
    }

    async fn list_agents(&self) -> StoreResult<Vec<Identity>> {
        Ok(self.lock().agents.clone())
    }
}
