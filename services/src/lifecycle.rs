//! Ticket lifecycle engine.
//!
//! Owns the OPEN to CLOSED state machine and every guarded mutation around it.
//! Each operation takes the acting identity explicitly; there is no ambient
//! session, so a given call is auditable from its arguments alone. Local
//! checks run first and in a fixed order (state, then permission, then input),
//! and nothing is persisted until all of them pass.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use common::format_validation_errors;
use store::models::{
    Comment, CreateComment, CreateTicket, Identity, Ticket, TicketStatus, TicketUpdate,
};
use store::{StoreError, TicketStore};

use crate::{access, assignment, roles};

/// Ratings may carry free-text feedback; below this length it is rejected.
const FEEDBACK_MIN_CHARS: usize = 10;

pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("not allowed to {action}")]
    Denied { action: &'static str },
    #[error("{reason}")]
    InvalidState { reason: String },
    #[error("invalid input: {reason}")]
    Validation { reason: String },
    #[error("ticket {ticket_id} no longer exists on the backend")]
    Conflict { ticket_id: i64 },
    /// The resolution comment never landed; nothing changed, retry the whole
    /// action.
    #[error("resolution comment was not recorded; the ticket is unchanged")]
    CommentNotRecorded {
        #[source]
        source: StoreError,
    },
    /// The comment landed but the close did not: retry only the close half
    /// (`finish_resolve`), not the comment.
    #[error("comment {comment_id} was recorded but ticket {ticket_id} is still open")]
    ResolvedHalfway {
        ticket_id: i64,
        comment_id: i64,
        #[source]
        source: StoreError,
    },
    /// The rating is saved; only the optional feedback comment is missing.
    #[error("rating was saved but the feedback comment was not recorded")]
    FeedbackNotRecorded {
        ticket_id: i64,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// User-entered fields for a new ticket. `assignee_id` is honored only when
/// the creator is an admin; everyone else goes through automatic assignment.
#[derive(Debug, Clone, Default)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    pub priority: Option<String>,
    pub asset_id: Option<i64>,
    pub assignee_id: Option<i64>,
}

/// Admin edit of an existing ticket. Carries no status field; the state
/// machine is the only writer of status and `closed_at`.
#[derive(Debug, Clone, Default)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub asset_id: Option<i64>,
    pub assignee_id: Option<i64>,
}

#[derive(Debug)]
pub struct ResolveOutcome {
    pub ticket: Ticket,
    pub comment: Comment,
}

#[derive(Debug)]
pub struct RateOutcome {
    pub ticket: Ticket,
    pub feedback: Option<Comment>,
}

pub struct TicketDesk {
    store: Arc<dyn TicketStore>,
}

impl TicketDesk {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// The read path feeding the collection view: fetch everything, keep what
    /// the viewer may see.
    pub async fn fetch_visible(
        &self,
        viewer: Option<&Identity>,
    ) -> LifecycleResult<Vec<Ticket>> {
        let all = self.store.list_tickets().await?;
        Ok(access::visible_tickets(viewer, &all))
    }

    pub async fn create(&self, actor: &Identity, draft: TicketDraft) -> LifecycleResult<Ticket> {
        if !access::can_create_ticket(actor) {
            return Err(LifecycleError::Denied { action: "create a ticket" });
        }

        let (assignee_id, assigned_by) = self.assignment_for(actor, draft.assignee_id).await?;
        let payload = CreateTicket {
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            asset_id: draft.asset_id,
            creator_id: actor.id,
            assignee_id,
            assigned_by,
        };
        payload.validate().map_err(|e| LifecycleError::Validation {
            reason: format_validation_errors(&e),
        })?;

        let ticket = self.store.create_ticket(&payload).await?;
        info!(
            ticket_id = ticket.id,
            user_id = actor.id,
            assignee_id,
            "ticket created"
        );
        Ok(ticket)
    }

    /// Decides the assignee for a new ticket.
    ///
    /// Admins assign by hand (recorded in `assigned_by` for the audit trail)
    /// or not at all; everyone else gets the least-loaded agent. A requested
    /// assignee from a non-admin is ignored, not an error.
    async fn assignment_for(
        &self,
        actor: &Identity,
        requested: Option<i64>,
    ) -> LifecycleResult<(Option<i64>, Option<i64>)> {
        let admin = roles::is_admin(actor);
        match requested {
            Some(assignee_id) if admin => {
                return Ok((Some(assignee_id), Some(actor.id)));
            }
            Some(assignee_id) => {
                warn!(
                    user_id = actor.id,
                    assignee_id, "ignoring manual assignment from non-admin creator"
                );
            }
            None => {}
        }
        if admin {
            return Ok((None, None));
        }

        let agents = self.store.list_agents().await?;
        let tickets = self.store.list_tickets().await?;
        Ok((
            assignment::choose_assignee(&agents, &tickets).map(|agent| agent.id),
            None,
        ))
    }

    /// CLOSE transition: records the mandatory resolution comment, then flips
    /// the status and stamps `closed_at`. Preconditions run before any effect,
    /// so a rejected call leaves both sides untouched.
    pub async fn resolve(
        &self,
        actor: &Identity,
        ticket: &Ticket,
        message: &str,
    ) -> LifecycleResult<ResolveOutcome> {
        if ticket.status != TicketStatus::Open {
            return Err(LifecycleError::InvalidState {
                reason: format!("ticket {} is already closed", ticket.id),
            });
        }
        if !access::can_resolve_ticket(actor, ticket) {
            return Err(LifecycleError::Denied { action: "resolve this ticket" });
        }

        let payload = CreateComment {
            ticket_id: ticket.id,
            author_id: actor.id,
            message: message.trim().to_string(),
        };
        payload.validate().map_err(|e| LifecycleError::Validation {
            reason: format_validation_errors(&e),
        })?;

        let comment = match self.store.add_comment(&payload).await {
            Ok(comment) => comment,
            Err(StoreError::NotFound) => {
                return Err(LifecycleError::Conflict { ticket_id: ticket.id });
            }
            Err(source) => return Err(LifecycleError::CommentNotRecorded { source }),
        };

        match self.store.close_ticket(ticket.id, Utc::now()).await {
            Ok(closed) => {
                info!(ticket_id = closed.id, user_id = actor.id, "ticket resolved");
                Ok(ResolveOutcome { ticket: closed, comment })
            }
            Err(source) => {
                warn!(
                    ticket_id = ticket.id,
                    comment_id = comment.id,
                    error = %source,
                    "close failed after the resolution comment was recorded"
                );
                Err(LifecycleError::ResolvedHalfway {
                    ticket_id: ticket.id,
                    comment_id: comment.id,
                    source,
                })
            }
        }
    }

    /// Retry path after `ResolvedHalfway`: performs only the close half.
    pub async fn finish_resolve(
        &self,
        actor: &Identity,
        ticket: &Ticket,
    ) -> LifecycleResult<Ticket> {
        if !access::can_resolve_ticket(actor, ticket) {
            return Err(LifecycleError::Denied { action: "resolve this ticket" });
        }
        match self.store.close_ticket(ticket.id, Utc::now()).await {
            Ok(closed) => Ok(closed),
            Err(StoreError::NotFound) => Err(LifecycleError::Conflict { ticket_id: ticket.id }),
            Err(source) => Err(source.into()),
        }
    }

    /// Rating: creator only, closed tickets only, score 1-5, with optional
    /// feedback text. All validation happens before the rating is persisted;
    /// only the feedback comment can fail afterwards, and that is reported as
    /// its own condition because the rating already stands.
    pub async fn rate(
        &self,
        actor: &Identity,
        ticket: &Ticket,
        score: u8,
        feedback: Option<&str>,
    ) -> LifecycleResult<RateOutcome> {
        if !(1..=5).contains(&score) {
            return Err(LifecycleError::Validation {
                reason: format!("rating {score} is outside 1-5"),
            });
        }
        let feedback = match feedback.map(str::trim).filter(|text| !text.is_empty()) {
            Some(text) if text.chars().count() < FEEDBACK_MIN_CHARS => {
                return Err(LifecycleError::Validation {
                    reason: format!(
                        "feedback must be at least {FEEDBACK_MIN_CHARS} characters"
                    ),
                });
            }
            other => other,
        };
        if ticket.status != TicketStatus::Closed {
            return Err(LifecycleError::InvalidState {
                reason: format!("ticket {} is not closed yet", ticket.id),
            });
        }
        if !access::can_rate_ticket(actor, ticket) {
            return Err(LifecycleError::Denied { action: "rate this ticket" });
        }

        let rated = match self.store.set_rating(ticket.id, score).await {
            Ok(ticket) => ticket,
            Err(StoreError::NotFound) => {
                return Err(LifecycleError::Conflict { ticket_id: ticket.id });
            }
            Err(source) => return Err(source.into()),
        };

        let mut saved = None;
        if let Some(text) = feedback {
            let payload = CreateComment {
                ticket_id: ticket.id,
                author_id: actor.id,
                message: text.to_string(),
            };
            match self.store.add_comment(&payload).await {
                Ok(comment) => saved = Some(comment),
                Err(source) => {
                    warn!(
                        ticket_id = ticket.id,
                        error = %source,
                        "feedback comment failed after the rating was saved"
                    );
                    return Err(LifecycleError::FeedbackNotRecorded {
                        ticket_id: ticket.id,
                        source,
                    });
                }
            }
        }

        info!(ticket_id = ticket.id, user_id = actor.id, score, "ticket rated");
        Ok(RateOutcome { ticket: rated, feedback: saved })
    }

    /// Removal is admin-only and independent of status.
    pub async fn delete(&self, actor: &Identity, ticket: &Ticket) -> LifecycleResult<()> {
        if !access::can_delete_ticket(actor, ticket) {
            return Err(LifecycleError::Denied { action: "delete this ticket" });
        }
        match self.store.delete_ticket(ticket.id).await {
            Ok(()) => {
                info!(ticket_id = ticket.id, user_id = actor.id, "ticket deleted");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(LifecycleError::Conflict { ticket_id: ticket.id }),
            Err(source) => Err(source.into()),
        }
    }

    /// Admin edit of ticket fields. A reassignment through here records the
    /// acting admin in `assigned_by`, like a manual assignment at creation.
    pub async fn update(
        &self,
        actor: &Identity,
        ticket: &Ticket,
        patch: TicketPatch,
    ) -> LifecycleResult<Ticket> {
        if !access::can_edit_ticket(actor, ticket) {
            return Err(LifecycleError::Denied { action: "edit this ticket" });
        }

        let assigned_by = patch.assignee_id.map(|_| actor.id);
        let changes = TicketUpdate {
            title: patch.title,
            description: patch.description,
            priority: patch.priority,
            asset_id: patch.asset_id,
            assignee_id: patch.assignee_id,
            assigned_by,
            status: None,
            closed_at: None,
        };
        changes.validate().map_err(|e| LifecycleError::Validation {
            reason: format_validation_errors(&e),
        })?;

        match self.store.update_ticket(ticket.id, &changes).await {
            Ok(updated) => Ok(updated),
            Err(StoreError::NotFound) => Err(LifecycleError::Conflict { ticket_id: ticket.id }),
            Err(source) => Err(source.into()),
        }
    }

    /// Comment listing, gated on visibility of the ticket itself.
    pub async fn comments(
        &self,
        actor: &Identity,
        ticket: &Ticket,
    ) -> LifecycleResult<Vec<Comment>> {
        if !access::can_view_ticket(actor, ticket) {
            return Err(LifecycleError::Denied { action: "view this ticket" });
        }
        Ok(self.store.comments_for(ticket.id).await?)
    }

    /// Free-standing comment outside a transition.
    pub async fn add_comment(
        &self,
        actor: &Identity,
        ticket: &Ticket,
        message: &str,
    ) -> LifecycleResult<Comment> {
        if !access::can_comment_ticket(actor, ticket) {
            return Err(LifecycleError::Denied { action: "comment on this ticket" });
        }
        let payload = CreateComment {
            ticket_id: ticket.id,
            author_id: actor.id,
            message: message.trim().to_string(),
        };
        payload.validate().map_err(|e| LifecycleError::Validation {
            reason: format_validation_errors(&e),
        })?;

        match self.store.add_comment(&payload).await {
            Ok(comment) => Ok(comment),
            Err(StoreError::NotFound) => Err(LifecycleError::Conflict { ticket_id: ticket.id }),
            Err(source) => Err(source.into()),
        }
    }

    /// Authors may reword their own comments.
    pub async fn edit_comment(
        &self,
        actor: &Identity,
        comment: &Comment,
        message: &str,
    ) -> LifecycleResult<Comment> {
        if !comment.is_author(actor.id) {
            return Err(LifecycleError::Denied { action: "edit this comment" });
        }
        let message = message.trim();
        if message.is_empty() {
            return Err(LifecycleError::Validation {
                reason: "comment must not be empty".into(),
            });
        }
        match self.store.update_comment(comment.id, message).await {
            Ok(updated) => Ok(updated),
            Err(StoreError::NotFound) => {
                Err(LifecycleError::Conflict { ticket_id: comment.ticket_id })
            }
            Err(source) => Err(source.into()),
        }
    }
}
