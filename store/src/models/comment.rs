use chrono::{DateTime, Utc};
use serde::Serialize;

use super::identity::UserRef;

/// A message attached to a ticket: resolution notes, follow-ups, ratings
/// feedback. Listed oldest-first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub ticket_id: i64,
    pub author: Option<UserRef>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_author(&self, user_id: i64) -> bool {
        self.author.as_ref().is_some_and(|u| u.id == user_id)
    }
}
