//! Outbound request bodies.
//!
//! These serialize with canonical snake_case names only; the alias tolerance
//! in `wire` is strictly for reading the backend's historical responses.

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

/// Body for `POST /ticket`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateTicket {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<i64>,
    pub creator_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_by: Option<i64>,
}

/// Body for `PUT /ticket/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct TicketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_by: Option<i64>,
    /// Status transitions go through the lifecycle engine, which is the only
    /// writer of these two fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

/// Body for `POST /ticket-comment`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateComment {
    pub ticket_id: i64,
    pub author_id: i64,
    #[validate(length(min = 1, message = "comment must not be empty"))]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bodies_fail_validation() {
        let comment = CreateComment {
            ticket_id: 1,
            author_id: 2,
            message: "  ".trim().to_string(),
        };
        assert!(comment.validate().is_err());

        let ticket = CreateTicket {
            title: String::new(),
            description: "broken".into(),
            priority: None,
            asset_id: None,
            creator_id: 1,
            assignee_id: None,
            assigned_by: None,
        };
        assert!(ticket.validate().is_err());
    }

    #[test]
    fn update_serializes_only_present_fields() {
        let update = TicketUpdate {
            title: Some("new title".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "new title" }));
    }
}
