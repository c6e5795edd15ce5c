use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use common::config;

use super::identity::UserRef;

/// The two lifecycle states a ticket can be in. CLOSED is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TicketStatus {
    Open,
    Closed,
}

impl TicketStatus {
    /// Resolves a status string from the backend. The configured literals win;
    /// the canonical lowercase names are accepted as a fallback so partially
    /// migrated backends keep working.
    pub fn from_wire(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case(&config::status_open()) {
            Some(TicketStatus::Open)
        } else if raw.eq_ignore_ascii_case(&config::status_closed()) {
            Some(TicketStatus::Closed)
        } else {
            raw.parse().ok()
        }
    }

    /// The configured wire literal, which is also the label shown to users.
    pub fn wire_label(&self) -> String {
        match self {
            TicketStatus::Open => config::status_open(),
            TicketStatus::Closed => config::status_closed(),
        }
    }
}

/// Named priority reference. Only the name takes part in any logic (search).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Priority {
    pub id: Option<i64>,
    pub name: String,
}

/// Equipment a ticket is about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub id: Option<i64>,
    pub name: String,
    pub serial: Option<String>,
}

/// Canonical ticket as every layer past the wire boundary sees it.
///
/// `creator`/`assignee` are `None` when the backend sent a missing or
/// unusable reference; the predicates below then answer `false`, so policy
/// code denies instead of guessing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: Option<Priority>,
    pub creator: Option<UserRef>,
    pub assignee: Option<UserRef>,
    /// Admin who performed a manual assignment, for auditing. Never consulted
    /// by authorization checks.
    pub assigned_by: Option<i64>,
    pub asset: Option<Asset>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub rating: Option<u8>,
}

impl Ticket {
    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.status == TicketStatus::Closed
    }

    pub fn created_by(&self, user_id: i64) -> bool {
        self.creator.as_ref().is_some_and(|u| u.id == user_id)
    }

    pub fn assigned_to(&self, user_id: i64) -> bool {
        self.assignee.as_ref().is_some_and(|u| u.id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::AppConfig;
    use serial_test::serial;

    fn bare_ticket() -> Ticket {
        Ticket {
            id: 1,
            title: "printer jam".into(),
            description: "tray 2".into(),
            status: TicketStatus::Open,
            priority: None,
            creator: None,
            assignee: None,
            assigned_by: None,
            asset: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            closed_at: None,
            rating: None,
        }
    }

    #[test]
    #[serial]
    fn wire_mapping_follows_configuration() {
        assert_eq!(TicketStatus::from_wire("ABIERTO"), Some(TicketStatus::Open));
        assert_eq!(TicketStatus::from_wire("cerrado"), Some(TicketStatus::Closed));
        assert_eq!(TicketStatus::from_wire("open"), Some(TicketStatus::Open));
        assert_eq!(TicketStatus::from_wire("pending"), None);

        AppConfig::set_status_open("EN_CURSO");
        assert_eq!(TicketStatus::from_wire("en_curso"), Some(TicketStatus::Open));
        assert_eq!(TicketStatus::Open.wire_label(), "EN_CURSO");
        AppConfig::set_status_open("ABIERTO");
    }

    #[test]
    fn missing_references_never_match() {
        let ticket = bare_ticket();
        assert!(!ticket.created_by(42));
        assert!(!ticket.assigned_to(42));

        let mut owned = bare_ticket();
        owned.creator = Some(UserRef {
            id: 42,
            name: "a".into(),
            email: "a@x".into(),
        });
        assert!(owned.created_by(42));
        assert!(!owned.created_by(43));
    }
}
