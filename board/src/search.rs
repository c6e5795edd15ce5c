//! Free-text matching across every field a user can see on a ticket row.

use common::format;
use store::models::Ticket;

/// Case-insensitive containment over the displayed fields: texts, the status
/// label, people, equipment, and the formatted dates. The term is expected
/// already lowercased by the board.
pub(crate) fn matches(ticket: &Ticket, term: &str) -> bool {
    let mut haystack = vec![
        ticket.title.clone(),
        ticket.description.clone(),
        ticket.status.wire_label(),
        format::timestamp(&ticket.created_at),
        format::timestamp(&ticket.updated_at),
    ];
    if let Some(closed_at) = &ticket.closed_at {
        haystack.push(format::timestamp(closed_at));
    }
    if let Some(creator) = &ticket.creator {
        haystack.push(creator.name.clone());
        haystack.push(creator.email.clone());
    }
    if let Some(assignee) = &ticket.assignee {
        haystack.push(assignee.name.clone());
        haystack.push(assignee.email.clone());
    }
    if let Some(priority) = &ticket.priority {
        haystack.push(priority.name.clone());
    }
    if let Some(asset) = &ticket.asset {
        haystack.push(asset.name.clone());
        if let Some(serial) = &asset.serial {
            haystack.push(serial.clone());
        }
    }

    haystack
        .iter()
        .any(|field| field.to_lowercase().contains(term))
}
