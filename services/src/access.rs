//! Ticket access policy.
//!
//! Who may see or act on a ticket, derived from the viewer's primary role and
//! their relationship to the ticket. Every predicate is evaluated fresh per
//! call. Missing or malformed creator/assignee references compare as "no
//! match", so the policy denies instead of guessing; identities without roles
//! get the narrowest visibility (their own tickets) rather than an error.

use store::models::{Identity, Role, Ticket, TicketStatus};

use crate::roles;

/// Filters a fetched collection down to what `viewer` may see.
///
/// No viewer means no session: nothing is visible.
pub fn visible_tickets(viewer: Option<&Identity>, tickets: &[Ticket]) -> Vec<Ticket> {
    let Some(viewer) = viewer else {
        return Vec::new();
    };
    let role = roles::primary_role(viewer);
    tickets
        .iter()
        .filter(|ticket| visible_for(viewer, role, ticket))
        .cloned()
        .collect()
}

pub fn can_view_ticket(viewer: &Identity, ticket: &Ticket) -> bool {
    visible_for(viewer, roles::primary_role(viewer), ticket)
}

fn visible_for(viewer: &Identity, role: Option<Role>, ticket: &Ticket) -> bool {
    match role {
        Some(Role::Admin) => true,
        Some(Role::Agent) => ticket.created_by(viewer.id) || ticket.assigned_to(viewer.id),
        // Roleless identities fall back to creator-only visibility.
        Some(Role::Client) | None => ticket.created_by(viewer.id),
    }
}

pub fn can_create_ticket(_viewer: &Identity) -> bool {
    true
}

pub fn can_edit_ticket(viewer: &Identity, _ticket: &Ticket) -> bool {
    roles::is_admin(viewer)
}

pub fn can_delete_ticket(viewer: &Identity, _ticket: &Ticket) -> bool {
    roles::is_admin(viewer)
}

/// Admins may resolve anything (the lifecycle engine still enforces the OPEN
/// precondition); agents only what is currently assigned to them and open.
pub fn can_resolve_ticket(viewer: &Identity, ticket: &Ticket) -> bool {
    match roles::primary_role(viewer) {
        Some(Role::Admin) => true,
        Some(Role::Agent) => {
            ticket.assigned_to(viewer.id) && ticket.status == TicketStatus::Open
        }
        Some(Role::Client) | None => false,
    }
}

/// Free-standing comments follow the resolve privilege.
pub fn can_comment_ticket(viewer: &Identity, ticket: &Ticket) -> bool {
    can_resolve_ticket(viewer, ticket)
}

/// Rating belongs to the person the ticket was solved for: the creator, once
/// the ticket is closed. Staff roles never rate.
pub fn can_rate_ticket(viewer: &Identity, ticket: &Ticket) -> bool {
    match roles::primary_role(viewer) {
        Some(Role::Client) | None => {
            ticket.created_by(viewer.id) && ticket.status == TicketStatus::Closed
        }
        Some(Role::Admin) | Some(Role::Agent) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::test_utils::{closed_ticket, sample_identity, sample_ticket};

    #[test]
    fn no_session_sees_nothing() {
        let tickets = vec![sample_ticket(1, 9, None)];
        assert!(visible_tickets(None, &tickets).is_empty());
    }

    #[test]
    fn client_sees_only_tickets_they_created() {
        let client = sample_identity(5, &[Role::Client]);
        let tickets = vec![
            sample_ticket(1, 5, None),
            sample_ticket(2, 9, Some(5)),
            sample_ticket(3, 9, None),
        ];

        let visible = visible_tickets(Some(&client), &tickets);
        assert_eq!(
            visible.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[test]
    fn agent_sees_created_or_assigned() {
        let agent = sample_identity(4, &[Role::Agent]);
        let tickets = vec![
            sample_ticket(1, 4, None),
            sample_ticket(2, 9, Some(4)),
            sample_ticket(3, 9, Some(6)),
        ];

        let visible = visible_tickets(Some(&agent), &tickets);
        assert_eq!(
            visible.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn admin_sees_everything() {
        let admin = sample_identity(1, &[Role::Admin]);
        let tickets = vec![sample_ticket(1, 9, None), sample_ticket(2, 8, Some(4))];
        assert_eq!(visible_tickets(Some(&admin), &tickets).len(), 2);
    }

    #[test]
    fn roleless_identity_degrades_to_creator_only() {
        let ghost = sample_identity(7, &[]);
        let tickets = vec![
            sample_ticket(1, 7, None),
            sample_ticket(2, 9, Some(7)),
        ];

        let visible = visible_tickets(Some(&ghost), &tickets);
        assert_eq!(
            visible.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[test]
    fn ticket_without_creator_is_hidden_from_non_admins() {
        let client = sample_identity(5, &[Role::Client]);
        let admin = sample_identity(1, &[Role::Admin]);
        let mut orphan = sample_ticket(1, 5, None);
        orphan.creator = None;

        assert!(!can_view_ticket(&client, &orphan));
        assert!(can_view_ticket(&admin, &orphan));
    }

    #[test]
    fn resolve_matrix_holds() {
        let admin = sample_identity(1, &[Role::Admin]);
        let agent = sample_identity(4, &[Role::Agent]);
        let client = sample_identity(5, &[Role::Client]);

        let assigned_open = sample_ticket(1, 5, Some(4));
        let unassigned_open = sample_ticket(2, 5, None);
        let assigned_closed = closed_ticket(3, 5, Some(4));

        assert!(can_resolve_ticket(&admin, &assigned_open));
        assert!(can_resolve_ticket(&admin, &assigned_closed));

        assert!(can_resolve_ticket(&agent, &assigned_open));
        assert!(!can_resolve_ticket(&agent, &unassigned_open));
        assert!(!can_resolve_ticket(&agent, &assigned_closed));

        assert!(!can_resolve_ticket(&client, &assigned_open));
    }

    #[test]
    fn only_the_creator_rates_and_only_when_closed() {
        let creator = sample_identity(5, &[Role::Client]);
        let other = sample_identity(6, &[Role::Client]);
        let admin = sample_identity(1, &[Role::Admin]);

        let open = sample_ticket(1, 5, Some(4));
        let closed = closed_ticket(2, 5, Some(4));

        assert!(!can_rate_ticket(&creator, &open));
        assert!(can_rate_ticket(&creator, &closed));
        assert!(!can_rate_ticket(&other, &closed));
        assert!(!can_rate_ticket(&admin, &closed));
    }

    #[test]
    fn edit_and_delete_are_admin_only_and_status_independent() {
        let admin = sample_identity(1, &[Role::Admin]);
        let agent = sample_identity(4, &[Role::Agent]);
        let closed = closed_ticket(2, 5, Some(4));

        assert!(can_edit_ticket(&admin, &closed));
        assert!(can_delete_ticket(&admin, &closed));
        assert!(!can_edit_ticket(&agent, &closed));
        assert!(!can_delete_ticket(&agent, &closed));
    }
}
