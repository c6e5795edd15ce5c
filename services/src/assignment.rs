//! Automatic agent assignment.
//!
//! The load snapshot is derived from the ticket collection at decision time
//! and thrown away; nothing here persists counters.

use std::collections::HashMap;

use store::models::{Identity, Ticket};

/// Open-ticket count per candidate. Tickets assigned to nobody, or to someone
/// outside the candidate pool, do not affect any count.
pub fn open_load(candidates: &[Identity], tickets: &[Ticket]) -> HashMap<i64, usize> {
    let mut load: HashMap<i64, usize> =
        candidates.iter().map(|agent| (agent.id, 0)).collect();

    for ticket in tickets.iter().filter(|t| t.is_open()) {
        if let Some(assignee) = &ticket.assignee {
            if let Some(count) = load.get_mut(&assignee.id) {
                *count += 1;
            }
        }
    }
    load
}

/// Least-loaded candidate. Ties go to the earliest candidate in the slice, so
/// the same inputs always produce the same choice. An empty pool yields
/// `None`, which the caller treats as "leave unassigned".
pub fn choose_assignee<'a>(
    candidates: &'a [Identity],
    tickets: &[Ticket],
) -> Option<&'a Identity> {
    let load = open_load(candidates, tickets);
    candidates
        .iter()
        .min_by_key(|agent| load.get(&agent.id).copied().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::models::Role;
    use store::test_utils::{closed_ticket, sample_identity, sample_ticket};

    fn pool() -> Vec<Identity> {
        vec![
            sample_identity(1, &[Role::Agent]),
            sample_identity(2, &[Role::Agent]),
            sample_identity(3, &[Role::Agent]),
        ]
    }

    #[test]
    fn picks_the_least_loaded_agent() {
        // Loads: agent 1 -> 2, agent 2 -> 0, agent 3 -> 1.
        let tickets = vec![
            sample_ticket(10, 9, Some(1)),
            sample_ticket(11, 9, Some(1)),
            sample_ticket(12, 9, Some(3)),
        ];

        let candidates = pool();
        let chosen = choose_assignee(&candidates, &tickets).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn ties_go_to_the_first_candidate() {
        let tickets: Vec<_> = Vec::new();
        let candidates = pool();
        let chosen = choose_assignee(&candidates, &tickets).unwrap();
        assert_eq!(chosen.id, 1);

        // Same inputs, same choice.
        let candidates_again = pool();
        let again = choose_assignee(&candidates_again, &tickets).unwrap();
        assert_eq!(again.id, chosen.id);
    }

    #[test]
    fn empty_pool_yields_none() {
        assert!(choose_assignee(&[], &[sample_ticket(1, 9, None)]).is_none());
    }

    #[test]
    fn closed_and_foreign_assignments_do_not_count() {
        let tickets = vec![
            closed_ticket(10, 9, Some(2)),
            closed_ticket(11, 9, Some(2)),
            sample_ticket(12, 9, Some(99)),
            sample_ticket(13, 9, None),
            sample_ticket(14, 9, Some(1)),
        ];

        let load = open_load(&pool(), &tickets);
        assert_eq!(load[&1], 1);
        assert_eq!(load[&2], 0);
        assert_eq!(load[&3], 0);

        let candidates = pool();
        let chosen = choose_assignee(&candidates, &tickets).unwrap();
        assert_eq!(chosen.id, 2);
    }
}
