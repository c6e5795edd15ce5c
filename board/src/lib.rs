//! Presentation state for the ticket collection: one authoritative list,
//! newest first, partitioned into open and closed views with an optional
//! free-text filter on top. The filter never touches the baseline, so
//! clearing it always restores the full listing.

pub mod clock;
mod search;

use store::models::{Ticket, TicketStatus};

#[derive(Default)]
pub struct TicketBoard {
    baseline: Vec<Ticket>,
    search: Option<String>,
}

impl TicketBoard {
    pub fn new(tickets: Vec<Ticket>) -> Self {
        let mut board = Self {
            baseline: tickets,
            search: None,
        };
        board.sort();
        board
    }

    // Stable sort keeps arrival order among tickets created the same instant.
    fn sort(&mut self) {
        self.baseline.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    /// Swaps in a fresh listing, keeping the active filter.
    pub fn replace(&mut self, tickets: Vec<Ticket>) {
        self.baseline = tickets;
        self.sort();
    }

    /// Upserts one ticket, as returned by a lifecycle operation.
    pub fn apply(&mut self, ticket: Ticket) {
        match self.baseline.iter_mut().find(|t| t.id == ticket.id) {
            Some(slot) => *slot = ticket,
            None => self.baseline.push(ticket),
        }
        self.sort();
    }

    pub fn remove(&mut self, ticket_id: i64) {
        self.baseline.retain(|t| t.id != ticket_id);
    }

    /// A blank or whitespace term clears the filter.
    pub fn set_search(&mut self, term: &str) {
        let term = term.trim().to_lowercase();
        self.search = (!term.is_empty()).then_some(term);
    }

    pub fn clear_search(&mut self) {
        self.search = None;
    }

    pub fn open(&self) -> Vec<&Ticket> {
        self.view(TicketStatus::Open)
    }

    pub fn closed(&self) -> Vec<&Ticket> {
        self.view(TicketStatus::Closed)
    }

    fn view(&self, status: TicketStatus) -> Vec<&Ticket> {
        self.baseline
            .iter()
            .filter(|t| t.status == status)
            .filter(|t| {
                self.search
                    .as_deref()
                    .is_none_or(|term| search::matches(t, term))
            })
            .collect()
    }

    /// The unfiltered listing, newest first.
    pub fn all(&self) -> &[Ticket] {
        &self.baseline
    }

    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::models::{Asset, Priority};
    use store::test_utils::{closed_ticket, sample_ticket};

    fn board_with_mix() -> TicketBoard {
        // Ids double as creation-order: sample tickets are created one
        // minute apart in id order.
        let mut urgent = sample_ticket(4, 5, Some(8));
        urgent.priority = Some(Priority {
            id: None,
            name: "Urgente".into(),
        });
        urgent.asset = Some(Asset {
            id: Some(3),
            name: "HP LaserJet".into(),
            serial: Some("SN-4491".into()),
        });

        TicketBoard::new(vec![
            sample_ticket(1, 9, Some(7)),
            closed_ticket(2, 9, Some(7)),
            sample_ticket(3, 5, None),
            urgent,
        ])
    }

    fn ids(view: &[&Ticket]) -> Vec<i64> {
        view.iter().map(|t| t.id).collect()
    }

    #[test]
    fn partitions_by_status_newest_first() {
        let board = board_with_mix();

        assert_eq!(board.len(), 4);
        assert_eq!(ids(&board.open()), vec![4, 3, 1]);
        assert_eq!(ids(&board.closed()), vec![2]);
        assert_eq!(board.all()[0].id, 4);
    }

    #[test]
    fn search_covers_people_equipment_and_dates() {
        let mut board = board_with_mix();

        // Assignee name.
        board.set_search("user7");
        assert_eq!(ids(&board.open()), vec![1]);
        assert_eq!(ids(&board.closed()), vec![2]);

        // Creator email, case-insensitive.
        board.set_search("USER5@helpdesk");
        assert_eq!(ids(&board.open()), vec![4, 3]);

        // Priority name and asset serial live on the same ticket.
        board.set_search("urgente");
        assert_eq!(ids(&board.open()), vec![4]);
        board.set_search("sn-4491");
        assert_eq!(ids(&board.open()), vec![4]);

        // Formatted creation date matches every sample ticket.
        board.set_search("01/06/2024");
        assert_eq!(board.open().len(), 3);
        assert_eq!(board.closed().len(), 1);
    }

    #[test]
    fn search_matches_the_status_label() {
        let mut board = board_with_mix();

        board.set_search("abierto");
        assert_eq!(board.open().len(), 3);
        assert!(board.closed().is_empty());
    }

    #[test]
    fn clearing_search_restores_the_baseline() {
        let mut board = board_with_mix();

        board.set_search("no such term anywhere");
        assert!(board.open().is_empty());
        assert!(board.closed().is_empty());
        assert_eq!(board.len(), 4);

        board.clear_search();
        assert_eq!(ids(&board.open()), vec![4, 3, 1]);

        // Whitespace terms behave like clearing.
        board.set_search("   ");
        assert_eq!(ids(&board.open()), vec![4, 3, 1]);
    }

    #[test]
    fn applying_a_closed_ticket_moves_it_across_views() {
        let mut board = board_with_mix();

        board.apply(closed_ticket(3, 5, None));

        assert_eq!(board.len(), 4);
        assert_eq!(ids(&board.open()), vec![4, 1]);
        assert_eq!(ids(&board.closed()), vec![3, 2]);
    }

    #[test]
    fn apply_inserts_unknown_tickets_in_order() {
        let mut board = board_with_mix();

        board.apply(sample_ticket(9, 9, None));

        assert_eq!(board.len(), 5);
        assert_eq!(board.all()[0].id, 9);
    }

    #[test]
    fn remove_drops_the_ticket() {
        let mut board = board_with_mix();

        board.remove(3);
        assert_eq!(board.len(), 3);
        assert_eq!(ids(&board.open()), vec![4, 1]);

        board.remove(999);
        assert_eq!(board.len(), 3);
    }
}
