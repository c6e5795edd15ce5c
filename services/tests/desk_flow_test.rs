//! End-to-end walk through the desk: creation with automatic assignment,
//! resolution, rating, and what each role can see along the way.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use services::{TicketDesk, TicketDraft};
    use store::models::Role;
    use store::test_utils::{sample_identity, sample_ticket, MemoryTicketStore};

    #[tokio::test]
    async fn full_ticket_journey() {
        let admin = sample_identity(1, &[Role::Admin]);
        let agent_marta = sample_identity(7, &[Role::Agent]);
        let agent_luis = sample_identity(8, &[Role::Agent]);
        let client = sample_identity(9, &[Role::Client]);

        let store = Arc::new(MemoryTicketStore::with_agents(vec![
            agent_marta.clone(),
            agent_luis.clone(),
        ]));
        // Marta already carries one open ticket.
        store.seed_ticket(sample_ticket(1, 5, Some(7)));
        let desk = TicketDesk::new(store.clone());

        // The client reports a problem; Luis is idle so he gets it.
        let draft = TicketDraft {
            title: "projector won't turn on".into(),
            description: "room B12, light stays red".into(),
            ..Default::default()
        };
        let ticket = desk.create(&client, draft).await.unwrap();
        assert!(ticket.assigned_to(agent_luis.id));
        assert!(ticket.is_open());

        // Each role sees its own slice of the desk.
        let admin_view = desk.fetch_visible(Some(&admin)).await.unwrap();
        assert_eq!(admin_view.len(), 2);
        let luis_view = desk.fetch_visible(Some(&agent_luis)).await.unwrap();
        assert_eq!(luis_view.len(), 1);
        assert_eq!(luis_view[0].id, ticket.id);
        let client_view = desk.fetch_visible(Some(&client)).await.unwrap();
        assert_eq!(client_view.len(), 1);

        // Marta is not the assignee, so she cannot close it; Luis can.
        assert!(desk
            .resolve(&agent_marta, &ticket, "swapped the bulb")
            .await
            .is_err());
        let outcome = desk
            .resolve(&agent_luis, &ticket, "swapped the bulb and tested input")
            .await
            .unwrap();
        assert!(outcome.ticket.is_closed());
        assert!(outcome.ticket.closed_at.is_some());
        assert!(outcome.comment.is_author(agent_luis.id));
        assert_eq!(store.comment_count(ticket.id), 1);

        // Only the creator rates, and only once the ticket is closed.
        let closed = store.ticket(ticket.id).unwrap();
        assert!(desk.rate(&agent_luis, &closed, 5, None).await.is_err());
        let rated = desk
            .rate(&client, &closed, 5, Some("fast fix, much appreciated"))
            .await
            .unwrap();
        assert_eq!(rated.ticket.rating, Some(5));
        assert!(rated.feedback.is_some());
        assert_eq!(store.comment_count(ticket.id), 2);

        // The client reads the thread on their own ticket.
        let thread = desk.comments(&client, &closed).await.unwrap();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].message, "swapped the bulb and tested input");

        // Cleanup is reserved for the admin.
        assert!(desk.delete(&client, &closed).await.is_err());
        desk.delete(&admin, &closed).await.unwrap();
        assert!(store.ticket(ticket.id).is_none());
    }
}
