//! Domain services: role interpretation, visibility and permission policy,
//! workload-based assignment, the ticket lifecycle engine, and the persisted
//! session. Everything here is backend-agnostic and talks to storage through
//! the `TicketStore` trait.

pub mod access;
pub mod assignment;
pub mod lifecycle;
pub mod roles;
pub mod session;

pub use lifecycle::{
    LifecycleError, LifecycleResult, RateOutcome, ResolveOutcome, TicketDesk, TicketDraft,
    TicketPatch,
};
pub use session::{Session, SessionFile};
