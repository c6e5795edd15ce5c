pub mod comment;
pub mod identity;
pub mod payloads;
pub mod ticket;

pub use comment::Comment;
pub use identity::{Identity, Role, UserRef};
pub use payloads::{CreateComment, CreateTicket, TicketUpdate};
pub use ticket::{Asset, Priority, Ticket, TicketStatus};
