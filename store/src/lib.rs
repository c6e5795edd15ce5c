pub mod error;
pub mod models;
pub mod rest;
pub mod test_utils;
pub mod traits;
pub mod wire;

pub use error::{StoreError, StoreResult};
pub use rest::RestTicketStore;
pub use traits::TicketStore;
