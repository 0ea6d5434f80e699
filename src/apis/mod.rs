// Catalog adapters: one file per provider plus the shared pieces
pub mod base;
pub mod factory;
pub mod fields;

pub mod eventbrite;
pub mod proxy;
pub mod seatgeek;
pub mod ticketmaster;

pub use factory::{create_all, create_provider};
