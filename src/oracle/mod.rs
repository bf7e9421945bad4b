//! Hermes oracle price and update-data client.

mod hermes;

pub use hermes::{HermesClient, DEFAULT_HERMES_BASE_URL};
