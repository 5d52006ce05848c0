//! Client module for the Sonos HTTP control surface

pub mod api;
pub mod models;
#[cfg(test)]
pub(crate) mod mock;

pub use api::*;
pub use models::*;
