//! sonos-grouper library core functionality

pub mod config;
pub mod logging;
pub mod session;
pub mod sonos;
pub mod topology;
pub mod ui;
