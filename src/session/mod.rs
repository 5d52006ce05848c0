//! Session control: turns operator choices into topology changes

pub mod controller;
mod operator;

pub use controller::*;
pub use operator::Operator;
