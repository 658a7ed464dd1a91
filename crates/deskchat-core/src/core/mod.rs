//! Session engine: transcript store, interaction controller, action profiles.

pub mod actions;
pub mod controller;
pub mod session;
