pub mod client_state;
pub mod connection;
pub mod migrations;

pub use client_state::LocalStore;
