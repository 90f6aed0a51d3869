//! Packigo server library.
//!
//! Stores moving-company bookings, the vehicle fleet and operational settings
//! in a Firebase Realtime Database, falls back to a local JSON file for
//! bookings when that database is absent or failing, and pushes every change
//! to connected WebSocket clients.

pub mod config;
pub mod models;
pub mod server;
pub mod store;
