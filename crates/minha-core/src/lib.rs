//! Core logic for the Minha alert bot.
//!
//! This crate is framework-agnostic. Telegram and HTTP page fetching live
//! behind ports (traits) implemented in the adapter crate.

pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod health;
pub mod language;
pub mod logging;
pub mod messaging;
pub mod monitor;
pub mod ports;
pub mod replies;
pub mod retry;
pub mod subscribers;

pub use errors::{Error, Result};
