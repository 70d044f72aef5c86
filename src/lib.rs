//! zbxwatch - Zabbix media type and user group watcher
//!
//! This library exposes the reconciliation engines, their collaborators and
//! the poll loop that drives them.

pub mod cli;
pub mod constants;
pub mod daemon;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod output;
pub mod state;
pub mod zabbix;

pub use models::{Result, WatchError};
