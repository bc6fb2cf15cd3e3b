//! StudyStream core: persistence and learning-tracker rules.
//!
//! The HTTP binary wraps [`service::StudyService`]; everything here is
//! synchronous and owns a single SQLite connection.

pub mod types;

pub mod account;
pub mod achievements;
pub mod clock;
pub mod config;
pub mod content;
pub mod credentials;
pub mod error;
pub mod event;
pub mod fun_facts;
pub mod goals;
pub mod leaderboard;
pub mod progress;
pub mod service;
pub mod store;

pub use error::{StudyError, StudyResult};
pub use service::{ServiceOptions, StudyService};
