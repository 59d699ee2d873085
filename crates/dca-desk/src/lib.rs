//! Case triage scoring and portfolio analytics for debt collection agency (DCA)
//! case management.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
