//! Modernity worldview survey engine.
//!
//! [`survey`] holds the scoring core and everything around it; [`config`],
//! [`telemetry`] and [`error`] are the ambient pieces shared with the API
//! service.

pub mod config;
pub mod error;
pub mod survey;
pub mod telemetry;
