//! Core functionality for the EATGate access-token authorization layer.
//!
//! This crate provides the primitive types, configuration, clocks, logging
//! bootstrap and error types shared by every other crate in the workspace.

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DomainConfig, EmergencyConfig, GateConfig, IssuerConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use error::{CoreError, Result};
pub use types::{selector_of, Address, Bytes, Selector, B256, U256};
