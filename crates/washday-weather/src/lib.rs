//! Drying advice and dry/rain windows for Washday
//!
//! The advice engine, window calculator and relevance filter are pure and
//! synchronous. `HassClient` fetches their inputs from a Home Assistant
//! weather entity.

pub mod advice;
pub mod clock;
pub mod daily;
pub mod error;
pub mod provider;
pub mod relevance;
pub mod report;
pub mod retry;
pub mod types;
pub mod windows;

pub use advice::{compute_advice, AdviceCategory, AdviceResult, SeverityColor};
pub use daily::{summarize_days, DaySummary};
pub use error::HassError;
pub use provider::HassClient;
pub use relevance::label_is_relevant;
pub use report::WashdayReport;
pub use retry::RetryConfig;
pub use types::*;
pub use windows::{
    compute_windows, compute_windows_in, Window, WindowKind, WindowLabel, WindowReport,
};
