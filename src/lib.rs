//! Freelance time tracking with productivity and earnings analytics.
//!
//! The [`analytics`] module is a pure aggregation engine over time entries;
//! [`db`] is the local SQLite store that feeds it, and [`report`] renders its
//! output.

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod report;
pub mod timer;
