//! Data models for routes, schedules and configuration.

pub mod config;
pub mod route;
pub mod schedule;
