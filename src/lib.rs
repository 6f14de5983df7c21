//! # TreloxBot
//! 
//! A Telegram bot for timed study challenges split into study and rest intervals.
//! 
//! ## Features
//! - Plan a challenge (total hours + study/rest split) into session notifications
//! - Durable event store so scheduled sessions survive restarts
//! - Points, daily streaks and weekly badges for finished sessions
//! - Personal to-do list
//! - Liveness endpoint for the hosting environment

/// Bot command handlers and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Challenge planning, event scheduling and session side effects
pub mod services;
/// Utility functions for datetime, validation, and formatting
pub mod utils;
