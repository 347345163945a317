//! # Eco Bot
//!
//! A Telegram bot that keeps people curious about the air they breathe.
//!
//! ## Features
//! - Onboarding with a home city (Cyrillic names are transliterated)
//! - Temperature, conditions and air quality index on demand
//! - One eco-mission per day, nature facts and a quick quiz
//! - Progress levels derived from completed missions
//! - Background alerts when the air quality gets bad
//! - Persistent storage with SQLite, plus a one-time legacy JSON import

/// Conversation engine, gamification rules and Telegram wiring
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Missions, facts and quiz questions
pub mod content;
/// Database models, connections, migrations and the legacy import
pub mod database;
/// User store, environmental lookups, alerts and health checks
pub mod services;
/// Utility functions for datetime, transliteration and logging
pub mod utils;
