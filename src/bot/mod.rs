pub mod commands;
pub mod engine;
pub mod gamification;
pub mod handlers;
pub mod menu;
pub mod transport;
