pub mod alerts;
pub mod environment;
pub mod health;
pub mod user_store;
