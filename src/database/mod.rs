pub mod connection;
pub mod error;
pub mod legacy;
pub mod models;

pub use error::StoreError;
