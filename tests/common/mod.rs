#![allow(dead_code)]

use async_trait::async_trait;
use eco_bot::bot::engine::ConversationEngine;
use eco_bot::bot::transport::{Keyboard, Transport, TransportError};
use eco_bot::database::connection::DatabaseManager;
use eco_bot::services::environment::{EnvironmentClient, EnvironmentError, EnvironmentReading};
use eco_bot::services::user_store::UserStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

pub async fn setup_test_db() -> (DatabaseManager, TempDir) {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.to_string_lossy());

    let db = DatabaseManager::new(&db_url).await.unwrap();
    db.run_migrations().await.unwrap();
    (db, dir)
}

pub async fn setup_store() -> (Arc<UserStore>, DatabaseManager, TempDir) {
    let (db, dir) = setup_test_db().await;
    let store = Arc::new(UserStore::new(db.clone()));
    (store, db, dir)
}

pub fn engine_with(store: Arc<UserStore>, environment: Arc<FakeEnvironment>) -> ConversationEngine {
    ConversationEngine::with_seed(store, environment, 7)
}

/// Environmental client returning a fixed reading, or always failing.
pub struct FakeEnvironment {
    reading: Option<EnvironmentReading>,
    calls: AtomicUsize,
}

impl FakeEnvironment {
    pub fn returning(temperature: f64, condition: &str, aqi: u32) -> Arc<Self> {
        Arc::new(Self {
            reading: Some(EnvironmentReading {
                temperature,
                condition: condition.to_string(),
                aqi,
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reading: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnvironmentClient for FakeEnvironment {
    async fn fetch(&self, _city: &str) -> Result<EnvironmentReading, EnvironmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reading.clone().ok_or(EnvironmentError::Status(503))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delivered {
    Sent { user_id: i64, text: String, keyboard: Keyboard },
    Edited { user_id: i64, message_id: i32, text: String },
}

/// Transport that records everything instead of talking to Telegram.
#[derive(Default)]
pub struct RecordingTransport {
    pub delivered: Mutex<Vec<Delivered>>,
    pub fail_sends: bool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            delivered: Mutex::new(Vec::new()),
            fail_sends: true,
        })
    }

    pub fn delivered(&self) -> Vec<Delivered> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.delivered()
            .into_iter()
            .map(|d| match d {
                Delivered::Sent { text, .. } | Delivered::Edited { text, .. } => text,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, user_id: i64, text: &str, keyboard: &Keyboard) -> Result<(), TransportError> {
        if self.fail_sends {
            return Err(TransportError::Other("chat not found".to_string()));
        }
        self.delivered.lock().unwrap().push(Delivered::Sent {
            user_id,
            text: text.to_string(),
            keyboard: keyboard.clone(),
        });
        Ok(())
    }

    async fn edit(&self, user_id: i64, message_id: i32, text: &str) -> Result<(), TransportError> {
        self.delivered.lock().unwrap().push(Delivered::Edited {
            user_id,
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }
}
