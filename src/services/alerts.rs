use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::bot::engine::AQI_ALERT_THRESHOLD;
use crate::bot::transport::{Keyboard, Transport};
use crate::database::models::UserRecord;
use crate::services::environment::EnvironmentClient;
use crate::services::user_store::UserStore;
use crate::utils::logging::log_transport_error;

/// Users checked by hand within this window are not alerted again.
pub const ALERT_COOLDOWN_HOURS: i64 = 2;

const ALERT_TEXT: &str = "Попередження: погана якість повітря!";

/// Outcome of one pass over all users.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AlertSummary {
    pub checked: usize,
    pub skipped: usize,
    pub alerted: usize,
    pub failed: usize,
}

pub struct AlertService {
    store: Arc<UserStore>,
    environment: Arc<dyn EnvironmentClient>,
    transport: Arc<dyn Transport>,
    schedule: String,
    scheduler: JobScheduler,
}

impl AlertService {
    pub async fn new(
        store: Arc<UserStore>,
        environment: Arc<dyn EnvironmentClient>,
        transport: Arc<dyn Transport>,
        schedule: impl Into<String>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            store,
            environment,
            transport,
            schedule: schedule.into(),
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let store = self.store.clone();
        let environment = self.environment.clone();
        let transport = self.transport.clone();

        let alert_job = Job::new_async(self.schedule.as_str(), move |_uuid, _l| {
            let store = store.clone();
            let environment = environment.clone();
            let transport = transport.clone();
            Box::pin(async move {
                let summary = check_and_send_alerts(
                    &store,
                    environment.as_ref(),
                    transport.as_ref(),
                    Utc::now(),
                )
                .await;
                tracing::info!(
                    "Air quality check finished: {} checked, {} skipped, {} alerted, {} failed",
                    summary.checked,
                    summary.skipped,
                    summary.alerted,
                    summary.failed
                );
            })
        })?;

        self.scheduler.add(alert_job).await?;
        self.scheduler.start().await?;

        tracing::info!("Alert service started - schedule '{}'", self.schedule);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    // Manual trigger for testing
    pub async fn check_alerts_now(&self) -> AlertSummary {
        check_and_send_alerts(
            &self.store,
            self.environment.as_ref(),
            self.transport.as_ref(),
            Utc::now(),
        )
        .await
    }
}

/// Whether the scheduler should look at `user` at all at time `now`.
pub fn is_alert_candidate(user: &UserRecord, now: DateTime<Utc>) -> bool {
    if !user.alerts_enabled || !user.has_city() {
        return false;
    }
    match user.last_check {
        Some(last_check) => now - last_check >= Duration::hours(ALERT_COOLDOWN_HOURS),
        None => true,
    }
}

/// One scheduler pass. Never mutates user state: `last_check` only moves
/// when a user triggers a lookup themselves. Lookup and delivery failures
/// are logged and counted, nothing more.
pub async fn check_and_send_alerts(
    store: &UserStore,
    environment: &dyn EnvironmentClient,
    transport: &dyn Transport,
    now: DateTime<Utc>,
) -> AlertSummary {
    let mut summary = AlertSummary::default();

    for user in store.list_all().await {
        if !is_alert_candidate(&user, now) {
            summary.skipped += 1;
            continue;
        }
        summary.checked += 1;

        let reading = match environment.fetch(&user.city).await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!("Alert lookup for user {} ({}) failed: {}", user.id, user.city, e);
                summary.failed += 1;
                continue;
            }
        };

        if reading.aqi <= AQI_ALERT_THRESHOLD {
            continue;
        }

        let text = format!("{ALERT_TEXT}\nAQI у місті {}: {}", user.city, reading.aqi);
        match transport.send(user.id, &text, &Keyboard::None).await {
            Ok(()) => {
                summary.alerted += 1;
                tracing::info!("Sent air quality alert to user {} (AQI {})", user.id, reading.aqi);
            }
            Err(e) => {
                summary.failed += 1;
                log_transport_error("alert", user.id, &e.to_string());
            }
        }
    }

    summary
}
