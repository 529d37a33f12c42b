use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::{sync::watch, task::JoinHandle, time::sleep};

use crate::repositories::health::HealthRepository;

const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one keep-alive firing. Each check is independent.
#[derive(Debug)]
pub struct PingReport {
    pub http: Result<u16, String>,
    pub store: Result<(), String>,
}

/// Handle to the running keep-alive pinger.
pub struct KeepAlive {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl KeepAlive {
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!("Keep-alive task ended abnormally: {}", e);
        }
        tracing::info!("Keep-alive pinger stopped");
    }
}

/// Time left until the next wall-clock firing after `now`.
pub fn until_next_firing(schedule: &Schedule, now: DateTime<Utc>) -> Option<Duration> {
    let next = schedule.after(&now).next()?;
    Some((next - now).to_std().unwrap_or(Duration::ZERO))
}

/// Hits the health route and reads one row so an idle host and its pooled
/// connection stay warm. Fires once after `initial_delay`, then on every
/// `schedule` occurrence. Failures are logged and never stop the schedule.
pub fn start_keep_alive(
    health_url: String,
    health_repo: Arc<dyn HealthRepository>,
    initial_delay: Duration,
    schedule: Schedule,
) -> KeepAlive {
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        let client = match reqwest::Client::builder().timeout(PING_TIMEOUT).build() {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("Keep-alive HTTP client could not be built: {}", e);
                return;
            }
        };

        tracing::info!(
            url = %health_url,
            initial_delay_secs = initial_delay.as_secs(),
            schedule = %schedule,
            "Keep-alive pinger armed"
        );

        tokio::select! {
            _ = sleep(initial_delay) => {
                ping_once(&client, &health_url, health_repo.as_ref()).await;
            }
            _ = stop_rx.changed() => return,
        }

        loop {
            let Some(wait) = until_next_firing(&schedule, Utc::now()) else {
                tracing::warn!("Keep-alive schedule has no upcoming firings");
                break;
            };

            tokio::select! {
                _ = sleep(wait) => {
                    ping_once(&client, &health_url, health_repo.as_ref()).await;
                }
                _ = stop_rx.changed() => break,
            }
        }
    });

    KeepAlive { stop_tx, handle }
}

pub async fn ping_once(client: &reqwest::Client, health_url: &str, health_repo: &dyn HealthRepository) -> PingReport {
    let http = match client.get(health_url).send().await {
        Ok(res) if res.status().is_success() => {
            tracing::info!(status = res.status().as_u16(), "Keep-alive health ping succeeded");
            Ok(res.status().as_u16())
        }
        Ok(res) => {
            tracing::warn!(status = res.status().as_u16(), "Keep-alive health ping returned an error status");
            Err(format!("health route returned {}", res.status()))
        }
        Err(e) => {
            tracing::error!("Keep-alive health ping failed: {}", e);
            Err(e.to_string())
        }
    };

    let store = match health_repo.sample_row().await {
        Ok(_) => {
            tracing::info!("Keep-alive store read succeeded");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Keep-alive store read failed: {}", e);
            Err(e.to_string())
        }
    };

    PingReport { http, store }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::{errors::AppError, repositories::health::MockHealthRepository};

    fn every_fourteen_minutes() -> Schedule {
        Schedule::from_str("0 */14 * * * *").unwrap()
    }

    #[test]
    fn firings_land_on_wall_clock_boundaries() {
        let schedule = every_fourteen_minutes();

        let now = "2024-05-01T10:13:30Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(until_next_firing(&schedule, now), Some(Duration::from_secs(30)));

        // Minute 56 is followed by the top of the next hour.
        let now = "2024-05-01T10:56:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(until_next_firing(&schedule, now), Some(Duration::from_secs(4 * 60)));
    }

    #[actix_rt::test]
    async fn failed_http_check_does_not_skip_store_read() {
        let mut repo = MockHealthRepository::new();
        repo.expect_sample_row().times(1).returning(|| Ok(None));

        let client = reqwest::Client::new();
        let report = ping_once(&client, "http://127.0.0.1:1/health", &repo).await;

        assert!(report.http.is_err());
        assert!(report.store.is_ok());
    }

    #[actix_rt::test]
    async fn store_failure_is_reported_not_raised() {
        let mut repo = MockHealthRepository::new();
        repo.expect_sample_row()
            .returning(|| Err(AppError::StoreError("connection reset".into())));

        let client = reqwest::Client::new();
        let report = ping_once(&client, "http://127.0.0.1:1/health", &repo).await;

        assert!(report.store.is_err());
    }

    #[actix_rt::test]
    async fn stop_cancels_before_first_firing() {
        let mut repo = MockHealthRepository::new();
        repo.expect_sample_row().times(0);

        let pinger = start_keep_alive(
            "http://127.0.0.1:1/health".into(),
            Arc::new(repo),
            Duration::from_secs(3600),
            every_fourteen_minutes(),
        );

        tokio::time::timeout(Duration::from_secs(5), pinger.stop())
            .await
            .expect("pinger should stop promptly");
    }
}
