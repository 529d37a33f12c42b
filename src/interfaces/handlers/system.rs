use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;
use std::{
    sync::atomic::{AtomicI64, Ordering},
    time::Duration,
};
use sysinfo::{ProcessesToUpdate, System};

use crate::{constants::START_TIME, AppState};

const CACHE_TTL_SECS: i64 = 5;

#[derive(Serialize, Clone, Default)]
struct SystemInfo {
    os: String,
    kernel: String,
    hostname: String,
    cpu_count: usize,
    memory_total: String,
}

#[derive(Serialize, Clone, Default)]
struct HealthCheckResponse {
    status: String,
    version: String,
    environment: String,
    timestamp: String,
    uptime: String,
    start_at: String,
    database: String,
    memory_usage: String,
    system: SystemInfo,
}

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> =
    Lazy::new(|| RwLock::new(HealthCheckResponse::default()));

/// Reads only memory and the current process, on the blocking pool.
fn sample_host() -> (SystemInfo, String) {
    let mut sys = System::new();
    sys.refresh_memory();

    let memory_usage = match sysinfo::get_current_pid() {
        Ok(pid) => {
            sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            sys.process(pid).map(|p| format!("{:.2} MB", p.memory() as f64 / 1024.0 / 1024.0))
        }
        Err(_) => None,
    };

    let system_info = SystemInfo {
        os: System::name().unwrap_or_else(|| "Unknown".to_string()),
        kernel: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        cpu_count: num_cpus::get(),
        memory_total: format!("{:.2} GB", sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0),
    };

    (system_info, memory_usage.unwrap_or_else(|| "Unknown".to_string()))
}

async fn build_health_response(state: &AppState) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_secs = now_utc.signed_duration_since(*START_TIME).num_seconds().max(0) as u64;
    let human_uptime = format_duration(Duration::from_secs(uptime_secs));

    let (system_info, memory_usage) = web::block(sample_host).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Host metrics could not be sampled");
        (SystemInfo::default(), "Unknown".to_string())
    });

    let (status, database) = match state.health_repo.check_connection().await {
        Ok(()) => ("healthy", "OK"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            ("degraded", "Unavailable")
        }
    };

    HealthCheckResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.env.to_string(),
        timestamp: now_utc.to_rfc3339(),
        uptime: human_uptime.to_string(),
        start_at: START_TIME.to_rfc3339(),
        database: database.to_string(),
        memory_usage,
        system: system_info,
    }
}

/// Liveness report, rebuilt at most every few seconds.
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > CACHE_TTL_SECS {
        let response = build_health_response(&state).await;
        *CACHED_STATUS.write() = response.clone();
        LAST_CHECK.store(now, Ordering::Relaxed);

        return HttpResponse::Ok().json(response);
    }

    HttpResponse::Ok().json(CACHED_STATUS.read().clone())
}
