use chrono::Utc;
use reqwest::Method;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks the level
/// (0 = warn, 1 = info, 2+ = debug).
pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// One access-log line per completed HTTP exchange
pub fn log_exchange(method: &Method, url: &str, status: u16, elapsed: Duration, authorized: bool) {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let line = format_exchange(method, url, status, elapsed, authorized);

    if status >= 400 {
        warn!(target: "access_log", "{} {}", timestamp, line);
    } else {
        info!(target: "access_log", "{} {}", timestamp, line);
    }
}

/// Exchange that never produced a response
pub fn log_transport_failure(method: &Method, url: &str, elapsed: Duration, error: &str) {
    warn!(
        target: "access_log",
        "{} \"{} {}\" - {}ms transport error: {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        method,
        url,
        elapsed.as_millis(),
        error
    );
}

fn format_exchange(
    method: &Method,
    url: &str,
    status: u16,
    elapsed: Duration,
    authorized: bool,
) -> String {
    format!(
        "\"{} {}\" {} {}ms auth={}",
        method,
        url,
        status,
        elapsed.as_millis(),
        if authorized { "bearer" } else { "-" }
    )
}
