//! Session logging.
//!
//! While a session runs the terminal sits in raw mode and stdout/stderr
//! carry the converted byte stream, so a stderr logger would corrupt the
//! child's display. Logging is therefore disabled unless `CP437_LOG` names
//! a log file; `RUST_LOG` selects the filter as usual. The interesting
//! events are session start/stop, forwarded resizes, and undecodable input
//! recovered by the converter (debug level).

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing from the environment, if configured.
pub fn init() {
    let Ok(log_path) = std::env::var("CP437_LOG") else {
        return;
    };
    init_to(&log_path);
}

// Several sessions may point CP437_LOG at the same path, so each one
// appends a `.{timestamp}.{pid}` suffix instead of sharing the file.
fn init_to(log_path: &str) {
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let unique_path = format!("{log_path}.{timestamp}.{pid}");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Ok(file) = std::fs::File::create(&unique_path) else {
        eprintln!("warning: failed to create log file: {unique_path}");
        return;
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    tracing::debug!(log = %unique_path, "file logging enabled");
}
