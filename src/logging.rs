use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// sqlx logs every statement at INFO; transfers issue several per attempt
const SQLX_DIRECTIVE: &str = "sqlx=warn";

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process. `RUST_LOG` replaces the configured filter.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let appender = RollingFileAppender::new(
        rotation(&config.rotation),
        &config.log_dir,
        &config.log_file,
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        // Transfer fields (from, to, amount, attempt) land as JSON keys
        let file_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(writer)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(writer)
            .with_ansi(false);
        let console_layer = fmt::layer().with_target(false).compact();
        registry.with(file_layer).with(console_layer).init();
    }

    guard
}

/// Filter string for a configured level
///
/// At `trace` sqlx statement logging stays on, otherwise it is capped at WARN.
fn filter_directives(level: &str) -> String {
    if level.eq_ignore_ascii_case("trace") {
        level.to_string()
    } else {
        format!("{level},{SQLX_DIRECTIVE}")
    }
}

/// Unknown names fall back to a single never-rotated file
fn rotation(name: &str) -> Rotation {
    match name {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}
