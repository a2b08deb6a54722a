use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{FmtSubscriber, filter::EnvFilter, util::SubscriberInitExt};

use crate::config::{LogFormat, LogLevel};

/// Initialize logging.
///
/// Returns a drop guard responsible for flushing any remaining logs when the program terminates.
/// The guard must be assigned to a binding that is not _, as _ will result in the guard being
/// dropped immediately.
pub fn init(log_level: LogLevel, log_format: LogFormat) -> WorkerGuard {
    let filter = build_tracing_filter(log_level);

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());

    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(enable_ansi())
        .with_thread_ids(false);

    match log_format {
        LogFormat::Plaintext => {
            let subscriber = builder.finish();
            subscriber.init();
        }
        LogFormat::Json => {
            let subscriber = builder.json().finish();
            subscriber.init();
        }
    };

    guard
}

/// Check if both stdout and stderr are proper terminal (tty),
/// so that we know whether or not to enable colored output,
/// using ANSI escape codes. If either is not, eg. because
/// stdout is redirected to a file, we don't enable colored output.
pub fn enable_ansi() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

/// Common prefixes of the crates targeted by the default log level.
const TARGET_CRATES: &[&str] = &[
    "faultline",
    "faultline_cli",
    "faultline_monitor",
    "faultline_rpc",
    "faultline_scenario",
    "faultline_tx",
];

/// Build a tracing directive setting the log level for the
/// crates to the given `log_level`.
pub fn default_directive(log_level: LogLevel) -> String {
    use itertools::Itertools;

    TARGET_CRATES.iter().map(|&c| format!("{c}={log_level}")).join(",")
}

/// Builds a tracing filter based on the input `log_level`. Directives from `RUST_LOG`
/// take precedence; an invalid one is skipped.
fn build_tracing_filter(log_level: LogLevel) -> EnvFilter {
    let directives = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(extra) if !extra.trim().is_empty() => {
            format!("{},{extra}", default_directive(log_level))
        }
        _ => default_directive(log_level),
    };
    EnvFilter::builder().with_default_directive(LevelFilter::WARN.into()).parse_lossy(directives)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_covers_every_crate() {
        let directive = default_directive(LogLevel::Debug);
        assert!(directive.starts_with("faultline=debug,"));
        assert!(directive.contains("faultline_monitor=debug"));
        assert_eq!(directive.split(',').count(), TARGET_CRATES.len());
    }
}
