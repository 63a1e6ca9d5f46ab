//! Tracing subscriber setup.
//!
//! Logs go to stderr so they never mix with report/plot output on stdout.
//! Without `-v` the filter comes from `RUST_LOG` (default `warn`); each `-v`
//! sets the level directly: info, debug, then trace.

use tracing_subscriber::{EnvFilter, fmt};

pub fn init(verbose: u8) {
    let directive = filter_directive(verbose, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (e.g. from tests) is harmless.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn filter_directive(verbose: u8, rust_log: Option<String>) -> String {
    match verbose {
        0 => rust_log
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "warn".to_string()),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_applies_only_without_verbose_flags() {
        assert_eq!(filter_directive(0, None), "warn");
        assert_eq!(filter_directive(0, Some("cst_estimator=debug".into())), "cst_estimator=debug");
        assert_eq!(filter_directive(1, Some("error".into())), "info");
        assert_eq!(filter_directive(3, Some("error".into())), "trace");
    }
}
