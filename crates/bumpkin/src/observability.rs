//! Logging setup for the CLI.
//!
//! All diagnostics go to stderr; stdout is reserved for command output
//! (including `--json`, which scripts parse).

use tracing_subscriber::EnvFilter;

/// Build an `EnvFilter` from CLI flags and environment.
///
/// Priority: quiet flag > verbose flag > `RUST_LOG` > config default.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    if verbose > 0 {
        let level = match verbose {
            1 => "debug",
            _ => "trace",
        };
        return EnvFilter::new(level);
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber. Call once at startup.
pub fn init(filter: EnvFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_overrides_everything() {
        let filter = env_filter(true, 2, "info");
        assert_eq!(filter.to_string(), "error");
    }

    #[test]
    fn verbose_maps_to_debug_and_trace() {
        assert_eq!(env_filter(false, 1, "info").to_string(), "debug");
        assert_eq!(env_filter(false, 2, "info").to_string(), "trace");
    }

    #[test]
    fn config_level_is_the_fallback() {
        // RUST_LOG may be set in the environment running the tests; only
        // assert the fallback when it is not.
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(env_filter(false, 0, "warn").to_string(), "warn");
        }
    }
}
