//! Log output for the binary.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// Picks the log level from `-v` count, falling back to the config setting.
///
/// Unrecognized config values fall back to `warn`.
pub fn level_for(verbose: u8, configured: Option<&str>) -> LevelFilter {
    match verbose {
        0 => configured
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::WARN),
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the stderr subscriber.
///
/// Returns false and keeps the existing subscriber if one is already
/// installed.
pub fn init(level: LevelFilter) -> bool {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match tracing_subscriber::registry()
        .with(layer.with_filter(level))
        .try_init()
    {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(error = %err, "log subscriber already installed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_overrides_config() {
        assert_eq!(level_for(1, Some("error")), LevelFilter::INFO);
        assert_eq!(level_for(2, None), LevelFilter::DEBUG);
        assert_eq!(level_for(5, None), LevelFilter::TRACE);
    }

    #[test]
    fn second_init_keeps_first_subscriber() {
        init(LevelFilter::WARN);
        assert!(!init(LevelFilter::DEBUG));
    }

    #[test]
    fn config_level_used_without_flags() {
        assert_eq!(level_for(0, Some("debug")), LevelFilter::DEBUG);
        assert_eq!(level_for(0, None), LevelFilter::WARN);
        assert_eq!(level_for(0, Some("loud")), LevelFilter::WARN);
    }
}
