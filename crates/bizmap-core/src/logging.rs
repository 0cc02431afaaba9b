//! Tracing subscriber setup shared by every host embedding the explorer.

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `log_level` is used as the filter
/// directive, falling back to `info` when it does not parse. Returns `false`
/// when a global subscriber was already installed.
pub fn init_tracing(log_level: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(log_level, "tracing subscriber installed");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_reports_false() {
        let _ = init_tracing("debug");
        assert!(!init_tracing("info"));
    }
}
