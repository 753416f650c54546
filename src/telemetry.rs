//! Opt-in log output.
//!
//! The library only emits `tracing` events. Programs that want them printed
//! can call [`init_default_tracing`] (with the `telemetry` feature) or
//! install their own subscriber.

/// Install a compact stderr subscriber filtered by `RUST_LOG`, falling back
/// to `info`.
///
/// Returns `false` when the `telemetry` feature is off or another global
/// subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_refused() {
        let _ = init_default_tracing();
        assert!(!init_default_tracing());
    }
}
