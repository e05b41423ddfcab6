//! Process-wide `tracing` subscriber, configured from `BURI_*` variables.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter directive for `cfg`; quiet mode caps output at warnings.
fn directive(cfg: &ObservabilityConfig) -> String {
    if cfg.quiet {
        "buri=warn".to_string()
    } else {
        cfg.log_level.clone()
    }
}

/// Install the subscriber on stderr. `RUST_LOG` overrides the configured level.
/// A second call is a no-op.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(cfg)));

    let json = cfg
        .log_json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text = (!cfg.log_json).then(|| fmt::layer().with_writer(std::io::stderr));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init();
}
