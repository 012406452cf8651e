use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "glint_engine=debug,wgpu_core=warn").
///
/// `write_style` controls ANSI coloring behavior.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// Filter used when neither the config nor `RUST_LOG` names one.
///
/// wgpu logs adapter and validation chatter at info; keep it at warn.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&resolve_filter(config.env_filter.as_deref()));
        builder.write_style(config.write_style);

        // A logger installed by the host (e.g. a test harness) wins.
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}

fn resolve_filter(explicit: Option<&str>) -> String {
    if let Some(filter) = explicit {
        return filter.to_owned();
    }
    match std::env::var("RUST_LOG") {
        Ok(filter) if !filter.trim().is_empty() => filter,
        _ => DEFAULT_FILTER.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        assert_eq!(resolve_filter(Some("glint_engine=trace")), "glint_engine=trace");
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig {
            env_filter: Some("debug".into()),
            ..Default::default()
        });
        log::info!("still alive");
    }
}
