use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

const APP_TARGET: &str = "fxcache";

/// Filter used when `RUST_LOG` is unset. Verbose mode only raises this crate,
/// HTTP and storage dependencies stay at `warn`.
fn default_directives(verbose: bool) -> String {
    if verbose {
        format!("warn,{APP_TARGET}=debug")
    } else {
        "warn".to_string()
    }
}

/// Installs the global subscriber. Logs go to stderr, tables own stdout.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(false), "warn");
        assert_eq!(default_directives(true), "warn,fxcache=debug");

        let filter = EnvFilter::new(default_directives(true));
        assert!(filter.to_string().contains("fxcache=debug"));
    }
}
