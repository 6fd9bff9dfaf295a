use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for log lines written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `log_level` when set. Logs go to stderr so command
/// output on stdout stays machine-readable. Calling this twice is a no-op.
pub fn init_tracing(service_name: &str, log_level: &str, format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .flatten_event(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!(
            "Tracing for '{}' was already initialized: {}",
            service_name, e
        );
        return;
    }

    tracing::debug!(service = service_name, "tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_deserializes_lowercase() {
        assert_eq!(parse_format("json"), LogFormat::Json);
        assert_eq!(parse_format("pretty"), LogFormat::Pretty);
    }

    fn parse_format(value: &str) -> LogFormat {
        use serde::de::{value::StrDeserializer, IntoDeserializer};
        let de: StrDeserializer<'_, serde::de::value::Error> = value.into_deserializer();
        LogFormat::deserialize(de).unwrap()
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_tracing("console-core-test", "debug", LogFormat::Pretty);
        init_tracing("console-core-test", "debug", LogFormat::Json);
    }
}
