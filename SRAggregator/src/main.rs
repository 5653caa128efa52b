use srconfig::Config;
use srradio::SverigesRadioExt;
use srserver::{LoggingOptions, ServerBuilder, init_logging};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional config directory as first argument, else SRAGG_CONFIG / .sraggregator
    let config_dir = std::env::args().nth(1).unwrap_or_default();
    let config = Config::load_config(&config_dir)?;

    // Logging depends on the configuration, so its loading is reported here
    init_logging(LoggingOptions::from_config(&config));
    info!(config_dir = config.config_dir(), "{}", config_source(&config));

    let mut server = ServerBuilder::new_configured(&config).build();

    server
        .add_route("/info", || async {
            serde_json::json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            })
        })
        .await;

    let state = server.init_sverigesradio(&config).await?;
    info!(
        batch_size = state.aggregator.settings().batch_size,
        concurrency = state.aggregator.settings().concurrency,
        channel_failure = %state.aggregator.settings().channel_failure,
        "Song aggregation ready"
    );

    server.start().await?;
    info!("Swagger UI available at /swagger-ui/{}", srradio::API_NAME);

    server.wait().await;
    info!("Server stopped");
    Ok(())
}

/// Where the configuration came from
fn config_source(config: &Config) -> String {
    match config.path() {
        Some(path) => format!("Configuration loaded from {}", path),
        None => "No config file found, using default embedded config".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_without_file() {
        let config = Config::from_yaml_str("").unwrap();
        assert_eq!(
            config_source(&config),
            "No config file found, using default embedded config"
        );
    }
}
