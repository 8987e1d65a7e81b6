use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use stackdraw_suggest::PipelineOptions;

/// Server options. Every flag can also come from the environment (or `.env`).
#[derive(Debug, Clone, Parser)]
#[command(name = "stackdraw-server", version, about = "Tech stack diagram generation service")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "STACKDRAW_BIND", default_value = "127.0.0.1:5001")]
    pub bind: SocketAddr,

    /// Origins allowed to call the API (comma separated in the environment)
    #[arg(
        long = "cors-origin",
        env = "STACKDRAW_CORS_ORIGINS",
        value_delimiter = ',',
        default_values = ["http://localhost:8080", "http://localhost:8081"]
    )]
    pub cors_origins: Vec<String>,

    /// Upper bound on a single model call, in seconds
    #[arg(long, env = "STACKDRAW_MODEL_TIMEOUT_SECS", default_value_t = 120)]
    pub model_timeout_secs: u64,

    /// Fall back instead of pruning when the model emits edges to unknown nodes
    #[arg(long, env = "STACKDRAW_STRICT_EDGES")]
    pub strict_edges: bool,
}

impl ServerConfig {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            model_timeout: Duration::from_secs(self.model_timeout_secs),
            strict_edges: self.strict_edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_dev_frontend() {
        let config = ServerConfig::try_parse_from(["stackdraw-server"]).unwrap();
        assert_eq!(config.bind.port(), 5001);
        assert_eq!(
            config.cors_origins,
            ["http://localhost:8080", "http://localhost:8081"]
        );
        assert_eq!(config.pipeline_options().model_timeout, Duration::from_secs(120));
        assert!(!config.pipeline_options().strict_edges);
    }

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "stackdraw-server",
            "--bind",
            "0.0.0.0:8000",
            "--cors-origin",
            "https://app.example.com",
            "--model-timeout-secs",
            "30",
            "--strict-edges",
        ])
        .unwrap();
        assert_eq!(config.bind.to_string(), "0.0.0.0:8000");
        assert_eq!(config.cors_origins, ["https://app.example.com"]);
        assert_eq!(config.pipeline_options().model_timeout, Duration::from_secs(30));
        assert!(config.strict_edges);
    }
}
