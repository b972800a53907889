//! Runtime configuration for the API server
//!
//! Every option can be given on the command line or through the environment.

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use clap::Parser;
use std::net::SocketAddr;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

#[derive(Parser, Debug, Clone)]
#[command(name = "api_server")]
#[command(about = "Serve train booking analytics over HTTP")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://data/bookings.db")]
    pub database_url: String,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value = "5")]
    pub max_connections: u32,

    /// Origins allowed to call the API from a browser
    #[arg(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000,http://localhost:5173,\
                         http://127.0.0.1:3000,http://127.0.0.1:5173"
    )]
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    pub fn cors_layer(&self) -> Result<CorsLayer> {
        let origins = self
            .cors_origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o.trim())
                    .with_context(|| format!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET])
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["api_server"]).unwrap();
        assert_eq!(config.cors_origins.len(), 4);
        assert!(config.cors_layer().is_ok());
    }

    #[test]
    fn test_origin_list_from_flag() {
        let config = ServerConfig::try_parse_from([
            "api_server",
            "--cors-origins",
            "http://a.example,http://b.example",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
        ])
        .unwrap();
        assert_eq!(config.cors_origins, vec!["http://a.example", "http://b.example"]);
        assert_eq!(config.socket_addr().unwrap(), "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
    }
}
