//! Layered configuration: optional TOML file, then `BLUEPRINT_*`
//! environment variables, over built-in defaults.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use blueprint_model::{Project, ProjectId};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid backend base url `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("invalid listen address: {0}")]
    InvalidAddress(#[from] AddrParseError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the dashboard API this service orchestrates.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub id: Option<uuid::Uuid>,
    pub name: String,
    pub path: String,
    pub framework: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub project: ProjectConfig,
}

impl Config {
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigLoadError> {
        Ok(format!("{}:{}", self.server.host, self.server.port).parse()?)
    }

    pub fn backend_base_url(&self) -> Result<Url, ConfigLoadError> {
        Url::parse(&self.backend.base_url).map_err(|source| {
            ConfigLoadError::InvalidBaseUrl {
                url: self.backend.base_url.clone(),
                source,
            }
        })
    }

    /// The session's active project. A missing id is generated once at load
    /// time, matching the single-writer-per-session model.
    pub fn project(&self) -> Project {
        Project {
            id: self
                .project
                .id
                .map(ProjectId::from)
                .unwrap_or_default(),
            name: self.project.name.clone(),
            path: self.project.path.clone(),
            framework: self.project.framework.clone(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<Config, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4400)?
            .set_default("backend.base_url", "http://localhost:3000")?
            .set_default("project.name", "blueprint")?
            .set_default("project.path", ".")?;

        if let Some(path) = &self.config_path {
            builder = builder.add_source(
                config::File::from(path.as_path()).required(true),
            );
        } else {
            builder = builder.add_source(
                config::File::with_name("blueprint").required(false),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("BLUEPRINT").separator("__"),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        // Fail fast on a bad url instead of at first request.
        config.backend_base_url()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_stand_alone() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.server.port, 4400);
        assert_eq!(
            config.backend_base_url().unwrap().as_str(),
            "http://localhost:3000/"
        );
        let project = config.project();
        assert_eq!(project.name, "blueprint");
        assert!(!project.is_nextjs());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[server]
host = "0.0.0.0"
port = 8088

[backend]
base_url = "http://backend:3000"

[project]
name = "storefront"
path = "/srv/storefront"
framework = "nextjs"
"#
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_config_path(file.path())
            .load()
            .unwrap();
        assert_eq!(config.listen_addr().unwrap().port(), 8088);
        assert!(config.project().is_nextjs());
        assert_eq!(config.project().path, "/srv/storefront");
    }

    #[test]
    fn a_bad_base_url_fails_at_load_time() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[backend]
base_url = "not a url"
"#
        )
        .unwrap();

        let err = ConfigLoader::new()
            .with_config_path(file.path())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::InvalidBaseUrl { .. }));
    }
}
