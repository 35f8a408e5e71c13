use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::req_handler::DEFAULT_BODY_LIMIT;

/// Startup configuration. Every flag can also be supplied through the
/// environment (or a `.env` file); explicit flags take precedence.
#[derive(Parser, Debug, Clone)]
#[command(name = "diabetes-api", version, about = "Serve a diabetes classifier over HTTP")]
pub struct AppCfg {
    /// Address to bind
    #[arg(long, env = "DIABETES_API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "DIABETES_API_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Verbose logging
    #[arg(long, env = "DIABETES_API_DEBUG")]
    pub debug: bool,

    /// Model artifact (JSON)
    #[arg(long, env = "DIABETES_API_MODEL", default_value = "model.json")]
    pub model: PathBuf,

    /// Categorical encoder artifact (JSON)
    #[arg(long, env = "DIABETES_API_ENCODER", default_value = "label_encoder.json")]
    pub encoder: PathBuf,

    /// Number of HTTP workers (defaults to one per core)
    #[arg(long, env = "DIABETES_API_WORKERS")]
    pub workers: Option<usize>,

    /// Largest accepted `/predict` body in bytes
    #[arg(long, env = "DIABETES_API_MAX_BODY_BYTES", default_value_t = DEFAULT_BODY_LIMIT)]
    pub max_body_bytes: usize,
}

/// Loads `path` into the process environment. A missing file is fine; a
/// malformed one is an error.
pub fn load_env_file(path: &Path) -> std::io::Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::new(ErrorKind::Other, e)),
    }
}

impl AppCfg {
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}
