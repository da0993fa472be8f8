use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub processor_cmd: String,
    pub processor_timeout_secs: u64,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Document upload-and-view server")]
pub struct Args {
    /// Host to bind to (overrides RAGVIEW_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides RAGVIEW_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where uploaded documents and their processed renderings
    /// are stored (overrides RAGVIEW_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Document processor command, invoked as `<cmd> <input> <output-dir>`
    /// (overrides RAGVIEW_PROCESSOR_CMD)
    #[arg(long)]
    pub processor_cmd: Option<String>,

    /// Seconds the processor may run before the upload is failed
    /// (overrides RAGVIEW_PROCESSOR_TIMEOUT_SECS)
    #[arg(long)]
    pub processor_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("RAGVIEW_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("RAGVIEW_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing RAGVIEW_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading RAGVIEW_PORT"),
        };
        let env_storage = env::var("RAGVIEW_STORAGE_DIR").unwrap_or_else(|_| "./uploads".into());
        let env_processor = env::var("RAGVIEW_PROCESSOR_CMD").unwrap_or_else(|_| "rag-dv".into());
        let env_timeout = match env::var("RAGVIEW_PROCESSOR_TIMEOUT_SECS") {
            Ok(value) => value.parse::<u64>().with_context(|| {
                format!("parsing RAGVIEW_PROCESSOR_TIMEOUT_SECS value `{}`", value)
            })?,
            Err(env::VarError::NotPresent) => 300,
            Err(err) => return Err(err).context("reading RAGVIEW_PROCESSOR_TIMEOUT_SECS"),
        };

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            processor_cmd: args.processor_cmd.unwrap_or(env_processor),
            processor_timeout_secs: args.processor_timeout_secs.unwrap_or(env_timeout),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
