use crate::document_ai::{DEFAULT_MIME_TYPE, ProcessingError, ProcessorSettings, guess_mime_type};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Value of `mime_type` that asks for detection from the file extension.
pub const AUTO_MIME_TYPE: &str = "auto";

#[derive(Parser, Debug)]
#[command(author, version, about = "Process documents with Google Cloud Document AI", long_about = None)]
pub struct Cli {
    /// Config file (JSON, YAML or TOML), same as --config
    #[arg(value_name = "CONFIG")]
    pub config_path: Option<String>,

    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// GCP project ID
    #[arg(long)]
    pub project_id: Option<String>,

    /// Processor location (e.g., 'us')
    #[arg(long)]
    pub location: Option<String>,

    /// Document AI processor ID
    #[arg(long)]
    pub processor_id: Option<String>,

    /// Processor version to pin
    #[arg(long)]
    pub processor_version: Option<String>,

    /// Path to document file
    #[arg(long)]
    pub file_path: Option<String>,

    /// Document MIME type, or 'auto' to guess from the extension
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Path to service account or authorized user credentials JSON
    #[arg(long)]
    pub credentials: Option<String>,

    /// Override the regional Document AI endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Do not print the human-readable report
    #[arg(long)]
    pub no_report: bool,

    /// Do not print the framed JSON result
    #[arg(long)]
    pub no_json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

/// Settings for one CLI invocation.
///
/// Keys mirror the JSON config files consumed by existing integrations, so a
/// file such as `{"project_id": "...", "file_path": "..."}` loads unchanged.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub processor_id: String,
    pub processor_version: Option<String>,
    #[serde(default)]
    pub file_path: String,
    pub mime_type: String,
    pub credentials_path: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Print the framed JSON record.
    pub emit_json: bool,
    /// Print the human-readable report.
    pub report: bool,
    pub log_json: bool,
}

impl AppConfig {
    /// Load from the process arguments.
    ///
    /// Clap handles `--help`, `--version` and bad flags itself and exits.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_cli(Cli::parse())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(cli)
    }

    /// Layer defaults, config file, `DOCAI_*` environment and CLI flags.
    pub fn from_cli(cli: Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("mime_type", DEFAULT_MIME_TYPE)?
            .set_default("emit_json", true)?
            .set_default("report", true)?
            .set_default("log_json", false)?;

        // Explicit flag wins over the positional form used by launchers
        if let Some(path) = cli.config.as_ref().or(cli.config_path.as_ref()) {
            builder = builder.add_source(File::with_name(path));
        }

        // DOCAI_PROJECT_ID, DOCAI_MIME_TYPE, ...
        builder = builder.add_source(
            Environment::with_prefix("DOCAI")
                .prefix_separator("_")
                .separator("__"),
        );

        let overrides = [
            ("project_id", cli.project_id),
            ("location", cli.location),
            ("processor_id", cli.processor_id),
            ("processor_version", cli.processor_version),
            ("file_path", cli.file_path),
            ("mime_type", cli.mime_type),
            ("credentials_path", cli.credentials),
            ("endpoint", cli.endpoint),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                builder = builder.set_override(key, value)?;
            }
        }
        if let Some(secs) = cli.timeout_secs {
            builder = builder.set_override("timeout_secs", secs)?;
        }
        if cli.no_report {
            builder = builder.set_override("report", false)?;
        }
        if cli.no_json {
            builder = builder.set_override("emit_json", false)?;
        }
        if cli.log_json {
            builder = builder.set_override("log_json", true)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Processor settings, failing with every missing required value listed.
    pub fn processor_settings(&self) -> Result<ProcessorSettings, ProcessingError> {
        let missing: Vec<&str> = [
            ("project_id", &self.project_id),
            ("location", &self.location),
            ("processor_id", &self.processor_id),
            ("file_path", &self.file_path),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(ProcessingError::Configuration(format!(
                "Missing required configuration values: {}",
                missing.join(", ")
            )));
        }

        Ok(ProcessorSettings {
            project_id: self.project_id.clone(),
            location: self.location.clone(),
            processor_id: self.processor_id.clone(),
            processor_version: self.processor_version.clone(),
            credentials_path: self
                .credentials_path
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            endpoint: self.endpoint.clone().filter(|e| !e.trim().is_empty()),
            timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }

    /// Input document path.
    pub fn file_path(&self) -> PathBuf {
        PathBuf::from(&self.file_path)
    }

    /// MIME type to send, resolving [`AUTO_MIME_TYPE`] from the file extension.
    pub fn resolved_mime_type(&self) -> String {
        let mime_type = self.mime_type.trim();
        if mime_type.eq_ignore_ascii_case(AUTO_MIME_TYPE) {
            guess_mime_type(&self.file_path())
        } else if mime_type.is_empty() {
            DEFAULT_MIME_TYPE.to_string()
        } else {
            mime_type.to_string()
        }
    }
}
