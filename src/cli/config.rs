use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::form::form_model::ExtractOptions;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-autofill",
    version,
    about = "Find fillable forms in HTML pages, infer their labels and fill them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: form-autofill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Append a JSON-lines trace of every operation to this file
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract forms, fields and inferred labels from a page
    Extract {
        /// HTML file to read (`-` for stdin)
        input: Option<String>,

        /// Fetch the page from this URL instead of a file
        #[arg(long)]
        url: Option<String>,

        /// URL the page is treated as loaded from (origin, action resolution)
        #[arg(long)]
        base_url: Option<String>,

        /// Editable fields a form needs to be reported
        #[arg(long)]
        min_fields: Option<usize>,

        /// Maximum fields extracted from the page
        #[arg(long)]
        max_fields: Option<usize>,

        /// Report select values as option text
        #[arg(long)]
        option_text: bool,

        /// Output format: console, json
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Fill a form with values and write the resulting HTML
    Fill {
        /// HTML file to read (`-` for stdin)
        input: String,

        /// Form identifier (name, else id); empty for controls outside forms
        #[arg(long, default_value = "")]
        form: String,

        /// YAML or JSON mapping of field name to value
        #[arg(long)]
        values: Option<String>,

        /// Overwrite this field even if it already holds a value
        #[arg(long)]
        force: Option<String>,

        /// Fill only this field (as for the field the user is focused on)
        #[arg(long)]
        field: Option<String>,

        /// YAML or JSON mapping of form → field → predicted type, shown as placeholders
        #[arg(long)]
        predictions: Option<String>,

        /// Summary format: console, json
        #[arg(long)]
        format: Option<String>,

        /// Output HTML path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Clear the autofilled fields of a previously filled page
    Clear {
        /// HTML file to read (`-` for stdin)
        input: String,

        /// Form identifier; empty for controls outside forms
        #[arg(long, default_value = "")]
        form: String,

        /// Summary format: console, json
        #[arg(long)]
        format: Option<String>,

        /// Output HTML path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-autofill.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub extract: ExtractOptions,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_console")]
    pub format: String,

    /// Trace file used when `--trace` is not given
    pub trace: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "console".to_string(),
            trace: None,
        }
    }
}

fn default_console() -> String { "console".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

pub const DEFAULT_CONFIG_PATH: &str = "form-autofill.yaml";

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => parse_config(&content),
        Err(_) => AppConfig::default(),
    }
}

pub fn parse_config(content: &str) -> AppConfig {
    serde_yaml::from_str(content).unwrap_or_default()
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Extraction options from config, with CLI flags taking precedence.
pub fn build_extract_options(
    config: &AppConfig,
    min_fields: Option<usize>,
    max_fields: Option<usize>,
    option_text: bool,
) -> ExtractOptions {
    let mut options = config.extract.clone();
    if let Some(min) = min_fields {
        options = options.with_min_required_fields(min);
    }
    if let Some(max) = max_fields {
        options = options.with_max_fields(max);
    }
    if option_text {
        options.extract_option_text = true;
    }
    options
}

/// Output format from CLI, else config.
pub fn resolve_format(config: &AppConfig, format: Option<&str>) -> String {
    format.unwrap_or(&config.output.format).to_string()
}
