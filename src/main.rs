//! tfds-config
//!
//! Operator CLI for TFDS configs: resolve, inspect and edit the configs that
//! jobs read through the config service or the local YAML files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tfdslib::{
    config::{
        ConfigDocument, ConfigResolver, DeleteOutcome, FileStore, RemoteConfigClient, Settings,
    },
    logging::{self, LogOptions},
};

/// TFDS config tool
///
/// Settings come from TFDS_CONFIG_URL and TFDS_ROOT_PATH (a .env file is read if present).
#[derive(Parser, Debug)]
#[command(name = "tfds-config")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level: trace, debug, info, warn, error (overrides TFDS_LOG_LEVEL env var)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a config through the service, or the local files if it is down
    Get { name: String },

    /// Show a config's metadata from the config service
    Meta { name: String },

    /// Check whether a local config file exists
    Exists { name: String },

    /// Print the local file a config name resolves to
    Path { name: String },

    /// List local config names (config and secrets)
    List,

    /// Write a local config from a YAML or JSON document
    Write {
        name: String,
        /// Document with a top-level `config` mapping
        file: PathBuf,
    },

    /// Delete a local config file
    Delete { name: String },

    /// Show which backend serves lookups right now
    Backend,
}

fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut options = LogOptions::from_env();
    if let Some(level) = args.log_level {
        options.level = level;
    }
    options.json = args.json_logs;
    options.extra_targets.push(env!("CARGO_CRATE_NAME").to_string());
    logging::init(&options);

    let settings = Settings::from_env();
    tracing::debug!(
        config_url = %settings.config_url,
        root_folder = %settings.root_folder.display(),
        "Loaded settings"
    );

    let files = FileStore::new(&settings.root_folder);

    match args.command {
        Command::Get { name } => {
            let resolver = ConfigResolver::new(RemoteConfigClient::new(&settings.config_url), files);
            let config = resolver
                .get_config(&name)
                .with_context(|| format!("Failed to resolve config '{}'", name))?;
            print_json(&Value::Object(config))?;
        }
        Command::Meta { name } => {
            let meta = RemoteConfigClient::new(&settings.config_url)
                .get_meta(&name)
                .with_context(|| format!("Failed to fetch metadata of '{}'", name))?;
            print_json(&meta.unwrap_or(Value::Null))?;
        }
        Command::Exists { name } => {
            println!("{}", files.exists(&name)?);
        }
        Command::Path { name } => {
            println!("{}", files.resolve_path(&name)?.display());
        }
        Command::List => {
            for name in files.list_names()? {
                println!("{}", name);
            }
        }
        Command::Write { name, file } => {
            let contents = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let value: Value = serde_yaml::from_str(&contents)
                .with_context(|| format!("{} is not valid YAML or JSON", file.display()))?;
            let document = ConfigDocument::from_value(&name, &file.display().to_string(), value)?;
            let path = files.write_document(&name, &document)?;
            println!("{}", path.display());
        }
        Command::Delete { name } => match files.delete(&name)? {
            DeleteOutcome::Deleted(path) => println!("Deleted {}", path.display()),
            DeleteOutcome::NotFound(path) => println!("Configuration '{}' not found.", path.display()),
        },
        Command::Backend => {
            let resolver = ConfigResolver::new(RemoteConfigClient::new(&settings.config_url), files);
            println!("{}", resolver.select_backend());
        }
    }

    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
