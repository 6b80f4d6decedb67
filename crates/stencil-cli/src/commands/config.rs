//! `stencil config`: read and write configuration values.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use stencil_core::application::ConflictPolicy;

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::{AppConfig, KEYS},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = config
                .get(&key)
                .ok_or(CliError::UnknownConfigKey { key })?;
            // Machine-friendly: the bare value, even in quiet mode.
            println!("{value}");
        }

        ConfigCommands::Set { key, value } => {
            let path = AppConfig::active_path(global.config.as_ref());
            set_value(&path, &key, &value)?;
            output.success(&format!("Set {key} = {value} in {}", path.display()))?;
        }

        ConfigCommands::List => {
            output.header("Current Configuration:")?;
            let serialised =
                toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                    message: format!("Failed to serialise config: {e}"),
                    source: Some(Box::new(e)),
                })?;
            output.print(&serialised)?;
        }

        ConfigCommands::Path => {
            println!("{}", AppConfig::active_path(global.config.as_ref()).display());
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

/// Update one dotted key in the TOML file at `path`, creating it if needed.
///
/// Other keys and tables already in the file are preserved. The result must
/// still deserialize as an [`AppConfig`] or nothing is written.
#[instrument(skip(path, value), fields(path = %path.display()))]
fn set_value(path: &Path, key: &str, value: &str) -> CliResult<()> {
    let (section, field) = key
        .split_once('.')
        .filter(|_| KEYS.contains(&key))
        .ok_or_else(|| CliError::UnknownConfigKey { key: key.into() })?;

    let mut doc = read_table(path)?;
    let parsed = parse_value(key, value)?;

    let table = doc
        .entry(section)
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    let toml::Value::Table(table) = table else {
        return Err(CliError::ConfigError {
            message: format!("'{section}' in {} is not a table", path.display()),
            source: None,
        });
    };
    table.insert(field.to_owned(), parsed);

    toml::Value::Table(doc.clone())
        .try_into::<AppConfig>()
        .map_err(|e| CliError::ConfigError {
            message: format!("'{value}' is not a valid value for {key}"),
            source: Some(Box::new(e)),
        })?;

    let text = toml::to_string_pretty(&doc).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }
    std::fs::write(path, text)
        .with_cli_context(|| format!("Failed to write config to '{}'", path.display()))?;

    debug!(key, "config value written");
    Ok(())
}

fn read_table(path: &Path) -> CliResult<toml::Table> {
    if !path.is_file() {
        return Ok(toml::Table::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_cli_context(|| format!("Failed to read config '{}'", path.display()))?;
    raw.parse::<toml::Table>().map_err(|e| CliError::ConfigError {
        message: format!("{} is not valid TOML", path.display()),
        source: Some(Box::new(e)),
    })
}

/// Typed TOML value for `key`; strings for everything but booleans.
fn parse_value(key: &str, value: &str) -> CliResult<toml::Value> {
    match key {
        "output.no_color" => value
            .parse::<bool>()
            .map(toml::Value::Boolean)
            .map_err(|e| CliError::InvalidInput {
                message: format!("{key} expects true or false, got '{value}'"),
                source: Some(Box::new(e)),
            }),
        "templates.conflict" => {
            let policy: ConflictPolicy = value.parse()?;
            Ok(toml::Value::String(policy.as_str().to_owned()))
        }
        "output.format" => Ok(toml::Value::String(value.to_ascii_lowercase())),
        "templates.dir" => Ok(toml::Value::String(
            PathBuf::from(value).display().to_string(),
        )),
        _ => Ok(toml::Value::String(value.to_owned())),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
