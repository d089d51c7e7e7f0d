//! Config command: inspect or edit the configuration file in use.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the config command against the file at `config_path`.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            Output::kv("File", &config_path.display().to_string());
            if !config_path.exists() {
                Output::info("File does not exist yet, showing built-in defaults.");
            }
            println!();
            println!("{}", render(&settings)?);
        }

        ConfigAction::Edit => {
            if ensure_config_file(&settings, config_path)? {
                Output::info(&format!("Created config at {}", config_path.display()));
            }
            open_in_editor(config_path);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

fn render(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(settings).context("Failed to serialize config")
}

/// Write `settings` to `path` unless a file is already there.
///
/// Returns whether the file was created.
fn ensure_config_file(settings: &Settings, path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    settings
        .save_to(&path.to_path_buf())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

fn open_in_editor(path: &Path) {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
    Output::info(&format!("Opening {} in {}...", path.display(), editor));

    match std::process::Command::new(&editor).arg(path).status() {
        Ok(status) if status.success() => Output::success("Config saved."),
        Ok(_) => Output::warning("Editor exited with non-zero status."),
        Err(e) => {
            Output::error(&format!("Failed to open editor {}: {}", editor, e));
            Output::info(&format!("Config file is at: {}", path.display()));
        }
    }
}
