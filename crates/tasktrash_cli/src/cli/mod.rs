use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tasktrash_core::TaskId;
use tasktrash_core::config::ConfigOverrides;
use tasktrash_core::error::AppError;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Task list to work on; each namespace is stored separately
    #[arg(long, value_name = "NAME", global = true)]
    pub namespace: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tasktrash add Buy milk
    Add { text: Vec<String> },
    /// Move tasks to the trash
    ///
    /// Example: tasktrash delete 1734652800123
    /// Example: tasktrash delete 1734652800123 1734652800124
    Delete {
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },
    /// Bring a task back from the trash
    ///
    /// Example: tasktrash restore 1734652800123
    Restore { id: TaskId },
    /// Permanently remove everything in the trash
    ///
    /// Example: tasktrash clear-trash
    ClearTrash,
    /// Show tasks and trash, newest first
    ///
    /// Example: tasktrash list
    /// Example: tasktrash list --trash
    List {
        /// Only show the trash
        #[arg(long)]
        trash: bool,
    },
    /// Select or unselect a task (interactive session only)
    ///
    /// Example: toggle 1734652800123
    Toggle { id: TaskId },
    /// Select every task, or clear the selection when all are selected
    /// (interactive session only)
    SelectAll,
    /// Move selected tasks to the trash (interactive session only)
    DeleteSelected,
}

impl Command {
    /// Commands that act on the selection, which only lives inside a session.
    pub fn needs_session(&self) -> bool {
        matches!(
            self,
            Command::Toggle { .. } | Command::SelectAll | Command::DeleteSelected
        )
    }
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Namespace,
    StorePath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field = tasktrash_core::config::canonical_name(key_raw)
        .ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "namespace" => ConfigOverrideTarget::Namespace,
        "store_path" => ConfigOverrideTarget::StorePath,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("{field} override requires a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Collects `--namespace` and every `--config-override` into one set of overrides.
/// `--namespace` wins over a `namespace=` override.
pub fn collect_overrides(cli: &Cli) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for raw in &cli.config_override {
        let parsed = parse_config_override(raw)
            .map_err(|message| AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG}: {message}")))?;
        match parsed.target {
            ConfigOverrideTarget::Namespace => overrides.namespace = Some(parsed.value),
            ConfigOverrideTarget::StorePath => {
                overrides.store_path = Some(PathBuf::from(parsed.value))
            }
        }
    }

    if let Some(namespace) = cli.namespace.as_ref() {
        overrides.namespace = Some(namespace.clone());
    }

    Ok(overrides)
}

/// Splits an interactive input line into arguments, honouring double quotes.
pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}
