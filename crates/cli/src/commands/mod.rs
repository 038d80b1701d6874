pub mod catalog;
pub mod config;
pub mod predict;
pub mod recommend;
pub mod users;

use std::path::PathBuf;

use cinerank_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use cinerank_core::{ApplicationError, Catalog, UserProfile};
use cinerank_loader::{LoadMode, SkippedRecord};
use serde::Serialize;
use tracing::info;

pub const UNKNOWN_USER_EXIT_CODE: u8 = 5;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<T: Serialize> {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::with_status(command, "ok", message, None::<()>)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: impl Serialize,
    ) -> Self {
        Self::with_status(command, "ok", message, Some(data))
    }

    /// A successful run that produced nothing to show, e.g. no recommendation.
    pub fn empty(command: &str, message: impl Into<String>, data: impl Serialize) -> Self {
        Self::with_status(command, "empty", message, Some(data))
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome::<()> {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            error.exit_code(),
        )
    }

    pub fn unknown_user(command: &str, user: &str) -> Self {
        Self::failure(
            command,
            "unknown_user",
            format!("user `{user}` was not found in the users file"),
            UNKNOWN_USER_EXIT_CODE,
        )
    }

    fn with_status<T: Serialize>(
        command: &str,
        status: &str,
        message: impl Into<String>,
        data: Option<T>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: status.to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }
}

fn serialize_payload<T: Serialize>(payload: CommandOutcome<T>) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Where a command finds its configuration and data files. Explicit paths
/// win over `data.*` config values.
#[derive(Clone, Debug, Default)]
pub struct DataSources {
    pub config_path: Option<PathBuf>,
    pub movies: Option<PathBuf>,
    pub users: Option<PathBuf>,
}

pub fn load_options(sources: &DataSources) -> LoadOptions {
    LoadOptions {
        config_path: sources.config_path.clone(),
        require_file: sources.config_path.is_some(),
        overrides: ConfigOverrides {
            movies_path: sources.movies.clone(),
            users_path: sources.users.clone(),
            ..ConfigOverrides::default()
        },
    }
}

pub(crate) fn load_config(sources: &DataSources) -> Result<AppConfig, ApplicationError> {
    AppConfig::load(load_options(sources))
        .map_err(|error| ApplicationError::Configuration(error.to_string()))
}

#[derive(Debug, Serialize)]
pub(crate) struct SkippedLine {
    line: usize,
    reason: String,
}

impl From<SkippedRecord> for SkippedLine {
    fn from(record: SkippedRecord) -> Self {
        Self { line: record.line, reason: record.reason }
    }
}

/// Loaded data plus every record a lenient load dropped.
pub(crate) struct Dataset {
    pub catalog: Catalog,
    pub users: Vec<UserProfile>,
    pub skipped: Vec<SkippedLine>,
}

impl Dataset {
    pub fn find_user(&self, name: &str) -> Option<&UserProfile> {
        self.users.iter().find(|user| user.name() == name)
    }
}

pub(crate) fn load_catalog(config: &AppConfig) -> Result<Dataset, ApplicationError> {
    let path = config.data.movies_path.as_deref().ok_or_else(|| {
        ApplicationError::Configuration(
            "no movie catalog configured; pass --movies or set data.movies_path".to_string(),
        )
    })?;
    let load = cinerank_loader::load_catalog(path, LoadMode::from_strict_flag(config.data.strict))
        .map_err(|error| ApplicationError::Load(error.to_string()))?;

    Ok(Dataset {
        catalog: load.catalog,
        users: Vec::new(),
        skipped: load.skipped.into_iter().map(SkippedLine::from).collect(),
    })
}

pub(crate) fn load_dataset(config: &AppConfig) -> Result<Dataset, ApplicationError> {
    let mut dataset = load_catalog(config)?;
    let path = config.data.users_path.as_deref().ok_or_else(|| {
        ApplicationError::Configuration(
            "no users file configured; pass --users or set data.users_path".to_string(),
        )
    })?;
    let load = cinerank_loader::load_users(
        path,
        &dataset.catalog,
        LoadMode::from_strict_flag(config.data.strict),
    )
    .map_err(|error| ApplicationError::Load(error.to_string()))?;

    dataset.users = load.users;
    dataset.skipped.extend(load.skipped.into_iter().map(SkippedLine::from));
    info!(
        event_name = "cli.dataset.loaded",
        items = dataset.catalog.len(),
        users = dataset.users.len(),
        skipped = dataset.skipped.len(),
        "dataset ready"
    );
    Ok(dataset)
}
