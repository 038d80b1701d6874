use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recommend::ranking::{PredictionPolicy, DEFAULT_NEIGHBORS};

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["cinerank.toml", "config/cinerank.toml"];

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub neighbors: usize,
    pub prediction_policy: PredictionPolicy,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DataConfig {
    pub movies_path: Option<PathBuf>,
    pub users_path: Option<PathBuf>,
    pub strict: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub neighbors: Option<usize>,
    pub prediction_policy: Option<PredictionPolicy>,
    pub movies_path: Option<PathBuf>,
    pub users_path: Option<PathBuf>,
    pub strict: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("`{path}` is not valid cinerank config: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("config file `{0}` does not exist")]
    MissingConfigFile(PathBuf),
    #[error("`${{{var}}}` is referenced in the config file but not set")]
    MissingEnvInterpolation { var: String },
    #[error("`${{` without a closing `}}` in the config file")]
    UnterminatedInterpolation,
    #[error("{key}={value:?} is not a valid override")]
    InvalidEnvOverride { key: String, value: String },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                neighbors: DEFAULT_NEIGHBORS,
                prediction_policy: PredictionPolicy::Raw,
            },
            data: DataConfig { movies_path: None, users_path: None, strict: false },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl std::str::FromStr for PredictionPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "raw" => Ok(Self::Raw),
            "mean_centered" => Ok(Self::MeanCentered),
            other => Err(ConfigError::Validation(format!(
                "unsupported prediction policy `{other}` (expected raw|mean_centered)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options
                .config_path
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(engine) = patch.engine {
            if let Some(neighbors) = engine.neighbors {
                self.engine.neighbors = neighbors;
            }
            if let Some(prediction_policy) = engine.prediction_policy {
                self.engine.prediction_policy = prediction_policy;
            }
        }

        if let Some(data) = patch.data {
            if let Some(movies_path) = data.movies_path {
                self.data.movies_path = Some(movies_path);
            }
            if let Some(users_path) = data.users_path {
                self.data.users_path = Some(users_path);
            }
            if let Some(strict) = data.strict {
                self.data.strict = strict;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CINERANK_ENGINE_NEIGHBORS") {
            self.engine.neighbors = parse_usize("CINERANK_ENGINE_NEIGHBORS", &value)?;
        }
        if let Some(value) = read_env("CINERANK_ENGINE_PREDICTION_POLICY") {
            self.engine.prediction_policy = value.parse()?;
        }

        if let Some(value) = read_env("CINERANK_DATA_MOVIES_PATH") {
            self.data.movies_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("CINERANK_DATA_USERS_PATH") {
            self.data.users_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("CINERANK_DATA_STRICT") {
            self.data.strict = parse_bool("CINERANK_DATA_STRICT", &value)?;
        }

        let log_level =
            read_env("CINERANK_LOGGING_LEVEL").or_else(|| read_env("CINERANK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CINERANK_LOGGING_FORMAT").or_else(|| read_env("CINERANK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(neighbors) = overrides.neighbors {
            self.engine.neighbors = neighbors;
        }
        if let Some(prediction_policy) = overrides.prediction_policy {
            self.engine.prediction_policy = prediction_policy;
        }
        if let Some(movies_path) = overrides.movies_path {
            self.data.movies_path = Some(movies_path);
        }
        if let Some(users_path) = overrides.users_path {
            self.data.users_path = Some(users_path);
        }
        if let Some(strict) = overrides.strict {
            self.data.strict = strict;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_engine(&self.engine)?;
        validate_data(&self.data)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// First existing config file: the explicit path if given, else the default
/// candidates relative to the working directory.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let text = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&interpolate_env_vars(&text)?)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Substitutes each `${VAR}` in a config file with the variable's value.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("${") {
        output.push_str(&rest[..open]);
        let expression = &rest[open + 2..];
        let close = expression.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &expression[..close];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &expression[close + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    if engine.neighbors == 0 {
        return Err(ConfigError::Validation(
            "engine.neighbors must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_data(data: &DataConfig) -> Result<(), ConfigError> {
    let blank = |path: &Option<PathBuf>| {
        path.as_ref().map(|value| value.as_os_str().is_empty()).unwrap_or(false)
    };
    if blank(&data.movies_path) {
        return Err(ConfigError::Validation("data.movies_path must not be empty".to_string()));
    }
    if blank(&data.users_path) {
        return Err(ConfigError::Validation("data.users_path must not be empty".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

/// Value of an environment override; unset and blank variables are `None`.
pub fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    engine: Option<EnginePatch>,
    data: Option<DataPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    neighbors: Option<usize>,
    prediction_policy: Option<PredictionPolicy>,
}

#[derive(Debug, Default, Deserialize)]
struct DataPatch {
    movies_path: Option<PathBuf>,
    users_path: Option<PathBuf>,
    strict: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
