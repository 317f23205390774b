use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::error::ExpertError;
use crate::providers::openai::DEFAULT_BASE_URL;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_ENV_FILE: &str = "api.env";

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const MODEL_VAR: &str = "OPENAI_MODEL";
const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
const TEMPERATURE_VAR: &str = "OPENAI_TEMPERATURE";
const ENV_FILE_VAR: &str = "EXPERT_CHAT_ENV_FILE";
const SETTINGS_FILE_VAR: &str = "EXPERT_CHAT_CONFIG";

const MAX_SETTINGS_FILE_SIZE: u64 = 64 * 1024; // 64 KiB

// --- TOML deserialization structs (map 1:1 to the settings file) ---

/// Optional settings file contents. Every field falls back to a default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    completion: CompletionSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CompletionSettings {
    model: Option<String>,
    temperature: Option<f32>,
    base_url: Option<String>,
}

impl FromStr for Settings {
    type Err = ExpertError;

    fn from_str(content: &str) -> Result<Self, ExpertError> {
        toml::from_str(content).map_err(|e| ExpertError::Config(e.to_string()))
    }
}

impl Settings {
    /// Load settings from a TOML file of at most 64 KiB.
    pub fn load(path: &Path) -> Result<Self, ExpertError> {
        let file = std::fs::File::open(path).map_err(|e| {
            ExpertError::Config(format!("settings file {}: {e}", path.display()))
        })?;

        let mut content = String::new();
        file.take(MAX_SETTINGS_FILE_SIZE + 1)
            .read_to_string(&mut content)
            .map_err(|e| ExpertError::Config(format!("settings file {}: {e}", path.display())))?;

        if content.len() as u64 > MAX_SETTINGS_FILE_SIZE {
            return Err(ExpertError::Config(format!(
                "settings file {} is larger than 64 KiB",
                path.display()
            )));
        }

        toml::from_str(&content)
            .map_err(|e| ExpertError::Config(format!("settings file {}: {e}", path.display())))
    }
}

// --- Resolved configuration ---

/// Everything needed to build the provider and responder at startup.
pub struct Config {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Config {
    /// Read the env file(s) and optional settings file, then resolve.
    /// Variables already set in the process environment win over env files,
    /// and the primary env file wins over `.env`.
    pub fn load() -> Result<Self, ExpertError> {
        let env_file = std::env::var_os(ENV_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE));
        let mut file_vars = read_env_file(&env_file)?;
        for (key, value) in read_env_file(Path::new(".env"))? {
            file_vars.entry(key).or_insert(value);
        }

        let settings = match std::env::var_os(SETTINGS_FILE_VAR) {
            Some(path) => Settings::load(Path::new(&path))?,
            None => Settings::default(),
        };

        let lookup = layered_lookup(|key| std::env::var(key).ok(), &file_vars);
        Self::from_lookup(lookup, settings, &env_file)
    }

    /// Resolve configuration from `settings` plus variables returned by
    /// `lookup`. Environment variables override the settings file.
    pub fn from_lookup<F>(lookup: F, settings: Settings, env_file: &Path) -> Result<Self, ExpertError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from)
            .ok_or_else(|| {
                ExpertError::Config(format!(
                    "{API_KEY_VAR} is not set; export it or add it to {}",
                    env_file.display()
                ))
            })?;

        let completion = settings.completion;
        let model = lookup(MODEL_VAR)
            .or(completion.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned());
        let base_url = lookup(BASE_URL_VAR)
            .or(completion.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let temperature = match lookup(TEMPERATURE_VAR) {
            Some(raw) => raw.trim().parse::<f32>().map_err(|e| {
                ExpertError::Config(format!("{TEMPERATURE_VAR}='{raw}' is not a number: {e}"))
            })?,
            None => completion.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        };

        if model.trim().is_empty() {
            return Err(ExpertError::Config("model must not be empty".to_owned()));
        }
        if base_url.trim().is_empty() {
            return Err(ExpertError::Config("base_url must not be empty".to_owned()));
        }
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ExpertError::Config(format!(
                "temperature {temperature} is outside 0.0..=2.0"
            )));
        }

        debug!(%model, %base_url, temperature, "resolved config");

        Ok(Self {
            api_key,
            base_url,
            model,
            temperature,
        })
    }
}

/// Process environment first, then values read from env files.
fn layered_lookup<'a, P>(
    process: P,
    file_vars: &'a HashMap<String, String>,
) -> impl Fn(&str) -> Option<String> + 'a
where
    P: Fn(&str) -> Option<String> + 'a,
{
    move |key| process(key).or_else(|| file_vars.get(key).cloned())
}

/// Parse `path` as a dotenv file without touching the process environment.
/// A missing file yields no variables.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ExpertError> {
    let invalid = |e: dotenvy::Error| ExpertError::Config(format!("cannot load {}: {e}", path.display()));

    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => return Ok(HashMap::new()),
        Err(e) => return Err(invalid(e)),
    };

    let vars = entries.collect::<Result<HashMap<_, _>, _>>().map_err(invalid)?;
    debug!(path = %path.display(), count = vars.len(), "read env file");
    Ok(vars)
}
