use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::{ErrorKind, Result, ResultExt};

pub const DEFAULT_CONFIG_FILE: &str = "app.env";
const DEFAULT_CREDENTIALS_FILE: &str = "./credentials.json";
const DEFAULT_TOKEN_FILE: &str = "token.json";

/// Settings for one run, read once at start-up and handed down by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Drive folder under which the new run folder is created (`UPLOAD`).
    pub upload_folder_id: String,
    /// Prefix joined verbatim in front of every local file name (`SRC`).
    pub source_dir: String,
    /// Logical file names from `FILE_LIST`, in configured order.
    pub file_names: Vec<String>,
    pub credentials_path: PathBuf,
    pub token_path: PathBuf,
}

impl Settings {
    /// Reads `path` as a dotenv file and layers the process environment on top.
    pub fn load(path: impl AsRef<Path>) -> Result<Settings> {
        let path = path.as_ref();
        let file_values = read_env_file(path)?;
        log::info!("Read {} configuration values from {}", file_values.len(), path.display());

        Ok(Settings::from_sources(&file_values, |name| std::env::var(name).ok()))
    }

    pub fn from_sources<F>(file_values: &HashMap<String, String>, env: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            env(&env_var_name(key))
                .or_else(|| file_values.get(key).cloned())
                .unwrap_or_default()
        };
        let path_or = |key: &str, default: &str| {
            let value = get(key);
            PathBuf::from(if value.is_empty() { default.to_string() } else { value })
        };

        Settings {
            upload_folder_id: get("UPLOAD"),
            source_dir: get("SRC"),
            file_names: split_file_list(&get("FILE_LIST")),
            credentials_path: path_or("CREDENTIALS", DEFAULT_CREDENTIALS_FILE),
            token_path: path_or("TOKEN", DEFAULT_TOKEN_FILE),
        }
    }
}

/// Reads `KEY=VALUE` lines; keys are matched case-insensitively, so they are stored uppercased.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    dotenvy::from_path_iter(path)
        .chain_err(|| ErrorKind::ConfigLoad(path.display().to_string()))?
        .map(|item| item.map(|(key, value)| (key.to_uppercase(), value)))
        .collect::<std::result::Result<HashMap<String, String>, _>>()
        .chain_err(|| ErrorKind::ConfigLoad(path.display().to_string()))
}

fn env_var_name(key: &str) -> String {
    key.replace('.', "_").to_uppercase()
}

fn split_file_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return vec![];
    }
    raw.split(',').map(str::to_owned).collect()
}
