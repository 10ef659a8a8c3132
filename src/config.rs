use std::fmt;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SECTION: &str = "default";
pub const DEFAULT_CLOUD: &str = "default";

const SETTINGS_DIR: &str = ".chaos-compute";
const SETTINGS_FILE: &str = "config";

/// Non-secret settings handed to the client provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub region: Option<String>,
    /// Named profile; also reported as the instance's cloud.
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
}

impl Configuration {
    pub fn cloud_name(&self) -> &str {
        self.profile.as_deref().unwrap_or(DEFAULT_CLOUD)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secrets {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Configuration and secrets read from one section of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub configuration: Configuration,
    pub secrets: Option<Secrets>,
}

/// `~/.chaos-compute/config`
pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
    dirs_next::home_dir()
        .map(|home| home.join(SETTINGS_DIR).join(SETTINGS_FILE))
        .ok_or(ConfigError::HomeDirNotFound)
}

impl Settings {
    pub fn load(path: &Path, section: &str) -> Result<Self, ConfigError> {
        let mut ini = Ini::new();
        ini.load(path).map_err(|message| ConfigError::Read {
            path: path.to_path_buf(),
            message,
        })?;
        Self::from_ini(&ini, section)
    }

    pub fn parse(contents: &str, section: &str) -> Result<Self, ConfigError> {
        let mut ini = Ini::new();
        ini.read(contents.to_string()).map_err(ConfigError::Parse)?;
        Self::from_ini(&ini, section)
    }

    fn from_ini(ini: &Ini, section: &str) -> Result<Self, ConfigError> {
        let section = section.to_lowercase();
        if !ini.sections().contains(&section) {
            return Err(ConfigError::SectionNotFound(section));
        }

        let get = |key: &str| {
            ini.get(&section, key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let configuration = Configuration {
            region: get("region"),
            profile: get("profile"),
            endpoint_url: get("endpoint_url"),
        };

        let secrets = match (get("access_key_id"), get("secret_access_key")) {
            (Some(access_key_id), Some(secret_access_key)) => Some(Secrets {
                access_key_id,
                secret_access_key,
                session_token: get("session_token"),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::IncompleteSecrets {
                    section: section.clone(),
                    missing: "secret_access_key",
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteSecrets {
                    section: section.clone(),
                    missing: "access_key_id",
                })
            }
        };

        Ok(Self {
            configuration,
            secrets,
        })
    }
}
