use crate::errors::Error;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

pub const LOCAL_HOST: &str = "http://localhost:8101";
pub const PROD_HOST: &str = "https://yimohanser.icu";

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub channel: ChannelConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[serde(alias = "dev")]
    Development,
    #[serde(alias = "prod")]
    Production,
}

impl Profile {
    /// Debug builds talk to the local backend, release builds to production.
    pub fn from_build() -> Profile {
        if cfg!(debug_assertions) {
            Profile::Development
        } else {
            Profile::Production
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" | "development" => Ok(Profile::Development),
            "prod" | "production" => Ok(Profile::Production),
            other => Err(format!(
                "unknown profile {other:?}, expected development or production"
            )),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub profile: Option<Profile>,
    pub local_host: String,
    pub prod_host: String,
    pub access_token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            profile: None,
            local_host: LOCAL_HOST.to_string(),
            prod_host: PROD_HOST.to_string(),
            access_token: None,
        }
    }
}

impl BackendConfig {
    pub fn host(&self, profile: Profile) -> &str {
        let host = match profile {
            Profile::Development => &self.local_host,
            Profile::Production => &self.prod_host,
        };
        host.trim_end_matches('/')
    }
}

#[derive(Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub result_timeout_secs: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            result_timeout_secs: 120,
        }
    }
}

impl ChannelConfig {
    /// `None` waits for the result indefinitely.
    pub fn result_timeout(&self) -> Option<Duration> {
        match self.result_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Derives the push channel base from the HTTP backend host: `http` becomes
/// `ws` and `https` becomes `wss`.
pub fn push_base(http_host: &str) -> Result<String, Error> {
    let scheme = Regex::new(r"^http(s?)://").map_err(|e| Error::Configuration(e.to_string()))?;
    if !scheme.is_match(http_host) {
        return Err(Error::Configuration(format!(
            "backend host {http_host:?} must start with http:// or https://"
        )));
    }
    Ok(scheme
        .replace(http_host.trim_end_matches('/'), "ws$1://")
        .into_owned())
}
