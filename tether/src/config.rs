use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// values the starting document is built from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct PageConfig {
    pub article_id: String,
    pub profile_slug: String,
    pub client_name: String,
    pub client_channel: String,
    pub comment: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig {
            article_id: "1".to_owned(),
            profile_slug: "admin".to_owned(),
            client_name: "tether".to_owned(),
            client_channel: "@tether".to_owned(),
            comment: String::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct Config {
    pub endpoint: String,
    /// `document.cookie` format.
    pub cookies: String,
    pub csrf_cookie: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    pub log_file: String,
    pub page: PageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: "http://[::1]:8000".to_owned(),
            cookies: String::new(),
            csrf_cookie: "csrftoken".to_owned(),
            timeout_secs: None,
            log_file: "./tether.log".to_owned(),
            page: PageConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tether").join("config.toml"))
    }

    /// reads the config file, writing the defaults out on first run.
    pub(crate) fn load() -> anyhow::Result<Self> {
        let path = match Self::path() {
            Some(path) => path,
            None => return Ok(Self::default()),
        };
        if !path.exists() {
            let config = Self::default();
            config.save_to(&path)?;
            return Ok(config);
        }
        Self::from_toml(&fs::read_to_string(&path)?)
    }

    pub(crate) fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
