//! INI file configuration adapter.

use crate::domain::error::VolcrossError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

fn unparseable(section: &str, key: &str, expected: &str, reason: String) -> VolcrossError {
    VolcrossError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("expected {expected}: {reason}"),
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, VolcrossError> {
        self.config
            .getint(section, key)
            .map(|v| v.unwrap_or(default))
            .map_err(|e| unparseable(section, key, "a whole number", e))
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, VolcrossError> {
        self.config
            .getfloat(section, key)
            .map(|v| v.unwrap_or(default))
            .map_err(|e| unparseable(section, key, "a number", e))
    }
}
