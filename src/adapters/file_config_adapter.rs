//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive.

use crate::domain::error::FxlabError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FxlabError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| FxlabError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, FxlabError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| FxlabError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, FxlabError> {
        match self.config.getfloat(section, key) {
            Ok(value) => Ok(value.unwrap_or(default)),
            Err(reason) => Err(FxlabError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason,
            }),
        }
    }

    fn section_keys(&self, section: &str) -> Vec<String> {
        let section = section.to_lowercase();
        let mut keys: Vec<String> = self
            .config
            .get_map_ref()
            .get(&section)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, value)| value.is_some())
                    .map(|(key, _)| key.clone())
                    .collect()
            })
            .unwrap_or_default();
        keys.sort();
        keys
    }
}
