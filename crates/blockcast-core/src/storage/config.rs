//! TOML-based predictor configuration.
//!
//! Stores one `[[predictors]]` table per predictor:
//!
//! ```toml
//! [[predictors]]
//! name = "office"
//! entity = "binary_sensor.office_occupancy"
//! period = 1440
//! block_length = 30
//! fading = 0.8
//! threshold = 0.5
//! ```
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{data_dir, write_atomic};
use crate::error::{ConfigError, Result, StorageError};
use crate::predictor::PredictorConfig;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub predictors: Vec<PredictorConfig>,
}

impl Config {
    pub fn path() -> Result<PathBuf, StorageError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, or return (and write) an empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| StorageError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Config = toml::from_str(&content).map_err(ConfigError::from)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        write_atomic(path, &content)?;
        Ok(())
    }

    /// Validate every predictor and check names and ids are unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, p) in self.predictors.iter().enumerate() {
            p.validate()?;
            let clash = self.predictors[..i]
                .iter()
                .any(|q| q.name == p.name || q.unique_id() == p.unique_id());
            if clash {
                return Err(ConfigError::Duplicate(p.name.clone()));
            }
        }
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&PredictorConfig> {
        self.predictors.iter().find(|p| p.name == name)
    }

    /// Predictors observing `entity`.
    pub fn observing<'a>(
        &'a self,
        entity: &'a str,
    ) -> impl Iterator<Item = &'a PredictorConfig> + 'a {
        self.predictors.iter().filter(move |p| p.entity == entity)
    }

    /// Add a validated predictor.
    pub fn add(&mut self, predictor: PredictorConfig) -> Result<(), ConfigError> {
        predictor.validate()?;
        if self
            .predictors
            .iter()
            .any(|p| p.name == predictor.name || p.unique_id() == predictor.unique_id())
        {
            return Err(ConfigError::Duplicate(predictor.name));
        }
        self.predictors.push(predictor);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<PredictorConfig, ConfigError> {
        let index = self
            .predictors
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ConfigError::UnknownPredictor(name.to_string()))?;
        Ok(self.predictors.remove(index))
    }

    /// Get one predictor field as a string.
    pub fn get(&self, name: &str, key: &str) -> Option<String> {
        let json = serde_json::to_value(self.find(name)?).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set one predictor field, keeping the field's type. The updated
    /// predictor must still validate.
    pub fn set(&mut self, name: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        let index = self
            .predictors
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ConfigError::UnknownPredictor(name.to_string()))?;

        let mut json = serde_json::to_value(&self.predictors[index])
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        set_json_field(&mut json, key, value)?;
        let updated: PredictorConfig =
            serde_json::from_value(json).map_err(|e| ConfigError::invalid(key, e.to_string()))?;
        updated.validate()?;

        let others = self
            .predictors
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, p)| p);
        for p in others {
            if p.name == updated.name || p.unique_id() == updated.unique_id() {
                return Err(ConfigError::Duplicate(updated.name));
            }
        }

        self.predictors[index] = updated;
        Ok(())
    }
}

const SETTABLE_KEYS: &[&str] = &[
    "name",
    "unique_id",
    "entity",
    "period",
    "block_length",
    "fading",
    "threshold",
];

fn set_json_field(root: &mut serde_json::Value, key: &str, value: &str) -> Result<(), ConfigError> {
    if !SETTABLE_KEYS.contains(&key) {
        return Err(ConfigError::invalid(key, "unknown predictor key"));
    }
    let obj = root
        .as_object_mut()
        .ok_or_else(|| ConfigError::ParseFailed("predictor is not an object".into()))?;

    let new_value = match key {
        "period" | "block_length" => {
            let n: u32 = value.parse().map_err(|_| {
                ConfigError::invalid(key, format!("cannot parse '{value}' as integer"))
            })?;
            serde_json::Value::Number(n.into())
        }
        "fading" | "threshold" => {
            let n: f64 = value.parse().map_err(|_| {
                ConfigError::invalid(key, format!("cannot parse '{value}' as number"))
            })?;
            serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .ok_or_else(|| {
                    ConfigError::invalid(key, format!("cannot parse '{value}' as number"))
                })?
        }
        _ => serde_json::Value::String(value.into()),
    };

    obj.insert(key.to_string(), new_value);
    Ok(())
}
