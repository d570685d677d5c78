use crate::error::{BoardwalkError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum field lengths, counted in characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_board_title: usize,
    pub max_list_title: usize,
    pub max_card_title: usize,
    pub max_description: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_board_title: 100,
            max_list_title: 100,
            max_card_title: 200,
            max_description: 2000,
        }
    }
}

impl Limits {
    /// Rejects blank or over-long titles
    pub fn check_title(&self, what: &str, title: &str, max: usize) -> Result<()> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(BoardwalkError::Validation(format!(
                "{} title must not be empty",
                what
            )));
        }
        if trimmed.chars().count() > max {
            return Err(BoardwalkError::Validation(format!(
                "{} title exceeds {} characters",
                what, max
            )));
        }
        Ok(())
    }

    pub fn check_description(&self, description: &str) -> Result<()> {
        if description.chars().count() > self.max_description {
            return Err(BoardwalkError::Validation(format!(
                "Description exceeds {} characters",
                self.max_description
            )));
        }
        Ok(())
    }
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Namespace prepended to every collection key
    pub key_prefix: String,
    pub limits: Limits,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key_prefix: "boardwalk".to_string(),
            limits: Limits::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BoardwalkError::Config(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            BoardwalkError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    fn validate(&self) -> Result<()> {
        if self.key_prefix.trim().is_empty() {
            return Err(BoardwalkError::Config(
                "key_prefix must not be empty".to_string(),
            ));
        }
        let limits = &self.limits;
        if limits.max_board_title == 0 || limits.max_list_title == 0 || limits.max_card_title == 0
        {
            return Err(BoardwalkError::Config(
                "title limits must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
