use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Tunables of the normalization pass.
///
/// Every field has a default matching the question bank's current markup, so a
/// missing or partial YAML file is fine.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Directory prefix that rewritten script media and attachment links point into.
    pub asset_prefix: String,

    /// Extensions (lower-case, with the dot) treated as downloadable archives.
    pub archive_extensions: Vec<String>,

    /// Banner sentence announcing that a task ships with extra files.
    pub attachment_notice: String,

    /// Category whose bare integers get wrapped into math spans.
    pub numeric_math_category: Option<u32>,

    /// Italic variable names turned into math in that category.
    pub numeric_math_variables: Vec<String>,

    /// Spaces per list nesting level in rendered Markdown.
    pub list_indent: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            asset_prefix: "assets/".to_string(),
            archive_extensions: vec![".zip".to_string(), ".rar".to_string(), ".7z".to_string()],
            attachment_notice: "Для выполнения задания используйте дополнительные файлы"
                .to_string(),
            numeric_math_category: Some(5),
            numeric_math_variables: vec!["N".to_string(), "R".to_string()],
            list_indent: 3,
        }
    }
}

impl NormalizerConfig {
    pub fn load_or_default(file_path: Option<&str>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load config from {path}: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn load_from_file(file_path: &str) -> Result<Self> {
        let path = Path::new(file_path);
        if !path.exists() {
            log::warn!("Config file {file_path} not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config = serde_yaml::from_str::<Self>(&content)?;
        Ok(config)
    }

    /// Whether `href` names an archive stored under the asset prefix.
    pub fn is_archive_asset(&self, href: &str) -> bool {
        let lower = href.trim().to_lowercase();
        lower.starts_with(&self.asset_prefix.to_lowercase())
            && self
                .archive_extensions
                .iter()
                .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }

    pub fn wraps_numbers_for(&self, category: Option<u32>) -> bool {
        match (self.numeric_math_category, category) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => false,
        }
    }
}
