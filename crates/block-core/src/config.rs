use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};

pub const DEFAULT_MAX_DEPTH: usize = 8;
pub const DEFAULT_LINK_TARGET: &str = "_blank";

/// Editor tuning knobs. Zero or empty fields mean "unset" and are filled by
/// [`EditorConfig::with_defaults`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub max_depth: usize,
    pub link_target: String,
    pub autoformat: bool,
    pub linkify: bool,
    pub max_normalize_iterations: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            link_target: String::new(),
            autoformat: true,
            linkify: true,
            max_normalize_iterations: 0,
        }
    }
}

impl EditorConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.max_depth == 0 {
            self.max_depth = DEFAULT_MAX_DEPTH;
        }
        if self.link_target.is_empty() {
            self.link_target = DEFAULT_LINK_TARGET.to_string();
        }
        if self.max_normalize_iterations == 0 {
            self.max_normalize_iterations = 100;
        }
        self
    }

    pub fn from_json_str(json: &str) -> EditorResult<Self> {
        let config: EditorConfig = serde_json::from_str(json).map_err(EditorError::Config)?;
        Ok(config.with_defaults())
    }
}
