//! 配置解析：命令行显式值 > 环境变量 > TOML 配置文件
use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, SqlrunError};

pub const PROJECT_ENV: &str = "GCP_PROJECT_ID";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// TOML 配置文件结构（所有字段可选）
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// 从 TOML 文件加载配置
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let txt = std::fs::read_to_string(path)
        .map_err(|source| SqlrunError::Io { path: path.to_path_buf(), source })?;
    toml::from_str(&txt).map_err(|e| SqlrunError::Config { path: path.to_path_buf(), message: e.to_string() })
}

/// 命令行传入的显式值
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

/// 解析后的设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
}

impl Settings {
    /// 使用进程环境变量解析
    pub fn from_env(overrides: &Overrides, file: Option<&ConfigFile>) -> Self {
        Self::resolve_with(overrides, file, |key| std::env::var(key).ok())
    }

    /// 按优先级逐项解析；空字符串视为未设置
    pub fn resolve_with<F>(overrides: &Overrides, file: Option<&ConfigFile>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: &Option<String>, key: Option<&str>, from_file: Option<&String>| {
            non_empty(explicit.clone())
                .or_else(|| key.and_then(|k| non_empty(env(k))))
                .or_else(|| non_empty(from_file.cloned()))
        };
        Self {
            project_id: pick(&overrides.project_id, Some(PROJECT_ENV), file.and_then(|f| f.project_id.as_ref())),
            api_key: pick(&overrides.api_key, Some(API_KEY_ENV), file.and_then(|f| f.api_key.as_ref())),
            model: pick(&overrides.model, None, file.and_then(|f| f.model.as_ref()))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn require_project(&self) -> Result<&str> {
        self.project_id.as_deref().ok_or(SqlrunError::MissingProject)
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(SqlrunError::MissingApiKey)
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}
