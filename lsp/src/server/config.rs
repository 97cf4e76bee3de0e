use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tower_lsp::lsp_types::ConfigurationItem;
use tracing::{debug, warn};

use super::state::RotoscopeLanguageServer;

/// Client configuration section holding the server settings.
pub const CONFIG_SECTION: &str = "rotoscope";

/// Trace export looked up in the workspace root when no path is configured.
pub const DEFAULT_TRACE_FILE: &str = ".rotoscope";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub trace_path: Option<PathBuf>,
    pub show_caller: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            trace_path: None,
            show_caller: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RotoscopeConfigSection {
    #[serde(default)]
    path_to_rotoscope_export: Option<String>,
    #[serde(default)]
    hover: HoverConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct HoverConfig {
    #[serde(default)]
    show_caller: Option<bool>,
}

impl ServerConfig {
    /// Build a config from a settings object. Accepts either the section itself
    /// or an object wrapping it under `rotoscope`. Returns `None` when the value
    /// is not a settings object.
    pub fn from_settings(value: &Value) -> Option<Self> {
        let section = value.get(CONFIG_SECTION).unwrap_or(value);
        if !section.is_object() {
            return None;
        }
        let cfg: RotoscopeConfigSection = serde_json::from_value(section.clone()).ok()?;

        let defaults = ServerConfig::default();
        Some(ServerConfig {
            trace_path: cfg
                .path_to_rotoscope_export
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            show_caller: cfg.hover.show_caller.unwrap_or(defaults.show_caller),
        })
    }

    /// Trace export to load: the configured path (relative paths resolve
    /// against `root`), else `.rotoscope` in `root`.
    pub fn resolve_trace_path(&self, root: Option<&Path>) -> Option<PathBuf> {
        match (&self.trace_path, root) {
            (Some(path), _) if path.is_absolute() => Some(path.clone()),
            (Some(path), Some(root)) => Some(root.join(path)),
            (Some(path), None) => Some(path.clone()),
            (None, Some(root)) => Some(root.join(DEFAULT_TRACE_FILE)),
            (None, None) => None,
        }
    }
}

impl RotoscopeLanguageServer {
    /// Pull the `rotoscope` section from the client, then reload the trace.
    pub(crate) async fn load_config(&self) {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some(CONFIG_SECTION.to_string()),
        }];

        match self.client.configuration(items).await {
            Ok(values) => {
                if let Some(val) = values.into_iter().next() {
                    self.apply_settings(&val);
                }
            }
            Err(err) => debug!("client did not answer workspace/configuration: {}", err),
        }
        self.reseed().await;
    }

    /// Store settings pushed by the client. Values that are not settings
    /// objects (e.g. `null`) leave the current config untouched.
    pub(crate) fn apply_settings(&self, value: &Value) -> bool {
        let Some(config) = ServerConfig::from_settings(value) else {
            return false;
        };
        match self.config.lock() {
            Ok(mut guard) => {
                *guard = config;
                true
            }
            Err(_) => {
                warn!("server config lock poisoned; settings ignored");
                false
            }
        }
    }

    pub(crate) fn current_config(&self) -> ServerConfig {
        self.config.lock().map(|c| c.clone()).unwrap_or_default()
    }
}
