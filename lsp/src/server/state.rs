use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use ropey::Rope;
use rotoscope_core::{Engine, TraceIndex};
use tokio::task;
use tower_lsp::lsp_types::{MessageType, Url};
use tower_lsp::Client;
use tracing::{debug, info, warn};

use super::config::ServerConfig;

/// In-memory copy of an open Ruby document.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
}

/// Primary LSP server state shared across handlers.
pub(crate) struct RotoscopeLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DashMap<Url, Document>>,
    pub(crate) engine: Arc<Engine>,
    pub(crate) config: Mutex<ServerConfig>,
    pub(crate) workspace_root: Mutex<Option<PathBuf>>,
}

impl RotoscopeLanguageServer {
    pub(crate) fn new(client: Client) -> Self {
        Self::with_engine(client, Arc::new(Engine::new()))
    }

    pub(crate) fn with_engine(client: Client, engine: Arc<Engine>) -> Self {
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            engine,
            config: Mutex::new(ServerConfig::default()),
            workspace_root: Mutex::new(None),
        }
    }

    pub(crate) fn set_workspace_root(&self, root: Option<PathBuf>) {
        if let Ok(mut guard) = self.workspace_root.lock() {
            *guard = root;
        }
    }

    fn trace_path(&self) -> Option<PathBuf> {
        let root = self.workspace_root.lock().ok().and_then(|g| g.clone());
        self.current_config().resolve_trace_path(root.as_deref())
    }

    /// Rebuild the engine's index from the configured trace export.
    pub(crate) async fn reseed(&self) {
        let Some(path) = self.trace_path() else {
            warn!("no trace export configured and no workspace root; hover disabled");
            return;
        };
        self.reseed_from(path).await;
    }

    /// Load `path` on a blocking thread and install it unless a later reload
    /// started in the meantime. Hovers keep using the previous index until
    /// the new one is complete.
    pub(crate) async fn reseed_from(&self, path: PathBuf) {
        let generation = self.engine.begin_seed();
        let load_path = path.clone();
        let outcome = task::spawn_blocking(move || TraceIndex::load(&load_path)).await;

        match outcome {
            Ok(Ok((index, summary))) => {
                if !self.engine.replace_index_if_current(generation, index) {
                    debug!(path = %path.display(), "discarding trace load superseded by a newer one");
                    return;
                }
                let message = format!(
                    "Rotoscope: loaded {} calls at {} call sites from {}",
                    summary.rows,
                    summary.call_sites,
                    path.display()
                );
                info!("{}", message);
                if summary.skipped > 0 {
                    warn!(skipped = summary.skipped, "trace export contained malformed rows");
                }
                let _ = self.client.log_message(MessageType::INFO, message).await;
            }
            Ok(Err(err)) => {
                let message = format!("Rotoscope: {:#}", err);
                warn!("{}", message);
                let _ = self.client.log_message(MessageType::WARNING, message).await;
            }
            Err(err) => warn!("trace loader task failed: {}", err),
        }
    }
}
