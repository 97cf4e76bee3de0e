use ropey::Rope;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::LanguageServer;
use tracing::{debug, info};

use super::{
    state::{Document, RotoscopeLanguageServer},
    text::apply_incremental_change_rope,
};

#[tower_lsp::async_trait]
impl LanguageServer for RotoscopeLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        #[allow(deprecated)]
        let root_uri = params.root_uri.clone().or_else(|| {
            params
                .workspace_folders
                .as_ref()
                .and_then(|folders| folders.first())
                .map(|folder| folder.uri.clone())
        });
        info!("Rotoscope Language Server initializing with root: {:?}", root_uri);
        self.set_workspace_root(root_uri.and_then(|uri| uri.to_file_path().ok()));

        if let Some(options) = params.initialization_options.as_ref() {
            self.apply_settings(options);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![".".to_string()]),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "Rotoscope Language Server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("Rotoscope Language Server initialized");
        let _ = self
            .client
            .log_message(MessageType::INFO, "Rotoscope Language Server started")
            .await;
        self.load_config().await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Rotoscope Language Server shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        // Settings pushed with the notification win; otherwise ask the client.
        if self.apply_settings(&params.settings) {
            self.reseed().await;
        } else {
            self.load_config().await;
        }
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let document = Document {
            content: Rope::from_str(&params.text_document.text),
            version: params.text_document.version,
        };
        self.documents.insert(uri, document);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let mut entry = self.documents.entry(uri.clone()).or_default();
        if params.text_document.version < entry.version {
            debug!("{} changed from version {} to older {}", uri, entry.version, params.text_document.version);
        }
        entry.version = params.text_document.version;
        for change in params.content_changes {
            apply_incremental_change_rope(&mut entry.content, &change);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.remove(&params.text_document.uri);
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        debug!("{} watched file change(s); reloading trace", params.changes.len());
        self.reseed().await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        Ok(self.get_hover_info(uri, position))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        Ok(Some(CompletionResponse::Array(self.get_completions(uri, position))))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rotoscope_core::Engine;
    use tower_lsp::LspService;

    use super::*;

    const TRACE: &str = "entity,method_name,method_level,filepath,lineno,caller_entity,caller_method_name,caller_method_level\n\
                         Dog,new,class,dog.rb,20,<ROOT>,,\n\
                         Dog,bark,instance,dog.rb,21,<ROOT>,,\n\
                         Noisemaker,speak,class,dog.rb,5,Dog,bark,instance\n";

    const SOURCE: &str = "require 'rotoscope'\n\nclass Dog\n  def bark\n    Noisemaker.speak('woof!')\n  end\nend\n";

    fn service() -> (LspService<RotoscopeLanguageServer>, Url) {
        let engine = Arc::new(Engine::new());
        engine.seed_from_reader(TRACE.as_bytes()).unwrap();
        let (service, _socket) = LspService::new(move |client| RotoscopeLanguageServer::with_engine(client, engine.clone()));
        (service, Url::parse("file:///work/example_project/dog.rb").unwrap())
    }

    fn hover_params(uri: &Url, line: u32, character: u32) -> HoverParams {
        HoverParams {
            text_document_position_params: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri: uri.clone() },
                position: Position::new(line, character),
            },
            work_done_progress_params: Default::default(),
        }
    }

    async fn open(server: &RotoscopeLanguageServer, uri: &Url, text: &str) {
        server
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: uri.clone(),
                    language_id: "ruby".to_string(),
                    version: 1,
                    text: text.to_string(),
                },
            })
            .await;
    }

    #[tokio::test]
    async fn test_hover_on_method_and_receiver() {
        let (service, uri) = service();
        let server = service.inner();
        open(server, &uri, SOURCE).await;

        let hover = server.hover(hover_params(&uri, 4, 17)).await.unwrap().expect("method hover");
        assert_eq!(
            hover.contents,
            HoverContents::Array(vec![MarkedString::String(
                "(method) `Noisemaker.speak`, called by: `Dog#bark`".to_string()
            )])
        );

        let hover = server.hover(hover_params(&uri, 4, 6)).await.unwrap().expect("receiver hover");
        assert_eq!(
            hover.contents,
            HoverContents::Array(vec![MarkedString::LanguageString(LanguageString {
                language: "ruby".to_string(),
                value: "class Noisemaker".to_string(),
            })])
        );
    }

    #[tokio::test]
    async fn test_hover_misses_are_none() {
        let (service, uri) = service();
        let server = service.inner();

        // document not open
        assert!(server.hover(hover_params(&uri, 4, 17)).await.unwrap().is_none());

        open(server, &uri, SOURCE).await;
        assert!(server.hover(hover_params(&uri, 2, 7)).await.unwrap().is_none());
        assert!(server.hover(hover_params(&uri, 99, 0)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hover_follows_incremental_edits() {
        let (service, uri) = service();
        let server = service.inner();
        open(server, &uri, SOURCE).await;

        server
            .did_change(DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier {
                    uri: uri.clone(),
                    version: 2,
                },
                content_changes: vec![TextDocumentContentChangeEvent {
                    range: Some(Range::new(Position::new(4, 4), Position::new(4, 4))),
                    range_length: None,
                    text: "::".to_string(),
                }],
            })
            .await;

        assert_eq!(server.documents.get(&uri).map(|d| d.version), Some(2));
        // `::Noisemaker.speak` shifts the method two columns right
        assert!(server.hover(hover_params(&uri, 4, 19)).await.unwrap().is_some());

        server
            .did_close(DidCloseTextDocumentParams {
                text_document: TextDocumentIdentifier { uri: uri.clone() },
            })
            .await;
        assert!(server.hover(hover_params(&uri, 4, 19)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_completion_lists_call_site_methods() {
        let (service, uri) = service();
        let server = service.inner();

        let response = server
            .completion(CompletionParams {
                text_document_position: TextDocumentPositionParams {
                    text_document: TextDocumentIdentifier { uri: uri.clone() },
                    position: Position::new(19, 9),
                },
                work_done_progress_params: Default::default(),
                partial_result_params: Default::default(),
                context: None,
            })
            .await
            .unwrap();

        match response {
            Some(CompletionResponse::Array(items)) => {
                let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
                assert_eq!(labels, vec!["new"]);
            }
            other => panic!("unexpected completion response {:?}", other),
        }
    }
}
