//
// backend.rs
//
// tower-lsp server wiring
//

use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use tower_lsp::LanguageServer;
use tower_lsp::LspService;
use tower_lsp::Server;

use crate::config::ScannerConfig;
use crate::handlers;
use crate::path::uri_to_path;
use crate::state::{QueryContext, WorldState};
use crate::symbols::SymbolsRecord;

pub struct Backend {
    client: Client,
    state: Arc<RwLock<WorldState>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(WorldState::new())),
        }
    }

    async fn query_context(&self, uri: &Url, position: Position) -> Option<QueryContext> {
        let state = self.state.read().await;
        state.query_context(uri, position)
    }

    /// Scan for a query. The state lock is not held while files are read.
    async fn scan(&self, ctx: &QueryContext) -> Option<Vec<Arc<SymbolsRecord>>> {
        match ctx
            .scanner
            .scan(ctx.root.as_deref(), Some(&ctx.current))
            .await
        {
            Ok(records) => Some(records),
            Err(err) => {
                self.report_scan_error(err).await;
                None
            }
        }
    }

    /// Scan errors only surface when `showErrors` is on.
    async fn report_scan_error(&self, err: anyhow::Error) {
        log::error!("Workspace scan failed: {:#}", err);
        self.client
            .show_message(MessageType::ERROR, format!("{:#}", err))
            .await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        log::info!("Initializing lessls");

        let mut state = self.state.write().await;

        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| folder.uri.clone())
            .or_else(|| params.root_uri.clone());
        if let Some(root) = root {
            log::info!("Using workspace root: {}", root);
            state.workspace_root = uri_to_path(&root);
        }

        if let Some(settings) = params
            .initialization_options
            .as_ref()
            .and_then(|options| options.get("settings"))
        {
            state.config = ScannerConfig::from_settings(settings);
        }

        drop(state);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        String::from("."),
                        String::from("#"),
                        String::from("@"),
                        String::from("{"),
                    ]),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(vec![
                        String::from("("),
                        String::from(","),
                        String::from(";"),
                    ]),
                    ..Default::default()
                }),
                definition_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: String::from("lessls"),
                version: Some(String::from(env!("CARGO_PKG_VERSION"))),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        log::info!("lessls initialized");

        let (scanner, root) = {
            let state = self.state.read().await;
            (state.scanner(), state.workspace_root.clone())
        };

        let Some(root) = root else {
            log::info!("No workspace root; skipping initial scan");
            return;
        };

        if let Err(err) = scanner.scan(Some(&root), None).await {
            self.report_scan_error(err).await;
        }
    }

    async fn shutdown(&self) -> Result<()> {
        log::info!("lessls shutting down");
        self.state.read().await.cache.dispose();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        log::trace!("Opened {}", doc.uri);
        let mut state = self.state.write().await;
        state.open_document(doc.uri, &doc.text, Some(doc.version));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let mut state = self.state.write().await;
        for change in params.content_changes {
            state.apply_change(&uri, change);
        }
        if let Some(doc) = state.documents.get_mut(&uri) {
            doc.version = Some(params.text_document.version);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        log::trace!("Closed {}", params.text_document.uri);
        let mut state = self.state.write().await;
        state.close_document(&params.text_document.uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        log::trace!("Configuration changed");
        let config = ScannerConfig::from_settings(&params.settings);
        self.state.write().await.config = config;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let Some(ctx) = self
            .query_context(&position.text_document.uri, position.position)
            .await
        else {
            return Ok(None);
        };
        let Some(records) = self.scan(&ctx).await else {
            return Ok(None);
        };

        let list = handlers::completion(
            &ctx.current,
            ctx.position,
            &records,
            ctx.scanner.config(),
        );
        Ok(Some(CompletionResponse::List(list)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params;
        let Some(ctx) = self
            .query_context(&position.text_document.uri, position.position)
            .await
        else {
            return Ok(None);
        };
        let Some(records) = self.scan(&ctx).await else {
            return Ok(None);
        };

        Ok(handlers::hover(&ctx.current, &records))
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let position = params.text_document_position_params;
        let Some(ctx) = self
            .query_context(&position.text_document.uri, position.position)
            .await
        else {
            return Ok(None);
        };
        let Some(records) = self.scan(&ctx).await else {
            return Ok(None);
        };

        Ok(handlers::signature_help(&ctx.current, &records))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params;
        let Some(ctx) = self
            .query_context(&position.text_document.uri, position.position)
            .await
        else {
            return Ok(None);
        };
        let Some(records) = self.scan(&ctx).await else {
            return Ok(None);
        };

        Ok(handlers::goto_definition(&ctx.current, &records).map(GotoDefinitionResponse::Scalar))
    }
}

pub async fn start_lsp() -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new).finish();
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
