use crate::config::AppConfig;
use crate::llm::CompletionApi;
use crate::media::{ImageApi, MediaLibrary, SpeechApi};
use crate::render::PdfRenderer;
use crate::session::SessionStore;
use crate::storage::ResourceStore;
use std::sync::Arc;

/// Everything the handlers share, injected as `web::Data<AppState>`.
/// Background jobs live in their own `web::Data<JobsState>`.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub completion: Arc<dyn CompletionApi>,
    pub images: Arc<dyn ImageApi>,
    pub speech: Arc<dyn SpeechApi>,
    pub store: ResourceStore,
    pub media: MediaLibrary,
    pub renderer: PdfRenderer,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        completion: Arc<dyn CompletionApi>,
        images: Arc<dyn ImageApi>,
        speech: Arc<dyn SpeechApi>,
    ) -> Self {
        Self {
            store: ResourceStore::new(&config.storage.database_path),
            media: MediaLibrary::new(&config.storage.resource_dir),
            renderer: PdfRenderer::from_config(&config.pdf),
            sessions: SessionStore::new(),
            config,
            completion,
            images,
            speech,
        }
    }

    /// `requested` when it is set and non-blank, the configured default otherwise.
    pub fn model_or_default(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.config.llm.model)
            .to_string()
    }
}
