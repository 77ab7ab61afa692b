use std::sync::Arc;

use banter_content::ContentPipeline;
use banter_store::Stores;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub stores: Stores,
    pub pipeline: ContentPipeline,
    pub session_secret: String,
}

impl AppStateInner {
    pub fn new(stores: Stores, session_secret: impl Into<String>) -> Self {
        Self {
            stores,
            pipeline: ContentPipeline::default(),
            session_secret: session_secret.into(),
        }
    }
}
