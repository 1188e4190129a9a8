use std::sync::Arc;

use scour_engine::Engine;
use scour_store::{CrawlStore, ResultCache};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub store: Arc<dyn CrawlStore>,
    pub cache: Arc<dyn ResultCache>,
}
