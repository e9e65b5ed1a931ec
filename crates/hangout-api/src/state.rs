//! Application state shared by handlers.

use hangout_core::Config;
use hangout_processing::UploadService;
use hangout_storage::Store;
use hangout_worker::Dispatcher;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub dispatcher: Arc<Dispatcher>,
    pub uploads: UploadService,
}
