use std::sync::Arc;

use tokio::sync::Mutex;

use crate::pipeline::{EtlPipeline, ExportSink};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<EtlPipeline>,
    pub sink: Arc<dyn ExportSink>,
    /// Serializes pipeline runs; the layers are rebuilt in place
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(pipeline: EtlPipeline, sink: Arc<dyn ExportSink>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            sink,
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}
