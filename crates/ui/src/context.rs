use std::sync::Arc;

use services::ResponseLoopService;
use survey_core::model::InstanceId;

pub trait UiApp: Send + Sync {
    /// Instance pinned at launch, offered as a shortcut on the start page.
    fn instance_id(&self) -> Option<InstanceId>;

    fn responses(&self) -> Arc<ResponseLoopService>;
}

#[derive(Clone)]
pub struct AppContext {
    instance_id: Option<InstanceId>,
    responses: Arc<ResponseLoopService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            instance_id: app.instance_id(),
            responses: app.responses(),
        }
    }

    #[must_use]
    pub fn instance_id(&self) -> Option<InstanceId> {
        self.instance_id
    }

    #[must_use]
    pub fn responses(&self) -> Arc<ResponseLoopService> {
        Arc::clone(&self.responses)
    }
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
