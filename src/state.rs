use std::sync::Arc;

use crate::config::AuthSettings;
use crate::mail::Mailer;
use crate::store::SharedStore;

/// Everything a handler or gate needs, shared through `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub mailer: Arc<dyn Mailer>,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(store: SharedStore, mailer: Arc<dyn Mailer>, auth: AuthSettings) -> Self {
        Self {
            store,
            mailer,
            auth,
        }
    }
}
