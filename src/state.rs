use std::sync::Arc;

use crate::auth::directory::DirectoryAuthenticator;
use crate::database::store::Store;
use crate::services::notify::Notifier;
use crate::services::tickets::TicketService;

/// Shared handler dependencies, constructed once in `main` and injected as
/// a request extension. No component reaches for a global store handle.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub directory: Arc<dyn DirectoryAuthenticator>,
    pub tickets: TicketService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        directory: Arc<dyn DirectoryAuthenticator>,
        notifier: Notifier,
    ) -> Self {
        Self {
            tickets: TicketService::new(store.clone(), notifier),
            store,
            directory,
        }
    }
}
