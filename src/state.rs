use std::sync::Arc;

use crate::banner::RegistrationApi;
use crate::db::WatchStore;

#[derive(Clone)]
pub struct AppState {
    pub store: WatchStore,
    pub registration: Arc<dyn RegistrationApi>,
}
