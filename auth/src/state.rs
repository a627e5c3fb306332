use std::sync::Arc;

use crate::services::auth::AccountService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
}

impl AppState {
    pub fn new(accounts: Arc<AccountService>) -> Self {
        Self { accounts }
    }
}
