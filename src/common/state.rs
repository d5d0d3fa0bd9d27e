// Application state shared across the auth surface

use reqwest::Client;
use std::sync::Arc;

use crate::auth::session::HandshakeStore;
use crate::auth::tokens::TokenService;
use crate::common::config::AuthConfig;
use crate::repository::AuthRepository;

/// Application state containing the credential store, token service, and
/// configuration.
///
/// Everything in here is either immutable after startup (`config`) or
/// internally synchronized (`repo`, `handshakes`), so the state is shared as
/// plain clones rather than behind a lock.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn AuthRepository>,
    pub config: Arc<AuthConfig>,
    pub tokens: TokenService,
    pub handshakes: HandshakeStore,
    pub http: Client,
}

impl AppState {
    pub fn new(repo: Arc<dyn AuthRepository>, config: AuthConfig) -> Self {
        let config = Arc::new(config);
        AppState {
            repo,
            tokens: TokenService::new(config.clone()),
            handshakes: HandshakeStore::new(),
            http: Client::new(),
            config,
        }
    }
}
