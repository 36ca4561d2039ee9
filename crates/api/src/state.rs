use std::sync::Arc;

use common::settings::Settings;
use repos::Repo;
use rollout::Resolver;

#[derive(Clone)]
pub struct AppState {
    pub repo: Repo,
    pub settings: Arc<Settings>,
    pub resolver: Resolver,
}
