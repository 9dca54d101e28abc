use std::sync::Arc;

use bbgraph_types::settings::ForumSettings;
use bbgraph_types::store::ContentStore;

use crate::authz::Authorizer;

/// Collaborators every resolver works through. Cheap to clone, so blocking
/// work can take its own copy onto `spawn_blocking`.
#[derive(Clone)]
pub struct ForumContext {
    pub store: Arc<dyn ContentStore>,
    pub authorizer: Arc<dyn Authorizer>,
    pub settings: Arc<ForumSettings>,
}

impl ForumContext {
    pub fn new(
        store: Arc<dyn ContentStore>,
        authorizer: Arc<dyn Authorizer>,
        settings: ForumSettings,
    ) -> Self {
        Self {
            store,
            authorizer,
            settings: Arc::new(settings),
        }
    }
}
