use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::models::{User, Vehicle};
use crate::ports::Directory;

/// The importing user's vehicles, keyed by nickname. Matching is case-sensitive.
#[derive(Debug, Default)]
pub struct Fleet {
    by_nickname: HashMap<String, Vehicle>,
}

impl Fleet {
    /// Duplicate nicknames are not rejected; the last vehicle listed wins.
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        let by_nickname = vehicles
            .into_iter()
            .map(|v| (v.nickname.clone(), v))
            .collect();
        Self { by_nickname }
    }

    pub fn resolve(&self, nickname: &str) -> Option<&Vehicle> {
        self.by_nickname.get(nickname)
    }

    pub fn len(&self) -> usize {
        self.by_nickname.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_nickname.is_empty()
    }
}

/// Lookups loaded once per import, before any row is read.
#[derive(Debug)]
pub struct Resolver {
    pub user: User,
    pub fleet: Fleet,
}

impl Resolver {
    pub fn load(directory: &dyn Directory, user_id: &str) -> Result<Self> {
        let fleet = Fleet::new(directory.vehicles_for(user_id)?);
        let user = directory.user_profile(user_id)?;
        debug!(user = user_id, vehicles = fleet.len(), "loaded fleet and profile");
        Ok(Self { user, fleet })
    }

    pub fn vehicle(&self, nickname: &str) -> Option<&Vehicle> {
        self.fleet.resolve(nickname)
    }
}
