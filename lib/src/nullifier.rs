//! In-memory nullifier set.

use ark_bn254::Fr;
use async_trait::async_trait;
use dashmap::DashSet;

use crate::error::CapabilityError;
use crate::traits::NullifierStore;

/// Nullifier set held in process memory. Entries are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryNullifierStore {
    seen: DashSet<(Fr, Fr)>,
}

impl InMemoryNullifierStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn contains(&self, scope: Fr, nullifier: Fr) -> bool {
        self.seen.contains(&(scope, nullifier))
    }
}

#[async_trait]
impl NullifierStore for InMemoryNullifierStore {
    async fn check_and_insert(&self, scope: Fr, nullifier: Fr) -> Result<bool, CapabilityError> {
        Ok(self.seen.insert((scope, nullifier)))
    }
}
