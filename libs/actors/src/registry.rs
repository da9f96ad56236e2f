//! Actor Registry
//!
//! Arena of running actors indexed by local identity, together with the
//! identity counter. The owning [`crate::System`] guards it with a single
//! reader/writer lock; handles are cloned out so no reference to an entry
//! outlives the guard.

use crate::actor::ActorHandle;
use crate::address::LocalAddress;
use std::collections::HashMap;

pub(crate) struct ActorRegistry<M> {
    /// Last identity handed out; identities start at 1
    last_id: u64,
    actors: HashMap<LocalAddress, ActorHandle<M>>,
}

impl<M: Send + 'static> ActorRegistry<M> {
    pub(crate) fn new() -> Self {
        Self {
            last_id: 0,
            actors: HashMap::new(),
        }
    }

    /// Next local address; never reused, even after removal
    pub(crate) fn allocate(&mut self) -> LocalAddress {
        self.last_id += 1;
        LocalAddress::new(self.last_id)
    }

    pub(crate) fn insert(&mut self, handle: ActorHandle<M>) {
        tracing::trace!(actor = %handle.address(), "Registering actor");
        self.actors.insert(handle.address(), handle);
    }

    pub(crate) fn remove(&mut self, address: &LocalAddress) -> Option<ActorHandle<M>> {
        tracing::trace!(actor = %address, "Unregistering actor");
        self.actors.remove(address)
    }

    /// Clone of the handle registered under `address`
    pub(crate) fn get(&self, address: &LocalAddress) -> Option<ActorHandle<M>> {
        self.actors.get(address).cloned()
    }

    pub(crate) fn contains(&self, address: &LocalAddress) -> bool {
        self.actors.contains_key(address)
    }

    pub(crate) fn len(&self) -> usize {
        self.actors.len()
    }

    /// Registered addresses in spawn order
    pub(crate) fn addresses(&self) -> Vec<LocalAddress> {
        let mut addresses: Vec<_> = self.actors.keys().copied().collect();
        addresses.sort_unstable();
        addresses
    }
}
