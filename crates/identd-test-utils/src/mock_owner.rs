//! Mock owners and owner directory for testing without a host relay.
//!
//! `MockOwner` scripts the addressing and identity an owner reports;
//! addressing is mutable at runtime so tests can simulate an outbound
//! connection coming up or going away mid-test.

use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use identd_core::{Owner, OwnerAddressing, OwnerDirectory, OwnerId};

/// Build an [`OwnerAddressing`] from textual addresses.
///
/// Panics on unparseable input; test-only convenience.
pub fn addressing(
    local_ip: &str,
    local_port: u16,
    remote_ip: &str,
    remote_port: u16,
) -> OwnerAddressing {
    OwnerAddressing {
        local_ip: local_ip.parse::<IpAddr>().unwrap(),
        local_port,
        remote_ip: remote_ip.parse::<IpAddr>().unwrap(),
        remote_port,
    }
}

/// A scripted owner for tests.
pub struct MockOwner {
    id: OwnerId,
    label: String,
    identity: String,
    addressing: Mutex<Option<OwnerAddressing>>,
}

impl MockOwner {
    /// Create an owner with no live addressing (outbound not yet connected).
    pub fn new(id: u64, label: &str, identity: &str) -> Arc<Self> {
        Arc::new(Self {
            id: OwnerId(id),
            label: label.to_string(),
            identity: identity.to_string(),
            addressing: Mutex::new(None),
        })
    }

    /// Create an owner that reports the given live addressing.
    pub fn connected(id: u64, label: &str, identity: &str, addr: OwnerAddressing) -> Arc<Self> {
        let owner = Self::new(id, label, identity);
        owner.set_addressing(Some(addr));
        owner
    }

    /// Replace the scripted addressing (None simulates disconnect).
    pub fn set_addressing(&self, addr: Option<OwnerAddressing>) {
        *self.addressing.lock().unwrap() = addr;
    }
}

impl Owner for MockOwner {
    fn id(&self) -> OwnerId {
        self.id
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn identity(&self) -> String {
        self.identity.clone()
    }

    fn addressing(&self) -> Option<OwnerAddressing> {
        *self.addressing.lock().unwrap()
    }
}

/// An in-memory owner directory with a fixed enumeration order.
///
/// Enumeration order is insertion order, which the fallback last-wins tests
/// rely on.
#[derive(Default)]
pub struct MockDirectory {
    owners: Mutex<Vec<Arc<dyn Owner>>>,
}

impl MockDirectory {
    /// Create an empty directory.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a directory pre-populated with the given owners.
    pub fn with_owners(owners: Vec<Arc<dyn Owner>>) -> Arc<Self> {
        Arc::new(Self {
            owners: Mutex::new(owners),
        })
    }

    /// Append an owner to the enumeration.
    pub fn push(&self, owner: Arc<dyn Owner>) {
        self.owners.lock().unwrap().push(owner);
    }

    /// Remove an owner from the enumeration.
    pub fn remove(&self, id: OwnerId) {
        self.owners.lock().unwrap().retain(|o| o.id() != id);
    }
}

impl OwnerDirectory for MockDirectory {
    fn owners(&self) -> Vec<Arc<dyn Owner>> {
        self.owners.lock().unwrap().clone()
    }
}
