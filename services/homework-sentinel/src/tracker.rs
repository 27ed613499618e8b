//! In-memory record of the last status reported for each work

use std::collections::{HashMap, HashSet};

/// Last status successfully notified per identifier.
///
/// Lives only as long as the process; a restart reports every work again.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    last_notified: HashMap<String, String>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `status` differs from the last one reported for
    /// `identifier`, including when nothing has been reported yet.
    pub fn observe(&self, identifier: &str, status: &str) -> bool {
        self.last_notified
            .get(identifier)
            .is_none_or(|previous| previous != status)
    }

    /// Record that `status` was delivered for `identifier`
    pub fn commit(&mut self, identifier: &str, status: &str) {
        self.last_notified
            .insert(identifier.to_string(), status.to_string());
    }

    pub fn last_status(&self, identifier: &str) -> Option<&str> {
        self.last_notified.get(identifier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.last_notified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_notified.is_empty()
    }
}

/// Per-cycle guard against the API returning the same work twice.
///
/// The API lists the newest record first, so the first sighting of an
/// identifier in a batch is the one that counts.
#[derive(Debug, Default)]
pub struct BatchSeen {
    seen: HashSet<String>,
}

impl BatchSeen {
    /// Returns true the first time `identifier` is offered in this batch
    pub fn first_sighting(&mut self, identifier: &str) -> bool {
        self.seen.insert(identifier.to_string())
    }
}
