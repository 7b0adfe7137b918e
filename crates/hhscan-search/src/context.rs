use std::collections::HashSet;

/// Place ids already handled in this run. Only ever grows.
#[derive(Debug, Default, Clone)]
pub struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the set with ids persisted by earlier runs.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Records `id`, returning `true` if it had not been seen before.
    pub fn mark(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Paid provider calls issued so far, bumped before each call goes out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Credits {
    pub search_calls: u64,
    pub detail_calls: u64,
}

/// Mutable state threaded through one search run.
#[derive(Debug, Default)]
pub struct RunContext {
    pub seen: SeenSet,
    pub credits: Credits,
}

impl RunContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_seen(seen: SeenSet) -> Self {
        Self {
            seen,
            credits: Credits::default(),
        }
    }
}
