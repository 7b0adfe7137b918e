//! Admission policy applied to coarse candidates before any paid detail fetch.

use hhscan_core::{BusinessStatus, SearchSettings};
use hhscan_places::Candidate;

/// Outcome of [`AdmissionFilter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Status missing or not in the admitted set.
    WrongStatus,
    /// No secondary-hours section carries the target tag.
    MissingTag,
}

#[derive(Debug, Clone)]
pub struct AdmissionFilter {
    admitted_statuses: Vec<BusinessStatus>,
    /// `None` disables the secondary-hours test.
    target_tag: Option<String>,
}

impl AdmissionFilter {
    #[must_use]
    pub fn new(admitted_statuses: Vec<BusinessStatus>, target_tag: Option<String>) -> Self {
        Self {
            admitted_statuses,
            target_tag,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &SearchSettings) -> Self {
        let target_tag = settings
            .require_secondary
            .then(|| settings.target_secondary_hours.clone());
        Self::new(settings.admitted_statuses.clone(), target_tag)
    }

    /// Status first, then the secondary-hours tag.
    #[must_use]
    pub fn check(&self, candidate: &Candidate) -> Admission {
        let status_ok = candidate
            .business_status
            .is_some_and(|s| self.admitted_statuses.contains(&s));
        if !status_ok {
            return Admission::WrongStatus;
        }
        match &self.target_tag {
            Some(tag) if !candidate.has_secondary_hours(tag) => Admission::MissingTag,
            _ => Admission::Admitted,
        }
    }
}
