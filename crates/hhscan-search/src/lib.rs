//! Adaptive spatial-subdivision search over a capped, paid places API.
//!
//! [`SearchEngine`] walks a [`Region`](hhscan_core::Region) cell by cell
//! through a [`SearchProvider`], filters candidates with an
//! [`AdmissionFilter`], and hands fetched details to a [`BatchedSink`].

pub mod context;
pub mod engine;
pub mod error;
pub mod filter;
pub mod provider;
pub mod sink;
pub mod snapshot;

pub use context::{Credits, RunContext, SeenSet};
pub use engine::{RunOutcome, SearchEngine};
pub use error::{SearchError, SinkError};
pub use filter::{Admission, AdmissionFilter};
pub use provider::SearchProvider;
pub use sink::{BatchedSink, FlushReport, PlaceStore};
pub use snapshot::write_snapshot;
