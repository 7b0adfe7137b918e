//! Adaptive subdivision over a region.
//!
//! Cells are taken from an explicit stack, depth first. A cell whose coarse
//! search comes back at the page cap is assumed truncated: its results are
//! discarded and its four quadrants are pushed instead, until cells reach the
//! minimum size and are accepted as they are. Leaf results go through the
//! seen set and the admission filter before any detail call is spent.

use hhscan_core::{Bounds, Region, SearchSettings};
use hhscan_places::Candidate;

use crate::context::RunContext;
use crate::error::SearchError;
use crate::filter::{Admission, AdmissionFilter};
use crate::provider::SearchProvider;
use crate::sink::{BatchedSink, PlaceStore};

/// Counters describing one finished (or budget-stopped) run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub cells_searched: usize,
    pub cells_culled: usize,
    pub cells_subdivided: usize,
    pub leaf_cells: usize,
    /// Candidates returned by leaf cells, before dedup.
    pub leaf_candidates: usize,
    pub duplicates: usize,
    pub missing_id: usize,
    pub rejected_status: usize,
    pub rejected_tag: usize,
    pub admitted: usize,
    pub missing_detail: usize,
    pub details_buffered: usize,
    /// A call cap stopped the traversal early.
    pub budget_exhausted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

pub struct SearchEngine<'a, P> {
    provider: &'a P,
    region: &'a Region,
    settings: &'a SearchSettings,
    filter: AdmissionFilter,
}

impl<'a, P: SearchProvider> SearchEngine<'a, P> {
    #[must_use]
    pub fn new(provider: &'a P, region: &'a Region, settings: &'a SearchSettings) -> Self {
        Self {
            provider,
            region,
            settings,
            filter: AdmissionFilter::from_settings(settings),
        }
    }

    /// Searches the whole region, then flushes whatever is still buffered.
    ///
    /// Call counts land in `ctx.credits` as they happen, so they are accurate
    /// even when this returns an error.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Sink`] when a batch cannot be persisted. The
    /// failed batch stays buffered in `sink`.
    pub async fn run<S: PlaceStore>(
        &self,
        ctx: &mut RunContext,
        sink: &mut BatchedSink<S>,
    ) -> Result<RunOutcome, SearchError> {
        let mut outcome = RunOutcome::default();
        let mut pending = vec![self.region.bounds()];

        while let Some(cell) = pending.pop() {
            if !self.admits_cell(&cell) {
                outcome.cells_culled += 1;
                continue;
            }

            if budget_reached(self.settings.max_search_calls, ctx.credits.search_calls) {
                tracing::warn!(
                    search_calls = ctx.credits.search_calls,
                    "search call cap reached; stopping traversal"
                );
                outcome.budget_exhausted = true;
                break;
            }

            let center = cell.center();
            let radius_m = cell.covering_radius_m();
            ctx.credits.search_calls += 1;
            outcome.cells_searched += 1;
            let page = self.provider.search_near(center, radius_m).await;

            let saturated = page.returned >= self.settings.page_cap
                && cell.longer_side_m() > self.settings.min_cell_size_m;
            tracing::info!(
                cell = %cell,
                radius_m = radius_m.ceil(),
                results = page.returned,
                parsed = page.candidates.len(),
                decision = if saturated { "subdivide" } else { "leaf" },
                "searched cell"
            );

            if saturated {
                outcome.cells_subdivided += 1;
                // Reversed so the first quadrant (NW) is popped first.
                pending.extend(cell.quadrants().into_iter().rev());
                continue;
            }

            outcome.leaf_cells += 1;
            if self.process_leaf(&page.candidates, ctx, sink, &mut outcome).await? == Step::Stop {
                outcome.budget_exhausted = true;
                break;
            }
        }

        sink.flush().await?;

        tracing::info!(
            search_calls = ctx.credits.search_calls,
            detail_calls = ctx.credits.detail_calls,
            seen = ctx.seen.len(),
            saved = sink.rows_written(),
            budget_exhausted = outcome.budget_exhausted,
            "search run finished"
        );
        Ok(outcome)
    }

    /// Polygon cells must overlap the region by at least the configured fraction.
    fn admits_cell(&self, cell: &Bounds) -> bool {
        if matches!(self.region, Region::Rect(_)) {
            return true;
        }
        let overlap = self.region.overlap_fraction(cell);
        if overlap <= 0.0 || overlap < self.settings.area_overlap_min {
            tracing::info!(cell = %cell, overlap, decision = "culled", "skipping cell");
            return false;
        }
        true
    }

    async fn process_leaf<S: PlaceStore>(
        &self,
        candidates: &[Candidate],
        ctx: &mut RunContext,
        sink: &mut BatchedSink<S>,
        outcome: &mut RunOutcome,
    ) -> Result<Step, SearchError> {
        for candidate in candidates {
            outcome.leaf_candidates += 1;

            let Some(place_id) = candidate.place_id() else {
                outcome.missing_id += 1;
                tracing::warn!("candidate without an id; skipping");
                continue;
            };
            // Marked before filtering: a rejected or failed id is not retried this run.
            if !ctx.seen.mark(place_id) {
                outcome.duplicates += 1;
                continue;
            }

            match self.filter.check(candidate) {
                Admission::Admitted => {}
                Admission::WrongStatus => {
                    outcome.rejected_status += 1;
                    tracing::debug!(place_id, status = ?candidate.business_status, "status not admitted");
                    continue;
                }
                Admission::MissingTag => {
                    outcome.rejected_tag += 1;
                    tracing::debug!(place_id, "no matching secondary hours");
                    continue;
                }
            }

            if budget_reached(self.settings.max_detail_calls, ctx.credits.detail_calls) {
                tracing::warn!(
                    detail_calls = ctx.credits.detail_calls,
                    "detail call cap reached; stopping traversal"
                );
                return Ok(Step::Stop);
            }

            outcome.admitted += 1;
            ctx.credits.detail_calls += 1;
            let Some(detail) = self.provider.fetch_detail(place_id).await else {
                outcome.missing_detail += 1;
                continue;
            };

            tracing::info!(
                place_id,
                name = detail.display_name().unwrap_or("<unnamed>"),
                "saved place"
            );
            sink.accumulate(detail);
            outcome.details_buffered += 1;
            if sink.is_full() {
                sink.flush().await?;
            }
        }
        Ok(Step::Continue)
    }
}

fn budget_reached(cap: Option<u64>, used: u64) -> bool {
    cap.is_some_and(|cap| used >= cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_without_cap_is_never_reached() {
        assert!(!budget_reached(None, u64::MAX));
    }

    #[test]
    fn budget_is_reached_at_the_cap() {
        assert!(!budget_reached(Some(3), 2));
        assert!(budget_reached(Some(3), 3));
        assert!(budget_reached(Some(0), 0));
    }
}
