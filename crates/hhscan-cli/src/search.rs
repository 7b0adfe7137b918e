//! `search` command handlers.
//!
//! Both region kinds share one flow: settings are resolved and validated,
//! the region is loaded, and only then are the provider client and database
//! pool built. A run row in `search_runs` brackets the engine so call counts
//! are recorded whether the run succeeds or fails.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use hhscan_core::{AppConfig, Bounds, Region, SearchSettings};
use hhscan_db::RunTotals;
use hhscan_places::PlacesClient;
use hhscan_search::{BatchedSink, RunContext, RunOutcome, SearchEngine, SeenSet};

use crate::store::PgPlaceStore;

/// Sub-commands available under `search`.
#[derive(Debug, Subcommand)]
pub enum SearchCommands {
    /// Search an axis-aligned rectangle
    Rect {
        #[arg(long, allow_negative_numbers = true)]
        north: f64,
        #[arg(long, allow_negative_numbers = true)]
        east: f64,
        #[arg(long, allow_negative_numbers = true)]
        south: f64,
        #[arg(long, allow_negative_numbers = true)]
        west: f64,
        #[command(flatten)]
        opts: SearchOpts,
    },
    /// Search the polygons of a GeoJSON FeatureCollection
    Polygon {
        /// Path to a GeoJSON file with Polygon or MultiPolygon features
        geojson: PathBuf,
        #[command(flatten)]
        opts: SearchOpts,
    },
}

/// Per-run overrides of the configured search settings.
#[derive(Debug, Default, Clone, PartialEq, Args)]
pub struct SearchOpts {
    /// Result count at which a coarse search is treated as truncated
    #[arg(long)]
    pub page_cap: Option<usize>,
    /// Cells at or below this size (meters, longer side) are never split
    #[arg(long)]
    pub min_cell_size_m: Option<f64>,
    /// Minimum fraction of a cell that must overlap the polygon
    #[arg(long)]
    pub overlap_min: Option<f64>,
    /// Details buffered before each flush
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Skip places already stored by earlier runs
    #[arg(long)]
    pub resume: bool,
    /// Print the root cell and settings without calling the provider
    #[arg(long)]
    pub dry_run: bool,
}

impl SearchOpts {
    fn apply(&self, mut settings: SearchSettings) -> SearchSettings {
        if let Some(page_cap) = self.page_cap {
            settings.page_cap = page_cap;
        }
        if let Some(min_cell) = self.min_cell_size_m {
            settings.min_cell_size_m = min_cell;
        }
        if let Some(overlap) = self.overlap_min {
            settings.area_overlap_min = overlap;
        }
        if let Some(batch_size) = self.batch_size {
            settings.batch_size = batch_size;
        }
        settings
    }
}

/// Resolves the region and settings, then runs a search.
///
/// # Errors
///
/// Returns an error for an invalid region or setting before any provider
/// call, if the client or pool cannot be built, or if a batch cannot be
/// persisted. Run bookkeeping failures are logged, not propagated.
pub(crate) async fn run_search(config: &AppConfig, command: SearchCommands) -> anyhow::Result<()> {
    let (region, opts) = match command {
        SearchCommands::Rect {
            north,
            east,
            south,
            west,
            opts,
        } => (Region::Rect(Bounds::new(north, east, south, west)?), opts),
        SearchCommands::Polygon { geojson, opts } => (Region::from_geojson_file(&geojson)?, opts),
    };
    let settings = opts.apply(config.search.clone());
    settings.validate()?;

    if opts.dry_run {
        print_dry_run(&region, &settings);
        return Ok(());
    }

    let client = PlacesClient::with_base_url(
        &config.google_api_key,
        config.request_timeout_secs,
        &config.user_agent,
        &config.places_base_url,
    )
    .context("failed to build places client")?
    .with_included_types(settings.included_types.clone());

    let pool = crate::connect(config)
        .await
        .context("failed to connect to database")?;

    let seen = if opts.resume {
        let ids = hhscan_db::list_place_ids(&pool).await?;
        tracing::info!(count = ids.len(), "preloaded stored place ids");
        SeenSet::from_ids(ids)
    } else {
        SeenSet::new()
    };

    let region_bounds = serde_json::to_value(region.bounds())?;
    let run = hhscan_db::create_search_run(&pool, region.kind(), &region_bounds).await?;
    if let Err(err) = hhscan_db::start_search_run(&pool, run.id).await {
        fail_run_best_effort(&pool, run.id, &RunTotals::default(), format!("{err:#}")).await;
        return Err(err.into());
    }
    tracing::info!(run_id = run.id, region = %region.bounds(), kind = region.kind(), "search run started");

    let mut ctx = RunContext::with_seen(seen);
    let mut sink = BatchedSink::new(PgPlaceStore::new(pool.clone()), settings.batch_size)
        .with_snapshot(&config.snapshot_path);
    let engine = SearchEngine::new(&client, &region, &settings);
    let result = engine.run(&mut ctx, &mut sink).await;

    print_summary(&ctx, &sink, result.as_ref().ok());
    let totals = RunTotals {
        search_calls: to_i64(ctx.credits.search_calls),
        detail_calls: to_i64(ctx.credits.detail_calls),
        places_saved: to_i64(sink.rows_written()),
        budget_exhausted: result.as_ref().is_ok_and(|o| o.budget_exhausted),
    };

    match result {
        Ok(_) => {
            if let Err(err) = hhscan_db::complete_search_run(&pool, run.id, &totals).await {
                fail_run_best_effort(&pool, run.id, &totals, format!("{err:#}")).await;
                return Err(err.into());
            }
            Ok(())
        }
        Err(err) => {
            fail_run_best_effort(&pool, run.id, &totals, format!("{err:#}")).await;
            Err(err.into())
        }
    }
}

fn print_dry_run(region: &Region, settings: &SearchSettings) {
    let root = region.bounds();
    println!("dry-run: {} region, no provider calls made", region.kind());
    println!("root cell:      {root}");
    println!("center:         {:.6}, {:.6}", root.center().lat, root.center().lng);
    println!("radius (m):     {}", root.covering_radius_m().ceil());
    println!("longer side:    {:.0} m", root.longer_side_m());
    println!("page cap:       {}", settings.page_cap);
    println!("min cell (m):   {}", settings.min_cell_size_m);
    println!("overlap min:    {}", settings.area_overlap_min);
    println!("batch size:     {}", settings.batch_size);
    println!("included types: {}", settings.included_types.join(","));
    let statuses: Vec<&str> = settings.admitted_statuses.iter().map(|s| s.as_str()).collect();
    println!("statuses:       {}", statuses.join(","));
    if settings.require_secondary {
        println!("secondary tag:  {}", settings.target_secondary_hours);
    } else {
        println!("secondary tag:  (not required)");
    }
    println!("search cap:     {}", fmt_cap(settings.max_search_calls));
    println!("detail cap:     {}", fmt_cap(settings.max_detail_calls));
}

fn print_summary<S: hhscan_search::PlaceStore>(
    ctx: &RunContext,
    sink: &BatchedSink<S>,
    outcome: Option<&RunOutcome>,
) {
    println!("search calls:   {}", ctx.credits.search_calls);
    println!("detail calls:   {}", ctx.credits.detail_calls);
    println!("places saved:   {}", sink.rows_written());
    println!("seen ids:       {}", ctx.seen.len());
    println!("flushes:        {}", sink.flushes());
    match outcome {
        Some(outcome) => {
            println!(
                "cells:          {} searched, {} split, {} culled",
                outcome.cells_searched, outcome.cells_subdivided, outcome.cells_culled
            );
            if outcome.budget_exhausted {
                println!("stopped early:  call cap reached");
            }
        }
        None => println!("unsaved:        {} buffered", sink.buffered()),
    }
}

fn fmt_cap(cap: Option<u64>) -> String {
    cap.map_or_else(|| "none".to_string(), |c| c.to_string())
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

async fn fail_run_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    totals: &RunTotals,
    message: String,
) {
    if let Err(mark_err) = hhscan_db::fail_search_run(pool, run_id, totals, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark search run as failed"
        );
    }
}
