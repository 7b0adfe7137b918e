use chrono::{DateTime, Utc};
use clap::Subcommand;

/// Sub-commands available under `runs`.
#[derive(Debug, Subcommand)]
pub enum RunsCommands {
    /// List recent search runs, newest first
    List {
        /// Maximum number of runs to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

fn fmt_time(time: Option<DateTime<Utc>>) -> String {
    time.map_or_else(
        || "-".to_string(),
        |t| t.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Prints a table of the most recent search runs.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_runs_list(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = hhscan_db::list_search_runs(pool, limit).await?;

    if runs.is_empty() {
        println!("no search runs recorded; run `search rect` or `search polygon` first");
        return Ok(());
    }

    println!(
        "{:<7}{:<10}{:<11}{:<18}{:>8}{:>9}{:>8}  ERROR",
        "ID", "KIND", "STATUS", "STARTED", "SEARCH", "DETAIL", "SAVED"
    );
    for run in &runs {
        let status = if run.budget_exhausted {
            format!("{}*", run.status)
        } else {
            run.status.clone()
        };
        println!(
            "{:<7}{:<10}{:<11}{:<18}{:>8}{:>9}{:>8}  {}",
            run.id,
            run.region_kind,
            status,
            fmt_time(run.started_at),
            run.search_calls,
            run.detail_calls,
            run.places_saved,
            run.error_message.as_deref().unwrap_or("")
        );
    }
    if runs.iter().any(|r| r.budget_exhausted) {
        println!("* stopped early at a call cap");
    }

    Ok(())
}
