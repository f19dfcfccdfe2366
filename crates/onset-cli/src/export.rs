//! `onset export`: batch collection, retry, optional enrichment, and the
//! gated file write.
//!
//! Page failures during collection are reported, not fatal. The file is only
//! written once no failed pages remain; otherwise the command exits with an
//! error listing them.

use onset_apollo::{ApolloClient, BatchProgress, BatchRun, BatchSummary, PageFetcher};
use onset_core::{batch_csv, batch_filename, enriched_table_csv, AppConfig, SearchFilters};
use onset_enrich::{EnrichEvent, Enricher, LocationInferenceClient};

use crate::search::write_export;
use crate::ExportFormat;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ExportPlan {
    pub from: u32,
    /// `None` collects until a page comes back empty.
    pub to: Option<u32>,
    pub retry: bool,
    pub format: ExportFormat,
    pub enrich: bool,
}

pub(crate) async fn run_export(
    config: &AppConfig,
    filters: SearchFilters,
    plan: &ExportPlan,
) -> anyhow::Result<()> {
    let client = ApolloClient::from_config(config)?;
    let mut batch = BatchRun::new(client, filters);

    collect(&mut batch, plan).await?;
    print_summary(&batch.summary());

    if plan.retry && batch.progress().has_failures() {
        println!(
            "reprocessing failed pages: {}",
            format_pages(&batch.progress().failed_pages())
        );
        let still_failing = batch.reprocess_failed_pages(report_progress).await;
        if still_failing.is_empty() {
            println!("all failed pages recovered");
        } else {
            println!("pages still failing: {}", format_pages(&still_failing));
        }
    }

    let mut snapshot = batch.snapshot()?;
    if let Err(e) = snapshot.ensure_exportable() {
        tracing::warn!(run_id = %batch.run_id(), error = %e, "export blocked");
        return Err(e.into());
    }

    if plan.enrich {
        let lookup = LocationInferenceClient::from_config(config)?;
        let mut enricher = Enricher::from_config(lookup, config);
        let stats = enricher
            .enrich(&mut snapshot.records, report_enrich_event)
            .await;
        println!(
            "location lookup: {} attempted, {} enriched, {} failed",
            stats.attempted, stats.enriched, stats.failed
        );
    }

    let bytes = match plan.format {
        ExportFormat::Display => batch_csv(&snapshot)?,
        ExportFormat::Table => enriched_table_csv(&snapshot)?,
    };
    let filename = batch_filename(
        snapshot.page_from,
        snapshot.page_to,
        chrono::Local::now().date_naive(),
    );
    let path = write_export(&config.export_dir, &filename, &bytes)?;
    batch.mark_exported()?;

    println!(
        "exported {} companies from pages {}-{} to {}",
        snapshot.records.len(),
        snapshot.page_from,
        snapshot.page_to,
        path.display()
    );
    Ok(())
}

async fn collect<F: PageFetcher>(batch: &mut BatchRun<F>, plan: &ExportPlan) -> anyhow::Result<()> {
    let state = match plan.to {
        Some(to) => batch.collect_range(plan.from, to, report_progress).await?,
        None => batch.collect_all(plan.from, report_progress).await?,
    };
    tracing::info!(run_id = %batch.run_id(), state = %state, "collection finished");
    Ok(())
}

fn report_progress(progress: &BatchProgress) {
    eprintln!("  page {}/{}", progress.current(), progress.total());
}

fn report_enrich_event(event: EnrichEvent) {
    match event {
        EnrichEvent::Progress { current, total } => eprintln!("  location {current}/{total}"),
        EnrichEvent::RateLimited { cooldown } => println!(
            "location service rate limit reached; waiting {}s before resuming",
            cooldown.as_secs()
        ),
        EnrichEvent::Resumed => println!("location lookup resumed"),
    }
}

fn print_summary(summary: &BatchSummary) {
    println!("collected {} companies", summary.total_records);
    for (page, count) in &summary.page_counts {
        println!("  page {page}: {count}");
    }
    if let Some(total) = summary.reported_total_entries {
        println!("search reports {total} matching companies");
    }
    if let Some(shortfall) = summary.shortfall {
        println!(
            "expected up to {} companies; {shortfall} fewer were returned",
            summary.expected_records
        );
    }
    if summary.has_duplicate_or_missing_ids {
        println!("warning: some companies have missing or repeated ids");
    }
    if !summary.failed_pages.is_empty() {
        println!("failed pages: {}", format_pages(&summary.failed_pages));
    }
}

pub(crate) fn format_pages(pages: &[u32]) -> String {
    pages
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
