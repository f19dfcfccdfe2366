//! `onset search`: one page, filtered, sorted and printed.

use std::path::{Path, PathBuf};

use onset_apollo::ApolloClient;
use onset_core::{
    display_location, filter_by_industries, quick_csv, quick_filename, sort_companies, AppConfig,
    CompanyRecord, SearchFilters, SortKey,
};

pub(crate) async fn run_search(
    config: &AppConfig,
    filters: &SearchFilters,
    page: u32,
    industries: &[String],
    sort: SortKey,
    export: bool,
) -> anyhow::Result<()> {
    let client = ApolloClient::from_config(config)?;
    let result = client.search_companies(filters, page).await?;

    for crumb in &result.breadcrumbs {
        println!("filter: {} = {}", crumb.label, crumb.display_name);
    }

    let fetched = result.organizations.len();
    let mut companies = filter_by_industries(result.organizations, industries);
    sort_companies(&mut companies, sort);

    for company in &companies {
        println!("{}", format_row(company));
    }

    let pagination = result.pagination;
    println!(
        "page {} of {} ({} companies in total; showing {} of {} on this page)",
        page,
        pagination.total_pages,
        pagination.total_entries,
        companies.len(),
        fetched
    );

    if export {
        let bytes = quick_csv(&companies)?;
        let filename = quick_filename(chrono::Local::now().date_naive());
        let path = write_export(&config.export_dir, &filename, &bytes)?;
        println!("wrote {} companies to {}", companies.len(), path.display());
    }

    Ok(())
}

fn format_row(company: &CompanyRecord) -> String {
    format!(
        "{} | {} | {} | {} | {}",
        company.name(),
        company.industry().unwrap_or("-"),
        display_location(company),
        company
            .num_employees()
            .map_or_else(|| "-".to_string(), |n| n.to_string()),
        company.website_url().unwrap_or("-"),
    )
}

/// Writes an export file under `dir`, creating the directory if needed.
pub(crate) fn write_export(dir: &Path, filename: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "export written");
    Ok(path)
}
