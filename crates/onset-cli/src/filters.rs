//! Search filter flags shared by `search` and `export`.

use clap::Args;

use onset_core::{load_presets, AppConfig, EmployeeRange, SearchFilters};

#[derive(Debug, Clone, Default, Args)]
pub(crate) struct FilterArgs {
    /// Start from a named preset; other filter flags override its fields
    #[arg(long)]
    pub preset: Option<String>,

    /// Company name contains
    #[arg(long)]
    pub company: Option<String>,

    /// Company location (defaults to Brasil)
    #[arg(long)]
    pub location: Option<String>,

    /// Employee range: all, 201,500, 501,1000, 1001,5000, 5001,10000 or 10001,50000
    #[arg(long, value_parser = parse_employee_range)]
    pub employees: Option<EmployeeRange>,

    /// Business area keyword
    #[arg(long)]
    pub area: Option<String>,
}

impl FilterArgs {
    /// Builds the filters for a run: preset (if any), then flag overrides,
    /// with the configured page size.
    pub(crate) fn resolve(&self, config: &AppConfig) -> anyhow::Result<SearchFilters> {
        let base = match &self.preset {
            Some(name) => {
                let presets = load_presets(&config.presets_path)?;
                let preset = presets.find(name).ok_or_else(|| {
                    anyhow::anyhow!(
                        "preset '{name}' not found in {}",
                        config.presets_path.display()
                    )
                })?;
                preset.to_filters(config.apollo_page_size)
            }
            None => SearchFilters {
                per_page: config.apollo_page_size,
                ..SearchFilters::default()
            },
        };
        Ok(self.apply_overrides(base))
    }

    pub(crate) fn apply_overrides(&self, mut filters: SearchFilters) -> SearchFilters {
        if let Some(company) = &self.company {
            filters.company_name.clone_from(company);
        }
        if let Some(location) = &self.location {
            filters.location.clone_from(location);
        }
        if let Some(range) = self.employees {
            filters.employee_range = range;
        }
        if let Some(area) = &self.area {
            filters.business_area.clone_from(area);
        }
        filters
    }
}

fn parse_employee_range(raw: &str) -> Result<EmployeeRange, String> {
    EmployeeRange::from_token(raw.trim()).ok_or_else(|| {
        let known: Vec<&str> = EmployeeRange::ALL.iter().map(|r| r.token()).collect();
        format!("unknown employee range \"{raw}\" (expected one of: {})", known.join(" | "))
    })
}
