use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::search::{EmployeeRange, SearchFilters};
use crate::ConfigError;

/// A named, reusable set of search criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPreset {
    pub name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub employee_range: EmployeeRange,
    #[serde(default)]
    pub business_area: String,
}

fn default_location() -> String {
    SearchFilters::default().location
}

impl SearchPreset {
    /// Filters for the first page of this preset.
    #[must_use]
    pub fn to_filters(&self, per_page: u32) -> SearchFilters {
        SearchFilters {
            company_name: self.company_name.clone(),
            location: self.location.clone(),
            employee_range: self.employee_range,
            business_area: self.business_area.clone(),
            page: 1,
            per_page,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PresetsFile {
    pub presets: Vec<SearchPreset>,
}

impl PresetsFile {
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&SearchPreset> {
        self.presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Load and validate search presets from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_presets(path: &Path) -> Result<PresetsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PresetsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_presets(&content)
}

fn parse_presets(content: &str) -> Result<PresetsFile, ConfigError> {
    let presets_file: PresetsFile =
        serde_yaml::from_str(content).map_err(ConfigError::PresetsFileParse)?;
    validate_presets(&presets_file)?;
    Ok(presets_file)
}

fn validate_presets(presets_file: &PresetsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for preset in &presets_file.presets {
        if preset.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "preset name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(preset.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate preset name: '{}'",
                preset.name
            )));
        }

        let has_criteria = [&preset.company_name, &preset.location, &preset.business_area]
            .iter()
            .any(|v| !v.trim().is_empty())
            || preset.employee_range != EmployeeRange::All;
        if !has_criteria {
            return Err(ConfigError::Validation(format!(
                "preset '{}' has no search criteria",
                preset.name
            )));
        }
    }

    Ok(())
}
