use onset_core::{load_presets, AppConfig};

/// Prints every preset in the configured presets file.
pub(crate) fn list_presets(config: &AppConfig) -> anyhow::Result<()> {
    let presets = load_presets(&config.presets_path)?;
    if presets.presets.is_empty() {
        println!("no presets defined in {}", config.presets_path.display());
        return Ok(());
    }

    for preset in &presets.presets {
        println!(
            "{:<20} company={:?} location={:?} employees={} area={:?}",
            preset.name,
            preset.company_name,
            preset.location,
            preset.employee_range,
            preset.business_area
        );
    }
    Ok(())
}
