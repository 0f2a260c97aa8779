mod bootstrap;

use anyhow::{Context, Result};
use cpuinfo_core::settings::Settings;
use cpuinfo_data::analysis::run;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("cpuinfo-parser v{} starting", env!("CARGO_PKG_VERSION"));

    let report = run(&settings)
        .with_context(|| format!("Failed to process {}", settings.input.display()))?;

    tracing::info!(
        "Done: {} loops, {} samples, {} ranks ({} unrecognised, {} orphan lines)",
        report.stats.loops,
        report.stats.samples,
        report.ranks,
        report.stats.unrecognized_lines,
        report.stats.orphan_lines
    );

    Ok(())
}
