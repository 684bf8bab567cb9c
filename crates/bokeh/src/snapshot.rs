//! Tabular snapshot of the particle pool, for export.

use std::path::{Path, PathBuf};

use bokeh_engine::{Engine, Particle};
use bokeh_export::{ExportError, Format, export_table};

/// Column headers of the snapshot table.
pub const HEADERS: [&str; 6] = ["id", "state", "x", "y", "alpha", "color"];

/// One row per particle, flattened in creation order.
pub fn cells(engine: &Engine) -> Vec<String> {
    engine.particles().iter().flat_map(row).collect()
}

fn row(particle: &Particle) -> [String; 6] {
    let position = particle.position();
    [
        particle.id().to_string(),
        particle.state().to_string(),
        format!("{:.1}", position.x),
        format!("{:.1}", position.y),
        format!("{:.3}", particle.alpha()),
        particle.color().to_string(),
    ]
}

/// Write the snapshot to `dir` in the given format.
pub fn export(engine: &Engine, dir: &Path, format: Format) -> Result<PathBuf, ExportError> {
    export_table(dir, &HEADERS, &cells(engine), format)
}
