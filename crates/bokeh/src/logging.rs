//! File logging, enabled through the `BOKEH_LOG` environment variable.
//!
//! The terminal belongs to the UI, so records go to `bokeh.log` in the
//! platform cache directory instead of stderr.

use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use color_eyre::eyre::eyre;
use directories::ProjectDirs;
use env_logger::{Builder, Target};

/// Environment variable holding the log filter, in `RUST_LOG` syntax.
pub const LOG_ENV: &str = "BOKEH_LOG";

const LOG_FILE: &str = "bokeh.log";

/// Install the logger if `BOKEH_LOG` is set. Returns the log file path.
pub fn init() -> color_eyre::Result<Option<PathBuf>> {
    let Ok(filter) = env::var(LOG_ENV) else {
        return Ok(None);
    };

    let dirs = ProjectDirs::from("", "", "bokeh")
        .ok_or_else(|| eyre!("no cache directory for the log file"))?;
    let dir = dirs.cache_dir();
    fs::create_dir_all(dir)?;

    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    Builder::new()
        .parse_filters(&filter)
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()?;

    Ok(Some(path))
}
