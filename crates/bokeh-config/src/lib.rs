//! Configuration for the bokeh backdrop.
//!
//! Settings live in `config.toml` under the platform configuration
//! directory. Every field has a default, so a missing file or a partial
//! file is always usable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bokeh_core::{Formation, Gradient, MotionTuning, Rgb};
use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the configuration inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Colors cycled through by the particles, in order.
pub const DEFAULT_PALETTE: [Rgb; 5] = [
    Rgb::new(0xa1, 0xbd, 0xff),
    Rgb::new(0x36, 0x5f, 0xa9),
    Rgb::new(0x73, 0x91, 0xb0),
    Rgb::new(0x62, 0x7d, 0xac),
    Rgb::new(0x78, 0x76, 0xa7),
];

/// Errors that can occur while reading or writing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The configuration could not be serialized
    #[error("could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No configuration directory exists for this platform
    #[error("configuration directory not found")]
    NoConfigDir,
}

/// User settings for the backdrop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of particles in the pool.
    pub particle_count: usize,
    /// Target frames per second of the render loop.
    pub frame_rate: u32,
    /// Identifier of the surface container.
    pub container: String,
    /// Surface height in logical units; the viewport height when unset.
    pub surface_height: Option<f32>,
    /// Fixed random seed, for reproducible runs.
    pub seed: Option<u64>,
    /// Layout the particles converge into.
    pub formation: Formation,
    /// Particle colors, assigned by creation order.
    pub palette: Vec<Rgb>,
    pub background: Gradient,
    pub motion: MotionTuning,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            particle_count: 100,
            frame_rate: 60,
            container: "stage".to_string(),
            surface_height: None,
            seed: None,
            formation: Formation::default(),
            palette: DEFAULT_PALETTE.to_vec(),
            background: Gradient::default(),
            motion: MotionTuning::default(),
        }
    }
}

impl Config {
    /// Default location of the configuration file, if the platform has one.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "bokeh").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults when the
    /// platform has no config directory or the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no configuration directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save to the default location and return the path written.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)?;
        info!("saved configuration to {}", path.display());
        Ok(())
    }
}
