use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// --- Error Type ---
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Unsupported config format '{0}', expected .json or .toml")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

// --- Configuration Sections ---

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CanvasSettings {
    #[serde(default = "default_canvas_width")]
    pub width: u32,
    #[serde(default = "default_canvas_height")]
    pub height: u32,
    #[serde(default = "default_background")]
    pub background: [u8; 4],
}

fn default_canvas_width() -> u32 { 1280 }
fn default_canvas_height() -> u32 { 720 }
fn default_background() -> [u8; 4] { [255, 255, 255, 255] }

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
            background: default_background(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AreaSettings {
    pub position: [i32; 2],
    #[serde(default = "default_area_size")]
    pub size: [i32; 2],
    #[serde(default = "default_area_color")]
    pub color: [u8; 4],
}

fn default_area_size() -> [i32; 2] { [25, 25] }
fn default_area_color() -> [u8; 4] { [0, 0, 150, 255] }

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct EmitterSettings {
    pub area: AreaSettings,
    pub particle_count: usize,
    /// Seconds a particle lives before it is recycled.
    #[serde(default = "default_lifetime")]
    pub lifetime: f32,
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 2],
    #[serde(default)]
    pub start_speed: [f32; 2],
    #[serde(default = "default_gravity_effect")]
    pub gravity_effect: f32,
    #[serde(default)]
    pub paused: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Fixed RNG seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_lifetime() -> f32 { 1.0 }
fn default_gravity() -> [f32; 2] { [0.0, 0.98] }
fn default_gravity_effect() -> f32 { 1.0 }
fn default_visible() -> bool { true }

/// Where the particle sprite comes from.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpriteSource {
    /// Decode an image file.
    File { path: PathBuf },
    /// A filled square generated in memory.
    Solid {
        #[serde(default = "default_sprite_size")]
        size: u32,
        #[serde(default = "default_sprite_color")]
        color: [u8; 4],
    },
}

fn default_sprite_size() -> u32 { 10 }
fn default_sprite_color() -> [u8; 4] { [255, 150, 0, 255] }

impl Default for SpriteSource {
    fn default() -> Self {
        SpriteSource::Solid {
            size: default_sprite_size(),
            color: default_sprite_color(),
        }
    }
}

/// Scripted pointer that moves the spawn area each frame.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerSettings {
    /// The area stays where the emitter config puts it.
    #[default]
    Fixed,
    /// The pointer circles `center` once every `period` seconds.
    Orbit {
        center: [i32; 2],
        radius: f32,
        period: f32,
    },
}

// --- Top-Level Config Struct ---

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub framerate: u32,
    #[serde(default)]
    pub canvas: CanvasSettings,
    pub emitter: EmitterSettings,
    #[serde(default)]
    pub sprite: SpriteSource,
    #[serde(default)]
    pub pointer: PointerSettings,
    /// Flip speed and gravity every frame.
    #[serde(default)]
    pub reverse_each_frame: bool,
    /// Paint the spawn area under the particles.
    #[serde(default)]
    pub show_area: bool,
    /// Stop after this many frames; run until interrupted when absent.
    #[serde(default)]
    pub frames: Option<u64>,
    /// Save the final canvas as a PNG here.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

// --- Loading Functions ---

/// Reads, parses and validates a configuration file.
///
/// The format is picked from the extension: `.json` or `.toml`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let content = fs::read_to_string(path)?;
    let config: Config = match extension.as_str() {
        "json" => serde_json::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.framerate == 0 {
        return Err(ConfigError::Validation("Framerate cannot be zero.".to_string()));
    }

    if config.canvas.width == 0 || config.canvas.height == 0 {
        return Err(ConfigError::Validation("Canvas dimensions must be positive.".to_string()));
    }

    let emitter = &config.emitter;
    if emitter.particle_count == 0 {
        return Err(ConfigError::Validation("Particle count must be greater than 0.".to_string()));
    }
    if !emitter.lifetime.is_finite() || emitter.lifetime <= 0.0 {
        return Err(ConfigError::Validation("Lifetime must be a positive number of seconds.".to_string()));
    }
    if emitter.area.size.iter().any(|&side| side < 0) {
        return Err(ConfigError::Validation("Area size cannot be negative.".to_string()));
    }

    if let SpriteSource::Solid { size: 0, .. } = config.sprite {
        return Err(ConfigError::Validation("Solid sprite size must be greater than 0.".to_string()));
    }

    if let PointerSettings::Orbit { radius, period, .. } = config.pointer {
        if !period.is_finite() || period <= 0.0 {
            return Err(ConfigError::Validation("Orbit period must be positive.".to_string()));
        }
        if !radius.is_finite() {
            return Err(ConfigError::Validation("Orbit radius must be finite.".to_string()));
        }
    }

    Ok(())
}
