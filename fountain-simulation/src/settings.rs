use fountain_core::{SpriteError, DEFAULT_GRAVITY};
use glam::Vec2;
use thiserror::Error;

/// Error types for building and driving a particle system.
#[derive(Error, Debug)]
pub enum SystemError {
    #[error("Invalid particle system settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Sprite(#[from] SpriteError),
}

/// Whether [`ParticleSystem::update`](crate::ParticleSystem::update) does anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PauseState {
    /// Updates are ignored entirely.
    Stopped,
    #[default]
    Running,
}

/// Construction parameters for a [`ParticleSystem`](crate::ParticleSystem).
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSettings {
    pub fps: u32,
    pub particle_count: usize,
    /// Seconds each particle lives before it is recycled.
    pub lifetime: f32,
    pub gravity: Vec2,
    pub start_speed: Vec2,
    pub gravity_effect: f32,
    pub pause_state: PauseState,
    pub visible: bool,
}

impl SystemSettings {
    pub fn new(fps: u32, particle_count: usize) -> Self {
        Self {
            fps,
            particle_count,
            lifetime: 1.0,
            gravity: DEFAULT_GRAVITY,
            start_speed: Vec2::ZERO,
            gravity_effect: 1.0,
            pause_state: PauseState::Running,
            visible: true,
        }
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_start_speed(mut self, start_speed: Vec2) -> Self {
        self.start_speed = start_speed;
        self
    }

    pub fn with_gravity_effect(mut self, gravity_effect: f32) -> Self {
        self.gravity_effect = gravity_effect;
        self
    }

    pub fn with_pause_state(mut self, pause_state: PauseState) -> Self {
        self.pause_state = pause_state;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Lifetime converted to whole frames, rounded to the nearest frame.
    pub fn lifetime_in_frames(&self) -> u32 {
        (f64::from(self.lifetime) * f64::from(self.fps)).round() as u32
    }

    /// Seconds between two consecutive staggered spawns.
    pub fn generation_interval(&self) -> f32 {
        self.lifetime / self.particle_count as f32
    }

    pub fn validate(&self) -> Result<(), SystemError> {
        if self.fps == 0 {
            return Err(SystemError::InvalidSettings(
                "Frame rate must be greater than 0".to_string(),
            ));
        }
        if self.particle_count == 0 {
            return Err(SystemError::InvalidSettings(
                "Particle count must be greater than 0".to_string(),
            ));
        }
        if !self.lifetime.is_finite() || self.lifetime <= 0.0 {
            return Err(SystemError::InvalidSettings(format!(
                "Lifetime must be a positive number of seconds, got {}",
                self.lifetime
            )));
        }
        if self.lifetime_in_frames() == 0 {
            return Err(SystemError::InvalidSettings(format!(
                "Lifetime of {}s is shorter than one frame at {} fps",
                self.lifetime, self.fps
            )));
        }
        if !self.gravity.is_finite() || !self.start_speed.is_finite() || !self.gravity_effect.is_finite() {
            return Err(SystemError::InvalidSettings(
                "Gravity, start speed and gravity effect must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
