//! Single-emitter particle simulation built on `fountain-core`.
//!
//! A [`ParticleSystem`] owns a spawn [`Area`] and a fixed pool of particles.
//! Call [`ParticleSystem::update`] once per frame and
//! [`ParticleSystem::draw`] with any [`Surface`](fountain_core::Surface).

pub mod area;
pub mod settings;
pub mod system;

pub use area::{Area, DEFAULT_AREA_COLOR};
pub use settings::{PauseState, SystemError, SystemSettings};
pub use system::ParticleSystem;
