//! Core particle types: individual particles, ordered particle arrays,
//! shared sprites and the surface they are drawn onto.

pub mod array;
pub mod particle;
pub mod sprite;

pub use array::{ParticleArray, PoolError};
pub use particle::{Particle, StartHook, DEFAULT_GRAVITY};
pub use sprite::{Sprite, SpriteError, Surface};

// Re-exported so downstream crates share one vector type.
pub use glam::{IVec2, Vec2};
