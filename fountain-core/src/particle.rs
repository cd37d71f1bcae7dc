use crate::sprite::{Sprite, SpriteError, Surface};
use glam::Vec2;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Callback invoked every time a particle starts or begins a new life cycle.
///
/// The hook receives the particle itself, so it can restyle it (swap the
/// sprite, nudge its velocity) right before it becomes visible.
pub type StartHook = Arc<dyn Fn(&mut Particle) + Send + Sync>;

/// Gravity applied to particles that are not given one explicitly.
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, 0.98);

/// A single point-sprite with its own kinematic state.
///
/// A particle is inert until [`start`](Particle::start) is called; after that
/// every [`update`](Particle::update) advances it by one frame.
#[derive(Clone)]
pub struct Particle {
    position: Vec2,
    velocity: Vec2,
    gravity: Vec2,
    gravity_effect: f32,
    age_in_frames: u32,
    visible: bool,
    started: bool,
    sprite: Option<Sprite>,
    on_start: Option<StartHook>,
}

impl Particle {
    pub fn new(position: Vec2, gravity: Vec2, velocity: Vec2, gravity_effect: f32) -> Self {
        Self {
            position,
            velocity,
            gravity,
            gravity_effect,
            age_in_frames: 0,
            visible: false,
            started: false,
            sprite: None,
            on_start: None,
        }
    }

    /// Runs the start hook, then marks the particle started and visible.
    pub fn start(&mut self) {
        self.fire_on_start();
        self.started = true;
        self.show();
    }

    /// Begins a new life cycle at `position`.
    ///
    /// Runs the start hook, moves the particle, zeroes its age and shows it.
    /// The `started` flag is left as it is.
    pub fn reset(&mut self, position: Vec2) {
        self.fire_on_start();
        self.position = position;
        self.age_in_frames = 0;
        self.show();
    }

    fn fire_on_start(&mut self) {
        // Clone the handle so the hook may freely borrow `self` mutably.
        if let Some(hook) = self.on_start.clone() {
            hook(self);
        }
    }

    /// Installs the start hook, replacing any previous one.
    pub fn set_on_start(&mut self, hook: StartHook) {
        self.on_start = Some(hook);
    }

    pub fn clear_on_start(&mut self) {
        self.on_start = None;
    }

    pub fn has_on_start(&self) -> bool {
        self.on_start.is_some()
    }

    pub fn load_sprite(&mut self, sprite: Sprite) {
        self.sprite = Some(sprite);
    }

    /// Decodes the image at `path` and uses it as this particle's sprite.
    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SpriteError> {
        self.sprite = Some(Sprite::from_path(path)?);
        Ok(())
    }

    /// Blits the sprite at the truncated position. Hidden or sprite-less
    /// particles draw nothing.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        if !self.visible {
            return;
        }
        if let Some(sprite) = &self.sprite {
            surface.blit(sprite, self.position.x as i32, self.position.y as i32);
        }
    }

    /// Advances one frame.
    ///
    /// Gravity is scaled linearly by the current age, so the per-frame drift
    /// grows with every frame the particle has lived:
    /// `position += velocity + gravity * age * gravity_effect`.
    pub fn update(&mut self) {
        if !self.started {
            return;
        }

        let drift = self.gravity * self.age_in_frames as f32 * self.gravity_effect;
        self.position += self.velocity + drift;
        self.age_in_frames += 1;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    pub fn gravity_effect(&self) -> f32 {
        self.gravity_effect
    }

    pub fn set_gravity_effect(&mut self, gravity_effect: f32) {
        self.gravity_effect = gravity_effect;
    }

    pub fn age_in_frames(&self) -> u32 {
        self.age_in_frames
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(Vec2::ZERO, DEFAULT_GRAVITY, Vec2::ZERO, 1.0)
    }
}

impl fmt::Debug for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Particle")
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("gravity", &self.gravity)
            .field("gravity_effect", &self.gravity_effect)
            .field("age_in_frames", &self.age_in_frames)
            .field("visible", &self.visible)
            .field("started", &self.started)
            .field("has_sprite", &self.sprite.is_some())
            .field("has_on_start", &self.on_start.is_some())
            .finish()
    }
}
