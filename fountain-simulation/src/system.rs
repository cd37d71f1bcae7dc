//! The particle system: a fixed pool of particles, a staggered spawn
//! schedule, and age-based recycling.

use crate::area::Area;
use crate::settings::{PauseState, SystemError, SystemSettings};
use fountain_core::{Particle, ParticleArray, Sprite, StartHook, Surface};
use glam::{IVec2, Vec2};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::Arc;

/// Global kinematic parameters handed to particles between life cycles.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Kinematics {
    gravity: Vec2,
    speed: Vec2,
    gravity_effect: f32,
}

impl Kinematics {
    fn apply(&self, particle: &mut Particle) {
        particle.set_gravity(self.gravity);
        particle.set_velocity(self.speed);
        particle.set_gravity_effect(self.gravity_effect);
    }
}

/// A single emitter with a fixed pool of `N` particles.
///
/// Particles are started one at a time, every `lifetime / N` seconds, so the
/// whole pool comes alive over the course of one lifetime. From then on each
/// particle is recycled in place the frame it reaches `lifetime` seconds of
/// age: it gets a fresh position in the spawn area and starts over.
///
/// Changes to the global kinematics (gravity, speed, gravity effect, spawn
/// position) only reach particles that are currently hidden. Live particles
/// keep what they were launched with until they are recycled.
///
/// The random source is owned by the system; use [`ParticleSystem::seeded`]
/// or [`ParticleSystem::with_rng`] for reproducible runs.
pub struct ParticleSystem<R = StdRng> {
    particles: ParticleArray,
    area: Area,
    fps: u32,
    lifetime: f32,
    lifetime_in_frames: u32,
    kinematics: Kinematics,
    frame_counter: u64,
    next_particle_index: usize,
    pause_state: PauseState,
    visible: bool,
    sprite: Option<Sprite>,
    rng: R,
}

impl ParticleSystem<StdRng> {
    /// Builds a system whose spawn positions come from an entropy-seeded RNG.
    pub fn new(area: Area, settings: SystemSettings) -> Result<Self, SystemError> {
        Self::with_rng(area, settings, StdRng::from_entropy())
    }

    /// Builds a system with a deterministic RNG.
    pub fn seeded(area: Area, settings: SystemSettings, seed: u64) -> Result<Self, SystemError> {
        Self::with_rng(area, settings, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ParticleSystem<R> {
    /// Builds a system drawing spawn positions from `rng`.
    ///
    /// The pool is filled with `settings.particle_count` hidden, unstarted
    /// particles placed inside `area`.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::InvalidSettings`] if `settings` fail validation.
    pub fn with_rng(area: Area, settings: SystemSettings, rng: R) -> Result<Self, SystemError> {
        settings.validate()?;

        let kinematics = Kinematics {
            gravity: settings.gravity,
            speed: settings.start_speed,
            gravity_effect: settings.gravity_effect,
        };
        let mut system = Self {
            particles: ParticleArray::with_capacity(settings.particle_count),
            area,
            fps: settings.fps,
            lifetime: settings.lifetime,
            lifetime_in_frames: settings.lifetime_in_frames(),
            kinematics,
            frame_counter: 0,
            next_particle_index: 0,
            pause_state: settings.pause_state,
            visible: settings.visible,
            sprite: None,
            rng,
        };

        for _ in 0..settings.particle_count {
            let position = system.generate_position();
            system.particles.add(Particle::new(
                position,
                kinematics.gravity,
                kinematics.speed,
                kinematics.gravity_effect,
            ));
        }

        debug!(
            "Created particle system: {} particles, {} fps, lifetime {}s ({} frames), one spawn every {}s",
            settings.particle_count,
            settings.fps,
            settings.lifetime,
            system.lifetime_in_frames,
            settings.generation_interval()
        );
        Ok(system)
    }

    /// Advances the whole system by one frame.
    ///
    /// Does nothing while the system is [`PauseState::Stopped`].
    pub fn update(&mut self) {
        if self.pause_state == PauseState::Stopped {
            return;
        }

        for (index, particle) in self.particles.iter_mut().enumerate() {
            particle.update();

            if particle.age_in_frames() == self.lifetime_in_frames {
                let position = self.area.sample(&mut self.rng);
                particle.hide();
                self.kinematics.apply(particle);
                particle.reset(position);
                trace!("Recycled particle {} at ({}, {})", index, position.x, position.y);
            }
        }

        self.frame_counter += 1;
        self.start_due_particles();
    }

    /// Starts every particle whose slot in the staggered schedule has come up.
    ///
    /// The cursor walks the pool once; when it wraps back onto a particle
    /// that has already been started, the schedule is finished and
    /// recycling takes over.
    fn start_due_particles(&mut self) {
        loop {
            let index = self.next_particle_index;
            let due = self.frame_counter as f64 >= self.spawn_threshold(index);
            let particle = match self.particles.get_mut(index) {
                Some(particle) if due && !particle.is_started() => particle,
                _ => break,
            };

            particle.start();
            trace!("Started particle {} on frame {}", index, self.frame_counter);
            self.next_particle_index = (index + 1) % self.particles.len();
        }
    }

    /// Frame count at which the particle at `index` is started, i.e.
    /// `generation_interval_in_frames * (index + 1)`.
    fn spawn_threshold(&self, index: usize) -> f64 {
        f64::from(self.lifetime_in_frames) * (index + 1) as f64 / self.particles.len() as f64
    }

    /// Uniformly samples a spawn position inside the current area.
    pub fn generate_position(&mut self) -> Vec2 {
        self.area.sample(&mut self.rng)
    }

    /// Pushes the current spawn area and kinematics onto every hidden particle.
    ///
    /// Visible particles are left untouched.
    pub fn sync_inactive_particles(&mut self) {
        let mut synced = 0usize;
        for particle in self.particles.iter_mut().filter(|p| !p.is_visible()) {
            particle.set_position(self.area.sample(&mut self.rng));
            self.kinematics.apply(particle);
            synced += 1;
        }
        trace!("Synced {} inactive particles", synced);
    }

    /// Moves the spawn area, typically to follow a pointer.
    pub fn set_position(&mut self, position: IVec2) {
        self.area.set_position(position);
        self.sync_inactive_particles();
    }

    pub fn set_size(&mut self, size: IVec2) {
        self.area.set_size(size);
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.kinematics.gravity = gravity;
        self.sync_inactive_particles();
    }

    pub fn set_speed(&mut self, speed: Vec2) {
        self.kinematics.speed = speed;
        self.sync_inactive_particles();
    }

    pub fn set_gravity_effect(&mut self, gravity_effect: f32) {
        self.kinematics.gravity_effect = gravity_effect;
        self.sync_inactive_particles();
    }

    pub fn reverse_gravity_x(&mut self) {
        let gravity = self.kinematics.gravity;
        self.set_gravity(Vec2::new(-gravity.x, gravity.y));
    }

    pub fn reverse_gravity_y(&mut self) {
        let gravity = self.kinematics.gravity;
        self.set_gravity(Vec2::new(gravity.x, -gravity.y));
    }

    pub fn reverse_speed_x(&mut self) {
        let speed = self.kinematics.speed;
        self.set_speed(Vec2::new(-speed.x, speed.y));
    }

    pub fn reverse_speed_y(&mut self) {
        let speed = self.kinematics.speed;
        self.set_speed(Vec2::new(speed.x, -speed.y));
    }

    /// Negates both axes of the speed and the gravity.
    pub fn reverse_all(&mut self) {
        let Kinematics { gravity, speed, .. } = self.kinematics;
        self.set_speed(-speed);
        self.set_gravity(-gravity);
    }
}

impl<R> ParticleSystem<R> {
    /// Decodes the image at `path` and hands it to every particle.
    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SystemError> {
        let sprite = Sprite::from_path(path)?;
        self.load_surface(sprite);
        Ok(())
    }

    /// Uses `sprite` for every particle, visible or not.
    pub fn load_surface(&mut self, sprite: Sprite) {
        for particle in self.particles.iter_mut() {
            particle.load_sprite(sprite.clone());
        }
        self.sprite = Some(sprite);
    }

    /// Installs `hook` as the start hook of every particle.
    pub fn on_start(&mut self, hook: StartHook) {
        for particle in self.particles.iter_mut() {
            particle.set_on_start(Arc::clone(&hook));
        }
    }

    /// Draws every visible particle, unless the whole system is hidden.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        if self.visible {
            self.particles.draw(surface);
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_pause_state(&mut self, pause_state: PauseState) {
        self.pause_state = pause_state;
    }

    pub fn pause_state(&self) -> PauseState {
        self.pause_state
    }

    pub fn sec_to_frames(&self, seconds: f32) -> f32 {
        seconds * self.fps as f32
    }

    pub fn frames_to_sec(&self, frames: f32) -> f32 {
        frames / self.fps as f32
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn gravity(&self) -> Vec2 {
        self.kinematics.gravity
    }

    pub fn speed(&self) -> Vec2 {
        self.kinematics.speed
    }

    pub fn gravity_effect(&self) -> f32 {
        self.kinematics.gravity_effect
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn lifetime_in_frames(&self) -> u32 {
        self.lifetime_in_frames
    }

    /// Seconds between two staggered spawns.
    pub fn generation_interval(&self) -> f32 {
        self.lifetime / self.particles.len() as f32
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn next_particle_index(&self) -> usize {
        self.next_particle_index
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    pub fn particles(&self) -> &ParticleArray {
        &self.particles
    }

    pub fn particle(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn started_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_started()).count()
    }

    pub fn visible_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_visible()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingSurface {
        blits: usize,
    }

    impl Surface for RecordingSurface {
        fn blit(&mut self, _sprite: &Sprite, _x: i32, _y: i32) {
            self.blits += 1;
        }
    }

    fn demo_area() -> Area {
        Area::new(IVec2::new(640, 360), IVec2::new(25, 25))
    }

    fn demo_settings() -> SystemSettings {
        SystemSettings::new(60, 200)
            .with_lifetime(1.0)
            .with_gravity(Vec2::new(0.0, 0.5))
            .with_start_speed(Vec2::new(5.0, -12.5))
            .with_gravity_effect(1.0)
    }

    fn run(system: &mut ParticleSystem, frames: usize) {
        for _ in 0..frames {
            system.update();
        }
    }

    #[test]
    fn pool_starts_hidden_and_inside_the_area() {
        let system = ParticleSystem::seeded(demo_area(), demo_settings(), 1).unwrap();
        assert_eq!(system.particle_count(), 200);
        assert_eq!(system.started_count(), 0);
        assert_eq!(system.visible_count(), 0);
        assert!(system.particles().iter().all(|p| system.area().contains(p.position())));
    }

    #[test]
    fn demo_scenario_starts_the_whole_pool_in_one_lifetime() {
        let mut system = ParticleSystem::seeded(demo_area(), demo_settings(), 42).unwrap();
        run(&mut system, 60);

        assert_eq!(system.started_count(), 200);
        assert_eq!(system.next_particle_index(), 0);
        assert_eq!(system.frame_counter(), 60);
    }

    #[test]
    fn staggered_spawn_starts_every_particle_exactly_once() {
        let cases = [(1, 1.0, 10), (3, 0.5, 30), (7, 2.0, 24), (200, 1.0, 60), (50, 0.25, 60), (13, 1.5, 50)];

        for (count, lifetime, fps) in cases {
            let settings = SystemSettings::new(fps, count).with_lifetime(lifetime);
            let lifetime_frames = settings.lifetime_in_frames() as usize;
            let mut system = ParticleSystem::seeded(demo_area(), settings, 9).unwrap();

            let starts = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&starts);
            system.on_start(Arc::new(move |_: &mut Particle| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

            run(&mut system, lifetime_frames - 1);
            assert!(system.started_count() < count, "case {:?} finished early", (count, lifetime, fps));

            system.update();
            assert_eq!(system.started_count(), count, "case {:?}", (count, lifetime, fps));
            assert_eq!(starts.load(Ordering::SeqCst), count, "case {:?}", (count, lifetime, fps));
            assert_eq!(system.next_particle_index(), 0);
        }
    }

    #[test]
    fn schedule_does_not_restart_particles_after_wrapping() {
        let settings = SystemSettings::new(10, 5).with_lifetime(1.0);
        let mut system = ParticleSystem::seeded(demo_area(), settings, 5).unwrap();
        let starts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&starts);
        system.on_start(Arc::new(move |_: &mut Particle| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        run(&mut system, 10);
        assert_eq!(starts.load(Ordering::SeqCst), 5);

        // Particle 0 started on frame 2, so it is recycled on frame 12; nothing
        // else fires the hook before then.
        system.update();
        assert_eq!(starts.load(Ordering::SeqCst), 5);
        assert_eq!(system.next_particle_index(), 0);
    }

    #[test]
    fn recycles_exactly_when_age_reaches_the_lifetime() {
        let settings = SystemSettings::new(10, 1).with_lifetime(1.0);
        let mut system = ParticleSystem::seeded(demo_area(), settings, 3).unwrap();

        // The single particle starts on frame 10.
        run(&mut system, 10);
        let particle = system.particle(0).unwrap();
        assert!(particle.is_started());
        assert_eq!(particle.age_in_frames(), 0);

        let mut ages = Vec::new();
        for _ in 0..25 {
            system.update();
            ages.push(system.particle(0).unwrap().age_in_frames());
        }

        // Age climbs to lifetime - 1, wraps to 0 instead of reaching 10, and never exceeds it.
        let expected: Vec<u32> = (1..10).chain(0..10).chain(0..6).collect();
        assert_eq!(ages, expected);
        assert!(ages.iter().all(|&age| age < system.lifetime_in_frames()));
    }

    #[test]
    fn recycled_particles_respawn_visible_inside_the_area() {
        let settings = SystemSettings::new(10, 4).with_lifetime(1.0).with_start_speed(Vec2::new(50.0, 50.0));
        let mut system = ParticleSystem::seeded(demo_area(), settings, 8).unwrap();
        run(&mut system, 10);

        for _ in 0..30 {
            system.update();
            for particle in system.particles() {
                if particle.age_in_frames() == 0 && particle.is_started() {
                    assert!(particle.is_visible());
                    assert!(system.area().contains(particle.position()));
                }
            }
        }
    }

    #[test]
    fn sync_only_touches_hidden_particles() {
        let settings = SystemSettings::new(10, 10).with_lifetime(1.0);
        let mut system = ParticleSystem::seeded(demo_area(), settings, 11).unwrap();
        run(&mut system, 5);
        assert_eq!(system.visible_count(), 5);

        let before: Vec<(Vec2, Vec2, Vec2)> = system
            .particles()
            .iter()
            .map(|p| (p.position(), p.gravity(), p.velocity()))
            .collect();

        let gravity = Vec2::new(0.25, -3.0);
        system.set_gravity(gravity);

        for (particle, (position, old_gravity, velocity)) in system.particles().iter().zip(before) {
            if particle.is_visible() {
                assert_eq!(particle.position(), position);
                assert_eq!(particle.gravity(), old_gravity);
                assert_eq!(particle.velocity(), velocity);
            } else {
                assert_eq!(particle.gravity(), gravity);
                assert!(system.area().contains(particle.position()));
            }
        }
    }

    #[test]
    fn moving_the_area_relocates_only_waiting_particles() {
        let settings = SystemSettings::new(10, 10).with_lifetime(1.0);
        let mut system = ParticleSystem::seeded(demo_area(), settings, 12).unwrap();
        run(&mut system, 3);

        system.set_position(IVec2::new(0, 0));
        for particle in system.particles() {
            let in_new_area = particle.position().cmple(Vec2::splat(25.0)).all();
            assert_eq!(in_new_area, !particle.is_visible());
        }
    }

    #[test]
    fn live_particles_adopt_new_kinematics_on_recycle() {
        let settings = SystemSettings::new(10, 1).with_lifetime(1.0).with_start_speed(Vec2::new(1.0, 0.0));
        let mut system = ParticleSystem::seeded(demo_area(), settings, 4).unwrap();
        run(&mut system, 11);
        assert!(system.particle(0).unwrap().is_visible());

        system.set_speed(Vec2::new(-2.0, 0.0));
        system.set_gravity_effect(0.0);
        assert_eq!(system.particle(0).unwrap().velocity(), Vec2::new(1.0, 0.0));

        run(&mut system, 9);
        let particle = system.particle(0).unwrap();
        assert_eq!(particle.age_in_frames(), 0);
        assert_eq!(particle.velocity(), Vec2::new(-2.0, 0.0));
        assert_eq!(particle.gravity_effect(), 0.0);
    }

    #[test]
    fn reverse_all_twice_is_the_identity() {
        let mut system = ParticleSystem::seeded(demo_area(), demo_settings(), 2).unwrap();
        let (gravity, speed) = (system.gravity(), system.speed());

        system.reverse_all();
        assert_eq!(system.gravity(), -gravity);
        assert_eq!(system.speed(), -speed);

        system.reverse_all();
        assert_eq!(system.gravity(), gravity);
        assert_eq!(system.speed(), speed);
    }

    #[test]
    fn single_axis_reversal() {
        let mut system = ParticleSystem::seeded(demo_area(), demo_settings(), 2).unwrap();
        system.reverse_gravity_y();
        assert_eq!(system.gravity(), Vec2::new(0.0, -0.5));
        system.reverse_gravity_x();
        assert_eq!(system.gravity(), Vec2::new(-0.0, -0.5));
        system.reverse_speed_x();
        system.reverse_speed_y();
        assert_eq!(system.speed(), Vec2::new(-5.0, 12.5));
        assert!(system.particles().iter().all(|p| p.velocity() == Vec2::new(-5.0, 12.5)));
    }

    #[test]
    fn stopped_system_ignores_updates() {
        let mut system = ParticleSystem::seeded(demo_area(), demo_settings(), 6).unwrap();
        run(&mut system, 30);

        system.set_pause_state(PauseState::Stopped);
        let snapshot: Vec<(Vec2, u32)> = system.particles().iter().map(|p| (p.position(), p.age_in_frames())).collect();
        let frame = system.frame_counter();

        run(&mut system, 100);
        let after: Vec<(Vec2, u32)> = system.particles().iter().map(|p| (p.position(), p.age_in_frames())).collect();
        assert_eq!(after, snapshot);
        assert_eq!(system.frame_counter(), frame);

        system.set_pause_state(PauseState::Running);
        system.update();
        assert_eq!(system.frame_counter(), frame + 1);
    }

    #[test]
    fn initially_stopped_system_never_starts_particles() {
        let settings = demo_settings().with_pause_state(PauseState::Stopped);
        let mut system = ParticleSystem::seeded(demo_area(), settings, 6).unwrap();
        run(&mut system, 120);
        assert_eq!(system.started_count(), 0);
        assert_eq!(system.frame_counter(), 0);
    }

    #[test]
    fn sprites_reach_every_particle_immediately() {
        let mut system = ParticleSystem::seeded(demo_area(), demo_settings(), 7).unwrap();
        run(&mut system, 10);

        let sprite = Sprite::solid(4, 4, [255, 150, 0, 255]);
        system.load_surface(sprite.clone());
        assert!(system.sprite().is_some_and(|s| s.ptr_eq(&sprite)));
        assert!(system.particles().iter().all(|p| p.sprite().is_some_and(|s| s.ptr_eq(&sprite))));
    }

    #[test]
    fn load_image_propagates_decode_errors() {
        let mut system = ParticleSystem::seeded(demo_area(), demo_settings(), 7).unwrap();
        let result = system.load_image("missing/spark.png");
        assert!(matches!(result, Err(SystemError::Sprite(_))));
        assert!(system.sprite().is_none());
    }

    #[test]
    fn draw_respects_system_and_particle_visibility() {
        let settings = SystemSettings::new(10, 10).with_lifetime(1.0);
        let mut system = ParticleSystem::seeded(demo_area(), settings, 13).unwrap();
        let mut surface = RecordingSurface::default();

        system.draw(&mut surface);
        assert_eq!(surface.blits, 0, "nothing is visible yet");

        run(&mut system, 4);
        system.draw(&mut surface);
        assert_eq!(surface.blits, 0, "no sprite loaded");

        system.load_surface(Sprite::solid(1, 1, [0, 0, 0, 255]));
        system.draw(&mut surface);
        assert_eq!(surface.blits, 4);

        system.hide();
        system.draw(&mut surface);
        assert_eq!(surface.blits, 4);
        system.show();
        assert!(system.is_visible());
    }

    #[test]
    fn seeded_systems_are_reproducible() {
        let mut a = ParticleSystem::seeded(demo_area(), demo_settings(), 99).unwrap();
        let mut b = ParticleSystem::seeded(demo_area(), demo_settings(), 99).unwrap();
        for frame in 0..150 {
            if frame % 7 == 0 {
                a.set_position(IVec2::new(frame, frame));
                b.set_position(IVec2::new(frame, frame));
            }
            a.update();
            b.update();
        }
        let positions = |s: &ParticleSystem| s.particles().iter().map(|p| p.position()).collect::<Vec<_>>();
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn accepts_any_rng() {
        let rng = rand::rngs::mock::StepRng::new(0, 1);
        let mut system = ParticleSystem::with_rng(demo_area(), SystemSettings::new(60, 3), rng).unwrap();
        system.update();
        assert!(system.particles().iter().all(|p| system.area().contains(p.position())));
    }

    #[test]
    fn rejects_invalid_settings() {
        let result = ParticleSystem::seeded(demo_area(), SystemSettings::new(60, 0), 0);
        assert!(matches!(result, Err(SystemError::InvalidSettings(_))));
    }

    #[test]
    fn time_conversions_use_the_frame_rate() {
        let system = ParticleSystem::seeded(demo_area(), demo_settings(), 0).unwrap();
        assert_eq!(system.sec_to_frames(0.5), 30.0);
        assert_eq!(system.frames_to_sec(90.0), 1.5);
        assert_eq!(system.generation_interval(), 1.0 / 200.0);
        assert_eq!(system.lifetime_in_frames(), 60);
    }
}
