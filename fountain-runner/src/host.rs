//! The host loop: owns the canvas, feeds pointer input into the particle
//! system and draws it once per frame.

use crate::clock::FrameClock;
use crate::error::RunnerError;
use crate::pointer::Pointer;
use crossbeam_channel::Receiver;
use fountain_config::{Config, SpriteSource};
use fountain_core::{Sprite, Surface};
use fountain_simulation::{Area, ParticleSystem, PauseState, SystemSettings};
use glam::{IVec2, Vec2};
use image::{Rgba, RgbaImage};
use log::{debug, info};
use std::path::Path;

pub struct Host {
    system: ParticleSystem,
    canvas: RgbaImage,
    background: Rgba<u8>,
    pointer: Pointer,
    reverse_each_frame: bool,
    show_area: bool,
    frame: u64,
}

impl Host {
    pub fn from_config(config: &Config) -> Result<Self, RunnerError> {
        let emitter = &config.emitter;
        let area = Area::new(IVec2::from(emitter.area.position), IVec2::from(emitter.area.size))
            .with_color(emitter.area.color);

        let pause_state = if emitter.paused { PauseState::Stopped } else { PauseState::Running };
        let settings = SystemSettings::new(config.framerate, emitter.particle_count)
            .with_lifetime(emitter.lifetime)
            .with_gravity(Vec2::from(emitter.gravity))
            .with_start_speed(Vec2::from(emitter.start_speed))
            .with_gravity_effect(emitter.gravity_effect)
            .with_pause_state(pause_state)
            .with_visible(emitter.visible);

        let mut system = match emitter.seed {
            Some(seed) => ParticleSystem::seeded(area, settings, seed)?,
            None => ParticleSystem::new(area, settings)?,
        };

        match &config.sprite {
            SpriteSource::File { path } => {
                info!("Loading sprite from {}", path.display());
                system.load_image(path)?;
            }
            SpriteSource::Solid { size, color } => system.load_surface(Sprite::solid(*size, *size, *color)),
        }

        Ok(Self {
            system,
            canvas: RgbaImage::from_pixel(config.canvas.width, config.canvas.height, Rgba(config.canvas.background)),
            background: Rgba(config.canvas.background),
            pointer: Pointer::from_settings(&config.pointer, config.framerate),
            reverse_each_frame: config.reverse_each_frame,
            show_area: config.show_area,
            frame: 0,
        })
    }

    /// Processes input, advances the system and redraws the canvas.
    pub fn step(&mut self) {
        if let Some(position) = self.pointer.position(self.frame) {
            self.system.set_position(position);
        }
        if self.reverse_each_frame {
            self.system.reverse_all();
        }

        self.system.update();
        self.render();
        self.frame += 1;
    }

    fn render(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = self.background;
        }

        if self.show_area {
            let area = self.system.area();
            let (min, max) = (area.min(), area.max());
            let extent = (max - min + IVec2::ONE).as_uvec2();
            let overlay = Sprite::solid(extent.x, extent.y, area.color());
            self.canvas.blit(&overlay, min.x, min.y);
        }

        self.system.draw(&mut self.canvas);
    }

    /// Steps until `frames` have been run or a stop signal arrives.
    ///
    /// Returns the number of frames run so far.
    pub fn run(&mut self, clock: &mut FrameClock, frames: Option<u64>, stop: &Receiver<()>) -> u64 {
        let fps = u64::from(self.system.fps());

        while frames.map_or(true, |limit| self.frame < limit) {
            if stop.try_recv().is_ok() {
                info!("Stop requested, ending after frame {}", self.frame);
                break;
            }

            clock.begin_frame();
            self.step();
            clock.end_frame();

            if self.frame % fps == 0 {
                debug!(
                    "Frame {}: {}/{} particles visible, spawn cursor at {}",
                    self.frame,
                    self.system.visible_count(),
                    self.system.particle_count(),
                    self.system.next_particle_index()
                );
            }
        }

        self.frame
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<(), RunnerError> {
        self.canvas.save(path)?;
        info!("Saved frame {} to {}", self.frame, path.display());
        Ok(())
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }
}
