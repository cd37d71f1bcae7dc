//! Scripted pointer input. Stands in for the mouse of a windowed host.

use fountain_config::PointerSettings;
use glam::{IVec2, Vec2};
use std::f32::consts::TAU;

#[derive(Debug, Clone, PartialEq)]
pub enum Pointer {
    /// No input; the spawn area stays put.
    Fixed,
    /// Circles `center` once every `period_frames` frames.
    Orbit {
        center: Vec2,
        radius: f32,
        period_frames: f32,
    },
}

impl Pointer {
    pub fn from_settings(settings: &PointerSettings, framerate: u32) -> Self {
        match settings {
            PointerSettings::Fixed => Pointer::Fixed,
            PointerSettings::Orbit { center, radius, period } => Pointer::Orbit {
                center: IVec2::from(*center).as_vec2(),
                radius: *radius,
                period_frames: period * framerate as f32,
            },
        }
    }

    /// Pointer coordinates for `frame`, if the pointer moves at all.
    pub fn position(&self, frame: u64) -> Option<IVec2> {
        match self {
            Pointer::Fixed => None,
            Pointer::Orbit { center, radius, period_frames } => {
                let phase = (frame as f64 % f64::from(*period_frames)) as f32 / period_frames;
                let angle = TAU * phase;
                let offset = Vec2::new(angle.cos(), angle.sin()) * *radius;
                Some((*center + offset).round().as_ivec2())
            }
        }
    }
}
