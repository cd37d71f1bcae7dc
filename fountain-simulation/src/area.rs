use glam::{IVec2, Vec2};
use rand::Rng;

/// Color given to areas that don't specify one.
pub const DEFAULT_AREA_COLOR: [u8; 4] = [0, 0, 150, 255];

/// Axis-aligned rectangle that particles are spawned in.
///
/// Bounds are inclusive on both axes: an area at (10, 10) with size (25, 25)
/// spawns particles anywhere in `[10, 35] x [10, 35]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    position: IVec2,
    size: IVec2,
    color: [u8; 4],
}

impl Area {
    pub fn new(position: IVec2, size: IVec2) -> Self {
        Self {
            position,
            size,
            color: DEFAULT_AREA_COLOR,
        }
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn position(&self) -> IVec2 {
        self.position
    }

    pub fn size(&self) -> IVec2 {
        self.size
    }

    pub fn color(&self) -> [u8; 4] {
        self.color
    }

    /// Smallest corner, whatever the sign of the size.
    pub fn min(&self) -> IVec2 {
        self.position.min(self.position + self.size)
    }

    /// Largest corner, whatever the sign of the size.
    pub fn max(&self) -> IVec2 {
        self.position.max(self.position + self.size)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min().as_vec2(), self.max().as_vec2());
        point.cmpge(min).all() && point.cmple(max).all()
    }

    pub(crate) fn set_position(&mut self, position: IVec2) {
        self.position = position;
    }

    pub(crate) fn set_size(&mut self, size: IVec2) {
        self.size = size;
    }

    /// Uniformly samples an integer point inside the area.
    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let (min, max) = (self.min(), self.max());
        let x = rng.gen_range(min.x..=max.x);
        let y = rng.gen_range(min.y..=max.y);
        Vec2::new(x as f32, y as f32)
    }
}
