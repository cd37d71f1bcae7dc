use crate::particle::Particle;
use crate::sprite::Surface;
use thiserror::Error;

/// Error types for particle array access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Particle index {index} is out of bounds for an array of {len} particles")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Ordered collection of particles. Insertion order is draw order.
#[derive(Debug, Clone, Default)]
pub struct ParticleArray {
    particles: Vec<Particle>,
}

impl ParticleArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Removes and returns the most recently added particle.
    pub fn remove_last(&mut self) -> Result<Particle, PoolError> {
        self.particles.pop().ok_or(PoolError::IndexOutOfBounds { index: 0, len: 0 })
    }

    /// Removes the particle at `index`, shifting later particles down.
    pub fn remove(&mut self, index: usize) -> Result<Particle, PoolError> {
        if index >= self.particles.len() {
            return Err(PoolError::IndexOutOfBounds {
                index,
                len: self.particles.len(),
            });
        }
        Ok(self.particles.remove(index))
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        for particle in &self.particles {
            particle.draw(surface);
        }
    }

    pub fn update(&mut self) {
        for particle in &mut self.particles {
            particle.update();
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }
}

impl<'a> IntoIterator for &'a ParticleArray {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut ParticleArray {
    type Item = &'a mut Particle;
    type IntoIter = std::slice::IterMut<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl FromIterator<Particle> for ParticleArray {
    fn from_iter<I: IntoIterator<Item = Particle>>(iter: I) -> Self {
        Self {
            particles: iter.into_iter().collect(),
        }
    }
}
