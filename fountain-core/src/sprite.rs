//! Sprite handles and the drawing surface abstraction.
//!
//! A [`Sprite`] is a shared, immutable RGBA image. Cloning it only bumps a
//! reference count, so a single decoded image can back every particle of a pool.
//! Anything that can composite a sprite at integer coordinates implements
//! [`Surface`]; the crate ships an implementation for [`image::RgbaImage`].

use image::{ImageError, Rgba, RgbaImage};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Error types for sprite loading.
#[derive(Error, Debug)]
pub enum SpriteError {
    /// The file could not be read or is not a supported image format.
    #[error("Failed to decode sprite '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
}

/// Shared handle to an RGBA sprite image.
#[derive(Clone, Debug)]
pub struct Sprite(Arc<RgbaImage>);

impl Sprite {
    /// Decodes the image at `path` into a sprite.
    ///
    /// # Errors
    ///
    /// Returns [`SpriteError::Decode`] if the file is missing, unreadable or
    /// in a format the `image` crate cannot decode.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SpriteError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| SpriteError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();

        debug!(
            "Loaded sprite {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self(Arc::new(image)))
    }

    /// Wraps an in-memory image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self(Arc::new(image))
    }

    /// A `width` x `height` block filled with a single color.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::from_image(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.0
    }

    /// True when both handles point at the same decoded image.
    pub fn ptr_eq(&self, other: &Sprite) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<RgbaImage> for Sprite {
    fn from(image: RgbaImage) -> Self {
        Self::from_image(image)
    }
}

/// A drawable target that sprites are composited onto.
pub trait Surface {
    /// Draws `sprite` with its top-left corner at (`x`, `y`).
    ///
    /// Parts of the sprite that fall outside the surface are clipped.
    fn blit(&mut self, sprite: &Sprite, x: i32, y: i32);
}

impl Surface for RgbaImage {
    fn blit(&mut self, sprite: &Sprite, x: i32, y: i32) {
        image::imageops::overlay(self, sprite.image(), i64::from(x), i64::from(y));
    }
}
