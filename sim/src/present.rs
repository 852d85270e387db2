//! Seams to the presentation layer. The window, renderer and texture storage
//! live behind these traits; the simulation only hands over rectangles and
//! handles.

use crate::error::SimResult;
use common::shapes::Rectangle;

/// Opaque id of a texture owned by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// A loaded texture and its pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: f32,
    pub height: f32,
}

pub trait TextureLoader {
    /// Fails with [`SimError::Texture`](crate::SimError::Texture) when the
    /// image cannot be read.
    fn load(&mut self, path: &str) -> SimResult<Texture>;

    /// Called with the texture of every entity the caller destroys.
    fn release(&mut self, _texture: Texture) {}
}

pub trait Canvas {
    /// Copies `texture` into `dest`, in world coordinates.
    fn draw(&mut self, dest: Rectangle, texture: TextureHandle);

    /// Debug outline of `rect`.
    fn outline(&mut self, rect: Rectangle);
}
