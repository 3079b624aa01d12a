//! Sprites: loaded images with a pivot point

use std::rc::Rc;

use super::surface::{Surface, SurfaceError};
use crate::sim::{Dimensions, Point};

/// Image load failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load image '{0}'")]
    Load(String),
}

/// A decoded image resource
#[derive(Debug, Clone)]
pub struct SpriteImage {
    uri: Rc<str>,
    size: Dimensions,
    #[cfg(target_arch = "wasm32")]
    element: Option<web_sys::HtmlImageElement>,
}

impl SpriteImage {
    /// Image with known intrinsic size and no backing element (headless)
    pub fn placeholder(uri: &str, size: Dimensions) -> Self {
        Self {
            uri: Rc::from(uri),
            size,
            #[cfg(target_arch = "wasm32")]
            element: None,
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_element(uri: &str, element: web_sys::HtmlImageElement) -> Self {
        let size = Dimensions::new(element.width() as f32, element.height() as f32);
        Self {
            uri: Rc::from(uri),
            size,
            element: Some(element),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn element(&self) -> Option<&web_sys::HtmlImageElement> {
        self.element.as_ref()
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn size(&self) -> Dimensions {
        self.size
    }
}

/// A drawable image handle
#[derive(Debug, Clone)]
pub struct Sprite {
    image: SpriteImage,
    /// Fraction of the bounds placed on the current origin
    pivot: Point,
}

impl Sprite {
    pub fn new(image: SpriteImage) -> Self {
        Self {
            image,
            pivot: Point::new(0.5, 0.5),
        }
    }

    pub fn with_pivot(mut self, pivot: Point) -> Self {
        self.pivot = pivot;
        self
    }

    pub fn image(&self) -> &SpriteImage {
        &self.image
    }

    /// Intrinsic image size
    pub fn bounds(&self) -> Dimensions {
        self.image.size()
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn pivot(&self) -> Point {
        self.pivot
    }

    /// Draw scaled by `scale` with the pivot on the current origin
    pub fn draw(&self, surface: &mut Surface, scale: f32) -> Result<(), SurfaceError> {
        let bounds = self.bounds();
        let scaled = Dimensions::new(bounds.width * scale, bounds.height * scale);
        surface.isolate(|surface| {
            surface.translate(-scaled.end().multiply_by(self.pivot.to_vector()));
            surface.draw_image(&self.image, scaled);
            Ok(())
        })
    }
}

/// Callback receiving a loaded sprite
pub type SpriteCallback = Box<dyn FnOnce(Sprite)>;

/// Asynchronous image source.
///
/// `load` returns immediately; `on_ready` runs once the image is available.
/// Failed loads never invoke the callback, and in-flight loads cannot be
/// cancelled.
pub trait SpriteLoader {
    fn load(&self, uri: &str, on_ready: SpriteCallback);
}

/// Loader that resolves synchronously with a fixed-size placeholder image
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderLoader {
    pub size: Dimensions,
}

impl Default for PlaceholderLoader {
    fn default() -> Self {
        Self {
            size: Dimensions::new(100.0, 100.0),
        }
    }
}

impl SpriteLoader for PlaceholderLoader {
    fn load(&self, uri: &str, on_ready: SpriteCallback) {
        on_ready(Sprite::new(SpriteImage::placeholder(uri, self.size)));
    }
}
