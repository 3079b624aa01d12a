//! Headless backend that records draw calls
//!
//! Used by the native binary and by tests to observe what a frame draws.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Affine2, Vec2};

use super::sprite::SpriteImage;
use super::surface::{Backend, TextAlign};
use crate::sim::{Color, Dimensions, Point, Vector2};

/// A recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Resize(Dimensions),
    Clear,
    Translate(Vector2),
    Rotate(f32),
    Fill(Color),
    Stroke(Color),
    StrokePath(Vec<Point>),
    FillPath(Vec<Point>),
    Circle { radius: f32, thickness: f32 },
    Line { to: Point, thickness: f32 },
    Text { text: String, font: String, align: TextAlign },
    Image { uri: String, size: Dimensions, opacity: f32 },
}

/// An image draw with the target-space position of its top-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub uri: String,
    pub size: Dimensions,
    pub origin: Point,
    pub opacity: f32,
}

#[derive(Debug, Default)]
struct Log {
    ops: Vec<DrawOp>,
    images: Vec<ImageRecord>,
}

/// Shared view of everything a [`RecordingBackend`] has drawn
#[derive(Debug, Clone, Default)]
pub struct Recording {
    log: Rc<RefCell<Log>>,
}

impl Recording {
    pub fn ops(&self) -> Vec<DrawOp> {
        self.log.borrow().ops.clone()
    }

    pub fn images(&self) -> Vec<ImageRecord> {
        self.log.borrow().images.clone()
    }

    /// Text strings drawn, in order
    pub fn texts(&self) -> Vec<String> {
        self.log
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Paths stroked, in order
    pub fn stroked_paths(&self) -> Vec<Vec<Point>> {
        self.log
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::StrokePath(points) => Some(points.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded so far
    pub fn reset(&self) {
        let mut log = self.log.borrow_mut();
        log.ops.clear();
        log.images.clear();
    }
}

/// Backend that draws nothing and remembers every call
#[derive(Debug, Default)]
pub struct RecordingBackend {
    recording: Recording,
    transform: Affine2,
}

impl RecordingBackend {
    pub fn new() -> (Self, Recording) {
        let recording = Recording::default();
        (
            Self {
                recording: recording.clone(),
                transform: Affine2::IDENTITY,
            },
            recording,
        )
    }

    fn push(&self, op: DrawOp) {
        self.recording.log.borrow_mut().ops.push(op);
    }
}

impl Backend for RecordingBackend {
    fn resize(&mut self, bounds: Dimensions) {
        // Resizing a canvas resets its transform
        self.transform = Affine2::IDENTITY;
        self.push(DrawOp::Resize(bounds));
    }

    fn clear(&mut self, _bounds: Dimensions) {
        self.push(DrawOp::Clear);
    }

    fn translate(&mut self, offset: Vector2) {
        self.transform = self.transform * Affine2::from_translation(offset.into());
        self.push(DrawOp::Translate(offset));
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform * Affine2::from_angle(radians);
        self.push(DrawOp::Rotate(radians));
    }

    fn set_fill(&mut self, color: Color) {
        self.push(DrawOp::Fill(color));
    }

    fn set_stroke(&mut self, color: Color) {
        self.push(DrawOp::Stroke(color));
    }

    fn stroke_path(&mut self, points: &[Point]) {
        self.push(DrawOp::StrokePath(points.to_vec()));
    }

    fn fill_path(&mut self, points: &[Point]) {
        self.push(DrawOp::FillPath(points.to_vec()));
    }

    fn circle(&mut self, radius: f32, thickness: f32) {
        self.push(DrawOp::Circle { radius, thickness });
    }

    fn line(&mut self, to: Point, thickness: f32) {
        self.push(DrawOp::Line { to, thickness });
    }

    fn text(&mut self, text: &str, font: &str, align: TextAlign) {
        self.push(DrawOp::Text {
            text: text.to_string(),
            font: font.to_string(),
            align,
        });
    }

    fn image(&mut self, image: &SpriteImage, size: Dimensions, opacity: f32) {
        let origin = self.transform.transform_point2(Vec2::ZERO);
        self.push(DrawOp::Image {
            uri: image.uri().to_string(),
            size,
            opacity,
        });
        self.recording.log.borrow_mut().images.push(ImageRecord {
            uri: image.uri().to_string(),
            size,
            origin: Point::new(origin.x, origin.y),
            opacity,
        });
    }
}
