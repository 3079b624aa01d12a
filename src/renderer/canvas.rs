//! Canvas 2D backend and image loading (WASM only)

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::sprite::{AssetError, Sprite, SpriteCallback, SpriteImage, SpriteLoader};
use super::surface::{Backend, TextAlign};
use crate::sim::{Color, Dimensions, Point, Vector2};

/// Backend drawing into an HTML canvas
pub struct CanvasBackend {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasBackend {
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }

    fn trace(&self, points: &[Point]) {
        self.ctx.begin_path();
        for point in points {
            self.ctx.line_to(point.x as f64, point.y as f64);
        }
        self.ctx.close_path();
    }
}

impl Backend for CanvasBackend {
    fn resize(&mut self, bounds: Dimensions) {
        self.canvas.set_width(bounds.width as u32);
        self.canvas.set_height(bounds.height as u32);
    }

    fn clear(&mut self, bounds: Dimensions) {
        self.ctx
            .clear_rect(0.0, 0.0, bounds.width as f64, bounds.height as f64);
    }

    fn translate(&mut self, offset: Vector2) {
        let _ = self.ctx.translate(offset.x as f64, offset.y as f64);
    }

    fn rotate(&mut self, radians: f32) {
        let _ = self.ctx.rotate(radians as f64);
    }

    fn set_fill(&mut self, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
    }

    fn set_stroke(&mut self, color: Color) {
        self.ctx.set_stroke_style_str(&color.to_css());
    }

    fn stroke_path(&mut self, points: &[Point]) {
        self.trace(points);
        self.ctx.stroke();
    }

    fn fill_path(&mut self, points: &[Point]) {
        self.trace(points);
        self.ctx.fill();
    }

    fn circle(&mut self, radius: f32, thickness: f32) {
        self.ctx.begin_path();
        self.ctx.set_line_width(thickness as f64);
        let _ = self.ctx.arc(0.0, 0.0, radius as f64, 0.0, TAU);
        self.ctx.stroke();
        self.ctx.set_line_width(1.0);
    }

    fn line(&mut self, to: Point, thickness: f32) {
        self.ctx.begin_path();
        self.ctx.set_line_width(thickness as f64);
        self.ctx.move_to(0.0, 0.0);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
        self.ctx.set_line_width(1.0);
    }

    fn text(&mut self, text: &str, font: &str, align: TextAlign) {
        self.ctx.set_font(font);
        self.ctx.set_text_align(align.as_str());
        let _ = self.ctx.fill_text(text, 0.0, 0.0);
    }

    fn image(&mut self, image: &SpriteImage, size: Dimensions, opacity: f32) {
        let Some(element) = image.element() else {
            return;
        };
        self.ctx.set_global_alpha(opacity as f64);
        let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            element,
            0.0,
            0.0,
            size.width as f64,
            size.height as f64,
        );
        self.ctx.set_global_alpha(1.0);
    }
}

/// Load an image by URI and wrap it as a sprite
pub async fn create_sprite(uri: &str) -> Result<Sprite, AssetError> {
    let error = || AssetError::Load(uri.to_string());
    let element = HtmlImageElement::new().map_err(|_| error())?;

    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        element.set_onload(Some(&resolve));
        element.set_onerror(Some(&reject));
    });
    element.set_src(uri);
    JsFuture::from(promise).await.map_err(|_| error())?;

    element.set_onload(None);
    element.set_onerror(None);
    Ok(Sprite::new(SpriteImage::from_element(uri, element)))
}

/// Loader spawning image loads on the browser's microtask queue
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageLoader;

impl SpriteLoader for ImageLoader {
    fn load(&self, uri: &str, on_ready: SpriteCallback) {
        let uri = uri.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            match create_sprite(&uri).await {
                Ok(sprite) => on_ready(sprite),
                Err(e) => log::warn!("{}", e),
            }
        });
    }
}
