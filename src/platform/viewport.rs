//! Host window size

use crate::sim::Dimensions;

/// Viewport from the window's inner size as reported by the host.
///
/// A dimension the host cannot report becomes 0, which the surface then
/// rejects on resize.
pub fn viewport(width: Option<f64>, height: Option<f64>) -> Dimensions {
    match (width, height) {
        (Some(width), Some(height)) => Dimensions::new(width as f32, height as f32),
        _ => {
            log::warn!(
                "Window size unavailable (width: {:?}, height: {:?}), falling back to 0",
                width,
                height
            );
            Dimensions::new(width.unwrap_or(0.0) as f32, height.unwrap_or(0.0) as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_size_is_used() {
        assert_eq!(viewport(Some(1280.0), Some(720.0)), Dimensions::new(1280.0, 720.0));
    }

    #[test]
    fn test_missing_dimension_falls_back_to_zero() {
        assert_eq!(viewport(None, Some(720.0)), Dimensions::new(0.0, 720.0));
        assert_eq!(viewport(Some(1280.0), None), Dimensions::new(1280.0, 0.0));
        assert_eq!(viewport(None, None), Dimensions::new(0.0, 0.0));
    }
}
