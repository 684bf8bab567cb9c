//! Vertical background gradient.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// A color stop at `offset` (0.0-1.0) along the gradient span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgb,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Rgb) -> Self {
        Self { offset, color }
    }
}

/// Linear gradient running top to bottom between two fractions of the
/// surface height. Outside the span the nearest end stop is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gradient {
    /// Fraction of the surface height where the gradient begins.
    pub start: f32,
    /// Fraction of the surface height where the gradient ends.
    pub end: f32,
    /// Stops ordered by offset.
    pub stops: Vec<GradientStop>,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            start: 0.4,
            end: 1.0,
            stops: vec![
                GradientStop::new(0.0, Rgb::new(0x33, 0x41, 0x91)),
                GradientStop::new(0.7, Rgb::new(0x47, 0x64, 0xa0)),
                GradientStop::new(1.0, Rgb::new(0x71, 0x8f, 0xc8)),
            ],
        }
    }
}

impl Gradient {
    /// Color at `fraction` of the surface height.
    pub fn color_at(&self, fraction: f32) -> Rgb {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Rgb::BLACK;
        };

        let span = self.end - self.start;
        let t = if span.abs() <= f32::EPSILON {
            if fraction < self.start { 0.0 } else { 1.0 }
        } else {
            ((fraction - self.start) / span).clamp(0.0, 1.0)
        };

        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }

        self.stops
            .windows(2)
            .find(|pair| t >= pair[0].offset && t <= pair[1].offset)
            .map(|pair| {
                let width = pair[1].offset - pair[0].offset;
                let local = if width > 0.0 {
                    (t - pair[0].offset) / width
                } else {
                    1.0
                };
                pair[0].color.lerp(pair[1].color, local)
            })
            .unwrap_or(last.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_above_span_uses_first_stop() {
        let gradient = Gradient::default();
        assert_eq!(gradient.color_at(0.0), Rgb::new(0x33, 0x41, 0x91));
        assert_eq!(gradient.color_at(0.39), Rgb::new(0x33, 0x41, 0x91));
    }

    #[test]
    fn test_bottom_uses_last_stop() {
        let gradient = Gradient::default();
        assert_eq!(gradient.color_at(1.0), Rgb::new(0x71, 0x8f, 0xc8));
    }

    #[test]
    fn test_interpolates_between_stops() {
        let gradient = Gradient {
            start: 0.0,
            end: 1.0,
            stops: vec![
                GradientStop::new(0.0, Rgb::new(0, 0, 0)),
                GradientStop::new(1.0, Rgb::new(200, 100, 0)),
            ],
        };
        assert_eq!(gradient.color_at(0.5), Rgb::new(100, 50, 0));
    }

    #[test]
    fn test_empty_gradient_is_black() {
        let gradient = Gradient {
            start: 0.0,
            end: 1.0,
            stops: Vec::new(),
        };
        assert_eq!(gradient.color_at(0.5), Rgb::BLACK);
    }
}
