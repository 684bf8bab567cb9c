//! Layouts that assign each particle its fixed formation origin.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Viewport};

/// Shape the particles converge into when formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Formation {
    /// Evenly spaced on an ellipse centred in the viewport.
    #[default]
    Ring,
    /// Row-major grid filling the viewport.
    Grid,
    /// Evenly spaced along the horizontal centre line.
    Line,
}

impl Formation {
    /// Origin of particle `index` out of `count` for the given viewport.
    pub fn origin(self, index: usize, count: usize, viewport: Viewport) -> Point {
        let count = count.max(1);
        let index = index % count;
        match self {
            Formation::Ring => {
                let center = viewport.center();
                let angle = TAU * index as f32 / count as f32;
                Point::new(
                    center.x + viewport.width * 0.3 * angle.cos(),
                    center.y + viewport.height * 0.3 * angle.sin(),
                )
            }
            Formation::Grid => {
                let aspect = if viewport.height > 0.0 {
                    viewport.width / viewport.height
                } else {
                    1.0
                };
                let columns = ((count as f32 * aspect).sqrt().ceil() as usize).clamp(1, count);
                let rows = count.div_ceil(columns);
                let cell_w = viewport.width / columns as f32;
                let cell_h = viewport.height / rows as f32;
                Point::new(
                    cell_w * ((index % columns) as f32 + 0.5),
                    cell_h * ((index / columns) as f32 + 0.5),
                )
            }
            Formation::Line => {
                let cell_w = viewport.width / count as f32;
                Point::new(cell_w * (index as f32 + 0.5), viewport.height / 2.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport::new(800.0, 200.0);

    #[test]
    fn test_every_layout_stays_in_viewport() {
        for formation in [Formation::Ring, Formation::Grid, Formation::Line] {
            for i in 0..100 {
                let origin = formation.origin(i, 100, VIEWPORT);
                assert!(VIEWPORT.contains(origin), "{formation:?} #{i}: {origin:?}");
            }
        }
    }

    #[test]
    fn test_ring_starts_right_of_center() {
        let origin = Formation::Ring.origin(0, 4, VIEWPORT);
        assert!((origin.x - 640.0).abs() < 1e-3);
        assert!((origin.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_grid_is_row_major() {
        // 8 particles on a 4:1 viewport -> 6 columns, 2 rows
        let first = Formation::Grid.origin(0, 8, VIEWPORT);
        let second = Formation::Grid.origin(1, 8, VIEWPORT);
        let wrapped = Formation::Grid.origin(6, 8, VIEWPORT);
        assert_eq!(first.y, second.y);
        assert!(second.x > first.x);
        assert_eq!(wrapped.x, first.x);
        assert!(wrapped.y > first.y);
    }

    #[test]
    fn test_line_is_centered_vertically() {
        let origin = Formation::Line.origin(0, 2, VIEWPORT);
        assert_eq!(origin, Point::new(200.0, 100.0));
    }
}
