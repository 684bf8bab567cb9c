//! Drawable surface: background gradient plus particles in creation order.

use bokeh_core::{Gradient, Rgb, Viewport};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::particle::Particle;
use crate::pool::ParticlePool;

/// Upper half block: foreground paints the top pixel, background the bottom one.
const HALF_BLOCK: &str = "▀";

/// A row-major grid of opaque pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Raster {
    pub fn new(width: usize, height: usize, fill: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get_mut(y * self.width + x)
    }

    fn copy_from(&mut self, other: &Raster) {
        self.pixels.clone_from(&other.pixels);
    }
}

/// The engine's canvas.
///
/// Twice as wide as the viewport. The gradient is painted once into a
/// background raster; each redraw starts from it and composites the
/// particles on top.
#[derive(Debug)]
pub struct Surface {
    /// Identifier of the host container this surface is mounted in.
    container: String,
    /// Logical width.
    width: f32,
    /// Logical height.
    height: f32,
    /// Logical units covered by one raster pixel.
    pixel_size: f32,
    background: Raster,
    frame: Raster,
    children: ParticlePool,
    redraws: u64,
}

impl Surface {
    /// Size the surface to `(2 * viewport.width, height)` and paint the gradient.
    pub fn new(
        container: impl Into<String>,
        viewport: Viewport,
        height: f32,
        pixel_size: f32,
        gradient: &Gradient,
        children: ParticlePool,
    ) -> Self {
        let pixel_size = if pixel_size.is_finite() && pixel_size > 0.0 {
            pixel_size
        } else {
            1.0
        };
        let width = viewport.width * 2.0;
        let columns = ((width / pixel_size).ceil() as usize).max(1);
        let rows = ((height / pixel_size).ceil() as usize).max(1);

        let mut background = Raster::new(columns, rows, Rgb::BLACK);
        paint_gradient(&mut background, gradient);

        Self {
            container: container.into(),
            width,
            height,
            pixel_size,
            frame: background.clone(),
            background,
            children,
            redraws: 0,
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Logical `(width, height)`.
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    pub fn background(&self) -> &Raster {
        &self.background
    }

    /// The raster produced by the latest redraw.
    pub fn frame(&self) -> &Raster {
        &self.frame
    }

    pub fn children(&self) -> &ParticlePool {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut ParticlePool {
        &mut self.children
    }

    /// Number of redraws since creation.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Compose the current particle attributes over the background.
    pub fn redraw(&mut self) {
        self.frame.copy_from(&self.background);
        for particle in self.children.iter() {
            composite(&mut self.frame, particle, self.pixel_size);
        }
        self.redraws += 1;
    }

    /// Draw the latest frame into `area` with half-block cells, two raster
    /// rows per terminal row.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = (0..area.height as usize)
            .map(|row| {
                let spans: Vec<Span> = (0..area.width as usize)
                    .map(|col| self.render_cell(col, row))
                    .collect();
                Line::from(spans)
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_cell(&self, col: usize, row: usize) -> Span<'static> {
        let top = self.frame.get(col, row * 2);
        let bottom = self.frame.get(col, row * 2 + 1);
        match (top, bottom) {
            (Some(top), Some(bottom)) => Span::styled(
                HALF_BLOCK,
                Style::new().fg(Color::from(top)).bg(Color::from(bottom)),
            ),
            (Some(top), None) => Span::styled(HALF_BLOCK, Style::new().fg(Color::from(top))),
            _ => Span::raw(" "),
        }
    }
}

fn paint_gradient(raster: &mut Raster, gradient: &Gradient) {
    let rows = raster.height();
    for y in 0..rows {
        let color = gradient.color_at((y as f32 + 0.5) / rows as f32);
        for x in 0..raster.width() {
            if let Some(pixel) = raster.pixel_mut(x, y) {
                *pixel = color;
            }
        }
    }
}

/// Paint one particle as a filled ellipse, sampling each pixel at its centre.
fn composite(raster: &mut Raster, particle: &Particle, pixel_size: f32) {
    let alpha = particle.alpha();
    if alpha.is_nan() || alpha <= 0.0 {
        return;
    }
    let (rx, ry) = particle.extent();
    if !(rx > 0.0 && ry > 0.0) {
        return;
    }

    let center = particle.position();
    let to_pixel = |v: f32| (v / pixel_size).floor().max(0.0) as usize;
    let x_range = to_pixel(center.x - rx)..=to_pixel(center.x + rx);
    let y_range = to_pixel(center.y - ry)..=to_pixel(center.y + ry);

    for py in y_range {
        if py >= raster.height() {
            break;
        }
        let dy = ((py as f32 + 0.5) * pixel_size - center.y) / ry;
        for px in x_range.clone() {
            if px >= raster.width() {
                break;
            }
            let dx = ((px as f32 + 0.5) * pixel_size - center.x) / rx;
            if dx * dx + dy * dy > 1.0 {
                continue;
            }
            if let Some(pixel) = raster.pixel_mut(px, py) {
                *pixel = pixel.blend(particle.color(), alpha);
            }
        }
    }
}
