//! CPU rasterizer: anti-aliased path fill into an RGBA buffer.
//!
//! Pixels are stored as premultiplied linear-in-value f32 RGBA and composited
//! with source-over. Paths are flattened to line segments, then filled with
//! the nonzero winding rule using a few sub-scanlines per pixel row and exact
//! horizontal span coverage.

use glam::Vec2;

use crate::surface::{DrawingSurface, LinearGradient};

/// Vertical sub-scanlines per pixel row
const SUBSAMPLES: usize = 4;

/// Max deviation of a flattened curve from the true curve (pixels)
const FLATTEN_TOLERANCE: f32 = 0.2;

#[derive(Clone, Copy, Debug)]
struct Edge {
    from: Vec2,
    to: Vec2,
}

impl Edge {
    /// Crossing x and winding direction at scanline `y`, if the edge spans it
    #[inline]
    fn crossing(&self, y: f32) -> Option<(f32, i32)> {
        let (a, b, dir) = if self.from.y < self.to.y {
            (self.from, self.to, 1)
        } else {
            (self.to, self.from, -1)
        };
        // Half-open so shared vertices count once
        if y < a.y || y >= b.y {
            return None;
        }
        let t = (y - a.y) / (b.y - a.y);
        Some((a.x + (b.x - a.x) * t, dir))
    }
}

/// Path under construction, flattened to closed polygons
#[derive(Debug, Default)]
struct FlatPath {
    edges: Vec<Edge>,
    start: Option<Vec2>,
    current: Option<Vec2>,
}

impl FlatPath {
    fn clear(&mut self) {
        self.edges.clear();
        self.start = None;
        self.current = None;
    }

    fn push_line(&mut self, from: Vec2, to: Vec2) {
        if from.y != to.y {
            self.edges.push(Edge { from, to });
        }
    }

    /// Edge from the current point back to the subpath start, if non-flat
    fn closing_edge(&self) -> Option<Edge> {
        match (self.start, self.current) {
            (Some(start), Some(current)) if start.y != current.y => Some(Edge {
                from: current,
                to: start,
            }),
            _ => None,
        }
    }

    fn close(&mut self) {
        if let (Some(start), Some(current)) = (self.start, self.current) {
            self.push_line(current, start);
            self.current = Some(start);
        }
    }

    fn move_to(&mut self, p: Vec2) {
        self.close();
        self.start = Some(p);
        self.current = Some(p);
    }

    fn line_to(&mut self, p: Vec2) {
        match self.current {
            Some(current) => {
                self.push_line(current, p);
                self.current = Some(p);
            }
            None => self.move_to(p),
        }
    }

    fn quad_to(&mut self, ctrl: Vec2, to: Vec2) {
        let Some(from) = self.current else {
            self.move_to(ctrl);
            self.line_to(to);
            return;
        };

        // Second difference bounds the deviation of a uniform subdivision
        let dd = (from - 2.0 * ctrl + to).length();
        let segments = ((dd / (4.0 * FLATTEN_TOLERANCE)).sqrt().ceil() as usize).clamp(1, 64);

        let mut prev = from;
        for i in 1..=segments {
            let t = i as f32 / segments as f32;
            let mt = 1.0 - t;
            let p = if i == segments {
                to
            } else {
                from * (mt * mt) + ctrl * (2.0 * mt * t) + to * (t * t)
            };
            self.push_line(prev, p);
            prev = p;
        }
        self.current = Some(to);
    }
}

/// Software drawing surface
pub struct PixelCanvas {
    width: u32,
    height: u32,
    /// Premultiplied RGBA, row-major
    pixels: Vec<[f32; 4]>,
    path: FlatPath,
    /// Per-row coverage scratch
    coverage: Vec<f32>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let mut canvas = Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
            path: FlatPath::default(),
            coverage: Vec::new(),
        };
        canvas.resize(width, height);
        canvas
    }

    /// Reallocate the raster; contents are cleared
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![[0.0; 4]; width as usize * height as usize];
        self.coverage = vec![0.0; width as usize + 1];
        log::debug!("Canvas resized to {}x{}", width, height);
    }

    /// Premultiplied pixel at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Straight-alpha RGBA8 bytes, row-major
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &[r, g, b, a] in &self.pixels {
            let unpremul = |c: f32| {
                if a > 0.0 {
                    (c / a).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            };
            out.extend_from_slice(&[
                to_byte(unpremul(r)),
                to_byte(unpremul(g)),
                to_byte(unpremul(b)),
                to_byte(a),
            ]);
        }
        out
    }

    /// Premultiplied RGBA8 bytes, row-major (GPU upload format)
    pub fn to_premultiplied_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|px| px.map(to_byte))
            .collect()
    }

    /// Opaque RGB8 bytes with the raster composited over `background`
    pub fn to_rgb8_over(&self, background: [u8; 3]) -> Vec<u8> {
        let bg = background.map(|c| c as f32 / 255.0);
        self.pixels
            .iter()
            .flat_map(|&[r, g, b, a]| {
                let keep = 1.0 - a;
                [
                    to_byte(r + bg[0] * keep),
                    to_byte(g + bg[1] * keep),
                    to_byte(b + bg[2] * keep),
                ]
            })
            .collect()
    }

    /// Accumulate horizontal coverage of one sub-scanline into `self.coverage`
    fn accumulate_scanline(&mut self, y: f32, crossings: &mut Vec<(f32, i32)>) {
        crossings.clear();
        crossings.extend(self.path.edges.iter().filter_map(|e| e.crossing(y)));
        if crossings.is_empty() {
            return;
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let weight = 1.0 / SUBSAMPLES as f32;
        let max_x = self.width as f32;
        let mut winding = 0;
        for pair in crossings.windows(2) {
            winding += pair[0].1;
            if winding == 0 {
                continue;
            }
            let x0 = pair[0].0.clamp(0.0, max_x);
            let x1 = pair[1].0.clamp(0.0, max_x);
            if x1 <= x0 {
                continue;
            }
            add_span(&mut self.coverage, x0, x1, weight);
        }
    }

    fn composite_row(&mut self, row: u32, style: &LinearGradient) {
        let y = row as f32 + 0.5;
        let base = (row * self.width) as usize;
        for col in 0..self.width as usize {
            let cover = self.coverage[col].min(1.0);
            self.coverage[col] = 0.0;
            if cover <= 0.0 {
                continue;
            }
            let t = style.project(Vec2::new(col as f32 + 0.5, y));
            let [r, g, b, a] = style.color_at(t);
            let sa = a * cover;
            if sa <= 0.0 {
                continue;
            }
            let dst = &mut self.pixels[base + col];
            let keep = 1.0 - sa;
            dst[0] = r * sa + dst[0] * keep;
            dst[1] = g * sa + dst[1] * keep;
            dst[2] = b * sa + dst[2] * keep;
            dst[3] = sa + dst[3] * keep;
        }
        self.coverage[self.width as usize] = 0.0;
    }
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Add `weight` times the covered fraction of [x0, x1) to each pixel
fn add_span(coverage: &mut [f32], x0: f32, x1: f32, weight: f32) {
    let first = x0.floor() as usize;
    let last = x1.floor() as usize;
    if first == last {
        coverage[first] += (x1 - x0) * weight;
        return;
    }
    coverage[first] += (first as f32 + 1.0 - x0) * weight;
    for c in &mut coverage[first + 1..last] {
        *c += weight;
    }
    coverage[last] += (x1 - last as f32) * weight;
}

impl DrawingSurface for PixelCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let x0 = (x.max(0.0).floor() as u32).min(self.width);
        let y0 = y.max(0.0).floor() as u32;
        let x1 = ((x + width).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((y + height).ceil().max(0.0) as u32).min(self.height);
        for row in y0..y1 {
            let base = (row * self.width) as usize;
            for px in &mut self.pixels[base + x0 as usize..base + x1.max(x0) as usize] {
                *px = [0.0; 4];
            }
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, p: Vec2) {
        self.path.move_to(p);
    }

    fn line_to(&mut self, p: Vec2) {
        self.path.line_to(p);
    }

    fn quadratic_curve_to(&mut self, ctrl: Vec2, to: Vec2) {
        self.path.quad_to(ctrl, to);
    }

    fn close_path(&mut self) {
        self.path.close();
    }

    fn fill(&mut self, style: &LinearGradient) {
        // Filling closes an open subpath implicitly, without ending it
        let implicit = self.path.closing_edge();
        if let Some(edge) = implicit {
            self.path.edges.push(edge);
        }
        self.fill_edges(style);
        if implicit.is_some() {
            self.path.edges.pop();
        }
    }
}

impl PixelCanvas {
    fn fill_edges(&mut self, style: &LinearGradient) {
        if self.path.edges.is_empty() || self.width == 0 || self.height == 0 {
            return;
        }

        let (min_y, max_y) = self
            .path
            .edges
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), e| {
                (lo.min(e.from.y.min(e.to.y)), hi.max(e.from.y.max(e.to.y)))
            });
        let first_row = min_y.floor().max(0.0) as u32;
        let last_row = (max_y.ceil().max(0.0) as u32).min(self.height);

        let mut crossings = Vec::new();
        for row in first_row..last_row {
            for s in 0..SUBSAMPLES {
                let y = row as f32 + (s as f32 + 0.5) / SUBSAMPLES as f32;
                self.accumulate_scanline(y, &mut crossings);
            }
            self.composite_row(row, style);
        }
    }
}
