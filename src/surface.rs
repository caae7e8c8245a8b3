//! Drawing surface abstraction shared by the band renderer and its sinks.
//!
//! The renderer only ever writes to a surface; nothing in the core reads
//! pixels back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 8-bit sRGB color triple
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Attach an opacity in [0, 1]
    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

/// sRGB color with straight (non-premultiplied) opacity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

/// Gradient color stop at `offset` in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

/// Linear gradient between two points with ordered color stops
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    stops: Vec<ColorStop>,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            stops: Vec::new(),
        }
    }

    /// Append a stop; offsets must be added in non-decreasing order
    pub fn add_color_stop(&mut self, offset: f32, color: Rgba) {
        debug_assert!(self.stops.last().map_or(true, |s| s.offset <= offset));
        self.stops.push(ColorStop {
            offset: offset.clamp(0.0, 1.0),
            color,
        });
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Position of `p` along the gradient axis (unclamped)
    pub fn project(&self, p: Vec2) -> f32 {
        let axis = self.end - self.start;
        let len_sq = axis.length_squared();
        if len_sq <= f32::EPSILON {
            return 0.0;
        }
        (p - self.start).dot(axis) / len_sq
    }

    /// Color at gradient position `t`, padded with the end stops outside [0, 1]
    ///
    /// Returns straight RGB in [0, 1] and opacity.
    pub fn color_at(&self, t: f32) -> [f32; 4] {
        let Some(first) = self.stops.first() else {
            return [0.0; 4];
        };
        let t = t.clamp(0.0, 1.0);
        if t <= first.offset {
            return unpack(first.color);
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                let k = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
                let (ca, cb) = (unpack(a.color), unpack(b.color));
                return [
                    ca[0] + (cb[0] - ca[0]) * k,
                    ca[1] + (cb[1] - ca[1]) * k,
                    ca[2] + (cb[2] - ca[2]) * k,
                    ca[3] + (cb[3] - ca[3]) * k,
                ];
            }
        }

        // Past the last stop
        self.stops
            .last()
            .map(|s| unpack(s.color))
            .unwrap_or([0.0; 4])
    }
}

fn unpack(c: Rgba) -> [f32; 4] {
    [
        c.r as f32 / 255.0,
        c.g as f32 / 255.0,
        c.b as f32 / 255.0,
        c.a.clamp(0.0, 1.0),
    ]
}

/// One path construction command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo { ctrl: Vec2, to: Vec2 },
    Close,
}

/// 2-D drawing sink with canvas-style path construction
pub trait DrawingSurface {
    /// Current raster size (width, height) in pixels
    fn size(&self) -> (u32, u32);

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Discard the current path and start a new one
    fn begin_path(&mut self);

    fn move_to(&mut self, p: Vec2);

    fn line_to(&mut self, p: Vec2);

    fn quadratic_curve_to(&mut self, ctrl: Vec2, to: Vec2);

    fn close_path(&mut self);

    /// Fill the current path with a linear gradient
    fn fill(&mut self, style: &LinearGradient);
}

/// Call recorded by [`RecordingSurface`]
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    ClearRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    BeginPath,
    Path(PathCommand),
    Fill(LinearGradient),
}

/// Surface that records every call instead of drawing
#[derive(Debug, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Recorded path commands, in order
    pub fn path_commands(&self) -> impl Iterator<Item = &PathCommand> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Path(cmd) => Some(cmd),
            _ => None,
        })
    }

    /// Recorded fill styles, in order
    pub fn fills(&self) -> impl Iterator<Item = &LinearGradient> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Fill(style) => Some(style),
            _ => None,
        })
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.calls.push(DrawCall::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn begin_path(&mut self) {
        self.calls.push(DrawCall::BeginPath);
    }

    fn move_to(&mut self, p: Vec2) {
        self.calls.push(DrawCall::Path(PathCommand::MoveTo(p)));
    }

    fn line_to(&mut self, p: Vec2) {
        self.calls.push(DrawCall::Path(PathCommand::LineTo(p)));
    }

    fn quadratic_curve_to(&mut self, ctrl: Vec2, to: Vec2) {
        self.calls
            .push(DrawCall::Path(PathCommand::QuadTo { ctrl, to }));
    }

    fn close_path(&mut self) {
        self.calls.push(DrawCall::Path(PathCommand::Close));
    }

    fn fill(&mut self, style: &LinearGradient) {
        self.calls.push(DrawCall::Fill(style.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> LinearGradient {
        let mut g = LinearGradient::new(Vec2::new(0.0, 10.0), Vec2::new(0.0, 20.0));
        let c = Rgb::new(255, 0, 0);
        g.add_color_stop(0.0, c.with_alpha(0.0));
        g.add_color_stop(0.5, c.with_alpha(1.0));
        g.add_color_stop(1.0, c.with_alpha(0.0));
        g
    }

    #[test]
    fn test_gradient_projection() {
        let g = ramp();
        assert_eq!(g.project(Vec2::new(5.0, 10.0)), 0.0);
        assert_eq!(g.project(Vec2::new(-3.0, 15.0)), 0.5);
        assert_eq!(g.project(Vec2::new(0.0, 30.0)), 2.0);
    }

    #[test]
    fn test_gradient_interpolates_and_pads() {
        let g = ramp();
        assert!((g.color_at(0.25)[3] - 0.5).abs() < 1e-6);
        assert_eq!(g.color_at(0.5)[3], 1.0);
        assert_eq!(g.color_at(-4.0)[3], 0.0);
        assert_eq!(g.color_at(7.0)[3], 0.0);
        assert_eq!(g.color_at(0.5)[0], 1.0);
    }

    #[test]
    fn test_recording_surface_logs_calls() {
        let mut surface = RecordingSurface::new(10, 10);
        surface.begin_path();
        surface.move_to(Vec2::ZERO);
        surface.line_to(Vec2::ONE);
        surface.close_path();
        surface.fill(&ramp());

        assert_eq!(surface.calls.len(), 5);
        assert_eq!(surface.path_commands().count(), 3);
        assert_eq!(surface.fills().count(), 1);
    }
}
