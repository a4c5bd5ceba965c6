use super::math::{Circle, Color, Vec2};
use anyhow::Result;
use kurbo::{Affine, BezPath, Point};
use std::path::Path;
use vello_cpu::kurbo::Shape;

// Colour, alpha and stroke width are sticky for every following primitive.
pub trait Renderer {
    fn set_color(&mut self, color: Color);
    fn set_alpha(&mut self, alpha: f32);
    fn set_stroke_width(&mut self, width: f32);
    fn draw_line(&mut self, from: Vec2, to: Vec2);
    fn draw_circle(&mut self, center: Vec2, radius: f32);
    fn fill_path(&mut self, path: &BezPath, clip: Option<Circle>);
    fn draw_polyline(&mut self, points: &[Vec2]);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetColor(Color),
    SetAlpha(f32),
    SetStrokeWidth(f32),
    Line { from: Vec2, to: Vec2 },
    Circle { center: Vec2, radius: f32 },
    FillPath { path: BezPath, clip: Option<Circle> },
    Polyline(Vec<Vec2>),
}

#[derive(Debug, Default)]
pub struct CommandRecorder {
    pub commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn circles(&self) -> impl Iterator<Item = (Vec2, f32)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle { center, radius } => Some((*center, *radius)),
            _ => None,
        })
    }
}

impl Renderer for CommandRecorder {
    fn set_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::SetColor(color));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::SetAlpha(alpha));
    }

    fn set_stroke_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::SetStrokeWidth(width));
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2) {
        self.commands.push(DrawCommand::Line { from, to });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32) {
        self.commands.push(DrawCommand::Circle { center, radius });
    }

    fn fill_path(&mut self, path: &BezPath, clip: Option<Circle>) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            clip,
        });
    }

    fn draw_polyline(&mut self, points: &[Vec2]) {
        self.commands.push(DrawCommand::Polyline(points.to_vec()));
    }
}

// Scales every coordinate and length about `pivot` before forwarding.
pub struct Scaled<'a> {
    inner: &'a mut dyn Renderer,
    pivot: Vec2,
    factor: f32,
}

impl<'a> Scaled<'a> {
    pub fn new(inner: &'a mut dyn Renderer, pivot: Vec2, factor: f32) -> Self {
        Self {
            inner,
            pivot,
            factor,
        }
    }

    fn map(&self, p: Vec2) -> Vec2 {
        p.scale_about(self.pivot, self.factor)
    }

    fn affine(&self) -> Affine {
        let pivot = Point::from(self.pivot).to_vec2();
        Affine::translate(pivot) * Affine::scale(self.factor as f64) * Affine::translate(-pivot)
    }
}

impl Renderer for Scaled<'_> {
    fn set_color(&mut self, color: Color) {
        self.inner.set_color(color);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.inner.set_alpha(alpha);
    }

    fn set_stroke_width(&mut self, width: f32) {
        self.inner.set_stroke_width(width * self.factor);
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2) {
        let (from, to) = (self.map(from), self.map(to));
        self.inner.draw_line(from, to);
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32) {
        let center = self.map(center);
        self.inner.draw_circle(center, radius * self.factor);
    }

    fn fill_path(&mut self, path: &BezPath, clip: Option<Circle>) {
        let mut path = path.clone();
        path.apply_affine(self.affine());
        let clip = clip.map(|c| Circle::new(self.map(c.center), c.radius * self.factor));
        self.inner.fill_path(&path, clip);
    }

    fn draw_polyline(&mut self, points: &[Vec2]) {
        let points: Vec<Vec2> = points.iter().map(|p| self.map(*p)).collect();
        self.inner.draw_polyline(&points);
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    fn from_premul(px: &[u8]) -> Self {
        let a = px[3];
        let unpremul = |c: u8| {
            if a == 0 {
                0
            } else {
                ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8
            }
        };
        Self {
            r: unpremul(px[0]),
            g: unpremul(px[1]),
            b: unpremul(px[2]),
            a,
        }
    }
}

const CIRCLE_TOLERANCE: f64 = 0.1;

// Draw calls are recorded into a vello_cpu context; `present` rasterizes them.
pub struct Framebuffer {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    color: Color,
    alpha: f32,
    stroke_width: f32,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| anyhow::anyhow!("Framebuffer width {} exceeds u16", width))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| anyhow::anyhow!("Framebuffer height {} exceeds u16", height))?;
        if w == 0 || h == 0 {
            anyhow::bail!("Framebuffer must not be empty ({}x{})", width, height);
        }

        Ok(Self {
            width: w,
            height: h,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            color: Color::WHITE,
            alpha: 1.0,
            stroke_width: 1.0,
        })
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    // Starts a new frame covered in `color`.
    pub fn clear(&mut self, color: Color) {
        self.ctx = vello_cpu::RenderContext::new(self.width, self.height);
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            self.width as f64,
            self.height as f64,
        ));
    }

    pub fn present(&mut self) {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let idx = ((y * self.width() + x) * 4) as usize;
        let data = self.pixmap.data_as_u8_slice();
        Some(Rgba8::from_premul(&data[idx..idx + 4]))
    }

    pub fn to_rgba8(&self) -> Vec<Rgba8> {
        self.pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(Rgba8::from_premul)
            .collect()
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        let pixels = self.to_rgba8();
        image::save_buffer_with_format(
            path,
            bytemuck::cast_slice(&pixels),
            self.width(),
            self.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))
    }

    fn apply_paint(&mut self) {
        let c = self.color;
        let a = (c.a as f32 * self.alpha).round().clamp(0.0, 255.0) as u8;
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, a));
    }

    fn stroke(&mut self, points: &[Vec2]) {
        if points.len() < 2 || self.stroke_width <= 0.0 {
            return;
        }
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(point_to_cpu(points[0]));
        for p in &points[1..] {
            path.line_to(point_to_cpu(*p));
        }
        self.apply_paint();
        self.ctx.set_stroke(
            vello_cpu::kurbo::Stroke::new(self.stroke_width as f64)
                .with_caps(vello_cpu::kurbo::Cap::Round)
                .with_join(vello_cpu::kurbo::Join::Round),
        );
        self.ctx.stroke_path(&path);
    }
}

impl Renderer for Framebuffer {
    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_stroke_width(&mut self, width: f32) {
        self.stroke_width = width.max(0.0);
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2) {
        self.stroke(&[from, to]);
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32) {
        if radius <= 0.0 {
            return;
        }
        self.apply_paint();
        let circle = vello_cpu::kurbo::Circle::new(point_to_cpu(center), radius as f64);
        self.ctx.fill_path(&circle.to_path(CIRCLE_TOLERANCE));
    }

    fn fill_path(&mut self, path: &BezPath, clip: Option<Circle>) {
        if path.elements().is_empty() {
            return;
        }
        if let Some(c) = clip {
            let clip = vello_cpu::kurbo::Circle::new(point_to_cpu(c.center), c.radius as f64);
            self.ctx.push_clip_layer(&clip.to_path(CIRCLE_TOLERANCE));
        }
        self.apply_paint();
        self.ctx.fill_path(&bezpath_to_cpu(path));
        if clip.is_some() {
            self.ctx.pop_layer();
        }
    }

    fn draw_polyline(&mut self, points: &[Vec2]) {
        self.stroke(points);
    }
}

fn point_to_cpu(p: Vec2) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x as f64, p.y as f64)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let cpu = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(cpu(p)),
            PathEl::LineTo(p) => out.line_to(cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(cpu(p1), cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(cpu(p1), cpu(p2), cpu(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
