use crate::gfx::math::{Circle, Rect, Vec2};

// (x1, y1, x2, y2, x3, y3) as fractions of the bounding box
const TICK_RATIOS: [f32; 6] = [0.29, 0.525, 0.445, 0.675, 0.74, 0.45];

const AMPLITUDE_RATIO: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vessel {
    pub center: Vec2,
    pub radius: f32,
    pub amplitude: f32,
    pub pour_stroke_width: f32,
    pub tick_stroke_width: f32,
    pub frame_top: f32,
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub pour_height: f32,
    pub tick_points: [Vec2; 3],
}

impl Vessel {
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::from_bounds(Vec2::new(width / 2.0, height / 2.0), width / 4.0)
    }

    pub fn from_bounds(center: Vec2, radius: f32) -> Self {
        let radius = radius.max(0.0);
        let pour_stroke_width = radius / 6.0;
        let left = center.x - radius;
        let top = center.y - radius;

        let bounds = Rect::new(left, top, 2.0 * radius, 2.0 * radius);
        let tick_points = [
            bounds.at(TICK_RATIOS[0], TICK_RATIOS[1]),
            bounds.at(TICK_RATIOS[2], TICK_RATIOS[3]),
            bounds.at(TICK_RATIOS[4], TICK_RATIOS[5]),
        ];

        Self {
            center,
            radius,
            amplitude: radius * AMPLITUDE_RATIO,
            pour_stroke_width,
            tick_stroke_width: pour_stroke_width / 2.0,
            frame_top: center.y - 3.0 * radius,
            top,
            bottom: center.y + radius,
            left,
            pour_height: 4.0 * radius,
            tick_points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.radius <= 0.0
    }

    pub fn silhouette(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_measurements_from_size() {
        let v = Vessel::from_size(400.0, 600.0);
        assert_eq!(v.center, Vec2::new(200.0, 300.0));
        assert_eq!(v.radius, 100.0);
        assert!((v.amplitude - 30.0).abs() < 1e-4);
        assert!((v.pour_stroke_width - 16.666_666).abs() < 1e-3);
        assert!((v.tick_stroke_width - 8.333_333).abs() < 1e-3);
        assert_eq!(v.frame_top, 0.0);
        assert_eq!(v.bottom, 400.0);
        assert_eq!(v.left, 100.0);
        assert_eq!(v.pour_height, 400.0);
    }

    #[test]
    fn tick_points_follow_ratio_table() {
        let v = Vessel::from_bounds(Vec2::new(100.0, 100.0), 100.0);
        let [p1, p2, p3] = v.tick_points;
        assert!((p1.x - 58.0).abs() < 1e-3 && (p1.y - 105.0).abs() < 1e-3);
        assert!((p2.x - 89.0).abs() < 1e-3 && (p2.y - 135.0).abs() < 1e-3);
        assert!((p3.x - 148.0).abs() < 1e-3 && (p3.y - 90.0).abs() < 1e-3);
    }

    #[test]
    fn negative_radius_is_empty() {
        let v = Vessel::from_bounds(Vec2::new(10.0, 10.0), -4.0);
        assert!(v.is_empty());
        assert_eq!(v.amplitude, 0.0);
        assert!(Vessel::default().is_empty());
    }
}
