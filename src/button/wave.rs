use super::vessel::Vessel;
use super::{FINISH_POUR, TOUCH_BASE};
use crate::gfx::math::Vec2;
use kurbo::{BezPath, Point};

// degrees per frame at full speed, and per horizontal pixel
const PHASE_SHIFT_FACTOR: f32 = 5.0;
const ANGLE_VELOCITY: f32 = 0.5;
const BUBBLE_INTERVAL: f32 = 0.2;
const BUBBLE_WINDOW: f32 = 0.01;

#[derive(Debug, Clone, Default)]
pub struct LiquidFrame {
    pub level: f32,
    pub amplitude: f32,
    pub path: BezPath,
    pub spawn_bubble: bool,
}

// phase_shift carries over between frames of one pour
#[derive(Debug, Default)]
pub struct WaveSurface {
    phase_shift: i32,
}

impl WaveSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.phase_shift = 0;
    }

    pub fn phase_shift(&self) -> i32 {
        self.phase_shift
    }

    pub fn compute(&mut self, vessel: &Vessel, t: f32) -> LiquidFrame {
        let level = if t < TOUCH_BASE {
            vessel.bottom
        } else {
            vessel.bottom - 2.0 * vessel.radius * (t - TOUCH_BASE) / FINISH_POUR
        };

        if vessel.is_empty() {
            return LiquidFrame {
                level,
                ..LiquidFrame::default()
            };
        }

        // Frame-rate dependent: may fire zero or several times per interval.
        let spawn_bubble = t > BUBBLE_INTERVAL && t % BUBBLE_INTERVAL <= BUBBLE_WINDOW;

        let reduce_ratio = 1.4 - t;
        if t >= TOUCH_BASE {
            self.advance_phase(PHASE_SHIFT_FACTOR * reduce_ratio);
        }

        let amplitude = if t <= FINISH_POUR {
            vessel.amplitude
        } else {
            vessel.amplitude * reduce_ratio
        };

        LiquidFrame {
            level,
            amplitude,
            path: self.surface_path(vessel, level, amplitude),
            spawn_bubble,
        }
    }

    fn advance_phase(&mut self, step: f32) {
        self.phase_shift = (self.phase_shift + step as i32).rem_euclid(360);
    }

    fn surface_path(&self, vessel: &Vessel, level: f32, amplitude: f32) -> BezPath {
        let samples = (2.0 * vessel.radius).ceil() as usize;
        let mut path = BezPath::new();

        for i in 0..samples {
            let x = vessel.left + i as f32;
            let angle = (i as f32 * ANGLE_VELOCITY + self.phase_shift as f32).to_radians();
            let y = (amplitude * angle.sin() + level).trunc();
            let sample = Point::from(Vec2::new(x, y));
            if i == 0 {
                path.move_to(sample);
            }
            path.quad_to(sample, Point::from(Vec2::new(x + 1.0, y)));
        }

        path.line_to(Vec2::new(vessel.center.x + vessel.radius, vessel.bottom));
        path.line_to(Vec2::new(vessel.left, vessel.bottom));
        path.close_path();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;

    fn vessel() -> Vessel {
        Vessel::from_bounds(Vec2::new(100.0, 100.0), 100.0)
    }

    fn surface_ys(frame: &LiquidFrame) -> Vec<f32> {
        frame
            .path
            .elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::QuadTo(_, end) => Some(end.y as f32),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn level_stays_at_bottom_before_touch_base() {
        let v = vessel();
        let mut wave = WaveSurface::new();
        let frame = wave.compute(&v, 0.05);
        assert_eq!(frame.level, v.bottom);
        assert!(!frame.spawn_bubble);
        assert_eq!(wave.phase_shift(), 0);
    }

    #[test]
    fn rises_and_spawns_on_interval() {
        let v = vessel();
        let mut wave = WaveSurface::new();
        let frame = wave.compute(&v, 0.4);
        assert!(frame.level < v.bottom);
        assert!(frame.spawn_bubble);
        assert!(!wave.compute(&v, 0.3).spawn_bubble);
        assert!(!wave.compute(&v, 0.2).spawn_bubble);
    }

    #[test]
    fn fully_filled_level_reaches_top() {
        let v = vessel();
        let frame = WaveSurface::new().compute(&v, 1.0);
        assert!((frame.level - v.top).abs() < 1e-3);
    }

    #[test]
    fn amplitude_decays_to_flat_line() {
        let v = vessel();
        let mut wave = WaveSurface::new();
        assert_eq!(wave.compute(&v, 0.5).amplitude, v.amplitude);

        let frame = wave.compute(&v, 1.4);
        assert!(frame.amplitude.abs() < 1e-4);
        let level = frame.level.trunc();
        assert!(surface_ys(&frame).iter().all(|y| (*y - level).abs() <= 1.0));
    }

    #[test]
    fn phase_shift_wraps_at_360() {
        let mut wave = WaveSurface::new();
        wave.phase_shift = 355;
        wave.advance_phase(5.0);
        assert_eq!(wave.phase_shift(), 0);

        wave.phase_shift = 358;
        wave.advance_phase(6.5);
        assert_eq!(wave.phase_shift(), 4);
    }

    #[test]
    fn phase_shift_stays_in_range_over_a_pour() {
        let v = vessel();
        let mut wave = WaveSurface::new();
        for i in 0..=1000 {
            wave.compute(&v, i as f32 / 1000.0);
            assert!((0..360).contains(&wave.phase_shift()));
        }
    }

    #[test]
    fn path_spans_the_vessel_and_closes() {
        let v = vessel();
        let frame = WaveSurface::new().compute(&v, 0.5);
        let els = frame.path.elements();
        assert!(matches!(els[0], PathEl::MoveTo(p) if p.x == v.left as f64));
        assert_eq!(surface_ys(&frame).len(), 200);
        assert_eq!(els[els.len() - 3], PathEl::LineTo(Vec2::new(200.0, v.bottom).into()));
        assert_eq!(els[els.len() - 2], PathEl::LineTo(Vec2::new(v.left, v.bottom).into()));
        assert_eq!(els[els.len() - 1], PathEl::ClosePath);
    }

    #[test]
    fn degenerate_vessel_skips_generation() {
        let v = Vessel::from_bounds(Vec2::new(10.0, 10.0), 0.0);
        let mut wave = WaveSurface::new();
        let frame = wave.compute(&v, 0.4);
        assert!(frame.path.elements().is_empty());
        assert!(!frame.spawn_bubble);
        assert_eq!(wave.phase_shift(), 0);
    }
}
