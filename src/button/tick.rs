use super::vessel::Vessel;
use crate::gfx::math::Vec2;

const HALF: f32 = 0.5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Checkmark {
    control2: Option<Vec2>,
    control3: Option<Vec2>,
}

impl Checkmark {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.control2 = None;
        self.control3 = None;
    }

    pub fn control2(&self) -> Option<Vec2> {
        self.control2
    }

    pub fn control3(&self) -> Option<Vec2> {
        self.control3
    }

    pub fn compute(&mut self, vessel: &Vessel, t: f32) {
        let [p1, p2, p3] = vessel.tick_points;
        if t <= HALF {
            // at t == 0 the first leg has not begun
            self.control2 = (t > 0.0).then(|| p1.lerp(p2, t / HALF));
        } else {
            // frames rarely land on exactly HALF; finish the first leg
            self.control2 = Some(p2);
            self.control3 = Some(p2.lerp(p3, (t - HALF) / HALF));
        }
    }

    pub fn polyline(&self, vessel: &Vessel) -> Vec<Vec2> {
        std::iter::once(vessel.tick_points[0])
            .chain(self.control2)
            .chain(self.control3)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vessel() -> Vessel {
        Vessel::from_bounds(Vec2::new(100.0, 100.0), 100.0)
    }

    #[test]
    fn nothing_traced_before_start() {
        let v = vessel();
        let tick = Checkmark::new();
        assert_eq!(tick.polyline(&v), vec![v.tick_points[0]]);
    }

    #[test]
    fn zero_progress_leaves_a_single_point() {
        let v = vessel();
        let mut tick = Checkmark::new();
        tick.compute(&v, 0.0);
        assert_eq!(tick.control2(), None);
        assert_eq!(tick.control3(), None);
        assert_eq!(tick.polyline(&v), vec![v.tick_points[0]]);

        tick.compute(&v, 0.25);
        let c2 = tick.control2().unwrap();
        assert!(c2.distance(v.tick_points[0].lerp(v.tick_points[1], 0.5)) < 1e-4);
    }

    #[test]
    fn legs_land_exactly_on_anchors() {
        let v = vessel();
        let mut tick = Checkmark::new();
        tick.compute(&v, 0.5);
        assert_eq!(tick.control2(), Some(v.tick_points[1]));
        assert_eq!(tick.control3(), None);

        tick.compute(&v, 1.0);
        assert_eq!(tick.control3(), Some(v.tick_points[2]));
        assert_eq!(tick.control2(), Some(v.tick_points[1]));
        assert_eq!(tick.polyline(&v), v.tick_points.to_vec());
    }

    #[test]
    fn second_leg_completes_a_coarse_first_leg() {
        let v = vessel();
        let mut tick = Checkmark::new();
        tick.compute(&v, 0.4);
        assert_ne!(tick.control2(), Some(v.tick_points[1]));
        tick.compute(&v, 0.6);
        assert_eq!(tick.control2(), Some(v.tick_points[1]));
    }

    #[test]
    fn overshoot_extends_past_last_anchor() {
        let v = vessel();
        let mut tick = Checkmark::new();
        tick.compute(&v, 0.5);
        tick.compute(&v, 1.1);
        let [_, p2, p3] = v.tick_points;
        let c3 = tick.control3().unwrap();
        assert!(p2.distance(c3) > p2.distance(p3));
    }

    #[test]
    fn reset_clears_both_legs() {
        let v = vessel();
        let mut tick = Checkmark::new();
        tick.compute(&v, 0.3);
        tick.compute(&v, 0.8);
        tick.reset();
        assert_eq!(tick, Checkmark::new());
    }
}
