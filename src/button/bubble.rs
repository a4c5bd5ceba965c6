use super::vessel::Vessel;
use crate::gfx::anim::Easing;
use crate::gfx::math::Vec2;
use kurbo::{ParamCurve, QuadBez};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BUBBLE_EASING: Easing = Easing::Decelerate { factor: 0.8 };
const LIFETIME_MS: std::ops::Range<u32> = 1000..1500;
const BURST_SIZE: std::ops::RangeInclusive<usize> = 3..=5;

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub start: Vec2,
    pub control: Vec2,
    pub end: Vec2,
    pub radius: f32,
    pub current: Vec2,
    pub alpha: f32,
}

impl Bubble {
    pub fn new(start: Vec2, control: Vec2, end: Vec2, radius: f32) -> Self {
        Self {
            start,
            control,
            end,
            radius,
            current: start,
            alpha: 1.0,
        }
    }

    pub fn evaluate(&mut self, u: f32) {
        let curve = QuadBez::new(self.start, self.control, self.end);
        self.current = curve.eval(u as f64).into();
        self.alpha = 1.0 - u;
    }
}

#[derive(Debug, Clone)]
struct ActiveBubble {
    bubble: Bubble,
    born: f32,
    lifetime: f32,
}

// each bubble keeps its own timer on the shared clock
pub struct BubbleSystem {
    active: Vec<ActiveBubble>,
    rng: StdRng,
}

impl BubbleSystem {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            active: Vec::new(),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bubble> {
        self.active.iter().map(|a| &a.bubble)
    }

    pub fn spawn(&mut self, vessel: &Vessel, level: f32, now: f32) {
        if vessel.is_empty() {
            return;
        }
        let radius = vessel.radius;
        let cx = vessel.center.x;

        let spread = 0.5 * vessel.pour_stroke_width + self.rng.gen::<f32>() * radius * 0.8;
        let control_x = if self.rng.gen_bool(0.5) { cx - spread } else { cx + spread };
        let end_x = control_x + (control_x - cx) * self.rng.gen::<f32>();

        let start = Vec2::new(cx, level);
        let control = Vec2::new(control_x, level - radius * (self.rng.gen::<f32>() + 0.2));
        let end = Vec2::new(end_x, level - 0.5 * (start.y - control.y));
        let bubble_radius = radius * 0.2 * self.rng.gen::<f32>();
        let lifetime = self.rng.gen_range(LIFETIME_MS) as f32 / 1000.0;

        self.active.push(ActiveBubble {
            bubble: Bubble::new(start, control, end, bubble_radius),
            born: now,
            lifetime,
        });
    }

    pub fn spawn_burst(&mut self, vessel: &Vessel, level: f32, now: f32) -> usize {
        if vessel.is_empty() {
            return 0;
        }
        let count = self.rng.gen_range(BURST_SIZE);
        for _ in 0..count {
            self.spawn(vessel, level, now);
        }
        count
    }

    pub fn advance(&mut self, now: f32) {
        self.active.retain_mut(|a| {
            let linear = ((now - a.born) / a.lifetime).clamp(0.0, 1.0);
            a.bubble.evaluate(BUBBLE_EASING.apply(linear));
            linear < 1.0
        });
    }
}

impl Default for BubbleSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn vessel() -> Vessel {
        Vessel::from_bounds(Vec2::new(100.0, 100.0), 100.0)
    }

    #[test]
    fn evaluate_hits_path_endpoints() {
        let start = Vec2::new(100.0, 150.0);
        let end = Vec2::new(160.3, 101.7);
        let mut b = Bubble::new(start, Vec2::new(140.2, 53.4), end, 4.0);

        b.evaluate(0.0);
        assert!(b.current.distance(start) < 1e-4);
        assert_eq!(b.alpha, 1.0);

        b.evaluate(0.5);
        assert!(b.current.distance(Vec2::new(135.175, 89.625)) < 1e-3);

        b.evaluate(1.0);
        assert!(b.current.distance(end) < 1e-4);
        assert_eq!(b.alpha, 0.0);
    }

    #[test]
    fn spawned_bubbles_stay_in_range() {
        let v = vessel();
        let mut system = BubbleSystem::with_seed(7);
        let level = 150.0;
        for _ in 0..200 {
            system.spawn(&v, level, 0.0);
        }
        for b in system.iter() {
            assert_eq!(b.start, Vec2::new(100.0, level));
            let offset = (b.control.x - 100.0).abs();
            assert!(offset >= 0.5 * v.pour_stroke_width - EPS);
            assert!(offset <= 0.5 * v.pour_stroke_width + 80.0 + EPS);
            // the end point drifts further out on the same side
            assert!((b.end.x - 100.0).signum() == (b.control.x - 100.0).signum());
            assert!((b.end.x - 100.0).abs() >= offset);
            assert!(b.control.y <= level - 20.0 + EPS && b.control.y >= level - 120.0 - EPS);
            assert!((b.end.y - (level - 0.5 * (level - b.control.y))).abs() < 1e-3);
            assert!(b.radius >= 0.0 && b.radius < 20.0);
        }
        let left = system.iter().filter(|b| b.control.x < 100.0).count();
        assert!(left > 0 && left < 200);
    }

    #[test]
    fn bubbles_rise_fade_and_retire() {
        let v = vessel();
        let mut system = BubbleSystem::with_seed(1);
        system.spawn(&v, 150.0, 2.0);

        system.advance(2.0);
        assert_eq!(system.len(), 1);
        let first = system.iter().next().unwrap().clone();
        assert!(first.current.distance(first.start) < 1e-4);
        assert_eq!(first.alpha, 1.0);

        system.advance(2.5);
        let mid = system.iter().next().unwrap().clone();
        assert!(mid.alpha < 1.0 && mid.alpha > 0.0);
        assert!(mid.current.y < first.current.y);

        system.advance(3.5);
        assert!(system.is_empty());
    }

    #[test]
    fn bursts_add_three_to_five() {
        let v = vessel();
        let mut system = BubbleSystem::with_seed(3);
        for _ in 0..20 {
            let before = system.len();
            let added = system.spawn_burst(&v, 0.0, 0.0);
            assert!((3..=5).contains(&added));
            assert_eq!(system.len(), before + added);
        }
    }

    #[test]
    fn empty_vessel_spawns_nothing() {
        let mut system = BubbleSystem::with_seed(3);
        system.spawn(&Vessel::default(), 0.0, 0.0);
        assert_eq!(system.spawn_burst(&Vessel::default(), 0.0, 0.0), 0);
        assert!(system.is_empty());
    }
}
