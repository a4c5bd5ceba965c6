#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    // cubic-bezier(0.4, 0.0, 1.0, 1.0)
    FastOutLinearIn,
    Overshoot { tension: f32 },
    Decelerate { factor: f32 },
}

impl Easing {
    // t is clamped to 0..=1; Overshoot may still return more than 1
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::FastOutLinearIn => cubic_bezier(t, 0.4, 0.0, 1.0, 1.0),
            Easing::Overshoot { tension } => {
                let s = t - 1.0;
                s * s * ((tension + 1.0) * s + tension) + 1.0
            }
            Easing::Decelerate { factor } => {
                if factor == 1.0 {
                    1.0 - (1.0 - t) * (1.0 - t)
                } else {
                    1.0 - (1.0 - t).powf(2.0 * factor)
                }
            }
        }
    }
}

fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    // Newton-Raphson for the curve parameter whose x equals t
    let mut u = t;
    for _ in 0..8 {
        let x = bezier_component(u, x1, x2) - t;
        let slope = bezier_slope(u, x1, x2);
        if x.abs() < 1e-6 || slope.abs() < 1e-6 {
            break;
        }
        u = (u - x / slope).clamp(0.0, 1.0);
    }
    bezier_component(u, y1, y2)
}

fn bezier_component(u: f32, p1: f32, p2: f32) -> f32 {
    let mu = 1.0 - u;
    3.0 * mu * mu * u * p1 + 3.0 * mu * u * u * p2 + u * u * u
}

fn bezier_slope(u: f32, p1: f32, p2: f32) -> f32 {
    let mu = 1.0 - u;
    3.0 * mu * mu * p1 + 6.0 * mu * u * (p2 - p1) + 3.0 * u * u * (1.0 - p2)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[derive(Debug, Clone)]
pub struct Timeline {
    pub start_time: f32,
    pub start_offset: f32,
    pub duration: f32,
    pub current_time: f32,
    pub easing: Easing,
}

impl Timeline {
    pub fn new(duration: f32) -> Self {
        Self {
            start_time: 0.0,
            start_offset: 0.0,
            duration,
            current_time: 0.0,
            easing: Easing::Linear,
        }
    }

    pub fn with_offset(mut self, start_offset: f32) -> Self {
        self.start_offset = start_offset;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn start(&mut self, now: f32) {
        self.start_time = now;
        self.current_time = now;
    }

    pub fn update(&mut self, now: f32) {
        self.current_time = now;
    }

    pub fn has_started(&self) -> bool {
        self.current_time >= self.start_time + self.start_offset
    }

    pub fn progress(&self) -> f32 {
        let elapsed = self.current_time - self.start_time - self.start_offset;
        if self.duration <= 0.0 {
            return if elapsed >= 0.0 { 1.0 } else { 0.0 };
        }
        (elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn eased_progress(&self) -> f32 {
        self.easing.apply(self.progress())
    }
}
