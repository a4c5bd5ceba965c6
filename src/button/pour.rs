use super::vessel::Vessel;
use super::TOUCH_BASE;

const BURST_CENTER: f32 = 0.2;
const BURST_RADIUS: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PourStream {
    pub top: f32,
    pub bottom: f32,
}

impl PourStream {
    pub fn reset(&mut self, vessel: &Vessel) {
        self.top = vessel.frame_top;
        self.bottom = vessel.frame_top;
    }

    pub fn compute_start(&mut self, vessel: &Vessel, t: f32) {
        self.bottom = if t < TOUCH_BASE {
            t / TOUCH_BASE * vessel.pour_height + vessel.frame_top
        } else {
            vessel.bottom
        };
    }

    pub fn compute_finish(&mut self, vessel: &Vessel, t: f32) -> bool {
        self.top = vessel.frame_top + 2.0 * vessel.radius * t;
        (t - BURST_CENTER).abs() <= BURST_RADIUS
    }
}

// non-zero only while overshoot pushes t past 1
pub fn bounce_offset(vessel: &Vessel, t: f32) -> f32 {
    if t < 1.0 {
        0.0
    } else {
        ((t - 1.0) * vessel.radius).round()
    }
}
