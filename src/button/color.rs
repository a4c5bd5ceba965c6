use super::{FINISH_POUR, TOUCH_BASE};
use crate::gfx::math::Color;

const LIQUID_BLUE: u8 = 24;

pub fn compute_color(t: f32) -> Color {
    let red = if t <= FINISH_POUR {
        255
    } else {
        channel(255.0 * (1.0 - (t - FINISH_POUR) / TOUCH_BASE))
    };
    let green = if t >= FINISH_POUR {
        255
    } else {
        channel(255.0 * t / FINISH_POUR)
    };
    Color::rgb(red, green, LIQUID_BLUE)
}

fn channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
