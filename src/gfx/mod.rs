pub mod anim;
pub mod draw;
pub mod math;
