pub mod app;
pub mod button;
pub mod config;
pub mod gfx;
