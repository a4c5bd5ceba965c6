use crate::button::{ButtonHost, LiquidButton};
use crate::config::Config;
use crate::gfx::draw::Framebuffer;
use crate::gfx::math::Color;
use anyhow::Result;
use log::{debug, info};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

// guards against a completion callback that never fires
const MAX_RUN_SECONDS: f32 = 30.0;

#[derive(Debug)]
pub struct HostState {
    pub clickable: bool,
    pub redraw_requested: bool,
}

impl ButtonHost for HostState {
    fn set_clickable(&mut self, clickable: bool) {
        debug!("Button clickable: {}", clickable);
        self.clickable = clickable;
    }

    fn invalidate(&mut self) {
        self.redraw_requested = true;
    }
}

pub struct App {
    pub config: Config,
    pub button: LiquidButton,
    pub host: HostState,
    pub framebuffer: Framebuffer,
    pub time: f32,
    pub frame: u64,
    background: Color,
    finished: Rc<Cell<bool>>,
    written: Vec<PathBuf>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let background = config.background_color()?;
        let tick_color = config.tick_color()?;

        let mut button = match config.seed {
            Some(seed) => LiquidButton::with_seed(seed),
            None => LiquidButton::new(),
        };
        button.set_size(config.size.width as f32, config.size.height as f32);
        button.set_tick_color(tick_color);

        let finished = Rc::new(Cell::new(false));
        let flag = finished.clone();
        button.set_pour_listener(move || {
            info!("Pour finished");
            flag.set(true);
        });

        let framebuffer = Framebuffer::new(config.size.width, config.size.height)?;

        Ok(Self {
            config,
            button,
            host: HostState {
                clickable: true,
                redraw_requested: false,
            },
            framebuffer,
            time: 0.0,
            frame: 0,
            background,
            finished,
            written: Vec::new(),
        })
    }

    pub fn click(&mut self) -> bool {
        if !self.host.clickable {
            debug!("Click ignored: button disabled");
            return false;
        }
        self.button.start(self.time, &mut self.host)
    }

    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.button.update(self.time, &mut self.host);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    pub fn written_frames(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn render(&mut self) -> bool {
        if !self.host.redraw_requested {
            return false;
        }
        self.host.redraw_requested = false;
        self.framebuffer.clear(self.background);
        self.button.render(&mut self.framebuffer);
        self.framebuffer.present();
        self.frame += 1;
        true
    }

    fn write_frame(&mut self) -> Result<()> {
        let dir = &self.config.output.dir;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("frame_{:05}.png", self.frame));
        self.framebuffer.save_png(&path)?;
        debug!(
            "Wrote {} ({}x{})",
            path.display(),
            self.framebuffer.width(),
            self.framebuffer.height()
        );
        self.written.push(path);
        Ok(())
    }

    pub fn run(&mut self) -> Result<()> {
        let stride = self.config.output.frame_stride as u64;
        let dt = self.config.frame_interval();

        self.click();
        self.render();

        while !self.is_finished() || !self.button.bubbles().is_empty() {
            if self.time > MAX_RUN_SECONDS {
                anyhow::bail!("Pour sequence did not finish within {}s", MAX_RUN_SECONDS);
            }
            self.update(dt);
            if self.render() && stride > 0 && self.frame % stride == 0 {
                self.write_frame()?;
            }
        }

        // settled final state
        if stride > 0 {
            self.write_frame()?;
        }
        info!(
            "Rendered {} frames over {:.2}s, wrote {}",
            self.frame,
            self.time,
            self.written.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::SequenceState;

    fn config() -> Config {
        let mut config = Config::default();
        config.size.width = 80;
        config.size.height = 80;
        config.seed = Some(5);
        config.output.frame_stride = 0;
        config
    }

    #[test]
    fn clicks_are_ignored_while_pouring() {
        let mut app = App::new(config()).unwrap();
        assert!(app.click());
        assert!(!app.host.clickable);
        app.update(0.1);
        assert!(!app.click());
        assert_eq!(app.button.state(), SequenceState::Pouring);
    }

    #[test]
    fn run_completes_and_reenables_clicks() {
        let mut app = App::new(config()).unwrap();
        app.run().unwrap();
        assert!(app.is_finished());
        assert!(app.host.clickable);
        assert!(app.frame > 300);
        assert!(app.written_frames().is_empty());
        assert!(app.time < 7.0);
    }

    #[test]
    fn final_frame_shows_the_green_ball() {
        let mut app = App::new(config()).unwrap();
        app.run().unwrap();
        // ball centre, off the checkmark strokes
        let p = app.framebuffer.pixel(40, 30).unwrap();
        assert_eq!((p.r, p.g, p.b), (0, 255, 24));
        let corner = app.framebuffer.pixel(0, 0).unwrap();
        assert_eq!((corner.r, corner.g, corner.b), (0x1a, 0x1a, 0x1a));
    }

    #[test]
    fn idle_app_draws_nothing() {
        let mut app = App::new(config()).unwrap();
        app.update(0.1);
        assert!(!app.render());
    }
}
