pub mod bubble;
pub mod color;
pub mod pour;
pub mod tick;
pub mod vessel;
pub mod wave;

use crate::gfx::anim::{lerp, Easing, Timeline};
use crate::gfx::draw::{Renderer, Scaled};
use crate::gfx::math::{Color, Vec2};
use bubble::BubbleSystem;
use log::{debug, info};
use pour::PourStream;
use tick::Checkmark;
use vessel::Vessel;
use wave::{LiquidFrame, WaveSurface};

pub const TOUCH_BASE: f32 = 0.1;
pub const FINISH_POUR: f32 = 0.9;

const SCALE_DOWN_SIZE: f32 = 0.8;

pub trait PourFinishListener {
    fn on_pour_finish(&mut self);
}

impl<F: FnMut()> PourFinishListener for F {
    fn on_pour_finish(&mut self) {
        self()
    }
}

pub trait ButtonHost {
    fn set_clickable(&mut self, clickable: bool);
    fn invalidate(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pour,
    Bounce,
    Tick,
    ScaleDown,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Pour, Phase::Bounce, Phase::Tick, Phase::ScaleDown];

    pub fn duration(self) -> f32 {
        match self {
            Phase::Pour => 5.0,
            Phase::Bounce => 0.5,
            Phase::Tick => 0.8,
            Phase::ScaleDown => 0.5,
        }
    }

    pub fn start_offset(self) -> f32 {
        match self {
            Phase::Pour => 0.0,
            Phase::Bounce => Phase::Pour.duration(),
            Phase::Tick | Phase::ScaleDown => Phase::Pour.duration() + Phase::Bounce.duration(),
        }
    }

    pub fn easing(self) -> Easing {
        match self {
            Phase::Pour => Easing::FastOutLinearIn,
            Phase::Bounce => Easing::Overshoot { tension: 3.0 },
            Phase::Tick => Easing::Overshoot { tension: 2.0 },
            Phase::ScaleDown => Easing::Linear,
        }
    }

    fn timeline(self) -> Timeline {
        Timeline::new(self.duration())
            .with_offset(self.start_offset())
            .with_easing(self.easing())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    Idle,
    Pouring,
    Bouncing,
    // tick and scale-down run together
    Ticking,
}

#[derive(Debug, Clone)]
struct PhaseTrack {
    phase: Phase,
    timeline: Timeline,
    finished: bool,
}

impl PhaseTrack {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            timeline: phase.timeline(),
            finished: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Idle,
    Running { start: f32 },
}

pub struct LiquidButton {
    vessel: Vessel,
    mode: Mode,
    state: SequenceState,
    // the last frame persists after a run ends
    has_run: bool,
    tracks: [PhaseTrack; 4],

    color: Color,
    tick_color: Color,
    pour: PourStream,
    liquid: LiquidFrame,
    wave: WaveSurface,
    bubbles: BubbleSystem,
    checkmark: Checkmark,
    bounce_offset: f32,
    scale: f32,

    listener: Option<Box<dyn PourFinishListener>>,
}

impl LiquidButton {
    pub fn new() -> Self {
        Self::with_bubbles(BubbleSystem::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_bubbles(BubbleSystem::with_seed(seed))
    }

    fn with_bubbles(bubbles: BubbleSystem) -> Self {
        Self {
            vessel: Vessel::default(),
            mode: Mode::Idle,
            state: SequenceState::Idle,
            has_run: false,
            tracks: Phase::ALL.map(PhaseTrack::new),
            color: color::compute_color(0.0),
            tick_color: Color::WHITE,
            pour: PourStream::default(),
            liquid: LiquidFrame::default(),
            wave: WaveSurface::new(),
            bubbles,
            checkmark: Checkmark::new(),
            bounce_offset: 0.0,
            scale: 1.0,
            listener: None,
        }
    }

    pub fn set_pour_listener(&mut self, listener: impl PourFinishListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn set_tick_color(&mut self, color: Color) {
        self.tick_color = color;
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.set_vessel(Vessel::from_size(width, height));
    }

    pub fn set_bounds(&mut self, center: Vec2, radius: f32) {
        self.set_vessel(Vessel::from_bounds(center, radius));
    }

    fn set_vessel(&mut self, vessel: Vessel) {
        debug!("Vessel laid out: center={:?} radius={}", vessel.center, vessel.radius);
        self.vessel = vessel;
        if !self.has_run {
            self.pour.reset(&self.vessel);
            self.liquid.level = self.vessel.bottom;
        }
    }

    pub fn vessel(&self) -> &Vessel {
        &self.vessel
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.mode, Mode::Running { .. })
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn liquid(&self) -> &LiquidFrame {
        &self.liquid
    }

    pub fn pour_stream(&self) -> PourStream {
        self.pour
    }

    pub fn bubbles(&self) -> &BubbleSystem {
        &self.bubbles
    }

    pub fn checkmark(&self) -> &Checkmark {
        &self.checkmark
    }

    pub fn bounce_offset(&self) -> f32 {
        self.bounce_offset
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn phase_shift(&self) -> i32 {
        self.wave.phase_shift()
    }

    pub fn is_phase_finished(&self, phase: Phase) -> bool {
        self.tracks.iter().any(|t| t.phase == phase && t.finished)
    }

    pub fn start(&mut self, now: f32, host: &mut dyn ButtonHost) -> bool {
        if self.is_running() {
            debug!("Start ignored: sequence already running");
            return false;
        }

        self.wave.reset();
        self.checkmark.reset();
        self.bubbles.clear();
        self.pour.reset(&self.vessel);
        self.liquid = LiquidFrame {
            level: self.vessel.bottom,
            ..LiquidFrame::default()
        };
        self.color = color::compute_color(0.0);
        self.bounce_offset = 0.0;
        self.scale = 1.0;
        for track in &mut self.tracks {
            *track = PhaseTrack::new(track.phase);
            track.timeline.start(now);
        }

        self.mode = Mode::Running { start: now };
        self.state = SequenceState::Pouring;
        self.has_run = true;
        host.set_clickable(false);
        host.invalidate();
        info!("Pour sequence started at {:.3}s", now);
        true
    }

    pub fn update(&mut self, now: f32, host: &mut dyn ButtonHost) {
        let Mode::Running { start } = self.mode else {
            // bubbles outlive the sequence until their own timers run out
            if !self.bubbles.is_empty() {
                self.bubbles.advance(now);
                host.invalidate();
            }
            return;
        };

        for i in 0..self.tracks.len() {
            let track = &mut self.tracks[i];
            if track.finished {
                continue;
            }
            track.timeline.update(now);
            if !track.timeline.has_started() {
                continue;
            }
            let phase = track.phase;
            let t = track.timeline.eased_progress();
            let complete = track.timeline.is_complete();
            if complete {
                track.finished = true;
            }

            self.apply(phase, t, now);
            if complete {
                debug!("{:?} phase finished at {:.3}s", phase, now - start);
            }
        }

        self.bubbles.advance(now);
        host.invalidate();

        let state = self.current_state();
        if state != self.state {
            info!("Sequence {:?} -> {:?}", self.state, state);
            self.state = state;
        }

        if self.tracks.iter().all(|t| t.finished) {
            self.finish(now - start, host);
        }
    }

    fn apply(&mut self, phase: Phase, t: f32, now: f32) {
        match phase {
            Phase::Pour => {
                self.color = color::compute_color(t);
                self.pour.compute_start(&self.vessel, t);
                self.liquid = self.wave.compute(&self.vessel, t);
                if self.liquid.spawn_bubble {
                    self.bubbles.spawn(&self.vessel, self.liquid.level, now);
                }
            }
            Phase::Bounce => {
                if self.pour.compute_finish(&self.vessel, t) {
                    let count = self.bubbles.spawn_burst(&self.vessel, self.liquid.level, now);
                    debug!("Bubble burst of {} at bounce progress {:.3}", count, t);
                }
                self.bounce_offset = pour::bounce_offset(&self.vessel, t);
            }
            Phase::Tick => self.checkmark.compute(&self.vessel, t),
            Phase::ScaleDown => self.scale = lerp(1.0, SCALE_DOWN_SIZE, t),
        }
    }

    fn current_state(&self) -> SequenceState {
        if !self.is_phase_finished(Phase::Pour) {
            SequenceState::Pouring
        } else if !self.is_phase_finished(Phase::Bounce) {
            SequenceState::Bouncing
        } else {
            SequenceState::Ticking
        }
    }

    fn finish(&mut self, elapsed: f32, host: &mut dyn ButtonHost) {
        self.mode = Mode::Idle;
        self.state = SequenceState::Idle;
        info!("Pour sequence finished after {:.3}s", elapsed);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_pour_finish();
        }
        host.set_clickable(true);
    }

    pub fn render(&self, renderer: &mut dyn Renderer) {
        if !self.has_run || self.vessel.is_empty() {
            return;
        }
        let v = &self.vessel;
        let mut r = Scaled::new(renderer, v.center, self.scale);

        r.set_color(self.color);
        r.set_alpha(1.0);
        r.set_stroke_width(v.pour_stroke_width);
        r.draw_line(
            Vec2::new(v.center.x, self.pour.top),
            Vec2::new(v.center.x, self.pour.bottom),
        );

        for bubble in self.bubbles.iter() {
            r.set_alpha(bubble.alpha);
            r.draw_circle(bubble.current, bubble.radius);
        }
        r.set_alpha(1.0);

        if self.is_phase_finished(Phase::Pour) {
            r.draw_circle(Vec2::new(v.center.x, v.center.y + self.bounce_offset), v.radius);
            if self.is_phase_finished(Phase::Bounce) {
                r.set_color(self.tick_color);
                r.set_stroke_width(v.tick_stroke_width);
                r.draw_polyline(&self.checkmark.polyline(v));
            }
        } else if !self.liquid.path.elements().is_empty() {
            r.fill_path(&self.liquid.path, Some(v.silhouette()));
        }
    }
}

impl Default for LiquidButton {
    fn default() -> Self {
        Self::new()
    }
}
