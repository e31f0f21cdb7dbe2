use ab_glyph::FontVec;
use anyhow::{Context, Result, anyhow};
use pixels::{Pixels, SurfaceTexture};
use serde_json::json;
use std::sync::Arc;
use stroop_core::{Direction, RunnerState};
use stroop_experiment::{SessionConfig, TrialRunner};
use stroop_render::{Hud, Scene, SkiaRenderer, StartInfo};
use stroop_timing::{HighPrecisionTimer, Timer};
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Icon, Window, WindowId},
};

use crate::icon;

const WINDOW_WIDTH: u32 = 1000;
const WINDOW_HEIGHT: u32 = 650;

enum Screen {
    Start,
    Running(TrialRunner),
    Finished(TrialRunner),
}

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    // Handed to the renderer once the window exists.
    font: Option<FontVec>,
    config: SessionConfig,
    screen: Screen,
    timer: HighPrecisionTimer,
    icon: Icon,
    fullscreen: bool,
    cursor: Option<(f32, f32)>,
    // First directional input since the last frame.
    pending_input: Option<Direction>,
    sessions: usize,
}

impl App {
    pub fn new(config: SessionConfig, font: FontVec, fullscreen: bool) -> Result<Self> {
        Ok(Self {
            window: None,
            pixels: None,
            renderer: None,
            font: Some(font),
            config,
            screen: Screen::Start,
            timer: HighPrecisionTimer::new(),
            icon: icon::window_icon()?,
            fullscreen,
            cursor: None,
            pending_input: None,
            sessions: 0,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!("press SPACE to start, ESC to quit");
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut attributes = Window::default_attributes()
            .with_title("Directional Stroop")
            .with_resizable(false)
            .with_window_icon(Some(self.icon.clone()));
        if self.fullscreen {
            let monitor = event_loop
                .primary_monitor()
                .or_else(|| event_loop.available_monitors().next())
                .ok_or_else(|| anyhow!("no monitor available"))?;
            if let Some(mhz) = monitor.refresh_rate_millihertz() {
                info!(refresh_hz = mhz as f64 / 1000.0, "fullscreen monitor");
            }
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))));
        } else {
            attributes =
                attributes.with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale_factor = window.scale_factor(),
            "window created"
        );

        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface)?);

        let font = self
            .font
            .take()
            .ok_or_else(|| anyhow!("renderer already created"))?;
        self.renderer = Some(SkiaRenderer::new(size.width, size.height, font)?);

        window.set_cursor_visible(true);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn start_session(&mut self) -> Result<()> {
        let runner = TrialRunner::from_config(self.config.clone())
            .context("starting session")?;
        self.sessions += 1;
        self.pending_input = None;
        let calibration = self.timer.calibration_stats();
        info!(
            frames = self.timer.frame_count(),
            fps = calibration.effective_fps,
            resolution_ms = calibration.resolution_ms(),
            "frame timing before session"
        );
        self.timer.reset_frames();
        info!(session = self.sessions, "session started");
        self.screen = Screen::Running(runner);
        Ok(())
    }

    fn restart(&mut self) {
        if matches!(self.screen, Screen::Running(_)) {
            info!(session = self.sessions, "session abandoned");
        }
        self.pending_input = None;
        self.screen = Screen::Start;
    }

    /// Steps the running session with this frame's input.
    fn update(&mut self) {
        let input = self.pending_input.take();
        let now_ms = self.timer.now_ms();
        let Screen::Running(runner) = &mut self.screen else {
            return;
        };
        let state = runner.advance(now_ms, input);
        if state.is_conclusion() {
            if let Some(result) = runner.last_result() {
                debug!(
                    trial = result.index,
                    outcome = result.outcome.label(),
                    rt_ms = ?result.reaction_time_ms,
                    "trial concluded"
                );
            }
        }
        if state.is_done() {
            let Screen::Running(runner) = std::mem::replace(&mut self.screen, Screen::Start)
            else {
                return;
            };
            self.log_summary(&runner);
            self.screen = Screen::Finished(runner);
        }
    }

    fn log_summary(&self, runner: &TrialRunner) {
        let stats = runner.stats();
        let summary = json!({
            "session": self.sessions,
            "trials": stats.total_trials,
            "correct": stats.correct,
            "wrong": stats.wrong,
            "too_slow": stats.too_slow,
            "accuracy": stats.accuracy(),
            "mean_rt_ms": stats.mean_reaction_time_ms(),
            "mean_correct_rt_ms": stats.mean_correct_reaction_time_ms(),
            "mean_congruent_rt_ms": stats.mean_congruent_reaction_time_ms(),
            "mean_incongruent_rt_ms": stats.mean_incongruent_reaction_time_ms(),
            "stroop_effect_ms": stats.stroop_effect_ms(),
            "results": runner.results(),
        });
        info!(summary = %summary, "session complete");

        let calibration = self.timer.calibration_stats();
        info!(
            frames = self.timer.frame_count(),
            avg_frame_ms = calibration.average_frame_time_ns / 1e6,
            jitter_ms = calibration.jitter_ns / 1e6,
            resolution_ms = calibration.resolution_ms(),
            "render timing"
        );
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };
        let now_ms = self.timer.now_ms();
        let hovered = self
            .cursor
            .and_then(|(x, y)| renderer.layout().hit_test(x, y));

        let scene = match &self.screen {
            Screen::Start => Scene::Start(StartInfo {
                trial_count: self.config.trial_count,
                stimulus_ms: self.config.stimulus_duration_ms,
                fixation_ms: self.config.fixation_duration_ms,
                show_distractor: self.config.show_distractor,
            }),
            Screen::Running(runner) => running_scene(runner, now_ms, hovered),
            Screen::Finished(runner) => Scene::Finished {
                stats: runner.stats(),
            },
        };

        let stats = renderer.render_frame(&scene, pixels.frame_mut(), &mut self.timer)?;
        let t = self.timer.now();
        pixels.render()?;
        trace!(
            present_ms = self.timer.elapsed(t).as_secs_f64() * 1e3,
            clear_ms = stats.clear.as_secs_f64() * 1e3,
            scene_ms = stats.scene.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            total_ms = stats.total.as_secs_f64() * 1e3,
            "frame"
        );
        Ok(())
    }

    fn submit(&mut self, direction: Direction) {
        if let Screen::Running(runner) = &self.screen {
            queue_input(&mut self.pending_input, runner.state(), direction);
        }
    }

    fn handle_key(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match code {
            KeyCode::Escape => self.exit(event_loop),
            KeyCode::ArrowLeft => self.submit(Direction::Left),
            KeyCode::ArrowRight => self.submit(Direction::Right),
            KeyCode::Space if matches!(self.screen, Screen::Start) => self.try_start(event_loop),
            KeyCode::KeyR => self.restart(),
            KeyCode::KeyQ if matches!(self.screen, Screen::Finished(_)) => self.exit(event_loop),
            _ => {}
        }
    }

    fn handle_click(&mut self, event_loop: &ActiveEventLoop) {
        match self.screen {
            Screen::Start => self.try_start(event_loop),
            Screen::Running(_) => {
                let hit = self.cursor.zip(self.renderer.as_ref()).and_then(
                    |((x, y), renderer)| renderer.layout().hit_test(x, y),
                );
                if let Some(direction) = hit {
                    self.submit(direction);
                }
            }
            Screen::Finished(_) => {}
        }
    }

    fn try_start(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.start_session() {
            error!(error = ?e, "could not start session");
            self.exit(event_loop);
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize renderer");
            }
        }
        debug!(width = new_size.width, height = new_size.height, "resized");
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Screen::Running(runner) = &self.screen {
            let (trial, total) = runner.progress();
            info!(trial, total, "quit during session");
        }
        event_loop.exit();
    }
}

fn hud(runner: &TrialRunner) -> Hud {
    let (trial, total) = runner.progress();
    Hud {
        trial,
        total,
        score: runner.stats().score(),
    }
}

/// Keeps the first directional input of a frame, and only while the runner
/// accepts one.
fn queue_input(pending: &mut Option<Direction>, state: RunnerState, direction: Direction) {
    if state.allows_input() && pending.is_none() {
        *pending = Some(direction);
    }
}

fn running_scene(runner: &TrialRunner, now_ms: f64, hovered: Option<Direction>) -> Scene<'_> {
    let hud = hud(runner);
    let show_distractor = runner.config().show_distractor;
    match runner.state() {
        RunnerState::StimulusWait => Scene::Stimulus {
            hud,
            spec: runner.current_trial(),
            show_distractor,
            time_left_ms: runner.time_left_ms(now_ms).unwrap_or(0.0),
            hovered,
        },
        RunnerState::SessionDone => Scene::Finished {
            stats: runner.stats(),
        },
        state if state.shows_feedback() => match runner.last_result() {
            Some(result) => Scene::Feedback {
                hud,
                result,
                show_distractor,
            },
            None => Scene::Fixation { hud },
        },
        _ => Scene::Fixation { hud },
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!(error = ?e, "failed to create window and surface");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.exit(event_loop),
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    error!(error = ?e, "frame failed");
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                self.handle_key(event.physical_key, event_loop);
            }
            WindowEvent::CursorMoved {
                position: PhysicalPosition { x, y },
                ..
            } => self.cursor = Some((x as f32, y as f32)),
            WindowEvent::CursorLeft { .. } => self.cursor = None,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.handle_click(event_loop),
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }
}
