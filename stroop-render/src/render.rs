use ab_glyph::FontVec;
use anyhow::{Result, anyhow, bail};
use std::time::Duration;
use stroop_core::{Direction, SessionStats, TrialResult, TrialSpec};
use stroop_timing::Timer;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

use crate::layout::{Bounds, Layout, arrow_points};
use crate::text::{TextCache, TextStyle};

const BG_TOP: [u8; 3] = [16, 24, 40];
const BG_BOTTOM: [u8; 3] = [12, 78, 120];
const CARD: [u8; 4] = [240, 248, 255, 255];
const TEXT: [u8; 4] = [20, 20, 30, 255];
const ACCENT: [u8; 4] = [255, 180, 85, 255];
const TRACK: [u8; 4] = [255, 255, 255, 30];
const CORRECT_GREEN: [u8; 4] = [20, 160, 80, 255];
const WRONG_RED: [u8; 4] = [220, 60, 60, 255];
const BUTTON: [u8; 4] = [30, 40, 60, 255];
const BUTTON_HOVER: [u8; 4] = [50, 70, 100, 255];
const ARROW: [u8; 4] = [60, 60, 80, 255];
const ARROW_DIM: [u8; 4] = [140, 140, 150, 255];
const WORD_DIM: [u8; 4] = [100, 100, 110, 255];
const OUTLINE: [u8; 4] = [0, 0, 0, 40];
const OVERLAY: [u8; 4] = [0, 0, 0, 80];

const TITLE_PX: f32 = 36.0;
const WORD_PX: f32 = 84.0;
const SMALL_PX: f32 = 22.0;
const BUTTON_PX: f32 = 28.0;

pub struct FrameStats {
    pub clear: Duration,
    pub scene: Duration,
    pub copy: Duration,
    pub total: Duration,
}

/// Progress line shown above every trial screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    /// 1-based
    pub trial: usize,
    pub total: usize,
    pub score: u32,
}

/// What the start screen advertises about the coming session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartInfo {
    pub trial_count: usize,
    pub stimulus_ms: f64,
    pub fixation_ms: f64,
    pub show_distractor: bool,
}

/// One frame's worth of game state, as the renderer needs it.
#[derive(Debug, Clone, Copy)]
pub enum Scene<'a> {
    Start(StartInfo),
    Fixation {
        hud: Hud,
    },
    Stimulus {
        hud: Hud,
        spec: &'a TrialSpec,
        show_distractor: bool,
        time_left_ms: f64,
        hovered: Option<Direction>,
    },
    Feedback {
        hud: Hud,
        result: &'a TrialResult,
        show_distractor: bool,
    },
    Finished {
        stats: &'a SessionStats,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Anchor {
    Center,
    TopLeft,
}

pub trait SceneRenderer {
    fn render_scene(&mut self, scene: &Scene<'_>) -> Result<()>;
}

/// Software renderer drawing into an offscreen pixmap that is copied to the
/// window's frame buffer once per frame.
pub struct SkiaRenderer {
    layout: Layout,
    canvas: Pixmap,
    // Opaque gradient, one entry per pixel; clearing is a single memcpy.
    background: Vec<[u8; 4]>,
    text_cache: TextCache,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, font: FontVec) -> Result<Self> {
        let mut renderer = SkiaRenderer {
            layout: Layout::new(width, height),
            canvas: new_canvas(width, height)?,
            background: Vec::new(),
            text_cache: TextCache::new(font),
        };
        renderer.background = gradient(width, height);
        Ok(renderer)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        self.canvas = new_canvas(new_width, new_height)?;
        self.layout = Layout::new(new_width, new_height);
        self.background = gradient(new_width, new_height);
        self.text_cache.clear();
        Ok(())
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    /// Draws `scene` and copies it into `frame_buffer` (RGBA8, same size as
    /// the canvas), recording the frame time on `timer`.
    pub fn render_frame<T: Timer>(
        &mut self,
        scene: &Scene<'_>,
        frame_buffer: &mut [u8],
        timer: &mut T,
    ) -> Result<FrameStats> {
        if frame_buffer.len() != self.canvas.data().len() {
            bail!(
                "frame buffer holds {} bytes, canvas needs {}",
                frame_buffer.len(),
                self.canvas.data().len()
            );
        }

        let t_clear = {
            let t = timer.now();
            self.clear();
            timer.elapsed(t)
        };
        let t_scene = {
            let t = timer.now();
            self.render_scene(scene)?;
            timer.elapsed(t)
        };
        // The canvas is opaque everywhere, so premultiplied equals straight RGBA.
        let t_copy = {
            let t = timer.now();
            frame_buffer.copy_from_slice(self.canvas.data());
            timer.elapsed(t)
        };

        let total = t_clear + t_scene + t_copy;
        timer.record_frame(total);
        Ok(FrameStats {
            clear: t_clear,
            scene: t_scene,
            copy: t_copy,
            total,
        })
    }

    fn clear(&mut self) {
        self.canvas
            .data_mut()
            .copy_from_slice(bytemuck::cast_slice(&self.background));
    }

    fn fill_path(&mut self, path: &Path, color: [u8; 4]) {
        self.canvas.fill_path(
            path,
            &paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn fill_rect(&mut self, b: Bounds, color: [u8; 4]) {
        if let Some(rect) = b.rect() {
            self.canvas
                .fill_rect(rect, &paint(color), Transform::identity(), None);
        }
    }

    fn fill_rounded(&mut self, b: Bounds, radius: f32, color: [u8; 4]) {
        if let Some(path) = rounded_rect(b, radius) {
            self.fill_path(&path, color);
        }
    }

    fn draw_text(&mut self, text: &str, style: TextStyle, pos: (f32, f32), anchor: Anchor) {
        let Some(pm) = self.text_cache.get_or_render(text, style) else {
            return;
        };
        let (x, y) = match anchor {
            Anchor::Center => (
                pos.0 - pm.width() as f32 * 0.5,
                pos.1 - pm.height() as f32 * 0.5,
            ),
            Anchor::TopLeft => pos,
        };
        self.canvas.draw_pixmap(
            x.round() as i32,
            y.round() as i32,
            (*pm).as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn draw_arrow(&mut self, center: (f32, f32), direction: Direction, color: [u8; 4]) {
        let points = arrow_points(center, self.layout.arrow_size, direction);
        let mut pb = PathBuilder::new();
        pb.move_to(points[0].0, points[0].1);
        for &(x, y) in &points[1..] {
            pb.line_to(x, y);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            return;
        };
        self.fill_path(&path, color);
        let stroke = Stroke {
            width: 2.0,
            ..Stroke::default()
        };
        self.canvas
            .stroke_path(&path, &paint(OUTLINE), &stroke, Transform::identity(), None);
    }

    fn draw_button(&mut self, direction: Direction, hot: bool) {
        let b = self.layout.button(direction);
        self.fill_rounded(b, 12.0, if hot { BUTTON_HOVER } else { BUTTON });
        self.fill_rounded(b.inset(3.0), 10.0, CARD);
        self.draw_text(
            direction.word(),
            TextStyle::new(BUTTON_PX, TEXT),
            b.center(),
            Anchor::Center,
        );
    }

    fn draw_hud(&mut self, hud: &Hud) {
        let bar = self.layout.progress_bar;
        self.fill_rounded(bar, 7.0, TRACK);
        if hud.total > 0 {
            let frac = (hud.trial as f32 / hud.total as f32).clamp(0.0, 1.0);
            self.fill_rounded(bar.with_width(bar.w * frac), 7.0, ACCENT);
        }
        let line = format!("Trial {}/{}    Score: {}", hud.trial, hud.total, hud.score);
        self.draw_text(
            &line,
            TextStyle::new(SMALL_PX, CARD),
            self.layout.hud_text,
            Anchor::TopLeft,
        );
    }

    fn draw_fixation(&mut self) {
        let (cx, cy) = self.layout.word_center;
        self.fill_rect(Bounds::new(cx - 14.0, cy - 2.5, 28.0, 5.0), CARD);
        self.fill_rect(Bounds::new(cx - 2.5, cy - 14.0, 5.0, 28.0), CARD);
    }

    /// Card, word and (optionally) arrow; shared by stimulus and feedback.
    fn draw_stimulus(&mut self, spec: &TrialSpec, show_distractor: bool, dimmed: bool) {
        self.fill_rounded(self.layout.card, 18.0, CARD);
        let word_color = if dimmed { WORD_DIM } else { TEXT };
        self.draw_text(
            spec.target.word(),
            TextStyle::new(WORD_PX, word_color),
            self.layout.word_center,
            Anchor::Center,
        );
        if show_distractor {
            let center = self.layout.arrow_center(spec.distractor_side);
            let color = if dimmed { ARROW_DIM } else { ARROW };
            self.draw_arrow(center, spec.distractor, color);
        }
    }

    fn render_start(&mut self, info: &StartInfo) {
        let cx = self.layout.center.0;
        self.draw_text(
            "Directional / Spatial Stroop",
            TextStyle::new(TITLE_PX, CARD),
            (cx, 120.0),
            Anchor::Center,
        );
        self.draw_text(
            "Respond to the WORD, not the arrow. Click or press Left / Right.",
            TextStyle::new(SMALL_PX, CARD),
            (cx, 170.0),
            Anchor::Center,
        );

        let card = self.layout.info_card;
        self.fill_rounded(card, 16.0, CARD);
        let lines = [
            format!(
                "Trials: {}    Stimulus: {}s    Fixation: {}s",
                info.trial_count,
                info.stimulus_ms / 1000.0,
                info.fixation_ms / 1000.0
            ),
            "Scoring: +1 for correct (word). Reaction time recorded.".to_owned(),
            "Controls: Click LEFT / RIGHT buttons or press Left and Right arrow keys.".to_owned(),
            if info.show_distractor {
                "Arrow distractor is shown to challenge spatial attention.".to_owned()
            } else {
                "Arrow distractor is hidden for this session.".to_owned()
            },
            "Press SPACE to start.".to_owned(),
        ];
        for (i, line) in lines.iter().enumerate() {
            self.draw_text(
                line,
                TextStyle::new(SMALL_PX, TEXT),
                (card.x + 28.0, card.y + 28.0 + i as f32 * 42.0),
                Anchor::TopLeft,
            );
        }
    }

    fn render_finished(&mut self, stats: &SessionStats) {
        let cx = self.layout.center.0;
        self.draw_text(
            "Session complete!",
            TextStyle::new(TITLE_PX, CARD),
            (cx, 120.0),
            Anchor::Center,
        );
        self.draw_text(
            &format!("Score: {} / {}", stats.score(), stats.total_trials),
            TextStyle::new(SMALL_PX, CARD),
            (cx, 180.0),
            Anchor::Center,
        );

        let mut lines = vec![
            format!("Trials: {}", stats.total_trials),
            match stats.mean_correct_reaction_time_ms() {
                Some(ms) => format!("Average RT (correct): {:.3} s", ms / 1000.0),
                None => "Average RT (correct): N/A".to_owned(),
            },
            format!(
                "Correct: {}    Wrong: {}    Too slow: {}",
                stats.correct, stats.wrong, stats.too_slow
            ),
        ];
        if let Some(effect) = stats.stroop_effect_ms() {
            lines.push(format!("Stroop effect: {effect:+.0} ms"));
        }
        lines.push("Press R to restart or Q to quit.".to_owned());

        for (i, line) in lines.iter().enumerate() {
            self.draw_text(
                line,
                TextStyle::new(SMALL_PX, CARD),
                (cx - 200.0, 240.0 + i as f32 * 40.0),
                Anchor::TopLeft,
            );
        }
    }
}

impl SceneRenderer for SkiaRenderer {
    fn render_scene(&mut self, scene: &Scene<'_>) -> Result<()> {
        match scene {
            Scene::Start(info) => self.render_start(info),
            Scene::Fixation { hud } => {
                self.draw_hud(hud);
                self.draw_fixation();
            }
            Scene::Stimulus {
                hud,
                spec,
                show_distractor,
                time_left_ms,
                hovered,
            } => {
                self.draw_hud(hud);
                self.draw_stimulus(spec, *show_distractor, false);
                for direction in Direction::ALL {
                    self.draw_button(direction, *hovered == Some(direction));
                }
                self.draw_text(
                    &format!("{:.2}s left", time_left_ms / 1000.0),
                    TextStyle::new(SMALL_PX, TEXT),
                    self.layout.countdown,
                    Anchor::TopLeft,
                );
            }
            Scene::Feedback {
                hud,
                result,
                show_distractor,
            } => {
                self.draw_hud(hud);
                self.draw_stimulus(&result.spec, *show_distractor, true);
                let full = Bounds::new(
                    0.0,
                    0.0,
                    self.layout.width as f32,
                    self.layout.height as f32,
                );
                self.fill_rect(full, OVERLAY);
                let color = if result.outcome.is_correct() {
                    CORRECT_GREEN
                } else {
                    WRONG_RED
                };
                self.draw_text(
                    result.outcome.label(),
                    TextStyle::new(TITLE_PX, color),
                    self.layout.center,
                    Anchor::Center,
                );
            }
            Scene::Finished { stats } => self.render_finished(stats),
        }
        Ok(())
    }
}

fn new_canvas(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height).ok_or_else(|| anyhow!("invalid canvas size {width}x{height}"))
}

fn paint(color: [u8; 4]) -> Paint<'static> {
    let mut p = Paint::default();
    p.set_color_rgba8(color[0], color[1], color[2], color[3]);
    p.anti_alias = true;
    p
}

/// Vertical gradient from `BG_TOP` to `BG_BOTTOM`, row-major RGBA.
fn gradient(width: u32, height: u32) -> Vec<[u8; 4]> {
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    let span = height.saturating_sub(1).max(1) as f32;
    for y in 0..height {
        let t = y as f32 / span;
        let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t) as u8;
        let px = [
            mix(BG_TOP[0], BG_BOTTOM[0]),
            mix(BG_TOP[1], BG_BOTTOM[1]),
            mix(BG_TOP[2], BG_BOTTOM[2]),
            255,
        ];
        pixels.extend(std::iter::repeat_n(px, width as usize));
    }
    pixels
}

fn rounded_rect(b: Bounds, radius: f32) -> Option<Path> {
    if b.w <= 0.0 || b.h <= 0.0 {
        return None;
    }
    let r = radius.min(b.w * 0.5).min(b.h * 0.5).max(0.0);
    let (x0, y0, x1, y1) = (b.x, b.y, b.x + b.w, b.y + b.h);
    let mut pb = PathBuilder::new();
    pb.move_to(x0 + r, y0);
    pb.line_to(x1 - r, y0);
    pb.quad_to(x1, y0, x1, y0 + r);
    pb.line_to(x1, y1 - r);
    pb.quad_to(x1, y1, x1 - r, y1);
    pb.line_to(x0 + r, y1);
    pb.quad_to(x0, y1, x0, y1 - r);
    pb.line_to(x0, y0 + r);
    pb.quad_to(x0, y0, x0 + r, y0);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::load_font;
    use stroop_core::Outcome;
    use stroop_timing::HighPrecisionTimer;

    #[test]
    fn gradient_runs_top_to_bottom() {
        let g = gradient(4, 3);
        assert_eq!(g.len(), 12);
        assert_eq!(g[0], [16, 24, 40, 255]);
        assert_eq!(g[11], [12, 78, 120, 255]);
        assert!(g.iter().all(|p| p[3] == 255));
    }

    #[test]
    fn single_row_gradient_uses_top_colour() {
        assert_eq!(gradient(2, 1), vec![[16, 24, 40, 255]; 2]);
    }

    #[test]
    fn rounded_rect_rejects_empty_boxes() {
        assert!(rounded_rect(Bounds::new(0.0, 0.0, 0.0, 10.0), 4.0).is_none());
        assert!(rounded_rect(Bounds::new(0.0, 0.0, 10.0, 10.0), 40.0).is_some());
    }

    fn renderer(w: u32, h: u32) -> Option<SkiaRenderer> {
        let font = load_font(None).ok()?;
        SkiaRenderer::new(w, h, font).ok()
    }

    #[test]
    fn every_scene_renders_into_the_frame() {
        let Some(mut r) = renderer(1000, 650) else {
            return; // headless box without fonts
        };
        let mut timer = HighPrecisionTimer::new();
        let mut frame = vec![0u8; 1000 * 650 * 4];
        let hud = Hud {
            trial: 3,
            total: 10,
            score: 2,
        };
        let spec = TrialSpec::incongruent(Direction::Left, Direction::Right);
        let result = TrialResult::new(2, spec, Some(Direction::Right), Some(480.0));
        assert_eq!(result.outcome, Outcome::Wrong);
        let mut stats = SessionStats::new(10);
        stats.record(&result);

        let scenes = [
            Scene::Start(StartInfo {
                trial_count: 10,
                stimulus_ms: 1200.0,
                fixation_ms: 500.0,
                show_distractor: true,
            }),
            Scene::Fixation { hud },
            Scene::Stimulus {
                hud,
                spec: &spec,
                show_distractor: true,
                time_left_ms: 640.0,
                hovered: Some(Direction::Left),
            },
            Scene::Feedback {
                hud,
                result: &result,
                show_distractor: true,
            },
            Scene::Finished { stats: &stats },
        ];
        for scene in &scenes {
            r.render_frame(scene, &mut frame, &mut timer).unwrap();
            assert!(frame.chunks_exact(4).all(|p| p[3] == 255));
        }
        assert_eq!(timer.frame_count(), scenes.len());
    }

    #[test]
    fn stimulus_card_is_drawn_over_background() {
        let Some(mut r) = renderer(1000, 650) else {
            return;
        };
        let spec = TrialSpec::congruent(Direction::Right, Direction::Right);
        r.render_scene(&Scene::Stimulus {
            hud: Hud {
                trial: 1,
                total: 1,
                score: 0,
            },
            spec: &spec,
            show_distractor: false,
            time_left_ms: 1000.0,
            hovered: None,
        })
        .unwrap();
        // Inside the card, away from the word.
        let px = r.canvas().pixel(160, 140).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (240, 248, 255));
    }

    #[test]
    fn title_text_lands_on_the_canvas() {
        let Some(mut r) = renderer(1000, 650) else {
            return;
        };
        r.render_scene(&Scene::Start(StartInfo {
            trial_count: 40,
            stimulus_ms: 1200.0,
            fixation_ms: 500.0,
            show_distractor: true,
        }))
        .unwrap();
        // Light title glyphs over the dark top of the gradient.
        let lit = (100..140)
            .flat_map(|y| (300..700).map(move |x| (x, y)))
            .filter_map(|(x, y)| r.canvas().pixel(x, y))
            .any(|px| px.red() > 200);
        assert!(lit);
    }

    #[test]
    fn mismatched_frame_buffer_is_an_error() {
        let Some(mut r) = renderer(20, 20) else {
            return;
        };
        let mut frame = vec![0u8; 10];
        let mut timer = HighPrecisionTimer::new();
        let scene = Scene::Fixation {
            hud: Hud {
                trial: 1,
                total: 1,
                score: 0,
            },
        };
        assert!(r.render_frame(&scene, &mut frame, &mut timer).is_err());
    }

    #[test]
    fn resize_rebuilds_canvas_and_layout() {
        let Some(mut r) = renderer(100, 100) else {
            return;
        };
        r.resize(1280, 720).unwrap();
        assert_eq!(r.canvas().width(), 1280);
        assert_eq!(r.layout().right_button.x, 970.0);
        assert!(r.resize(0, 10).is_err());
    }

    #[test]
    fn resize_drops_cached_text() {
        let Some(mut r) = renderer(200, 200) else {
            return;
        };
        r.render_scene(&Scene::Fixation {
            hud: Hud {
                trial: 1,
                total: 4,
                score: 0,
            },
        })
        .unwrap();
        assert!(!r.text_cache.is_empty());
        r.resize(300, 300).unwrap();
        assert!(r.text_cache.is_empty());
    }
}
