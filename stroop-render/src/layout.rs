use stroop_core::Direction;
use tiny_skia::Rect;

/// Axis-aligned box in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn inset(&self, by: f32) -> Self {
        Self::new(
            self.x + by,
            self.y + by,
            (self.w - 2.0 * by).max(0.0),
            (self.h - 2.0 * by).max(0.0),
        )
    }

    pub fn with_width(&self, w: f32) -> Self {
        Self::new(self.x, self.y, w, self.h)
    }

    /// `None` for empty or non-finite boxes.
    pub fn rect(&self) -> Option<Rect> {
        if !(self.w > 0.0 && self.h > 0.0) {
            return None;
        }
        Rect::from_xywh(self.x, self.y, self.w, self.h)
    }
}

/// Where everything goes on a `width` x `height` canvas. Offsets are fixed
/// pixel distances from the edges and the centre, so the layout holds from
/// the classic 1000x650 window up to fullscreen.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub center: (f32, f32),
    pub word_center: (f32, f32),
    pub arrow_offset: f32,
    pub arrow_size: f32,
    pub card: Bounds,
    pub progress_bar: Bounds,
    pub hud_text: (f32, f32),
    pub countdown: (f32, f32),
    pub left_button: Bounds,
    pub right_button: Bounds,
    pub info_card: Bounds,
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let center = (w * 0.5, h * 0.5);
        let progress_bar = Bounds::new(130.0, 40.0, (w - 260.0).max(0.0), 14.0);
        Self {
            width,
            height,
            center,
            word_center: (center.0, center.1 - 20.0),
            arrow_offset: 220.0,
            arrow_size: 46.0,
            card: Bounds::new(140.0, 120.0, (w - 280.0).max(0.0), 360.0),
            hud_text: (progress_bar.x, progress_bar.y - 28.0),
            progress_bar,
            countdown: (center.0 - 40.0, h - 40.0),
            left_button: Bounds::new(130.0, h - 120.0, 180.0, 80.0),
            right_button: Bounds::new(w - 310.0, h - 120.0, 180.0, 80.0),
            info_card: Bounds::new(120.0, 220.0, (w - 240.0).max(0.0), 260.0),
        }
    }

    /// Centre of the distractor arrow drawn on `side` of the word.
    pub fn arrow_center(&self, side: Direction) -> (f32, f32) {
        let dx = match side {
            Direction::Left => -self.arrow_offset,
            Direction::Right => self.arrow_offset,
        };
        (self.center.0 + dx, self.center.1 - 10.0)
    }

    pub fn button(&self, direction: Direction) -> Bounds {
        match direction {
            Direction::Left => self.left_button,
            Direction::Right => self.right_button,
        }
    }

    /// The on-screen response button under a cursor position, if any.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.button(*d).contains(x, y))
    }
}

/// Six-point block arrow centred on `center`, `size` tall and 1.6x as wide.
pub fn arrow_points(center: (f32, f32), size: f32, direction: Direction) -> [(f32, f32); 6] {
    let (cx, cy) = center;
    let w = size * 1.6;
    let h = size;
    let notch = h * 0.2;
    // Mirror the right-pointing shape for left.
    let s = match direction {
        Direction::Right => 1.0,
        Direction::Left => -1.0,
    };
    [
        (cx - s * w / 2.0, cy - h / 2.0),
        (cx, cy - h / 2.0),
        (cx + s * w / 2.0, cy),
        (cx, cy + h / 2.0),
        (cx - s * w / 2.0, cy + h / 2.0),
        (cx - s * (w / 2.0 - notch), cy),
    ]
}
