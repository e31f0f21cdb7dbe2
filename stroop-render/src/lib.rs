pub mod layout;
pub mod render;
pub mod text;

pub use layout::{Bounds, Layout, arrow_points};
pub use render::{FrameStats, Hud, Scene, SceneRenderer, SkiaRenderer, StartInfo};
pub use text::{DEFAULT_CACHE_LIMIT, TextCache, TextStyle, load_font, render_text_pixmap};
