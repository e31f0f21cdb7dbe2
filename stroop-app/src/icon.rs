use anyhow::{Result, anyhow};
use stroop_core::Direction;
use stroop_render::arrow_points;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};
use winit::window::Icon;

const SIZE: u32 = 32;

/// Window icon: a light arrow on the button colour, drawn at startup.
pub fn window_icon() -> Result<Icon> {
    let rgba = icon_rgba()?;
    Ok(Icon::from_rgba(rgba, SIZE, SIZE)?)
}

fn icon_rgba() -> Result<Vec<u8>> {
    let mut pm = Pixmap::new(SIZE, SIZE).ok_or_else(|| anyhow!("icon pixmap"))?;
    pm.fill(tiny_skia::Color::from_rgba8(30, 40, 60, 255));

    let c = SIZE as f32 * 0.5;
    let points = arrow_points((c, c), SIZE as f32 * 0.5, Direction::Right);
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].0, points[0].1);
    for &(x, y) in &points[1..] {
        pb.line_to(x, y);
    }
    pb.close();
    let path = pb.finish().ok_or_else(|| anyhow!("icon path"))?;

    let mut paint = Paint::default();
    paint.set_color_rgba8(255, 180, 85, 255);
    paint.anti_alias = true;
    pm.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

    // Opaque, so the premultiplied bytes are already straight RGBA.
    Ok(pm.take())
}
