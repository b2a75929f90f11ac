use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use vellum_engine::logging::{LoggingConfig, init_logging};
use vellum_engine::{
    BlurStyle, Canvas, Color, Device, FontdueTypeface, Gradient, Interpolation, LineCap, LineJoin, MaskFilter, Matrix,
    Paint, Path, PathDirection, PathEffect, RRect, RasterConfig, Rect, Shader, SoftwareDevice, Style, TextBlobBuilder,
    Vec2, color_set_argb,
};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let out = output_path("VELLUM_DEMO_OUT", "vellum-demo.png");
    let filter_out = output_path("VELLUM_DEMO_FILTER_OUT", "vellum-filter.png");
    let typeface = load_typeface()?;

    let mut canvas = new_canvas("demo")?;
    render(&mut canvas, typeface)?;
    save(canvas, &out)?;

    let mut canvas = new_canvas("filter")?;
    canvas.clear(Color::WHITE)?;
    draw_filter(&mut canvas)?;
    canvas.flush()?;
    save(canvas, &filter_out)?;
    Ok(())
}

fn output_path(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var).map_or_else(|| PathBuf::from(default), PathBuf::from)
}

fn new_canvas(name: &str) -> anyhow::Result<Canvas<SoftwareDevice>> {
    let device = SoftwareDevice::new(RasterConfig { background: Color::WHITE, ..RasterConfig::default() });
    Ok(Canvas::make(device, name, WIDTH, HEIGHT, 4)?)
}

fn save(canvas: Canvas<SoftwareDevice>, out: &std::path::Path) -> anyhow::Result<()> {
    let surface = canvas.surface().clone();
    let device = canvas.into_device();
    let pixmap = device.pixmap(&surface).context("demo surface missing from device")?;
    pixmap.save_png(out)?;
    log::info!("wrote {}", out.display());
    Ok(())
}

fn render<D: Device>(canvas: &mut Canvas<D>, typeface: Option<Arc<FontdueTypeface>>) -> anyhow::Result<()> {
    canvas.clear(Color::WHITE)?;

    draw_basic(canvas)?;

    canvas.save();
    canvas.translate(0.0, 300.0);
    draw_dash_star(canvas)?;
    canvas.restore()?;

    canvas.save();
    canvas.translate(300.0, 0.0);
    draw_discrete(canvas)?;
    canvas.restore()?;

    match typeface {
        Some(typeface) => {
            canvas.save();
            canvas.translate(520.0, 0.0);
            draw_text(canvas, typeface)?;
            canvas.restore()?;
        }
        None => log::info!("VELLUM_DEMO_FONT not set; skipping text"),
    }

    canvas.save();
    canvas.translate(400.0, 300.0);
    draw_gradients(canvas)?;
    canvas.restore()?;

    canvas.flush()?;
    Ok(())
}

fn draw_basic<D: Device>(canvas: &mut Canvas<D>) -> anyhow::Result<()> {
    let mut paint = Paint::fill(color_set_argb(255, 0x42, 0x85, 0xF4));
    let mut rect = Rect::from_xywh(10.0, 10.0, 100.0, 160.0);
    canvas.draw_rect(rect, &paint)?;

    let mut oval = RRect::from_oval(rect);
    oval.offset(40.0, 80.0);
    paint.set_color(color_set_argb(255, 0xDB, 0x44, 0x37));
    canvas.draw_rrect(&oval, &paint)?;

    paint.set_color(color_set_argb(255, 0x0F, 0x9D, 0x58));
    canvas.draw_circle(180.0, 50.0, 25.0, &paint)?;

    rect.offset(80.0, 50.0);
    paint.set_stroke_width(4.0);
    paint.set_style(Style::Stroke);
    paint.set_color(color_set_argb(255, 0xF4, 0xB4, 0x00));
    canvas.draw_round_rect(rect, 10.0, 10.0, &paint)?;
    Ok(())
}

fn draw_dash_star<D: Device>(canvas: &mut Canvas<D>) -> anyhow::Result<()> {
    let path = star();

    let mut paint = Paint::fill(color_set_argb(255, 150, 150, 255));
    canvas.draw_path(&path, &paint)?;

    let effect = PathEffect::dash(&[10.0, 10.0], 0.0)?;
    paint.set_stroke_cap(LineCap::Round);
    paint.set_stroke_join(LineJoin::Round);
    paint.set_color(color_set_argb(255, 0, 0, 255));
    paint.set_stroke_width(3.0);
    paint.set_style(Style::Stroke);
    paint.set_path_effect(Some(effect.clone()));
    canvas.draw_path(&path, &paint)?;

    effect.release();
    Ok(())
}

fn draw_discrete<D: Device>(canvas: &mut Canvas<D>) -> anyhow::Result<()> {
    const R: f32 = 115.2;
    const C: f32 = 128.0;

    let mut path = Path::new();
    path.move_to(C + R, C);
    for i in 1..8 {
        let a = 2.692_793_7 * i as f32;
        path.line_to(C + R * a.cos(), C + R * a.sin());
    }

    let effect = PathEffect::discrete(10.0, 4.0, 0)?;
    let mut paint = Paint::stroke(color_set_argb(255, 0x42, 0x85, 0xF4), 2.0);
    paint.set_path_effect(Some(effect.clone()));
    canvas.draw_path(&path, &paint)?;

    effect.release();
    Ok(())
}

fn draw_text<D: Device>(canvas: &mut Canvas<D>, typeface: Arc<FontdueTypeface>) -> anyhow::Result<()> {
    let mut paint = Paint::fill(color_set_argb(255, 0x42, 0x85, 0xF4));
    paint.set_text_size(64.0);
    paint.set_typeface(Some(typeface));

    let blob = TextBlobBuilder::new().build_text_blob("Vellum", &paint)?;
    canvas.draw_text_blob(&blob, 20.0, 64.0, &paint)?;

    paint.set_style(Style::Stroke);
    paint.set_color(color_set_argb(255, 0xDB, 0x44, 0x37));
    paint.set_stroke_width(2.0);
    canvas.draw_text_blob(&blob, 20.0, 144.0, &paint)?;

    let colors = [
        Color(color_set_argb(255, 0, 255, 255)),
        Color(color_set_argb(255, 0, 0, 255)),
        Color(color_set_argb(255, 255, 0, 0)),
    ];
    let shader = Shader::linear(Vec2::new(0.0, 0.0), Vec2::new(200.0, 0.0), &colors)?;
    paint.set_shader(Some(shader.clone()));
    paint.set_style(Style::Fill);
    canvas.draw_text_blob(&blob, 20.0, 224.0, &paint)?;

    shader.release();
    blob.release();

    paint.set_shader(None);
    paint.set_text_size(18.0);
    paint.set_color(color_set_argb(255, 0x0F, 0x9D, 0x58));
    canvas.draw_simple_text("drawn without a blob", 20.0, 270.0, &paint)?;
    Ok(())
}

/// Four linear gradient blocks (right column premultiplied, bottom row
/// rotated 45 degrees about its corner) and a radial gradient disc.
fn draw_gradients<D: Device>(canvas: &mut Canvas<D>) -> anyhow::Result<()> {
    let colors = [Color(0x0000_FFFF), Color(0xFF00_00FF), Color(0xFFFF_0000)];
    let positions = [0.0, 0.65, 1.0];
    let mut paint = Paint::new();

    for i in 0..4 {
        let bx = (i % 2) as f32 * 100.0;
        let by = (i / 2) as f32 * 100.0;
        let mut gradient =
            Gradient::linear_with_pos(Vec2::new(bx, by), Vec2::new(bx + 50.0, by + 100.0), &colors, &positions)?;
        if i % 2 == 1 {
            gradient = gradient.with_interpolation(Interpolation::Premul);
        }
        if i / 2 == 1 {
            gradient = gradient.with_local_matrix(Matrix::rotate_about(45.0, bx, by));
        }
        let shader = Shader::from_gradient(gradient);
        paint.set_shader(Some(shader.clone()));
        canvas.draw_rect(Rect::from_ltrb(bx, by, bx + 100.0, by + 100.0), &paint)?;
        shader.release();
    }

    let circle = Path::circle(220.0, 350.0, 100.0, PathDirection::Cw)?;
    let radial = Shader::radial(Vec2::new(220.0, 350.0), 150.0, &[Color::WHITE, Color::BLACK])?;
    paint.set_shader(Some(radial.clone()));
    canvas.draw_path(&circle, &paint)?;
    radial.release();
    Ok(())
}

/// Blur mask filters: a stroked curve, one circle per style and a
/// blurred star.
fn draw_filter<D: Device>(canvas: &mut Canvas<D>) -> anyhow::Result<()> {
    let mut paint = Paint::stroke(Color(0xFF42_85F4), 18.0);
    paint.set_stroke_cap(LineCap::Round);
    paint.set_mask_filter(Some(MaskFilter::blur(BlurStyle::Normal, 10.0)?));

    let mut curve = Path::new();
    curve.move_to(10.0, 10.0).quad_to(256.0, 64.0, 128.0, 128.0).quad_to(10.0, 192.0, 250.0, 250.0);
    canvas.draw_path(&curve, &paint)?;

    paint.set_style(Style::Fill);
    for (dx, style) in [(50.0, BlurStyle::Normal), (200.0, BlurStyle::Outer), (350.0, BlurStyle::Inner)] {
        paint.set_mask_filter(Some(MaskFilter::blur(style, 20.0)?));
        canvas.save();
        canvas.translate(dx, 0.0);
        canvas.draw_circle(300.0, 100.0, 50.0, &paint)?;
        canvas.restore()?;
    }

    paint.set_mask_filter(Some(MaskFilter::blur(BlurStyle::Normal, 10.0)?));
    canvas.save();
    canvas.translate(300.0, 200.0);
    canvas.draw_path(&star(), &paint)?;
    canvas.restore()?;
    Ok(())
}

fn star() -> Path {
    let mut path = Path::new();
    path.move_to(199.0, 34.0)
        .line_to(253.0, 143.0)
        .line_to(374.0, 160.0)
        .line_to(287.0, 244.0)
        .line_to(307.0, 365.0)
        .line_to(199.0, 309.0)
        .line_to(97.0, 365.0)
        .line_to(112.0, 245.0)
        .line_to(26.0, 161.0)
        .line_to(146.0, 143.0)
        .close();
    path
}

fn load_typeface() -> anyhow::Result<Option<Arc<FontdueTypeface>>> {
    let Some(path) = std::env::var_os("VELLUM_DEMO_FONT") else {
        return Ok(None);
    };
    let bytes = std::fs::read(&path).with_context(|| format!("reading font {}", path.to_string_lossy()))?;
    let typeface = FontdueTypeface::from_bytes(&bytes)?;
    Ok(Some(Arc::new(typeface)))
}
