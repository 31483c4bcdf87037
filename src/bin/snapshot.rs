//! Renders a button offscreen and compares it with a golden image.
//!
//! Usage: `snapshot <font.ttf> [theme.json] [style-name]`

use anyhow::{anyhow, Context};
use image::{ImageReader, RgbaImage};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tuber::backend::WgpuRenderer;
use tuber::style::{DrawState, PropertyValue, Style};
use tuber::text::FontManager;
use tuber::theme::Theme;
use tuber::utils::{Color, Rectangle};
use tuber::widgets::{Button, Element};

const WIDTH: u32 = 200;
const HEIGHT: u32 = 80;

fn fallback_style() -> Style {
    let mut style = Style::new("button");
    let normal = [
        ("background-color", Color::from_rgba8(0x30, 0x30, 0x30, 0xff)),
        ("border-color", Color::from_rgba8(0x80, 0x80, 0x80, 0xff)),
        ("color", Color::from_rgba8(0xe0, 0xe0, 0xe0, 0xff)),
    ];
    for (prop, color) in normal {
        style.set(DrawState::Normal, prop, PropertyValue::Color(color));
    }
    style.set(
        DrawState::Hover,
        "border-color",
        PropertyValue::Color(Color::WHITE),
    );
    style
}

fn compare_with_tolerance(a_path: &Path, b_path: &Path, tolerance: u8) -> anyhow::Result<bool> {
    let a = ImageReader::open(a_path)?.decode()?.to_rgba8();
    let b = ImageReader::open(b_path)?.decode()?.to_rgba8();

    if a.dimensions() != b.dimensions() {
        return Ok(false);
    }
    Ok(a.pixels().zip(b.pixels()).all(|(pa, pb)| {
        (0..4).all(|i| pa.0[i].abs_diff(pb.0[i]) <= tolerance)
    }))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let font_path = PathBuf::from(args.next().ok_or_else(|| anyhow!("missing font path"))?);
    let theme_path = args.next().map(PathBuf::from);
    let style_name = args.next().unwrap_or_else(|| "button".to_string());

    let mut gpu = WgpuRenderer::headless(WIDTH, HEIGHT)?;
    gpu.set_clear_color(Color::rgba(0.1, 0.1, 0.1, 1.0));

    let font_data =
        fs::read(&font_path).with_context(|| format!("reading {}", font_path.display()))?;
    let mut fm = FontManager::new(&mut gpu, 512)?;
    fm.load_font(&mut gpu, &font_data, 16.0)?;
    let fm = Rc::new(fm);

    let style = match theme_path {
        Some(path) => Theme::load(&path)?
            .style(&style_name)
            .ok_or_else(|| anyhow!("theme has no style {:?}", style_name))?,
        None => Rc::new(fallback_style()),
    };

    let mut button = Button::new(&mut gpu, fm, style, "Snapshot", None)?;
    button.update_style(&mut gpu)?;
    button.layout(&mut gpu, Rectangle::new(20.0, 16.0, 160.0, 48.0))?;
    button.draw(&mut gpu);
    info!("queued {} draws", gpu.queued_draws());

    let target = gpu.create_target();
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());
    gpu.render(&view);
    let pixels = gpu.read_rgba(&target)?;

    fs::create_dir_all("snapshots/actual")?;
    fs::create_dir_all("snapshots/golden")?;
    let out_actual = Path::new("snapshots/actual/button.png");
    let out_golden = Path::new("snapshots/golden/button.png");

    RgbaImage::from_raw(WIDTH, HEIGHT, pixels)
        .ok_or_else(|| anyhow!("readback size mismatch"))?
        .save(out_actual)?;

    if !out_golden.exists() {
        fs::copy(out_actual, out_golden)?;
        println!("golden created at {}", out_golden.display());
        return Ok(());
    }

    if compare_with_tolerance(out_actual, out_golden, 3)? {
        println!("snapshot OK for button.png");
    } else {
        println!("snapshot mismatch for button.png");
    }
    Ok(())
}
