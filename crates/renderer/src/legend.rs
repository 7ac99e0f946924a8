//! Vertical color legend strip.

use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use tracing::{debug, warn};

use crate::colormap::{Colormap, Normalize};

/// Embedded font data - DejaVu Sans Mono
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

pub const LEGEND_WIDTH: u32 = 96;
pub const LEGEND_HEIGHT: u32 = 720;
pub const DEFAULT_TICKS: usize = 7;

const BAR_LEFT: u32 = 22;
const BAR_WIDTH: u32 = 24;
const BAR_TOP: u32 = 16;
const BAR_BOTTOM: u32 = LEGEND_HEIGHT - 16;
const TICK_LEN: u32 = 4;
const TICK_FONT_SIZE: f32 = 12.0;
const TITLE_FONT_SIZE: f32 = 13.0;
const TITLE_X: i64 = 4;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// What to draw besides the gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendStyle {
    pub title: String,
    pub ticks: usize,
}

impl LegendStyle {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ticks: DEFAULT_TICKS,
        }
    }
}

/// Render the legend; the top of the bar is `norm.vmax`.
pub fn render_legend(cmap: &Colormap, norm: Normalize, style: &LegendStyle) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(LEGEND_WIDTH, LEGEND_HEIGHT, WHITE);
    let bar_height = BAR_BOTTOM - BAR_TOP;

    for y in BAR_TOP..BAR_BOTTOM {
        // Row centers map onto [0, 1] bottom to top
        let t = (BAR_BOTTOM as f64 - y as f64 - 0.5) / bar_height as f64;
        let color = Rgba(cmap.rgba(t));
        for x in BAR_LEFT..BAR_LEFT + BAR_WIDTH {
            img.put_pixel(x, y, color);
        }
    }
    draw_frame(&mut img, BAR_LEFT - 1, BAR_TOP - 1, BAR_LEFT + BAR_WIDTH, BAR_BOTTOM);

    // Without a font the legend keeps its gradient and ticks
    let font = Font::try_from_bytes(FONT_DATA);
    if font.is_none() {
        warn!("Failed to load font for legend labels");
    }

    let tick_scale = Scale::uniform(TICK_FONT_SIZE);
    for (k, value) in tick_values(norm, style.ticks).into_iter().enumerate() {
        let frac = k as f64 / (style.ticks.max(2) - 1) as f64;
        let y = (BAR_BOTTOM as f64 - frac * bar_height as f64).round() as u32;
        let y = y.clamp(BAR_TOP, BAR_BOTTOM - 1);
        let x0 = BAR_LEFT + BAR_WIDTH;
        for x in x0..x0 + TICK_LEN {
            img.put_pixel(x, y, BLACK);
        }
        if let Some(font) = &font {
            let label = format_tick(value);
            let label_y = y as i32 - (TICK_FONT_SIZE / 2.0) as i32;
            draw_text_mut(
                &mut img,
                BLACK,
                (x0 + TICK_LEN + 2) as i32,
                label_y,
                tick_scale,
                font,
                &label,
            );
        }
    }

    if let Some(font) = &font {
        draw_title(&mut img, font, &style.title, BAR_TOP + bar_height / 2);
    }

    debug!(colormap = cmap.name(), vmin = norm.vmin, vmax = norm.vmax, "Rendered legend");

    img
}

/// Flat RGBA bytes of [`render_legend`].
pub fn legend_rgba(cmap: &Colormap, norm: Normalize, style: &LegendStyle) -> Vec<u8> {
    render_legend(cmap, norm, style).into_raw()
}

/// `ticks` values evenly spaced from vmin to vmax inclusive.
pub fn tick_values(norm: Normalize, ticks: usize) -> Vec<f64> {
    match ticks {
        0 => Vec::new(),
        1 => vec![norm.vmin],
        n => (0..n)
            .map(|k| norm.vmin + (norm.vmax - norm.vmin) * k as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// Whole numbers without decimals, everything else with one.
pub fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Title rotated to read bottom to top, centered on `center_y`.
fn draw_title(img: &mut RgbaImage, font: &Font, title: &str, center_y: u32) {
    let scale = Scale::uniform(TITLE_FONT_SIZE);
    let width = text_width(font, scale, title);
    if width == 0 {
        return;
    }

    let mut line = RgbaImage::from_pixel(width + 2, TITLE_FONT_SIZE as u32 + 2, WHITE);
    draw_text_mut(&mut line, BLACK, 1, 0, scale, font, title);
    let rotated = imageops::rotate270(&line);

    let top = center_y as i64 - rotated.height() as i64 / 2;
    imageops::replace(img, &rotated, TITLE_X, top.max(0));
}

/// Pixel width of `text` laid out on one line.
fn text_width(font: &Font, scale: Scale, text: &str) -> u32 {
    font.layout(text, scale, point(0.0, 0.0))
        .filter_map(|g| g.pixel_bounding_box())
        .map(|bb| bb.max.x.max(0) as u32)
        .max()
        .unwrap_or(0)
}

fn draw_frame(img: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32) {
    for x in x0..=x1 {
        img.put_pixel(x, y0, BLACK);
        img.put_pixel(x, y1, BLACK);
    }
    for y in y0..=y1 {
        img.put_pixel(x0, y, BLACK);
        img.put_pixel(x1, y, BLACK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm() -> Normalize {
        Normalize::new(0.0, 120.0).unwrap()
    }

    #[test]
    fn test_size_and_length() {
        let bytes = legend_rgba(&Colormap::turbo(), norm(), &LegendStyle::new("TEMPERATURE (°F)"));
        assert_eq!(bytes.len(), (LEGEND_WIDTH * LEGEND_HEIGHT * 4) as usize);
    }

    #[test]
    fn test_bar_runs_low_to_high() {
        let cmap = Colormap::turbo();
        let img = render_legend(&cmap, norm(), &LegendStyle::new("T"));
        let x = BAR_LEFT + BAR_WIDTH / 2;
        assert_eq!(img.get_pixel(x, BAR_BOTTOM - 1).0, cmap.rgba(0.0));
        assert_eq!(img.get_pixel(x, BAR_TOP).0, cmap.rgba(1.0));
    }

    #[test]
    fn test_frame_and_background() {
        let img = render_legend(&Colormap::turbo(), norm(), &LegendStyle::new(""));
        assert_eq!(*img.get_pixel(BAR_LEFT - 1, BAR_TOP + 10), BLACK);
        assert_eq!(*img.get_pixel(LEGEND_WIDTH - 1, 0), WHITE);
    }

    #[test]
    fn test_ticks() {
        assert_eq!(
            tick_values(norm(), 7),
            vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0, 120.0]
        );
        assert_eq!(format_tick(20.0), "20");
        assert_eq!(format_tick(12.5), "12.5");
        assert_eq!(format_tick(-3.0), "-3");
    }

    #[test]
    fn test_deterministic() {
        let style = LegendStyle::new("DEW POINT (°F)");
        let a = legend_rgba(&Colormap::turbo(), norm(), &style);
        let b = legend_rgba(&Colormap::turbo(), norm(), &style);
        assert_eq!(a, b);
    }

    fn dark_pixels(img: &RgbaImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y).0[0] < 128)
            .count()
    }

    #[test]
    fn test_embedded_font_loads() {
        assert!(Font::try_from_bytes(FONT_DATA).is_some());
    }

    #[test]
    fn test_tick_labels_are_drawn() {
        let img = render_legend(&Colormap::turbo(), norm(), &LegendStyle::new(""));
        let label_x = BAR_LEFT + BAR_WIDTH + TICK_LEN + 1;
        assert!(dark_pixels(&img, label_x..LEGEND_WIDTH, BAR_TOP..BAR_BOTTOM) > 0);
    }

    #[test]
    fn test_title_drawn_left_of_bar() {
        let cmap = Colormap::turbo();
        let blank = render_legend(&cmap, norm(), &LegendStyle::new(""));
        assert_eq!(dark_pixels(&blank, 0..BAR_LEFT - 1, 0..LEGEND_HEIGHT), 0);

        let titled = render_legend(&cmap, norm(), &LegendStyle::new("TEMPERATURE (°F)"));
        let center = BAR_TOP + (BAR_BOTTOM - BAR_TOP) / 2;
        assert!(dark_pixels(&titled, 0..BAR_LEFT - 1, center - 60..center + 60) > 0);
        assert_eq!(dark_pixels(&titled, 0..BAR_LEFT - 1, 0..BAR_TOP), 0);
    }
}
