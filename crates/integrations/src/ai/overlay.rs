//! Local slogan rendering: white text with a black outline, centred near the
//! bottom edge, re-encoded as PNG.

use std::io::Cursor;
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use campaign_core::config::OverlayConfig;
use campaign_core::{CampaignError, CampaignResult};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::debug;

const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const OUTLINE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Tried in order when no font is configured.
pub const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn overlay_error(context: &str, err: impl std::fmt::Display) -> CampaignError {
    CampaignError::Ai(format!("{context}: {err}"))
}

/// First existing entry of [`SYSTEM_FONTS`].
pub fn discover_system_font() -> Option<&'static str> {
    SYSTEM_FONTS.iter().copied().find(|p| Path::new(p).is_file())
}

/// Shrink the scale so text of `text_width` at `size` fits in `max_width`.
pub(crate) fn fit_scale(size: f32, text_width: u32, max_width: u32) -> f32 {
    if text_width == 0 || text_width <= max_width {
        return size;
    }
    (size * max_width as f32 / text_width as f32).max(1.0)
}

/// Top-left corner for text centred horizontally, `margin` px above the bottom.
pub(crate) fn text_origin(
    width: u32,
    height: u32,
    text_width: u32,
    text_height: u32,
    margin: u32,
) -> (i32, i32) {
    let x = (width as i32 - text_width as i32) / 2;
    let y = height as i32 - text_height as i32 - margin as i32;
    (x, y)
}

pub(crate) fn decode_canvas(image: &[u8]) -> CampaignResult<RgbaImage> {
    image::load_from_memory(image)
        .map(|img| img.to_rgba8())
        .map_err(|e| overlay_error("cannot decode image for overlay", e))
}

pub(crate) fn encode_png(canvas: &RgbaImage) -> CampaignResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    canvas
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| overlay_error("cannot encode overlaid image", e))?;
    Ok(out.into_inner())
}

/// Draws campaign messages onto hero images.
pub struct TextOverlay {
    font: FontVec,
    font_size: f32,
    bottom_margin: u32,
    outline_px: i32,
}

impl TextOverlay {
    pub fn from_config(config: &OverlayConfig) -> CampaignResult<Self> {
        let path = match config.font_path.as_deref() {
            Some(path) => path,
            None => discover_system_font().ok_or_else(|| {
                CampaignError::Config(
                    "no overlay font found; set overlay.font_path to a TTF/OTF file".to_string(),
                )
            })?,
        };
        let bytes = std::fs::read(path)
            .map_err(|e| CampaignError::Config(format!("cannot read font {path}: {e}")))?;
        debug!(font = path, "Loaded overlay font");
        Self::from_font_bytes(bytes, config)
    }

    pub fn from_font_bytes(bytes: Vec<u8>, config: &OverlayConfig) -> CampaignResult<Self> {
        let font = FontVec::try_from_vec_and_index(bytes, 0)
            .map_err(|e| CampaignError::Config(format!("invalid overlay font: {e}")))?;
        Ok(Self {
            font,
            font_size: config.font_size,
            bottom_margin: config.bottom_margin,
            outline_px: config.outline_px,
        })
    }

    /// Render `text` onto a PNG/JPEG image and return PNG bytes of the same size.
    pub fn render(&self, image: &[u8], text: &str) -> CampaignResult<Vec<u8>> {
        let mut canvas = decode_canvas(image)?;
        let (width, height) = canvas.dimensions();

        let max_width = width.saturating_sub(2 * self.bottom_margin).max(1);
        let (natural_width, _) = text_size(PxScale::from(self.font_size), &self.font, text);
        let scale = PxScale::from(fit_scale(self.font_size, natural_width, max_width));
        let (text_width, text_height) = text_size(scale, &self.font, text);
        let (x, y) = text_origin(width, height, text_width, text_height, self.bottom_margin);

        let o = self.outline_px;
        for dx in [-o, 0, o] {
            for dy in [-o, 0, o] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (ox, oy) = (x + dx, y + dy);
                draw_text_mut(&mut canvas, OUTLINE_COLOR, ox, oy, scale, &self.font, text);
            }
        }
        draw_text_mut(&mut canvas, TEXT_COLOR, x, y, scale, &self.font, text);

        encode_png(&canvas)
    }
}
