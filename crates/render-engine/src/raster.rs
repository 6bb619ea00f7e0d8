//! Still-image rasterizer.
//!
//! Paints placements onto an RGBA canvas at `pixel_ratio` output pixels per
//! logical pixel. Each image is cover-fitted to its cell, then panned,
//! rotated and magnified about the cell centre, and clipped to the cell's
//! rounded rectangle.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use collage_common::{CollageError, CollageResult};
use collage_layout::Rect;
use collage_project_model::{MediaItem, MediaSource, Transform};
use image::{ImageFormat, Pixel, Rgba, RgbaImage};

use crate::color::{color_or, parse_hex_color};
use crate::compositor::{Canvas, CellPlacement};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Output pixel size of a logical canvas.
pub fn output_size(canvas: &Canvas, pixel_ratio: f64) -> (u32, u32) {
    let w = (canvas.width * pixel_ratio).round().max(1.0) as u32;
    let h = (canvas.height * pixel_ratio).round().max(1.0) as u32;
    (w, h)
}

/// Read a media item's bytes from its data URI or path.
pub fn media_bytes(item: &MediaItem) -> CollageResult<Vec<u8>> {
    match item.source() {
        source @ MediaSource::DataUrl { .. } => match source.decode() {
            Some(Ok(bytes)) => Ok(bytes),
            Some(Err(e)) => Err(CollageError::render(format!("Invalid data URI payload: {e}"))),
            None => Err(CollageError::render("Data URI without payload")),
        },
        MediaSource::Path(path) => {
            let path = Path::new(path);
            if !path.exists() {
                return Err(CollageError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            Ok(std::fs::read(path)?)
        }
    }
}

/// Decode an image media item into RGBA pixels.
pub fn load_image(item: &MediaItem) -> CollageResult<RgbaImage> {
    let bytes = media_bytes(item)?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| CollageError::render(format!("Failed to decode image: {e}")))?;
    Ok(img.to_rgba8())
}

/// Paint `placements` in order.
///
/// Video cells get their background only; their frames are composited by
/// the video backend. Images that fail to load are logged and skipped so
/// one broken source does not sink the export.
pub fn rasterize(
    placements: &[CellPlacement],
    canvas: &Canvas,
    pixel_ratio: f64,
) -> CollageResult<RgbaImage> {
    if !(pixel_ratio.is_finite() && pixel_ratio > 0.0) {
        return Err(CollageError::render(format!(
            "Pixel ratio must be positive, got {pixel_ratio}"
        )));
    }
    let (width, height) = output_size(canvas, pixel_ratio);
    let background = color_or(&canvas.background, WHITE);
    let mut out = RgbaImage::from_pixel(width, height, background);

    // Several cells may show the same source.
    let mut decoded: HashMap<&str, Option<RgbaImage>> = HashMap::new();

    for placement in placements {
        let rect = placement.rect.scaled(pixel_ratio);
        let radius = placement.transform.border_radius * pixel_ratio;
        let fill = parse_hex_color(&placement.background).unwrap_or_else(|| {
            tracing::warn!(
                cell = %placement.cell_id,
                color = %placement.background,
                "Unparseable cell color; using canvas background"
            );
            background
        });
        fill_rounded_rect(&mut out, &rect, radius, fill);

        let Some(item) = placement.media.as_ref().filter(|m| !m.is_video()) else {
            continue;
        };
        let source = decoded.entry(item.url()).or_insert_with(|| match load_image(item) {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!(cell = %placement.cell_id, error = %e, "Skipping unreadable image");
                None
            }
        });
        if let Some(source) = source {
            draw_media(&mut out, source, &rect, radius, &placement.transform, pixel_ratio);
        }
    }

    Ok(out)
}

/// Encode an RGBA canvas as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> CollageResult<Vec<u8>> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CollageError::render(format!("Failed to encode PNG: {e}")))?;
    Ok(png)
}

/// Scale factor that makes `(src_w, src_h)` cover `rect` exactly.
pub fn cover_scale(src_w: f64, src_h: f64, rect: &Rect) -> f64 {
    if src_w <= 0.0 || src_h <= 0.0 {
        return 0.0;
    }
    (rect.width / src_w).max(rect.height / src_h)
}

fn fill_rounded_rect(out: &mut RgbaImage, rect: &Rect, radius: f64, color: Rgba<u8>) {
    let Some((x0, y0, x1, y1)) = pixel_bounds(out, rect) else {
        return;
    };
    for py in y0..y1 {
        for px in x0..x1 {
            let (cx, cy) = (px as f64 + 0.5, py as f64 + 0.5);
            if inside_rounded(cx, cy, rect, radius) {
                out.get_pixel_mut(px, py).blend(&color);
            }
        }
    }
}

fn draw_media(
    out: &mut RgbaImage,
    source: &RgbaImage,
    rect: &Rect,
    radius: f64,
    transform: &Transform,
    pixel_ratio: f64,
) {
    let (src_w, src_h) = (source.width() as f64, source.height() as f64);
    let scale = cover_scale(src_w, src_h, rect) * transform.magnification();
    if scale <= 0.0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = pixel_bounds(out, rect) else {
        return;
    };

    let (center_x, center_y) = rect.center();
    let pivot_x = center_x + transform.offset_x * pixel_ratio;
    let pivot_y = center_y + transform.offset_y * pixel_ratio;
    let (sin, cos) = transform.rotation.to_radians().sin_cos();

    for py in y0..y1 {
        for px in x0..x1 {
            let (cx, cy) = (px as f64 + 0.5, py as f64 + 0.5);
            if !inside_rounded(cx, cy, rect, radius) {
                continue;
            }
            // Inverse mapping: undo translate, rotate, then scale.
            let (dx, dy) = (cx - pivot_x, cy - pivot_y);
            let rx = dx * cos + dy * sin;
            let ry = -dx * sin + dy * cos;
            let u = rx / scale + src_w / 2.0;
            let v = ry / scale + src_h / 2.0;
            if u < 0.0 || v < 0.0 || u >= src_w || v >= src_h {
                continue;
            }
            let sample = *source.get_pixel(u as u32, v as u32);
            out.get_pixel_mut(px, py).blend(&sample);
        }
    }
}

/// Integer pixel bounds of `rect` clipped to the canvas.
fn pixel_bounds(out: &RgbaImage, rect: &Rect) -> Option<(u32, u32, u32, u32)> {
    let x0 = rect.x.floor().max(0.0) as u32;
    let y0 = rect.y.floor().max(0.0) as u32;
    let x1 = (rect.right().ceil().max(0.0) as u32).min(out.width());
    let y1 = (rect.bottom().ceil().max(0.0) as u32).min(out.height());
    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}

/// Whether a point lies inside `rect` with corners rounded by `radius`.
fn inside_rounded(x: f64, y: f64, rect: &Rect, radius: f64) -> bool {
    if !rect.contains(x, y) {
        return false;
    }
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    if r <= 0.0 {
        return true;
    }
    let nearest_x = x.clamp(rect.x + r, rect.right() - r);
    let nearest_y = y.clamp(rect.y + r, rect.bottom() - r);
    let (dx, dy) = (x - nearest_x, y - nearest_y);
    dx * dx + dy * dy <= r * r
}
