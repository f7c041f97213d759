//! Placeholder frames for scenes whose image could not be generated.
//!
//! Text is drawn with a small built-in 5x7 bitmap font, upper-case only,
//! so no font files are needed at runtime.

use image::{ImageFormat, Rgba, RgbaImage};
use std::path::Path;
use storyweaver_core::error::ImageError;

pub const PLACEHOLDER_SIZE: u32 = 512;

const BACKGROUND: Rgba<u8> = Rgba([44, 48, 58, 255]);
const FOREGROUND: Rgba<u8> = Rgba([222, 222, 222, 255]);

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const SCALE: u32 = 4;
const ADVANCE: u32 = (GLYPH_WIDTH + 1) * SCALE;
const LINE_GAP: u32 = 6 * SCALE;

/// Rows of a glyph, top to bottom; bit 4 is the leftmost column.
fn glyph(c: char) -> [u8; 7] {
    match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        _ => [0; 7],
    }
}

pub fn placeholder_filename(scene_number: u32) -> String {
    format!("scene_{scene_number}_placeholder.png")
}

/// Render the "Scene N / Image Not Generated" frame.
pub fn render_placeholder(scene_number: u32) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, BACKGROUND);

    let lines = [format!("Scene {scene_number}"), "Image Not Generated".to_string()];
    let block_height = lines.len() as u32 * GLYPH_HEIGHT * SCALE + LINE_GAP;
    let mut y = PLACEHOLDER_SIZE.saturating_sub(block_height) / 2;

    for line in &lines {
        draw_line(&mut img, &line.to_uppercase(), y);
        y += GLYPH_HEIGHT * SCALE + LINE_GAP;
    }
    img
}

fn draw_line(img: &mut RgbaImage, text: &str, y: u32) {
    let width = text.chars().count() as u32 * ADVANCE;
    let mut x = img.width().saturating_sub(width) / 2;

    for c in text.chars() {
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                fill_cell(img, x + col * SCALE, y + row as u32 * SCALE);
            }
        }
        x += ADVANCE;
    }
}

fn fill_cell(img: &mut RgbaImage, x: u32, y: u32) {
    for dy in 0..SCALE {
        for dx in 0..SCALE {
            if x + dx < img.width() && y + dy < img.height() {
                img.put_pixel(x + dx, y + dy, FOREGROUND);
            }
        }
    }
}

/// Write the placeholder for `scene_number` into `dir` and return its basename.
pub fn write_placeholder(dir: &Path, scene_number: u32) -> Result<String, ImageError> {
    std::fs::create_dir_all(dir).map_err(|e| ImageError::Io(format!("{}: {e}", dir.display())))?;

    let filename = placeholder_filename(scene_number);
    render_placeholder(scene_number)
        .save_with_format(dir.join(&filename), ImageFormat::Png)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(filename)
}
