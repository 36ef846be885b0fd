use rusttype::{point, Font, Scale};
use std::fs;
use std::path::Path;

pub struct FontRenderer {
    font: Font<'static>,
}

impl FontRenderer {
    /// Looks for the family in the usual macOS/Linux font directories.
    pub fn try_load(family: &str) -> Option<Self> {
        let paths = [
            format!("/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/Supplemental/{}.ttf", family),
            format!("/usr/share/fonts/truetype/{}.ttf", family),
            format!("/usr/share/fonts/truetype/dejavu/{}.ttf", family),
            format!("{}.ttf", family),
        ];

        for p in paths.iter() {
            if Path::new(p).exists() {
                if let Ok(data) = fs::read(p) {
                    if let Some(font) = Font::try_from_vec(data) {
                        println!("Loaded font from {}", p);
                        return Some(Self { font });
                    }
                }
            }
        }

        println!(
            "Could not find font family '{}'. Falling back to bitmap.",
            family
        );
        None
    }

    pub fn draw_text(
        &self,
        buffer: &mut [u8],
        width: usize,
        height: usize,
        x: usize,
        y: usize,
        text: &str,
        color: (u8, u8, u8),
        size_pt: f32,
    ) {
        let scale = Scale::uniform(size_pt);
        let v_metrics = self.font.v_metrics(scale);
        let start = point(x as f32, y as f32 + v_metrics.ascent);

        for glyph in self.font.layout(text, scale, start) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    if v < 0.05 {
                        return;
                    }
                    let px = bb.min.x + gx as i32;
                    let py = bb.min.y + gy as i32;
                    if px >= 0 && py >= 0 && (px as usize) < width && (py as usize) < height {
                        let idx = (py as usize * width + px as usize) * 3;
                        if idx + 2 < buffer.len() {
                            // Blend against the frame so thin strokes stay legible.
                            buffer[idx] = blend(buffer[idx], color.0, v);
                            buffer[idx + 1] = blend(buffer[idx + 1], color.1, v);
                            buffer[idx + 2] = blend(buffer[idx + 2], color.2, v);
                        }
                    }
                });
            }
        }
    }

    pub fn measure_height(&self, size_pt: f32) -> usize {
        let scale = Scale::uniform(size_pt);
        let v_metrics = self.font.v_metrics(scale);
        (v_metrics.ascent - v_metrics.descent + v_metrics.line_gap) as usize
    }
}

fn blend(under: u8, over: u8, alpha: f32) -> u8 {
    (under as f32 * (1.0 - alpha) + over as f32 * alpha) as u8
}
