//! Debug annotations drawn directly into the RGB8 frame buffer.

use crate::types::{BoundingBox, Circle};

#[inline]
fn put_pixel(buffer: &mut [u8], width: usize, height: usize, x: i32, y: i32, color: (u8, u8, u8)) {
    if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
        return;
    }
    let idx = (y as usize * width + x as usize) * 3;
    if idx + 2 < buffer.len() {
        buffer[idx] = color.0;
        buffer[idx + 1] = color.1;
        buffer[idx + 2] = color.2;
    }
}

/// Filled dot, the marker used for individual iris landmarks.
pub fn draw_point(
    buffer: &mut [u8],
    width: usize,
    height: usize,
    x: i32,
    y: i32,
    radius: i32,
    color: (u8, u8, u8),
) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel(buffer, width, height, x + dx, y + dy, color);
            }
        }
    }
}

/// Circle outline of the given stroke thickness.
pub fn draw_circle_outline(
    buffer: &mut [u8],
    width: usize,
    height: usize,
    circle: &Circle,
    color: (u8, u8, u8),
    thickness: i32,
) {
    let r = circle.radius.max(0);
    let t = thickness.max(1);
    let reach = r + t;
    let half = t as f32 / 2.0;

    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            if (dist - r as f32).abs() <= half {
                put_pixel(buffer, width, height, circle.cx + dx, circle.cy + dy, color);
            }
        }
    }
}

/// One-pixel rectangle outline, used for the eye region debug view.
pub fn draw_rect_outline(
    buffer: &mut [u8],
    width: usize,
    height: usize,
    bbox: &BoundingBox,
    color: (u8, u8, u8),
) {
    for x in bbox.x1..=bbox.x2 {
        put_pixel(buffer, width, height, x, bbox.y1, color);
        put_pixel(buffer, width, height, x, bbox.y2, color);
    }
    for y in bbox.y1..=bbox.y2 {
        put_pixel(buffer, width, height, bbox.x1, y, color);
        put_pixel(buffer, width, height, bbox.x2, y, color);
    }
}

/// Parses "#RRGGBB"; falls back to red on anything malformed.
pub fn parse_hex(hex: &str) -> (u8, u8, u8) {
    if hex.len() == 7 && hex.starts_with('#') {
        let r = u8::from_str_radix(&hex[1..3], 16).unwrap_or(255);
        let g = u8::from_str_radix(&hex[3..5], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[5..7], 16).unwrap_or(0);
        (r, g, b)
    } else {
        (255, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#FF0000"), (255, 0, 0));
        assert_eq!(parse_hex("#00FF00"), (0, 255, 0));
        assert_eq!(parse_hex("#0000FF"), (0, 0, 255));
        assert_eq!(parse_hex("#FFFFFF"), (255, 255, 255));
        assert_eq!(parse_hex("invalid"), (255, 0, 0)); // fallback
    }

    #[test]
    fn point_stays_inside_buffer() {
        let mut buffer = vec![0u8; 16 * 16 * 3];
        // Partially off-frame marker must not panic or wrap.
        draw_point(&mut buffer, 16, 16, 0, 0, 3, (255, 0, 0));
        draw_point(&mut buffer, 16, 16, 15, 15, 3, (255, 0, 0));
        assert_eq!(buffer[0], 255);
    }

    #[test]
    fn circle_outline_paints_ring_only() {
        let mut buffer = vec![0u8; 64 * 64 * 3];
        let circle = Circle { cx: 32, cy: 32, radius: 10 };
        draw_circle_outline(&mut buffer, 64, 64, &circle, (0, 255, 0), 2);

        // Center untouched, ring painted.
        let center_idx = (32 * 64 + 32) * 3;
        assert_eq!(buffer[center_idx + 1], 0);
        let ring_idx = (32 * 64 + 42) * 3;
        assert_eq!(buffer[ring_idx + 1], 255);
    }
}
