//! Built-in single-stroke capitals.
//!
//! Used when no TrueType face can be loaded. Each letter is a set of
//! polylines on a 4x6 grid (x right, y down) that is scaled to the requested
//! pixel height and drawn with round pens.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_circle_mut;

type Stroke = &'static [(u8, u8)];

const GRID_WIDTH: f32 = 4.0;
const GRID_HEIGHT: f32 = 6.0;

const O_RING: Stroke = &[(1, 0), (3, 0), (4, 1), (4, 5), (3, 6), (1, 6), (0, 5), (0, 1), (1, 0)];
const P_BOWL: Stroke = &[(0, 6), (0, 0), (3, 0), (4, 1), (4, 2), (3, 3), (0, 3)];

/// Polylines of an ASCII letter (either case).
pub fn strokes(letter: char) -> Option<&'static [Stroke]> {
    let strokes: &'static [Stroke] = match letter.to_ascii_uppercase() {
        'A' => &[&[(0, 6), (2, 0), (4, 6)], &[(1, 3), (3, 3)]],
        'B' => &[
            &[(0, 0), (0, 6), (3, 6), (4, 5), (4, 4), (3, 3), (0, 3)],
            &[(0, 0), (3, 0), (4, 1), (4, 2), (3, 3)],
        ],
        'C' => &[&[(4, 1), (3, 0), (1, 0), (0, 1), (0, 5), (1, 6), (3, 6), (4, 5)]],
        'D' => &[&[(0, 0), (0, 6), (2, 6), (4, 4), (4, 2), (2, 0), (0, 0)]],
        'E' => &[&[(4, 0), (0, 0), (0, 6), (4, 6)], &[(0, 3), (3, 3)]],
        'F' => &[&[(4, 0), (0, 0), (0, 6)], &[(0, 3), (3, 3)]],
        'G' => &[&[
            (4, 1),
            (3, 0),
            (1, 0),
            (0, 1),
            (0, 5),
            (1, 6),
            (3, 6),
            (4, 5),
            (4, 3),
            (2, 3),
        ]],
        'H' => &[&[(0, 0), (0, 6)], &[(4, 0), (4, 6)], &[(0, 3), (4, 3)]],
        'I' => &[&[(1, 0), (3, 0)], &[(2, 0), (2, 6)], &[(1, 6), (3, 6)]],
        'J' => &[&[(1, 0), (4, 0)], &[(3, 0), (3, 5), (2, 6), (1, 6), (0, 5)]],
        'K' => &[&[(0, 0), (0, 6)], &[(4, 0), (0, 3), (4, 6)]],
        'L' => &[&[(0, 0), (0, 6), (4, 6)]],
        'M' => &[&[(0, 6), (0, 0), (2, 3), (4, 0), (4, 6)]],
        'N' => &[&[(0, 6), (0, 0), (4, 6), (4, 0)]],
        'O' => &[O_RING],
        'P' => &[P_BOWL],
        'Q' => &[O_RING, &[(2, 4), (4, 6)]],
        'R' => &[P_BOWL, &[(2, 3), (4, 6)]],
        'S' => &[&[
            (4, 1),
            (3, 0),
            (1, 0),
            (0, 1),
            (0, 2),
            (1, 3),
            (3, 3),
            (4, 4),
            (4, 5),
            (3, 6),
            (1, 6),
            (0, 5),
        ]],
        'T' => &[&[(0, 0), (4, 0)], &[(2, 0), (2, 6)]],
        'U' => &[&[(0, 0), (0, 5), (1, 6), (3, 6), (4, 5), (4, 0)]],
        'V' => &[&[(0, 0), (2, 6), (4, 0)]],
        'W' => &[&[(0, 0), (1, 6), (2, 3), (3, 6), (4, 0)]],
        'X' => &[&[(0, 0), (4, 6)], &[(4, 0), (0, 6)]],
        'Y' => &[&[(0, 0), (2, 3), (4, 0)], &[(2, 3), (2, 6)]],
        'Z' => &[&[(0, 0), (4, 0), (0, 6), (4, 6)]],
        _ => return None,
    };
    Some(strokes)
}

fn pen_radius(size: u32) -> i32 {
    (size as i32 / 10).max(1)
}

/// Bounding box `(width, height)` of a letter drawn at `size` pixels tall.
pub fn measure(letter: char, size: u32) -> (u32, u32) {
    if strokes(letter).is_none() {
        return (0, 0);
    }
    // pen overhang on both sides, plus the last pixel row/column
    let extra = 2 * pen_radius(size) as u32 + 1;
    let width = (size as f32 * GRID_WIDTH / GRID_HEIGHT).round() as u32;
    (width + extra, size + extra)
}

/// Draws a letter with its bounding box's top-left corner at `(x, y)`.
pub fn draw(canvas: &mut GrayImage, letter: char, x: i32, y: i32, size: u32, color: Luma<u8>) {
    let Some(strokes) = strokes(letter) else {
        return;
    };
    let radius = pen_radius(size);
    let sx = size as f32 / GRID_HEIGHT;
    let to_pixel = |(gx, gy): (u8, u8)| {
        (
            x as f32 + radius as f32 + gx as f32 * sx,
            y as f32 + radius as f32 + gy as f32 * sx,
        )
    };

    for stroke in strokes {
        for pair in stroke.windows(2) {
            let (x0, y0) = to_pixel(pair[0]);
            let (x1, y1) = to_pixel(pair[1]);
            let steps = ((x1 - x0).abs().max((y1 - y0).abs()).ceil() as i32).max(1);
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                let px = (x0 + (x1 - x0) * t).round() as i32;
                let py = (y0 + (y1 - y0) * t).round() as i32;
                draw_filled_circle_mut(canvas, (px, py), radius, color);
            }
        }
    }
}
