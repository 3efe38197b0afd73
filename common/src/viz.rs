use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect as ImageRect;
use std::path::Path;

use crate::model::Grid;

const PALETTE: &[Rgb<u8>] = &[
    Rgb([0, 110, 255]),
    Rgb([255, 20, 80]),
    Rgb([0, 255, 100]),
    Rgb([255, 215, 0]),
    Rgb([180, 50, 255]),
    Rgb([0, 240, 255]),
];

/// Draws every net's current path as a polyline, gates as filled
/// squares, and saves the result to `filename`. Purely informational —
/// there is no contract on exact pixels.
pub fn draw_routed_design(grid: &Grid, filename: &str, width: u32, height: u32) {
    let mut img = RgbImage::from_pixel(width, height, Rgb([20, 20, 20]));

    let (size_x, size_y, _) = grid.size;
    if size_x == 0 || size_y == 0 {
        let _ = img.save(Path::new(filename));
        return;
    }

    let scale_x = width as f64 / (size_x as f64 + 1.0);
    let scale_y = height as f64 / (size_y as f64 + 1.0);
    let map = |x: u32, y: u32| {
        (
            x as f32 * scale_x as f32,
            height as f32 - (y as f32 * scale_y as f32),
        )
    };

    let mut keys: Vec<_> = grid.nets.keys().copied().collect();
    keys.sort_unstable();
    for (i, key) in keys.into_iter().enumerate() {
        let net = &grid.nets[&key];
        let color = PALETTE[i % PALETTE.len()];
        for window in net.path.windows(2) {
            let (x1, y1) = map(window[0].x, window[0].y);
            let (x2, y2) = map(window[1].x, window[1].y);
            draw_line_segment_mut(&mut img, (x1, y1), (x2, y2), color);
        }
    }

    let gate_color = Rgb([220, 220, 220]);
    for gate in grid.gates.values() {
        let (x, y) = map(gate.coord.x, gate.coord.y);
        let rect = ImageRect::at(x as i32 - 2, y as i32 - 2).of_size(4, 4);
        draw_filled_rect_mut(&mut img, rect, gate_color);
    }

    let _ = img.save(Path::new(filename));
}
