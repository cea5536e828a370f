use crate::frame::saturate_u8;
use image::{GrayImage, Luma};

/// Tiles per axis
pub const DEFAULT_GRID: u32 = 8;

/// Contrast-limited adaptive histogram equalization on one plane.
///
/// The plane is cut into a `grid` x `grid` set of tiles. Each tile gets its
/// own equalization LUT built from a histogram whose bins are clipped at
/// `clip_limit * tile_area / 256` (the excess is spread evenly over all
/// bins), and every pixel blends the LUTs of its four nearest tile centers.
pub fn equalize(plane: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = plane.dimensions();
    if width == 0 || height == 0 {
        return plane.clone();
    }

    let grid_x = grid.clamp(1, width);
    let grid_y = grid.clamp(1, height);

    let mut luts = Vec::with_capacity((grid_x * grid_y) as usize);
    for ty in 0..grid_y {
        let y0 = ty * height / grid_y;
        let y1 = (ty + 1) * height / grid_y;
        for tx in 0..grid_x {
            let x0 = tx * width / grid_x;
            let x1 = (tx + 1) * width / grid_x;

            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[plane.get_pixel(x, y).0[0] as usize] += 1;
                }
            }
            let area = (x1 - x0) * (y1 - y0);
            luts.push(clipped_lut(hist, area, clip_limit));
        }
    }

    let tile_w = width as f32 / grid_x as f32;
    let tile_h = height as f32 / grid_y as f32;
    let lut_at = |tx: usize, ty: usize| &luts[ty * grid_x as usize + tx];

    GrayImage::from_fn(width, height, |x, y| {
        let (ty1, ty2, ya) = neighbours(y, tile_h, grid_y);
        let (tx1, tx2, xa) = neighbours(x, tile_w, grid_x);
        let v = plane.get_pixel(x, y).0[0] as usize;

        let top = (1.0 - xa) * lut_at(tx1, ty1)[v] as f32 + xa * lut_at(tx2, ty1)[v] as f32;
        let bottom = (1.0 - xa) * lut_at(tx1, ty2)[v] as f32 + xa * lut_at(tx2, ty2)[v] as f32;
        Luma([saturate_u8((1.0 - ya) * top + ya * bottom)])
    })
}

/// The two tile indices whose centers bracket `pos`, and the blend weight of the second.
fn neighbours(pos: u32, tile: f32, tiles: u32) -> (usize, usize, f32) {
    let t = (pos as f32 + 0.5) / tile - 0.5;
    let lower = t.floor();
    let weight = t - lower;
    let last = tiles as isize - 1;
    let first = (lower as isize).clamp(0, last) as usize;
    let second = (lower as isize + 1).clamp(0, last) as usize;
    (first, second, weight)
}

/// Clip the histogram, redistribute the excess, and turn the CDF into a LUT.
fn clipped_lut(mut hist: [u32; 256], area: u32, clip_limit: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    if area == 0 {
        for (i, entry) in lut.iter_mut().enumerate() {
            *entry = i as u8;
        }
        return lut;
    }

    if clip_limit > 0.0 {
        let clip = ((clip_limit * area as f32 / 256.0) as u32).max(1);

        let mut excess = 0u32;
        for bin in hist.iter_mut() {
            if *bin > clip {
                excess += *bin - clip;
                *bin = clip;
            }
        }

        let batch = excess / 256;
        let mut residual = excess - batch * 256;
        for bin in hist.iter_mut() {
            *bin += batch;
        }
        if residual > 0 {
            let step = (256 / residual).max(1) as usize;
            let mut i = 0;
            while residual > 0 && i < 256 {
                hist[i] += 1;
                residual -= 1;
                i += step;
            }
        }
    }

    let scale = 255.0 / area as f32;
    let mut sum = 0u32;
    for (entry, count) in lut.iter_mut().zip(hist.iter()) {
        sum += count;
        *entry = saturate_u8(sum as f32 * scale);
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spread(img: &GrayImage) -> u8 {
        let min = img.pixels().map(|p| p.0[0]).min().unwrap_or(0);
        let max = img.pixels().map(|p| p.0[0]).max().unwrap_or(0);
        max - min
    }

    fn low_contrast_ramp() -> GrayImage {
        GrayImage::from_fn(64, 64, |x, y| Luma([100 + ((x + y) / 8) as u8]))
    }

    #[test]
    fn test_clahe_stretches_low_contrast_plane() {
        let img = low_contrast_ramp();
        // A loose clip limit behaves close to plain histogram equalization
        let result = equalize(&img, 40.0, DEFAULT_GRID);
        assert_eq!(result.dimensions(), img.dimensions());
        assert!(
            spread(&result) > spread(&img),
            "expected wider range: {} vs {}",
            spread(&result),
            spread(&img)
        );
    }

    #[test]
    fn test_higher_clip_limit_gives_steeper_lut() {
        let mut hist = [0u32; 256];
        hist[100] = 528;
        hist[101] = 496;
        let gentle = clipped_lut(hist, 1024, 1.5);
        let strong = clipped_lut(hist, 1024, 3.0);
        assert!(strong[101] - strong[100] > gentle[101] - gentle[100]);
    }

    #[test]
    fn test_clahe_keeps_white_plane() {
        let img = GrayImage::from_pixel(40, 24, Luma([255]));
        let result = equalize(&img, 1.5, DEFAULT_GRID);
        assert!(result.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_clahe_handles_planes_smaller_than_grid() {
        let img = GrayImage::from_fn(3, 2, |x, y| Luma([(x * 40 + y * 10) as u8]));
        let result = equalize(&img, 3.0, DEFAULT_GRID);
        assert_eq!(result.dimensions(), (3, 2));
    }

    #[test]
    fn test_clipped_lut_is_monotonic() {
        let mut hist = [0u32; 256];
        hist[10] = 500;
        hist[200] = 12;
        hist[201] = 12;
        let lut = clipped_lut(hist, 524, 2.0);
        assert!(lut.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(lut[255], 255);
    }
}
