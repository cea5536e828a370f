use crate::color;
use crate::error::FilterError;
use crate::frame::{saturate_u8, ColorSpace, Frame, CHANNELS};

/// Weights below exp(-WEIGHT_CUTOFF) ~= 0.001 are dropped
const WEIGHT_CUTOFF: f32 = 6.907_755;

/// Non-local means parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenoiseParams {
    /// Filter strength on the lightness channel
    pub h_luminance: f32,
    /// Filter strength on the two chroma channels
    pub h_color: f32,
    /// Side of the patch compared around each pixel (odd)
    pub template_window: u32,
    /// Side of the neighbourhood searched for similar patches (odd)
    pub search_window: u32,
}

impl DenoiseParams {
    /// Low strength that keeps fine detail
    pub const LIGHT: DenoiseParams = DenoiseParams {
        h_luminance: 3.0,
        h_color: 3.0,
        template_window: 7,
        search_window: 21,
    };
}

impl Default for DenoiseParams {
    fn default() -> Self {
        Self::LIGHT
    }
}

/// Edge-preserving non-local means smoothing, run in Lab so lightness and
/// chroma get their own strengths.
pub fn apply(frame: Frame, params: &DenoiseParams) -> Result<Frame, FilterError> {
    frame.require("denoise", ColorSpace::Rgb)?;
    let lab = color::rgb_to_lab(&frame)?;
    let smoothed = nl_means(&lab, params);
    color::lab_to_rgb(&smoothed)
}

/// Weighted average of every pixel in the search window, each weighted by how
/// similar its surrounding patch is to the patch around the target pixel.
///
/// Patch distances are computed one displacement at a time with an integral
/// image.
fn nl_means(frame: &Frame, params: &DenoiseParams) -> Frame {
    let (width, height) = frame.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return frame.clone();
    }

    let src = frame.pixels().as_raw();
    let template_radius = (params.template_window / 2) as isize;
    let search_radius = (params.search_window / 2) as isize;

    let strengths = [params.h_luminance, params.h_color, params.h_color];
    let denominators = strengths.map(|s| (s * s * CHANNELS as f32).max(f32::EPSILON));

    let count = w * h;
    let mut weight_sums = vec![[0.0f32; CHANNELS]; count];
    let mut accum = vec![[0.0f32; CHANNELS]; count];
    let mut distances = vec![0u32; count];
    let mut integral = vec![0u64; (w + 1) * (h + 1)];

    let clamp = |v: isize, len: usize| v.clamp(0, len as isize - 1) as usize;

    for dy in -search_radius..=search_radius {
        for dx in -search_radius..=search_radius {
            // Channel-summed squared difference to the displaced pixel
            for y in 0..h {
                let ys = clamp(y as isize + dy, h);
                for x in 0..w {
                    let xs = clamp(x as isize + dx, w);
                    let a = (y * w + x) * CHANNELS;
                    let b = (ys * w + xs) * CHANNELS;
                    let mut d = 0u32;
                    for c in 0..CHANNELS {
                        let diff = src[a + c] as i32 - src[b + c] as i32;
                        d += (diff * diff) as u32;
                    }
                    distances[y * w + x] = d;
                }
            }

            fill_integral(&distances, w, h, &mut integral);

            for y in 0..h {
                let y0 = clamp(y as isize - template_radius, h);
                let y1 = clamp(y as isize + template_radius, h) + 1;
                let ys = clamp(y as isize + dy, h);
                for x in 0..w {
                    let x0 = clamp(x as isize - template_radius, w);
                    let x1 = clamp(x as isize + template_radius, w) + 1;
                    let area = ((x1 - x0) * (y1 - y0)) as f32;
                    let sum = box_sum(&integral, w, x0, y0, x1, y1);
                    let dist = sum as f32 / area;

                    let xs = clamp(x as isize + dx, w);
                    let neighbour = (ys * w + xs) * CHANNELS;
                    let idx = y * w + x;
                    for c in 0..CHANNELS {
                        let scaled = dist / denominators[c];
                        if scaled > WEIGHT_CUTOFF {
                            continue;
                        }
                        let weight = (-scaled).exp();
                        weight_sums[idx][c] += weight;
                        accum[idx][c] += weight * src[neighbour + c] as f32;
                    }
                }
            }
        }
    }

    let mut out = frame.pixels().clone();
    for (idx, value) in out.iter_mut().enumerate() {
        let (p, c) = (idx / CHANNELS, idx % CHANNELS);
        // The zero displacement always contributes weight 1
        *value = saturate_u8(accum[p][c] / weight_sums[p][c]);
    }
    Frame::new(out, frame.space())
}

fn fill_integral(values: &[u32], w: usize, h: usize, integral: &mut [u64]) {
    let stride = w + 1;
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += values[y * w + x] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }
}

/// Sum over the half-open window [x0, x1) x [y0, y1)
fn box_sum(integral: &[u64], w: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
    let stride = w + 1;
    integral[y1 * stride + x1] + integral[y0 * stride + x0]
        - integral[y0 * stride + x1]
        - integral[y1 * stride + x0]
}
