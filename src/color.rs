//! Color space conversions and channel plumbing for 8-bit frames.
//!
//! Encodings follow the usual 8-bit conventions so that filter constants
//! keep their familiar meaning:
//! - HSV: hue in 0..180 (degrees / 2), saturation and value in 0..255
//! - Lab: L scaled from 0..100 to 0..255, a and b offset by 128 (D65, sRGB)

use crate::error::FilterError;
use crate::frame::{saturate_u8, ColorSpace, Frame, CHANNELS};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::sync::OnceLock;

/// D65 reference white
const D65_X: f32 = 0.95047;
const D65_Y: f32 = 1.00000;
const D65_Z: f32 = 1.08883;

/// Linear sRGB to XYZ (D65)
const SRGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

/// XYZ to linear sRGB (D65)
const XYZ_TO_SRGB: [[f32; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

/// Convert a device RGB frame to HSV
pub fn rgb_to_hsv(frame: &Frame) -> Result<Frame, FilterError> {
    frame.require("rgb_to_hsv", ColorSpace::Rgb)?;
    Ok(map_pixels(frame, ColorSpace::Hsv, hsv_from_rgb))
}

/// Convert an HSV frame back to device RGB
pub fn hsv_to_rgb(frame: &Frame) -> Result<Frame, FilterError> {
    frame.require("hsv_to_rgb", ColorSpace::Hsv)?;
    Ok(map_pixels(frame, ColorSpace::Rgb, rgb_from_hsv))
}

/// Convert a device RGB frame to Lab
pub fn rgb_to_lab(frame: &Frame) -> Result<Frame, FilterError> {
    frame.require("rgb_to_lab", ColorSpace::Rgb)?;
    Ok(map_pixels(frame, ColorSpace::Lab, lab_from_rgb))
}

/// Convert a Lab frame back to device RGB
pub fn lab_to_rgb(frame: &Frame) -> Result<Frame, FilterError> {
    frame.require("lab_to_rgb", ColorSpace::Lab)?;
    Ok(map_pixels(frame, ColorSpace::Rgb, rgb_from_lab))
}

/// Split a frame into its channel planes, in storage order.
pub fn split(frame: &Frame) -> Vec<GrayImage> {
    let pixels = frame.pixels();
    (0..CHANNELS)
        .map(|c| {
            GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
                Luma([pixels.get_pixel(x, y).0[c]])
            })
        })
        .collect()
}

/// Interleave channel planes back into a frame tagged `space`.
pub fn merge(planes: &[GrayImage], space: ColorSpace) -> Result<Frame, FilterError> {
    if planes.len() != CHANNELS {
        return Err(FilterError::PlaneMismatch(format!(
            "expected {} planes, got {}",
            CHANNELS,
            planes.len()
        )));
    }

    let dims = planes[0].dimensions();
    if let Some(bad) = planes.iter().find(|p| p.dimensions() != dims) {
        return Err(FilterError::PlaneMismatch(format!(
            "plane is {:?}, expected {:?}",
            bad.dimensions(),
            dims
        )));
    }

    let pixels = RgbImage::from_fn(dims.0, dims.1, |x, y| {
        Rgb([
            planes[0].get_pixel(x, y).0[0],
            planes[1].get_pixel(x, y).0[0],
            planes[2].get_pixel(x, y).0[0],
        ])
    });
    Ok(Frame::new(pixels, space))
}

fn map_pixels<F>(frame: &Frame, space: ColorSpace, f: F) -> Frame
where
    F: Fn([u8; 3]) -> [u8; 3],
{
    let mut out = frame.pixels().clone();
    for pixel in out.pixels_mut() {
        pixel.0 = f(pixel.0);
    }
    Frame::new(out, space)
}

pub(crate) fn hsv_from_rgb(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(f32::from);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v > 0.0 { diff * 255.0 / v } else { 0.0 };

    let mut h = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    let h = (h / 2.0).round();
    let h = if h >= 180.0 { 0 } else { h as u8 };

    [h, saturate_u8(s), v as u8]
}

pub(crate) fn rgb_from_hsv(hsv: [u8; 3]) -> [u8; 3] {
    let h = (hsv[0] as f32 * 2.0) % 360.0;
    let s = hsv[1] as f32 / 255.0;
    let v = hsv[2] as f32;

    if hsv[1] == 0 {
        return [hsv[2]; 3];
    }

    let sector = h / 60.0;
    let i = sector.floor();
    let f = sector - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    [saturate_u8(r), saturate_u8(g), saturate_u8(b)]
}

fn srgb_to_linear_lut() -> &'static [f32; 256] {
    static LUT: OnceLock<[f32; 256]> = OnceLock::new();
    LUT.get_or_init(|| {
        let mut lut = [0.0f32; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            let c = i as f32 / 255.0;
            *entry = if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            };
        }
        lut
    })
}

#[inline]
fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    const DELTA_CUBED: f32 = DELTA * DELTA * DELTA;

    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

#[inline]
fn lab_f_inv(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;

    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

#[inline]
fn mat_mul(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

pub(crate) fn lab_from_rgb(rgb: [u8; 3]) -> [u8; 3] {
    let lut = srgb_to_linear_lut();
    let linear = rgb.map(|c| lut[c as usize]);
    let [x, y, z] = mat_mul(&SRGB_TO_XYZ, linear);

    let fx = lab_f(x / D65_X);
    let fy = lab_f(y / D65_Y);
    let fz = lab_f(z / D65_Z);

    let l = 116.0 * fy - 16.0;
    let a = 500.0 * (fx - fy);
    let b = 200.0 * (fy - fz);

    [
        saturate_u8(l * 255.0 / 100.0),
        saturate_u8(a + 128.0),
        saturate_u8(b + 128.0),
    ]
}

pub(crate) fn rgb_from_lab(lab: [u8; 3]) -> [u8; 3] {
    let l = lab[0] as f32 * 100.0 / 255.0;
    let a = lab[1] as f32 - 128.0;
    let b = lab[2] as f32 - 128.0;

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let xyz = [
        D65_X * lab_f_inv(fx),
        D65_Y * lab_f_inv(fy),
        D65_Z * lab_f_inv(fz),
    ];
    let linear = mat_mul(&XYZ_TO_SRGB, xyz);

    linear.map(|c| saturate_u8(linear_to_srgb(c) * 255.0))
}
