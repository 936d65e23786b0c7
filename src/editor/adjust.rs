//! Slider enhancement pipeline.
//!
//! Every slider maps its 1..=100 value to a multiplicative factor
//! (`value / 50`, so 50 is identity). Each enhancement interpolates
//! between a degenerate image and the input:
//! `out = degenerate + (input - degenerate) * factor`, clamped to u8.
//!
//! The pipeline always re-derives from the committed reference image and
//! applies the factors in a fixed order:
//! brightness -> contrast -> saturation -> sharpness.

use image::{DynamicImage, RgbaImage};

pub const SLIDER_MIN: i32 = 1;
pub const SLIDER_MAX: i32 = 100;
pub const SLIDER_DEFAULT: i32 = 50;

/// 3x3 smoothing kernel used as the degenerate image for sharpness.
const SMOOTH_KERNEL: [f32; 9] = [
    1.0 / 13.0, 1.0 / 13.0, 1.0 / 13.0,
    1.0 / 13.0, 5.0 / 13.0, 1.0 / 13.0,
    1.0 / 13.0, 1.0 / 13.0, 1.0 / 13.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustments {
    pub brightness: i32,
    pub contrast: i32,
    pub saturation: i32,
    pub sharpness: i32,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            brightness: SLIDER_DEFAULT,
            contrast: SLIDER_DEFAULT,
            saturation: SLIDER_DEFAULT,
            sharpness: SLIDER_DEFAULT,
        }
    }
}

impl Adjustments {
    pub fn factor(value: i32) -> f32 {
        value as f32 / SLIDER_DEFAULT as f32
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Recompute a working image from `reference`. Stages at factor 1.0
    /// are skipped, so a fully-default pipeline returns the reference
    /// unchanged.
    pub fn apply(&self, reference: &DynamicImage) -> DynamicImage {
        if self.is_identity() {
            return reference.clone();
        }
        let mut buf: RgbaImage = reference.to_rgba8();
        enhance_brightness(&mut buf, Self::factor(self.brightness));
        enhance_contrast(&mut buf, Self::factor(self.contrast));
        enhance_saturation(&mut buf, Self::factor(self.saturation));
        enhance_sharpness(&mut buf, Self::factor(self.sharpness));
        DynamicImage::ImageRgba8(buf)
    }
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> f32 {
    (299.0 * r as f32 + 587.0 * g as f32 + 114.0 * b as f32) / 1000.0
}

#[inline]
fn blend(degenerate: f32, value: f32, factor: f32) -> u8 {
    (degenerate + (value - degenerate) * factor).round().clamp(0.0, 255.0) as u8
}

/// Degenerate: black. Factor 2.0 doubles every channel.
fn enhance_brightness(buf: &mut RgbaImage, factor: f32) {
    if factor == 1.0 {
        return;
    }
    for pixel in buf.pixels_mut() {
        for i in 0..3 {
            pixel[i] = blend(0.0, pixel[i] as f32, factor);
        }
    }
}

/// Degenerate: uniform gray at the image's mean luma, which stays a
/// fixed point of the enhancement.
fn enhance_contrast(buf: &mut RgbaImage, factor: f32) {
    if factor == 1.0 {
        return;
    }
    let mean: f32 = mean_luma(buf).round();
    for pixel in buf.pixels_mut() {
        for i in 0..3 {
            pixel[i] = blend(mean, pixel[i] as f32, factor);
        }
    }
}

/// Degenerate: per-pixel grayscale. Gray pixels are invariant.
fn enhance_saturation(buf: &mut RgbaImage, factor: f32) {
    if factor == 1.0 {
        return;
    }
    for pixel in buf.pixels_mut() {
        let gray: f32 = luma(pixel[0], pixel[1], pixel[2]);
        for i in 0..3 {
            pixel[i] = blend(gray, pixel[i] as f32, factor);
        }
    }
}

/// Degenerate: a smoothed copy of the image. Alpha is carried over from
/// the input, not the convolution.
fn enhance_sharpness(buf: &mut RgbaImage, factor: f32) {
    if factor == 1.0 {
        return;
    }
    let smooth: RgbaImage = image::imageops::filter3x3(&*buf, &SMOOTH_KERNEL);
    for (pixel, smooth_pixel) in buf.pixels_mut().zip(smooth.pixels()) {
        for i in 0..3 {
            pixel[i] = blend(smooth_pixel[i] as f32, pixel[i] as f32, factor);
        }
    }
}

fn mean_luma(buf: &RgbaImage) -> f32 {
    let count: u32 = buf.width() * buf.height();
    if count == 0 {
        return 0.0;
    }
    let sum: f64 = buf
        .pixels()
        .map(|p| luma(p[0], p[1], p[2]) as f64)
        .sum();
    (sum / count as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn image_of(pixels: &[[u8; 4]], width: u32) -> DynamicImage {
        let height: u32 = pixels.len() as u32 / width;
        let mut buf = RgbaImage::new(width, height);
        for (i, px) in pixels.iter().enumerate() {
            buf.put_pixel(i as u32 % width, i as u32 / width, Rgba(*px));
        }
        DynamicImage::ImageRgba8(buf)
    }

    #[test]
    fn default_pipeline_is_exact_identity() {
        let img = image_of(&[[10, 60, 200, 255], [0, 255, 128, 77]], 2);
        let out = Adjustments::default().apply(&img);
        assert_eq!(out.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn slider_value_maps_to_factor() {
        assert_eq!(Adjustments::factor(50), 1.0);
        assert_eq!(Adjustments::factor(100), 2.0);
        assert_eq!(Adjustments::factor(1), 0.02);
    }

    #[test]
    fn brightness_100_doubles_channels() {
        let img = image_of(&[[10, 60, 200, 255]], 1);
        let adj = Adjustments { brightness: 100, ..Default::default() };
        let out = adj.apply(&img).to_rgba8();
        assert_eq!(out.get_pixel(0, 0).0, [20, 120, 255, 255]);
    }

    #[test]
    fn brightness_1_is_near_black() {
        let img = image_of(&[[128, 128, 128, 255]], 1);
        let adj = Adjustments { brightness: 1, ..Default::default() };
        let out = adj.apply(&img).to_rgba8();
        assert_eq!(out.get_pixel(0, 0).0, [3, 3, 3, 255]);
    }

    #[test]
    fn contrast_keeps_mean_gray_fixed() {
        let img = image_of(&[[100, 100, 100, 255], [100, 100, 100, 255]], 2);
        for value in [1, 25, 75, 100] {
            let adj = Adjustments { contrast: value, ..Default::default() };
            let out = adj.apply(&img).to_rgba8();
            assert_eq!(out.get_pixel(0, 0).0, [100, 100, 100, 255], "contrast {value}");
        }
    }

    #[test]
    fn contrast_spreads_around_mean() {
        let img = image_of(&[[50, 50, 50, 255], [150, 150, 150, 255]], 2);
        let adj = Adjustments { contrast: 100, ..Default::default() };
        let out = adj.apply(&img).to_rgba8();
        assert!(out.get_pixel(0, 0).0[0] < 50, "dark pixel moves darker");
        assert!(out.get_pixel(1, 0).0[0] > 150, "bright pixel moves brighter");
    }

    #[test]
    fn saturation_min_is_near_grayscale() {
        let img = image_of(&[[200, 50, 50, 255]], 1);
        let adj = Adjustments { saturation: 1, ..Default::default() };
        let px = adj.apply(&img).to_rgba8().get_pixel(0, 0).0;
        let max = px[0].max(px[1]).max(px[2]);
        let min = px[0].min(px[1]).min(px[2]);
        assert!(max - min <= 4, "channels should collapse toward luma: {px:?}");
    }

    #[test]
    fn gray_is_invariant_under_saturation() {
        let img = image_of(&[[128, 128, 128, 255]], 1);
        for value in [1, 30, 100] {
            let adj = Adjustments { saturation: value, ..Default::default() };
            let out = adj.apply(&img).to_rgba8();
            assert_eq!(out.get_pixel(0, 0).0, [128, 128, 128, 255], "saturation {value}");
        }
    }

    #[test]
    fn sharpness_leaves_flat_image_unchanged() {
        let img = image_of(&[[90, 90, 90, 255]; 9], 3);
        let adj = Adjustments { sharpness: 100, ..Default::default() };
        let out = adj.apply(&img).to_rgba8();
        assert_eq!(out.get_pixel(1, 1).0, [90, 90, 90, 255]);
    }

    #[test]
    fn alpha_survives_the_full_pipeline() {
        let img = image_of(&[[200, 50, 50, 77]; 9], 3);
        let adj = Adjustments { brightness: 80, contrast: 30, saturation: 70, sharpness: 90 };
        let out = adj.apply(&img).to_rgba8();
        assert!(out.pixels().all(|p| p[3] == 77));
    }

    #[test]
    fn applying_is_pure_over_the_reference() {
        // Moving a slider twice must equal moving it once to the final
        // value: apply never accumulates onto prior output.
        let img = image_of(&[[10, 60, 200, 255], [250, 5, 90, 255]], 2);
        let half = Adjustments { brightness: 75, ..Default::default() };
        let full = Adjustments { brightness: 100, ..Default::default() };
        let _discarded = half.apply(&img);
        assert_eq!(full.apply(&img).to_rgba8(), full.apply(&img).to_rgba8());
    }

    #[test]
    fn extreme_values_stay_in_range() {
        let img = image_of(&[[0, 255, 128, 255], [255, 0, 7, 255]], 2);
        let adj = Adjustments {
            brightness: SLIDER_MAX,
            contrast: SLIDER_MAX,
            saturation: SLIDER_MAX,
            sharpness: SLIDER_MAX,
        };
        let out = adj.apply(&img);
        assert_eq!(out.width(), 2);
        let adj_min = Adjustments {
            brightness: SLIDER_MIN,
            contrast: SLIDER_MIN,
            saturation: SLIDER_MIN,
            sharpness: SLIDER_MIN,
        };
        let out_min = adj_min.apply(&img);
        assert_eq!(out_min.height(), 1);
    }
}
