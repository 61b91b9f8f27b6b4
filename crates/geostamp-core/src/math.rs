//! Shared arithmetic: DMS conversion and crop geometry.

/// Convert degrees/minutes/seconds, each a `(numerator, denominator)` pair,
/// to decimal degrees: `deg + min/60 + sec/3600`.
///
/// Callers must reject zero denominators first; see
/// [`DmsCoordinate::is_valid`](crate::types::DmsCoordinate::is_valid).
pub fn dms_to_decimal(degrees: (u32, u32), minutes: (u32, u32), seconds: (u32, u32)) -> f64 {
    let ratio = |(num, den): (u32, u32)| f64::from(num) / f64::from(den);
    ratio(degrees) + ratio(minutes) / 60.0 + ratio(seconds) / 3600.0
}

/// Resize-then-crop plan that maps a source image onto an exact target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPlan {
    /// Width after scaling, before cropping
    pub scaled_width: u32,
    /// Height after scaling, before cropping
    pub scaled_height: u32,
    /// Left edge of the crop window in the scaled image
    pub left: u32,
    /// Top edge of the crop window in the scaled image
    pub top: u32,
    /// Final width
    pub width: u32,
    /// Final height
    pub height: u32,
}

impl CropPlan {
    /// Plan a cover-scale and center-crop of `source` onto `target`.
    ///
    /// Portrait sources (`width / height < 1`) swap the target so the crop
    /// follows the photo's orientation. The scale factor is the larger of the
    /// two axis ratios, so both scaled sides are at least the target. Sizes
    /// must be non-zero.
    pub fn new(source: (u32, u32), target: (u32, u32)) -> Self {
        let (src_w, src_h) = source;
        let (mut width, mut height) = target;

        if src_w < src_h {
            std::mem::swap(&mut width, &mut height);
        }

        let scale = f64::max(
            f64::from(height) / f64::from(src_h),
            f64::from(width) / f64::from(src_w),
        );

        // Float truncation can land one pixel short of the target.
        let scaled_width = ((f64::from(src_w) * scale) as u32).max(width);
        let scaled_height = ((f64::from(src_h) * scale) as u32).max(height);

        Self {
            scaled_width,
            scaled_height,
            left: (scaled_width - width) / 2,
            top: (scaled_height - height) / 2,
            width,
            height,
        }
    }

    /// Whether the source already has the scaled size (no resample needed).
    pub fn is_identity_scale(&self, source: (u32, u32)) -> bool {
        source == (self.scaled_width, self.scaled_height)
    }
}
