//! Cover-scale and center-crop to the target size.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::error::PipelineError;
use crate::math::CropPlan;

/// Resize `image` so it covers the target, then crop the center.
///
/// The target is swapped for portrait sources, so the result is
/// `(width, height)` for landscape or square photos and `(height, width)`
/// for portrait ones. Very lopsided sources whose intermediate size would
/// exceed `max_dimension` on either side are rejected before any resampling.
pub fn resize_and_crop(
    image: DynamicImage,
    width: u32,
    height: u32,
    max_dimension: u32,
) -> Result<DynamicImage, PipelineError> {
    if width == 0 || height == 0 {
        return Err(PipelineError::InvalidDimensions { width, height });
    }
    let source = image.dimensions();
    if source.0 == 0 || source.1 == 0 {
        return Err(PipelineError::InvalidDimensions {
            width: source.0,
            height: source.1,
        });
    }

    let plan = CropPlan::new(source, (width, height));
    if plan.scaled_width.max(plan.scaled_height) > max_dimension.max(width).max(height) {
        return Err(PipelineError::ScaleTooLarge {
            width: plan.scaled_width,
            height: plan.scaled_height,
            max_dim: max_dimension,
        });
    }
    tracing::debug!(
        "Resize {}x{} -> {}x{}, crop {}x{} at ({}, {})",
        source.0,
        source.1,
        plan.scaled_width,
        plan.scaled_height,
        plan.width,
        plan.height,
        plan.left,
        plan.top
    );

    let scaled = if plan.is_identity_scale(source) {
        image
    } else {
        image.resize_exact(plan.scaled_width, plan.scaled_height, FilterType::CatmullRom)
    };

    Ok(scaled.crop_imm(plan.left, plan.top, plan.width, plan.height))
}
