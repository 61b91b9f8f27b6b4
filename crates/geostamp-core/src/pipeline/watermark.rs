//! Watermark text rendering: right-aligned lines stacked above the bottom margin.
//!
//! Each line is drawn four times in black at diagonal offsets, then once in
//! translucent white on top, which keeps the text legible on any background.

use ab_glyph::{Font, FontVec, PxScale};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size, Blend};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::RenderConfig;
use crate::error::PipelineError;
use crate::types::Watermark;

const OUTLINE: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Draws watermark lines onto images.
pub struct WatermarkRenderer {
    margin: u32,
    line_spacing: f32,
    outline_offset: i32,
    text_alpha: u8,
}

impl WatermarkRenderer {
    /// Create a renderer from the render settings.
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            margin: config.margin,
            line_spacing: config.line_spacing,
            outline_offset: config.outline_offset,
            text_alpha: config.text_alpha,
        }
    }

    /// Draw `watermarks` onto `image`.
    ///
    /// Index 0 is the topmost line and the last index sits on the bottom
    /// margin. Text wider than the image runs off the left edge.
    pub fn render(
        &self,
        image: &DynamicImage,
        watermarks: &[Watermark],
    ) -> Result<RgbaImage, PipelineError> {
        let mut canvas = Blend(image.to_rgba8());
        let (width, height) = (canvas.0.width(), canvas.0.height());
        let fill = Rgba([255, 255, 255, self.text_alpha]);
        let mut fonts: HashMap<PathBuf, FontVec> = HashMap::new();

        for (index, watermark) in watermarks.iter().enumerate() {
            if !fonts.contains_key(&watermark.font_family) {
                let font = load_font(&watermark.font_family)?;
                fonts.insert(watermark.font_family.clone(), font);
            }
            let font = &fonts[&watermark.font_family];

            let scale = em_scale(font, watermark.font_size);
            let (text_width, _) = text_size(scale, font, &watermark.text);
            let (x, y) = self.line_origin(
                (width, height),
                text_width,
                watermark.font_size,
                index,
                watermarks.len(),
            );
            tracing::debug!("Watermark {:?} at ({}, {})", watermark.text, x, y);

            let o = self.outline_offset;
            for (dx, dy) in [(-o, -o), (o, -o), (-o, o), (o, o)] {
                draw_text_mut(&mut canvas, OUTLINE, x + dx, y + dy, scale, font, &watermark.text);
            }
            draw_text_mut(&mut canvas, fill, x, y, scale, font, &watermark.text);
        }

        Ok(canvas.0)
    }

    /// Top-left corner of line `index` out of `count`.
    ///
    /// `x = W - text_width - margin`,
    /// `y = H - font_size * (count - index) * line_spacing - margin`.
    pub fn line_origin(
        &self,
        canvas: (u32, u32),
        text_width: u32,
        font_size: u32,
        index: usize,
        count: usize,
    ) -> (i32, i32) {
        let (width, height) = canvas;
        let x = i64::from(width) - i64::from(text_width) - i64::from(self.margin);
        let rows_from_bottom = count.saturating_sub(index) as f32;
        let y = height as f32
            - font_size as f32 * rows_from_bottom * self.line_spacing
            - self.margin as f32;
        (x as i32, y.floor() as i32)
    }
}

/// Scale at which one em spans `font_size` pixels.
///
/// `PxScale` measures ascent minus descent, which is usually taller than the
/// em square. Fonts without a usable units-per-em fall back to the raw size.
pub fn em_scale(font: &impl Font, font_size: u32) -> PxScale {
    let size = font_size as f32;
    match font.units_per_em() {
        Some(units_per_em) if units_per_em > 0.0 => {
            PxScale::from(size * font.height_unscaled() / units_per_em)
        }
        _ => PxScale::from(size),
    }
}

/// Load a TrueType/OpenType font from disk.
pub fn load_font(path: &Path) -> Result<FontVec, PipelineError> {
    let data = std::fs::read(path).map_err(|e| PipelineError::Font {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    FontVec::try_from_vec(data).map_err(|e| PipelineError::Font {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> WatermarkRenderer {
        WatermarkRenderer::new(&RenderConfig::default())
    }

    /// A font shipped with most Linux images; tests that draw skip without it.
    fn system_font() -> Option<PathBuf> {
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/Library/Fonts/Arial Unicode.ttf",
        ]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    }

    #[test]
    fn test_line_origin_right_aligned() {
        let (x, y) = renderer().line_origin((3000, 2000), 400, 40, 0, 1);
        assert_eq!(x, 3000 - 400 - 40);
        assert_eq!(y, 2000 - 60 - 40);
    }

    #[test]
    fn test_line_origin_stacking_order() {
        // [A, B, C] appended, reversed to [C, B, A] before rendering:
        // C is at index 0 and gets the smallest y.
        let r = renderer();
        let order = ["C", "B", "A"];
        let ys: Vec<i32> = (0..order.len())
            .map(|i| r.line_origin((3000, 2000), 100, 40, i, order.len()).1)
            .collect();
        assert_eq!(ys, vec![2000 - 180 - 40, 2000 - 120 - 40, 2000 - 60 - 40]);
        assert!(ys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_line_origin_overflow_goes_negative() {
        let (x, _) = renderer().line_origin((100, 100), 500, 40, 0, 1);
        assert_eq!(x, 100 - 500 - 40);
    }

    #[test]
    fn test_missing_font_is_an_error() {
        let img = DynamicImage::new_rgb8(64, 64);
        let marks = [Watermark::new("2023-04-05", "/nonexistent/HeyMoon.ttf", 12)];
        let err = renderer().render(&img, &marks).unwrap_err();
        assert!(matches!(err, PipelineError::Font { .. }));
    }

    #[test]
    fn test_invalid_font_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(
            load_font(&path),
            Err(PipelineError::Font { .. })
        ));
    }

    #[test]
    fn test_em_scale_matches_em_size() {
        let Some(path) = system_font() else {
            eprintln!("Skipping em scale test: no system font found");
            return;
        };
        let font = load_font(&path).unwrap();
        let units_per_em = font.units_per_em().unwrap();
        let scale = em_scale(&font, 40);

        // One em of the scaled font is exactly the requested size.
        let em_px = scale.y * units_per_em / font.height_unscaled();
        assert!((em_px - 40.0).abs() < 1e-3);
        assert!(scale.y > 40.0);
        assert!((scale.x - scale.y).abs() < f32::EPSILON);
    }

    #[test]
    fn test_no_watermarks_leaves_image_unchanged() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            8,
            8,
            image::Rgb([10, 20, 30]),
        ));
        let out = renderer().render(&img, &[]).unwrap();
        assert!(out.pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_render_draws_in_bottom_right_corner() {
        let Some(font) = system_font() else {
            eprintln!("Skipping render test: no system font found");
            return;
        };
        let gray = Rgba([128, 128, 128, 255]);
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(400, 200, gray));
        let marks = [
            Watermark::new("Beijing", &font, 20),
            Watermark::new("2023-04-05 10:20:30", &font, 20),
        ];
        let out = renderer().render(&img, &marks).unwrap();
        assert_eq!(out.dimensions(), (400, 200));

        // Text sits in the bottom-right block above the margin.
        let changed = |x0: u32, y0: u32, x1: u32, y1: u32| {
            (y0..y1).any(|y| (x0..x1).any(|x| *out.get_pixel(x, y) != gray))
        };
        assert!(changed(200, 80, 360, 160));
        assert!(!changed(0, 0, 400, 60));
        assert!(!changed(0, 161, 400, 200));
    }
}
