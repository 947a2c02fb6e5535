use image::DynamicImage;
use image::RgbaImage;
use image::imageops;
use image::imageops::FilterType;
use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_THUMBNAIL_SIZE: u32 = 32;

/// How fetched artwork is turned into a thumbnail. Also handed to the image
/// subsystem, which may apply it itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleOptions {
    /// Edge length of the square target box.
    pub desired_size: u32,
    /// Scale images larger than the box down to fit it.
    pub scale: bool,
    /// Center the result on a transparent canvas of the full box size.
    pub pad: bool,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            desired_size: DEFAULT_THUMBNAIL_SIZE,
            scale: true,
            pad: true,
        }
    }
}

/// Fits `image` into the square box described by `options`.
///
/// Images already at the target size are returned as-is. Larger images are
/// scaled down keeping their aspect ratio; smaller ones are never upscaled.
/// An empty input yields an empty image.
pub fn scale_and_pad(image: &DynamicImage, options: &ScaleOptions) -> RgbaImage {
    let (width, height) = (image.width(), image.height());
    let size = options.desired_size;
    if width == 0 || height == 0 || size == 0 {
        return RgbaImage::new(0, 0);
    }

    if width == size && height == size {
        return image.to_rgba8();
    }

    let scaled = if options.scale && (width > size || height > size) {
        let (fit_width, fit_height) = fit_within(width, height, size);
        imageops::resize(image, fit_width, fit_height, FilterType::Triangle)
    } else {
        image.to_rgba8()
    };

    if !options.pad || scaled.width() > size || scaled.height() > size {
        return scaled;
    }
    if scaled.width() == size && scaled.height() == size {
        return scaled;
    }

    let mut canvas = RgbaImage::new(size, size);
    let x = (size - scaled.width()) / 2;
    let y = (size - scaled.height()) / 2;
    imageops::replace(&mut canvas, &scaled, i64::from(x), i64::from(y));
    canvas
}

/// Largest dimensions with the same aspect ratio that fit a `size` square.
fn fit_within(width: u32, height: u32, size: u32) -> (u32, u32) {
    let shrink = |long: u32, short: u32| {
        let scaled = (u64::from(short) * u64::from(size) + u64::from(long) / 2) / u64::from(long);
        u32::try_from(scaled).unwrap_or(size).clamp(1, size)
    };
    if width >= height {
        (size, shrink(width, height))
    } else {
        (shrink(height, width), size)
    }
}
