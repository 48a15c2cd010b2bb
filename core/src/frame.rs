use image::{DynamicImage, GrayImage, RgbImage};
use std::path::Path;

/// A decoded frame, either single-channel or three-channel.
///
/// Processing stages that work on intensity data take the `Gray` arm,
/// everything else runs on `Rgb`. Conversions between the two go through
/// [`Frame::to_gray`] and [`Frame::to_rgb`] and always allocate.
#[derive(Debug, Clone)]
pub enum Frame {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl Frame {
    /// Wraps a decoded image, keeping single-channel data single-channel.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(gray) => Frame::Gray(gray),
            other => Frame::Rgb(other.into_rgb8()),
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Frame::Gray(img) => img.width(),
            Frame::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Frame::Gray(img) => img.height(),
            Frame::Rgb(img) => img.height(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn channels(&self) -> u8 {
        match self {
            Frame::Gray(_) => 1,
            Frame::Rgb(_) => 3,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Returns the frame as an owned RGB image, replicating the channel
    /// for gray input.
    pub fn to_rgb(&self) -> RgbImage {
        match self {
            Frame::Gray(img) => DynamicImage::ImageLuma8(img.clone()).into_rgb8(),
            Frame::Rgb(img) => img.clone(),
        }
    }

    /// Returns the frame as an owned gray image, converting with the
    /// standard luma weights for RGB input.
    pub fn to_gray(&self) -> GrayImage {
        match self {
            Frame::Gray(img) => img.clone(),
            Frame::Rgb(img) => DynamicImage::ImageRgb8(img.clone()).into_luma8(),
        }
    }

    /// Encodes the frame to `path`, format inferred from the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> image::ImageResult<()> {
        match self {
            Frame::Gray(img) => img.save(path),
            Frame::Rgb(img) => img.save(path),
        }
    }
}

impl From<GrayImage> for Frame {
    fn from(img: GrayImage) -> Self {
        Frame::Gray(img)
    }
}

impl From<RgbImage> for Frame {
    fn from(img: RgbImage) -> Self {
        Frame::Rgb(img)
    }
}
