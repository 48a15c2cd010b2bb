//! Frame stream input and output.
//!
//! A [`VideoCapture`] turns an animated GIF or a directory of numbered
//! images into a stream of RGB frames; a [`VideoWriter`] records processed
//! frames back to disk. [`open_video`] picks the backend from the path.

use std::fmt::Debug;
use std::path::Path;

use image::RgbImage;

pub mod backends;

pub type Result<T> = std::result::Result<T, VideoError>;

#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific decode or encode failure.
    #[error("backend: {0}")]
    Backend(String),

    /// The source has delivered its last frame.
    #[error("end of stream")]
    EndOfStream,

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Frame source with the grab/retrieve split: `grab` checks that another
/// frame is available, `retrieve` decodes it and advances the stream.
pub trait VideoCapture: Send + Debug {
    /// Whether the source has any frames to deliver.
    fn is_opened(&self) -> bool;

    /// Succeeds while another frame is available.
    fn grab(&mut self) -> Result<()>;

    /// Returns the next frame and advances past it.
    fn retrieve(&mut self) -> Result<RgbImage>;

    /// Grabs and retrieves in one call.
    fn read(&mut self) -> Result<RgbImage> {
        self.grab()?;
        self.retrieve()
    }
}

/// Frame sink; one `write` call appends one frame.
pub trait VideoWriter: Send + Debug {
    fn write(&mut self, frame: &RgbImage) -> Result<()>;
}

/// Open a frame source, picking a backend from the path.
///
/// Animated GIFs decode fully up front. A directory is treated as a
/// numbered image sequence played in filename order.
pub fn open_video<P: AsRef<Path>>(path: P) -> Result<Box<dyn VideoCapture>> {
    let path = path.as_ref();
    if path.is_dir() {
        let cap = backends::ImageSequenceCapture::new(path)?;
        return Ok(Box::new(cap));
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("gif") => {
            let cap = backends::GifCapture::new(path)?;
            Ok(Box::new(cap))
        }
        _ => Err(VideoError::UnsupportedFormat(format!(
            "no backend can play {}",
            path.display()
        ))),
    }
}
