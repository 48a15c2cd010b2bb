use crate::{Result, VideoCapture, VideoError};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, RgbImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Plays back an animated GIF as a frame stream. Every frame is decoded
/// and converted to RGB when the file is opened, so retrieval is just a
/// buffer clone.
pub struct GifCapture {
    frames: Vec<RgbImage>,
    cursor: usize,
}

impl GifCapture {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(VideoError::Io)?;
        let decoder = GifDecoder::new(BufReader::new(file))
            .map_err(|e| VideoError::Backend(format!("unreadable GIF: {}", e)))?;

        let frames = decoder
            .into_frames()
            .map(|frame| {
                let frame =
                    frame.map_err(|e| VideoError::Backend(format!("bad GIF frame: {}", e)))?;
                Ok(DynamicImage::ImageRgba8(frame.into_buffer()).into_rgb8())
            })
            .collect::<Result<Vec<RgbImage>>>()?;
        if frames.is_empty() {
            return Err(VideoError::Backend("GIF decoded to zero frames".to_string()));
        }
        log::debug!("decoded {} GIF frames", frames.len());

        Ok(Self { frames, cursor: 0 })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl std::fmt::Debug for GifCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifCapture")
            .field("frames", &self.frames.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl VideoCapture for GifCapture {
    fn is_opened(&self) -> bool {
        !self.frames.is_empty()
    }

    fn grab(&mut self) -> Result<()> {
        if self.cursor >= self.frames.len() {
            return Err(VideoError::EndOfStream);
        }
        Ok(())
    }

    fn retrieve(&mut self) -> Result<RgbImage> {
        let frame = self
            .frames
            .get(self.cursor)
            .cloned()
            .ok_or(VideoError::EndOfStream)?;
        self.cursor += 1;
        Ok(frame)
    }
}
