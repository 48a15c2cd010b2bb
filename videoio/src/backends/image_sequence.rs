use crate::{Result, VideoCapture, VideoError, VideoWriter};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};

const FRAME_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

/// Plays the image files of a directory in filename order.
#[derive(Debug)]
pub struct ImageSequenceCapture {
    files: Vec<PathBuf>,
    cursor: usize,
}

impl ImageSequenceCapture {
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let mut files: Vec<PathBuf> = fs::read_dir(directory.as_ref())
            .map_err(VideoError::Io)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map(|ext| FRAME_EXTENSIONS.iter().any(|k| ext.eq_ignore_ascii_case(k)))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(VideoError::Backend(
                "directory contains no image frames".to_string(),
            ));
        }
        log::debug!("found {} sequence frames", files.len());

        Ok(Self { files, cursor: 0 })
    }

    pub fn frame_count(&self) -> usize {
        self.files.len()
    }
}

impl VideoCapture for ImageSequenceCapture {
    fn is_opened(&self) -> bool {
        !self.files.is_empty()
    }

    fn grab(&mut self) -> Result<()> {
        if self.cursor < self.files.len() {
            Ok(())
        } else {
            Err(VideoError::EndOfStream)
        }
    }

    fn retrieve(&mut self) -> Result<RgbImage> {
        let Some(path) = self.files.get(self.cursor) else {
            return Err(VideoError::EndOfStream);
        };

        let img = image::open(path).map_err(|e| {
            VideoError::Backend(format!("unreadable frame {}: {}", path.display(), e))
        })?;
        self.cursor += 1;
        Ok(img.into_rgb8())
    }
}

/// Writes frames as zero-padded numbered PNG files, creating the target
/// directory if needed.
#[derive(Debug)]
pub struct ImageSequenceWriter {
    directory: PathBuf,
    prefix: String,
    next_index: usize,
}

impl ImageSequenceWriter {
    pub fn new(directory: &Path, prefix: &str) -> Result<Self> {
        fs::create_dir_all(directory).map_err(VideoError::Io)?;
        Ok(Self {
            directory: directory.to_path_buf(),
            prefix: prefix.to_string(),
            next_index: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.next_index
    }
}

impl VideoWriter for ImageSequenceWriter {
    fn write(&mut self, frame: &RgbImage) -> Result<()> {
        let path = self
            .directory
            .join(format!("{}_{:06}.png", self.prefix, self.next_index));
        frame
            .save(&path)
            .map_err(|e| VideoError::Backend(format!("cannot save frame: {}", e)))?;
        self.next_index += 1;
        Ok(())
    }
}
