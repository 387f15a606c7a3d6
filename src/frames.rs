//! Frame extraction from animated images
//!
//! Decodes a multi-frame container (GIF, APNG) into an ordered, fully
//! materialized list of [`Frame`]s. Still images decode to a single frame.
//!
//! Codec APIs stay behind [`FrameSource`]; the rest of the crate only sees
//! [`Frame`] values.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::{AnimationDecoder, DynamicImage, ImageError, ImageFormat, RgbaImage};
use tracing::debug;

use crate::error::{AtlasError, AtlasResult};

/// One still image of an animation, in decode order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    index: usize,
    image: RgbaImage,
    delay_ms: u32,
}

impl Frame {
    /// Create a frame at the given sequence index.
    pub fn new(index: usize, image: RgbaImage) -> Self {
        Self { index, image, delay_ms: 0 }
    }

    /// Set the display delay reported by the container.
    pub fn with_delay_ms(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Position of this frame in decode order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Display delay in milliseconds (0 when the container has no timing).
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Pixel data of the frame.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Something that can turn a file into an ordered frame sequence.
pub trait FrameSource {
    /// Decode every frame of `path`.
    ///
    /// Reaching the end of the frame sequence is normal termination; any other
    /// decode failure aborts with [`AtlasError::Decode`]. A source that yields
    /// no frames at all is reported as [`AtlasError::EmptyAnimation`].
    fn frames(&self, path: &Path) -> AtlasResult<Vec<Frame>>;
}

/// [`FrameSource`] backed by the `image` crate codecs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFrameSource;

impl FrameSource for ImageFrameSource {
    fn frames(&self, path: &Path) -> AtlasResult<Vec<Frame>> {
        let file = File::open(path).map_err(|e| decode_error(path, None, ImageError::IoError(e)))?;
        let mut reader = BufReader::new(file);
        let format = detect_format(&mut reader, path).map_err(|e| decode_error(path, None, e))?;

        debug!(path = %path.display(), ?format, "decoding frames");

        let frames = match format {
            ImageFormat::Gif => {
                let decoder = GifDecoder::new(reader).map_err(|e| decode_error(path, None, e))?;
                collect_frames(path, decoder.into_frames())?
            }
            ImageFormat::Png => {
                let decoder = PngDecoder::new(reader).map_err(|e| decode_error(path, None, e))?;
                if decoder.is_apng() {
                    collect_frames(path, decoder.apng().into_frames())?
                } else {
                    let still = DynamicImage::from_decoder(decoder)
                        .map_err(|e| decode_error(path, Some(0), e))?;
                    vec![Frame::new(0, still.to_rgba8())]
                }
            }
            other => {
                let still = image::load(reader, other).map_err(|e| decode_error(path, Some(0), e))?;
                vec![Frame::new(0, still.to_rgba8())]
            }
        };

        if frames.is_empty() {
            return Err(AtlasError::EmptyAnimation { path: path.to_path_buf() });
        }

        debug!(path = %path.display(), count = frames.len(), "decoded frames");
        Ok(frames)
    }
}

/// Decode every frame of `path` with the default [`ImageFrameSource`].
pub fn decode_frames(path: &Path) -> AtlasResult<Vec<Frame>> {
    ImageFrameSource.frames(path)
}

/// Pick the container from the leading bytes, falling back to the extension.
fn detect_format(reader: &mut BufReader<File>, path: &Path) -> Result<ImageFormat, ImageError> {
    let head = reader.fill_buf().map_err(ImageError::IoError)?;
    match image::guess_format(head) {
        Ok(format) => Ok(format),
        Err(_) => ImageFormat::from_path(path),
    }
}

/// Drain an animation iterator into frames, stopping only at its natural end.
fn collect_frames(path: &Path, frames: image::Frames<'_>) -> AtlasResult<Vec<Frame>> {
    let mut out = Vec::new();
    for (index, decoded) in frames.enumerate() {
        let decoded = decoded.map_err(|e| decode_error(path, Some(index), e))?;
        let (numer, denom) = decoded.delay().numer_denom_ms();
        let delay_ms = if denom == 0 { 0 } else { numer / denom };
        out.push(Frame::new(index, decoded.into_buffer()).with_delay_ms(delay_ms));
    }
    Ok(out)
}

fn decode_error(path: &Path, frame: Option<usize>, source: ImageError) -> AtlasError {
    AtlasError::Decode { path: path.to_path_buf(), frame, source }
}
