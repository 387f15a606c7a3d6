//! PNG output for composed atlases
//!
//! Writes are all-or-nothing: data goes to a temporary file next to the
//! destination ([`StagedFile`]) and is renamed over it only once fully
//! written. Several staged files can be prepared before any is committed.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{AtlasError, AtlasResult};

/// A fully written temporary file waiting to be renamed over its destination.
///
/// Dropping it without [`StagedFile::commit`] deletes the temporary file and
/// leaves the destination untouched.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    path: PathBuf,
}

impl StagedFile {
    /// Final destination of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically replace the destination with the staged contents.
    pub fn commit(self) -> AtlasResult<()> {
        let StagedFile { temp, path } = self;
        temp.persist(&path).map_err(|e| AtlasError::encode(&path, e.error))?;
        Ok(())
    }
}

/// Encode an atlas canvas as a lossless RGBA PNG into a [`StagedFile`].
///
/// Missing parent directories are created; nothing is visible at `path`
/// until the staged file is committed.
///
/// # Errors
///
/// [`AtlasError::Encode`] if the canvas has a zero dimension or the
/// destination cannot be written.
pub fn stage_png(canvas: &RgbaImage, path: &Path) -> AtlasResult<StagedFile> {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return Err(AtlasError::encode(
            path,
            format!("canvas is empty ({}x{})", width, height),
        ));
    }

    stage(path, |writer| {
        PngEncoder::new(writer)
            .write_image(canvas.as_raw(), width, height, ColorType::Rgba8)
            .map_err(|e| e.to_string())
    })
}

/// Save an atlas canvas as a lossless RGBA PNG.
///
/// Any existing file at `path` is replaced. A failed write leaves no file
/// behind and does not touch an existing destination.
pub fn encode_png(canvas: &RgbaImage, path: &Path) -> AtlasResult<()> {
    stage_png(canvas, path)?.commit()?;
    debug!(path = %path.display(), width = canvas.width(), height = canvas.height(), "wrote atlas");
    Ok(())
}

/// Write `path`'s future contents into a sibling temporary file.
pub fn stage<F>(path: &Path, write: F) -> AtlasResult<StagedFile>
where
    F: FnOnce(&mut dyn Write) -> Result<(), String>,
{
    if path.is_dir() {
        return Err(AtlasError::encode(path, "destination is a directory"));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|e| AtlasError::encode(path, e))?;
    }

    let mut temp = NamedTempFile::new_in(&dir).map_err(|e| AtlasError::encode(path, e))?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer).map_err(|reason| AtlasError::encode(path, reason))?;
        writer.flush().map_err(|e| AtlasError::encode(path, e))?;
    }

    Ok(StagedFile { temp, path: path.to_path_buf() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn entries(dir: &Path) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> =
            fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()).collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_encode_round_trips_alpha() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("atlas.png");

        let mut canvas = RgbaImage::new(4, 2);
        canvas.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        canvas.put_pixel(3, 1, Rgba([10, 20, 30, 77]));
        encode_png(&canvas, &path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded, canvas);
    }

    #[test]
    fn test_encode_overwrites_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("atlas.png");
        fs::write(&path, b"stale").unwrap();

        let canvas = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));
        encode_png(&canvas, &path).unwrap();

        assert_eq!(image::open(&path).unwrap().to_rgba8(), canvas);
        assert_eq!(entries(dir.path()), vec![path]);
    }

    #[test]
    fn test_encode_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets/textures/player.png");
        encode_png(&RgbaImage::new(1, 1), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_encode_empty_canvas_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let err = encode_png(&RgbaImage::new(0, 4), &path).unwrap_err();
        assert!(matches!(err, AtlasError::Encode { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_encode_unwritable_destination() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"file").unwrap();

        let path = blocker.join("atlas.png");
        let err = encode_png(&RgbaImage::new(2, 2), &path).unwrap_err();
        assert!(matches!(err, AtlasError::Encode { .. }));
    }

    #[test]
    fn test_encode_directory_destination_rejected() {
        let dir = tempdir().unwrap();
        let err = encode_png(&RgbaImage::new(2, 2), dir.path()).unwrap_err();
        assert!(matches!(err, AtlasError::Encode { .. }));
    }

    #[test]
    fn test_failed_write_leaves_no_trace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, b"original").unwrap();

        let err = stage(&path, |w| {
            w.write_all(b"partial").map_err(|e| e.to_string())?;
            Err("boom".to_string())
        })
        .unwrap_err();

        assert!(err.to_string().contains("boom"));
        assert_eq!(fs::read(&path).unwrap(), b"original");
        assert_eq!(entries(dir.path()), vec![path]);
    }

    #[test]
    fn test_staged_file_invisible_until_commit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("atlas.png");
        fs::write(&path, b"previous").unwrap();

        let staged = stage_png(&RgbaImage::new(3, 3), &path).unwrap();
        assert_eq!(staged.path(), path.as_path());
        assert_eq!(fs::read(&path).unwrap(), b"previous");

        staged.commit().unwrap();
        assert_eq!(image::open(&path).unwrap().to_rgba8().dimensions(), (3, 3));
        assert_eq!(entries(dir.path()), vec![path]);
    }

    #[test]
    fn test_dropped_stage_leaves_no_trace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("atlas.png");

        drop(stage_png(&RgbaImage::new(2, 2), &path).unwrap());
        assert!(entries(dir.path()).is_empty());
    }
}
