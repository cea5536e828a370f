//! Reading captures and writing rendered variants.

use crate::error::{InputError, OutputError};
use crate::frame::Frame;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, ImageReader, RgbImage};
use std::io::{BufWriter, Write};
use std::path::Path;

/// A decoded capture
#[derive(Debug, Clone)]
pub struct Decoded {
    pub frame: Frame,
    /// Container format detected from the file contents
    pub format: Option<ImageFormat>,
}

/// Decode `path` into a device-RGB frame.
///
/// The format is sniffed from the leading bytes, so a mislabeled extension
/// still decodes. Zero-sized images are rejected.
pub fn decode(path: &Path) -> Result<Decoded, InputError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| InputError::Decode {
            detail: e.to_string(),
        })?;
    let format = reader.format();

    let image = reader.decode().map_err(|e| InputError::Decode {
        detail: e.to_string(),
    })?;

    let frame = Frame::from_rgb(image.into_rgb8());
    if frame.is_empty() {
        return Err(InputError::Decode {
            detail: "image has no pixels".to_string(),
        });
    }

    Ok(Decoded { frame, format })
}

/// Encode `image` to `output`, picking the format from its extension.
///
/// Bytes go to a temporary file next to `output` that is renamed into place
/// once complete, so a failed write never leaves a partial file behind.
pub fn encode(image: &RgbImage, output: &Path, quality: u8) -> Result<(), OutputError> {
    let format = ImageFormat::from_path(output)
        .map_err(|_| OutputError::UnsupportedFormat(output.display().to_string()))?;
    if !format.writing_enabled() {
        return Err(OutputError::UnsupportedFormat(format!("{:?}", format)));
    }

    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let temp_file = tempfile::Builder::new()
        .prefix(".render-")
        .tempfile_in(dir)?;

    let mut writer = BufWriter::new(temp_file);
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            image.write_with_encoder(encoder)?;
        }
        other => image.write_to(&mut writer, other)?,
    }
    writer.flush()?;

    let temp_file = writer
        .into_inner()
        .map_err(|e| OutputError::Io(e.error().to_string()))?;
    temp_file
        .persist(output)
        .map_err(|e| OutputError::Io(e.error.to_string()))?;

    tracing::debug!("Wrote {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::fixtures::textured_frame;
    use std::fs;

    #[test]
    fn test_png_is_written_losslessly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let frame = textured_frame(12, 9, 4);

        encode(frame.pixels(), &path, 95).unwrap();
        let decoded = decode(&path).unwrap();

        assert_eq!(decoded.format, Some(ImageFormat::Png));
        assert_eq!(decoded.frame, frame);
    }

    #[test]
    fn test_jpeg_quality_changes_size() {
        let dir = tempfile::tempdir().unwrap();
        let frame = textured_frame(64, 64, 8);
        let low = dir.path().join("low.jpg");
        let high = dir.path().join("high.JPG");

        encode(frame.pixels(), &low, 20).unwrap();
        encode(frame.pixels(), &high, 95).unwrap();

        let low_size = fs::metadata(&low).unwrap().len();
        let high_size = fs::metadata(&high).unwrap().len();
        assert!(low_size < high_size);
        assert_eq!(decode(&high).unwrap().frame.dimensions(), (64, 64));
    }

    #[test]
    fn test_format_is_sniffed_from_contents() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("real.png");
        encode(textured_frame(5, 5, 1).pixels(), &png, 95).unwrap();

        let mislabeled = dir.path().join("mislabeled.jpg");
        fs::rename(&png, &mislabeled).unwrap();

        let decoded = decode(&mislabeled).unwrap();
        assert_eq!(decoded.format, Some(ImageFormat::Png));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, vec![0x42u8; 4096]).unwrap();

        assert!(matches!(decode(&path), Err(InputError::Decode { .. })));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = encode(
            textured_frame(4, 4, 1).pixels(),
            &dir.path().join("out.xyz"),
            95,
        )
        .unwrap_err();
        assert!(matches!(err, OutputError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("out.jpg");

        let err = encode(textured_frame(4, 4, 1).pixels(), &output, 95).unwrap_err();
        assert!(matches!(err, OutputError::Io(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
