//! Image discovery in directories.

use std::fs;
use std::path::Path;

use crate::corpus::{Corpus, CorpusImage};
use crate::error::{Error, Result};

/// Supported image extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

/// Canonical format name for a file extension.
pub(crate) fn format_for_extension(extension: &str) -> String {
    match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => "jpeg".to_string(),
        "tif" | "tiff" => "tiff".to_string(),
        other => other.to_string(),
    }
}

/// Discover images in a directory.
pub fn discover_corpus(path: &Path) -> Result<Corpus> {
    if !path.exists() {
        return Err(Error::Corpus(format!("Path does not exist: {}", path.display())));
    }

    if !path.is_dir() {
        return Err(Error::Corpus(format!("Path is not a directory: {}", path.display())));
    }

    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("corpus")
        .to_string();

    let mut corpus = Corpus::new(name, path);
    discover_recursive(path, path, &mut corpus.images)?;
    corpus.images.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    Ok(corpus)
}

fn discover_recursive(root: &Path, current: &Path, images: &mut Vec<CorpusImage>) -> Result<()> {
    let entries = fs::read_dir(current).map_err(|e| {
        Error::Corpus(format!("Failed to read directory {}: {}", current.display(), e))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            Error::Corpus(format!("Failed to read entry in {}: {}", current.display(), e))
        })?;

        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.starts_with('.'));

        if path.is_dir() {
            if !hidden {
                discover_recursive(root, &path, images)?;
            }
        } else if path.is_file() {
            if let Some(img) = try_load_image_info(&path, root) {
                images.push(img);
            }
        }
    }

    Ok(())
}

fn try_load_image_info(path: &Path, root: &Path) -> Option<CorpusImage> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }

    let data = fs::read(path).ok()?;
    let relative_path = path.strip_prefix(root).ok()?.to_path_buf();
    let (width, height) = sniff_dimensions(&data).unwrap_or((0, 0));

    Some(CorpusImage {
        relative_path,
        width,
        height,
        file_size: data.len() as u64,
        format: format_for_extension(&extension),
    })
}

/// Read dimensions from a PNG, JPEG or TIFF header without decoding pixels.
fn sniff_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        let width = u32::from_be_bytes(data.get(16..20)?.try_into().ok()?);
        let height = u32::from_be_bytes(data.get(20..24)?.try_into().ok()?);
        return Some((width, height));
    }

    if data.starts_with(&[0xFF, 0xD8]) {
        return parse_jpeg_dimensions(data);
    }

    if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        return parse_tiff_dimensions(data);
    }

    None
}

const TIFF_IMAGE_WIDTH: u16 = 256;
const TIFF_IMAGE_LENGTH: u16 = 257;
const TIFF_SHORT: u16 = 3;
const TIFF_LONG: u16 = 4;

/// Width and height from the first IFD of a classic (non-Big) TIFF.
fn parse_tiff_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let little = data[0] == b'I';
    let u16_at = |at: usize| -> Option<u16> {
        let bytes = data.get(at..at + 2)?.try_into().ok()?;
        Some(if little { u16::from_le_bytes(bytes) } else { u16::from_be_bytes(bytes) })
    };
    let u32_at = |at: usize| -> Option<u32> {
        let bytes = data.get(at..at + 4)?.try_into().ok()?;
        Some(if little { u32::from_le_bytes(bytes) } else { u32::from_be_bytes(bytes) })
    };

    let ifd = usize::try_from(u32_at(4)?).ok()?;
    let entries = usize::from(u16_at(ifd)?);

    let (mut width, mut height) = (None, None);
    for n in 0..entries {
        let entry = ifd + 2 + n * 12;
        let tag = u16_at(entry)?;
        if tag != TIFF_IMAGE_WIDTH && tag != TIFF_IMAGE_LENGTH {
            continue;
        }
        let value = match u16_at(entry + 2)? {
            TIFF_SHORT => u32::from(u16_at(entry + 8)?),
            TIFF_LONG => u32_at(entry + 8)?,
            _ => return None,
        };
        if tag == TIFF_IMAGE_WIDTH {
            width = Some(value);
        } else {
            height = Some(value);
        }
        if let (Some(w), Some(h)) = (width, height) {
            return Some((w, h));
        }
    }

    None
}

fn parse_jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        // SOFn, excluding DHT (C4), JPG (C8) and DAC (CC)
        if matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            let height = u32::from(data[i + 5]) << 8 | u32::from(data[i + 6]);
            let width = u32::from(data[i + 7]) << 8 | u32::from(data[i + 8]);
            return Some((width, height));
        }

        let length = usize::from(data[i + 2]) << 8 | usize::from(data[i + 3]);
        i += 2 + length;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        png.extend_from_slice(&[0, 0, 0, 13]);
        png.extend_from_slice(b"IHDR");
        png.extend_from_slice(&width.to_be_bytes());
        png.extend_from_slice(&height.to_be_bytes());
        png.extend_from_slice(&[8, 6, 0, 0, 0]);
        png
    }

    #[test]
    fn test_png_dimensions() {
        assert_eq!(sniff_dimensions(&png_header(768, 512)), Some((768, 512)));
        assert_eq!(sniff_dimensions(&png_header(768, 512)[..20]), None);
    }

    #[test]
    fn test_jpeg_dimensions() {
        let mut jpeg = vec![0xFF, 0xD8];
        // APP0 segment of length 4 (2 length bytes + 2 payload)
        jpeg.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
        // SOF0: length, precision, height 0x0200, width 0x0300
        jpeg.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x02, 0x00, 0x03, 0x00, 0x03]);
        jpeg.extend_from_slice(&[0u8; 8]);
        assert_eq!(sniff_dimensions(&jpeg), Some((768, 512)));
    }

    /// One IFD holding ImageWidth as SHORT and ImageLength as LONG.
    fn tiff_header(big_endian: bool, width: u16, height: u32) -> Vec<u8> {
        let u16b = |v: u16| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
        let u32b = |v: u32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };

        let mut tiff = if big_endian { b"MM\0*".to_vec() } else { b"II*\0".to_vec() };
        tiff.extend_from_slice(&u32b(8));
        tiff.extend_from_slice(&u16b(3));
        // BitsPerSample first, so the scan has to skip an entry.
        for (tag, kind, value) in [(258u16, 3u16, 8u32), (256, 3, 0), (257, 4, height)] {
            tiff.extend_from_slice(&u16b(tag));
            tiff.extend_from_slice(&u16b(kind));
            tiff.extend_from_slice(&u32b(1));
            if kind == 3 {
                let short = if tag == 256 { width } else { value as u16 };
                tiff.extend_from_slice(&u16b(short));
                tiff.extend_from_slice(&[0, 0]);
            } else {
                tiff.extend_from_slice(&u32b(value));
            }
        }
        tiff.extend_from_slice(&u32b(0));
        tiff
    }

    #[test]
    fn test_tiff_dimensions() {
        assert_eq!(sniff_dimensions(&tiff_header(false, 720, 576)), Some((720, 576)));
        assert_eq!(sniff_dimensions(&tiff_header(true, 512, 512)), Some((512, 512)));
        // Truncated inside the IFD.
        assert_eq!(sniff_dimensions(&tiff_header(false, 720, 576)[..20]), None);
        assert_eq!(sniff_dimensions(b"II*\0"), None);
    }

    #[test]
    fn test_discover_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.png"), png_header(16, 8)).unwrap();
        fs::write(dir.path().join("a.tif"), b"II*\0").unwrap();
        fs::write(dir.path().join("c.tif"), tiff_header(false, 720, 576)).unwrap();
        fs::write(dir.path().join("notes.txt"), b"skip me").unwrap();
        fs::create_dir(dir.path().join(".cache")).unwrap();
        fs::write(dir.path().join(".cache").join("c.png"), png_header(1, 1)).unwrap();

        let corpus = discover_corpus(dir.path()).unwrap();
        let names: Vec<_> = corpus.images.iter().map(|i| i.name()).collect();
        assert_eq!(names, ["a.tif", "b.png", "c.tif"]);
        assert_eq!((corpus.images[1].width, corpus.images[1].height), (16, 8));
        assert_eq!((corpus.images[2].width, corpus.images[2].height), (720, 576));
        assert_eq!(corpus.images[0].format, "tiff");
        assert_eq!((corpus.images[0].width, corpus.images[0].height), (0, 0));
    }

    #[test]
    fn test_discover_missing_path() {
        assert!(matches!(
            discover_corpus(Path::new("/nonexistent/corpus/dir")),
            Err(Error::Corpus(_))
        ));
    }
}
