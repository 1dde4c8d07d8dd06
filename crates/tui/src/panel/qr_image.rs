use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

const QR_FILE_STEM: &str = "whatsapp-qr";

#[derive(Debug, Error)]
pub enum QrImageError {
    #[error("QR payload is empty")]
    Empty,
    #[error("QR payload is not a data URI")]
    NotDataUri,
    #[error("QR data URI is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 in QR payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("QR payload is not a PNG, JPEG, GIF or WebP image")]
    UnsupportedFormat,
    #[error("failed to write QR image: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl QrImage {
    /// Decodes an image data URI such as `data:image/png;base64,iVBOR...`.
    pub fn from_data_uri(src: &str) -> Result<Self, QrImageError> {
        if src.trim().is_empty() {
            return Err(QrImageError::Empty);
        }
        let rest = src.strip_prefix("data:").ok_or(QrImageError::NotDataUri)?;
        let (meta, payload) = rest.split_once(',').ok_or(QrImageError::NotDataUri)?;
        if !meta
            .split(';')
            .any(|part| part.trim().eq_ignore_ascii_case("base64"))
        {
            return Err(QrImageError::NotBase64);
        }

        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(&cleaned)
            .or_else(|_| STANDARD_NO_PAD.decode(&cleaned))?;
        let mime = sniff_image(&bytes).ok_or(QrImageError::UnsupportedFormat)?;
        Ok(Self { mime, bytes })
    }

    pub fn extension(&self) -> &'static str {
        match self.mime {
            "image/jpeg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "png",
        }
    }

    /// Writes the image into `dir` so it can be opened outside the terminal.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, QrImageError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{QR_FILE_STEM}.{}", self.extension()));
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn decodes_png_data_uri() {
        let image = QrImage::from_data_uri(&format!("data:image/png;base64,{ONE_PIXEL_PNG}"))
            .expect("decode");
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.extension(), "png");
    }

    #[test]
    fn detects_format_from_bytes_not_declared_mime() {
        let image = QrImage::from_data_uri(&format!("data:image/jpeg;base64,{ONE_PIXEL_PNG}"))
            .expect("decode");
        assert_eq!(image.mime, "image/png");
    }

    #[test]
    fn rejects_broken_payloads() {
        assert!(matches!(
            QrImage::from_data_uri(""),
            Err(QrImageError::Empty)
        ));
        assert!(matches!(
            QrImage::from_data_uri("iVBORw0KGgo="),
            Err(QrImageError::NotDataUri)
        ));
        assert!(matches!(
            QrImage::from_data_uri("data:image/png,rawbytes"),
            Err(QrImageError::NotBase64)
        ));
        assert!(matches!(
            QrImage::from_data_uri("data:image/png;base64,@@@@"),
            Err(QrImageError::Base64(_))
        ));
        assert!(matches!(
            QrImage::from_data_uri("data:image/png;base64,aGVsbG8gd29ybGQ="),
            Err(QrImageError::UnsupportedFormat)
        ));
    }

    #[test]
    fn saves_into_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let image = QrImage::from_data_uri(&format!("data:image/png;base64,{ONE_PIXEL_PNG}"))
            .expect("decode");
        let path = image.save_to(&dir.path().join("qr")).expect("save");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("whatsapp-qr.png"));
        assert_eq!(std::fs::read(path).expect("read"), image.bytes);
    }
}
