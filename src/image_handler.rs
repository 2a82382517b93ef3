//! # Image Handler Module
//!
//! Questo modulo gestisce la compressione in-place di un singolo file immagine
//! utilizzando il crate `image` per decodifica e ri-codifica.
//!
//! ## Formati Supportati
//!
//! | Estensione   | Output | Opzioni usate                          |
//! |--------------|--------|----------------------------------------|
//! | jpg, jpeg    | JPEG   | `quality` (1-100)                      |
//! | png          | PNG    | `optimize` => compressione Best        |
//! | Altre        | ❌     | `CompressError::Validation`            |
//!
//! Il formato in ingresso viene riconosciuto dal contenuto; quello in uscita
//! dall'estensione, quindi un PNG rinominato `.jpg` viene salvato come JPEG.
//!
//! ## Pipeline
//!
//! 1. **Validazione estensione**: case-sensitive, salvo `ignore_extension_case`
//! 2. **Decodifica**: in `spawn_blocking`, errori mappati su `CompressError::Decode`
//! 3. **Appiattimento**: immagini con canale alpha convertite in RGB (alpha perso)
//! 4. **Ri-codifica in memoria** (`encode`); se il risultato non è più piccolo
//!    dell'originale il file resta invariato
//! 5. **Sovrascrittura** (`commit`): file temporaneo `.<nome>.compressing` nella
//!    stessa directory, poi `rename` sull'originale
//! 6. **Statistiche**: dimensione compressa e ratio `round(1 - new/old, 2)`
//!
//! ## Attenzione
//!
//! L'operazione è distruttiva: il file originale viene sovrascritto senza backup.
//! Se la decodifica o la scrittura falliscono il file non viene toccato.
//!
//! ## Esempio:
//! ```rust,ignore
//! let mut handler = ImageHandler::open("/photos/a.jpg").await?;
//! handler.compress(true, 80).await?;
//! println!("{} -> {}", handler.original_size(), handler.compressed_size());
//! ```

use crate::error::CompressError;
use crate::file_manager::FileManager;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage, GenericImageView, ImageEncoder, ImageFormat};
use std::path::{Path, PathBuf};
use tokio::{fs, task};
use tracing::debug;

/// Extensions that can be compressed
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png"];

/// Compression ratio `1 - compressed/original`, rounded to two decimals.
///
/// An empty original yields `0.0`.
pub fn compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    let ratio = 1.0 - (compressed_size as f64 / original_size as f64);
    (ratio * 100.0).round() / 100.0
}

/// Wraps one file of the watched directory
#[derive(Debug)]
pub struct ImageHandler {
    path: PathBuf,
    extension: String,
    original_size: u64,
    compressed_size: u64,
    compression_ratio: f64,
    ignore_case: bool,
    pending: Option<Vec<u8>>,
}

impl ImageHandler {
    /// Open `path`, recording its current size and extension.
    ///
    /// # Errors
    /// `CompressError::NotFound` if the path does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CompressError> {
        let path = path.into();
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CompressError::NotFound(path));
            }
            Err(e) => return Err(e.into()),
        };
        let extension = FileManager::file_extension(&path);

        Ok(Self {
            path,
            extension,
            original_size: metadata.len(),
            compressed_size: 0,
            compression_ratio: 0.0,
            ignore_case: false,
            pending: None,
        })
    }

    /// Accept `.JPG`, `.Png` and friends as well
    pub fn ignore_extension_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    /// Size after the last successful `encode`, 0 before that
    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    pub fn compression_ratio(&self) -> f64 {
        self.compression_ratio
    }

    /// Whether the extension is one of [`ACCEPTED_EXTENSIONS`]
    pub fn is_acceptable(&self) -> bool {
        ACCEPTED_EXTENSIONS.iter().any(|accepted| {
            if self.ignore_case {
                accepted.eq_ignore_ascii_case(&self.extension)
            } else {
                *accepted == self.extension
            }
        })
    }

    fn output_format(&self) -> Option<ImageFormat> {
        if !self.is_acceptable() {
            return None;
        }
        match self.extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    /// Re-encode the image and overwrite the file in place.
    ///
    /// `quality` drives the JPEG encoder, `optimize` picks the best PNG
    /// compression level. When the new encoding is not smaller than the
    /// original the file is left as it is and the ratio is `0.0`.
    ///
    /// # Errors
    /// - `Validation` if the extension is not accepted
    /// - `Decode` if the content is not a readable image (file left untouched)
    /// - `Io` / `Image` / `Task` for failures while encoding or writing
    pub async fn compress(&mut self, optimize: bool, quality: u8) -> Result<(), CompressError> {
        self.encode(optimize, quality).await?;
        self.commit().await
    }

    /// Re-encode the image in memory without touching the file.
    ///
    /// Sets `compressed_size` and `compression_ratio` to what [`commit`]
    /// will leave on disk.
    ///
    /// [`commit`]: ImageHandler::commit
    pub async fn encode(&mut self, optimize: bool, quality: u8) -> Result<(), CompressError> {
        let format = self.output_format().ok_or_else(|| CompressError::Validation {
            extension: self.extension.clone(),
            accepted: ACCEPTED_EXTENSIONS,
        })?;

        let source = self.path.clone();
        let encoded = task::spawn_blocking(move || reencode(&source, format, optimize, quality)).await??;

        debug!(
            "Re-encoded {} as {:?} (quality {}, optimize {}): {} -> {} bytes",
            self.path.display(),
            format,
            quality,
            optimize,
            self.original_size,
            encoded.len()
        );

        if encoded.len() as u64 >= self.original_size {
            debug!(
                "{} would not shrink, keeping the original bytes",
                self.path.display()
            );
            self.pending = None;
            self.compressed_size = self.original_size;
        } else {
            self.compressed_size = encoded.len() as u64;
            self.pending = Some(encoded);
        }
        self.compression_ratio = compression_ratio(self.original_size, self.compressed_size);

        Ok(())
    }

    /// Replace the file with the bytes produced by [`encode`].
    ///
    /// The bytes go to a sibling temporary file first, which is then renamed
    /// over the original, so a failed write never leaves a truncated image.
    /// Does nothing when there is nothing to write.
    ///
    /// [`encode`]: ImageHandler::encode
    pub async fn commit(&mut self) -> Result<(), CompressError> {
        let Some(encoded) = self.pending.take() else {
            return Ok(());
        };

        let temp_path = temp_path_for(&self.path);
        let written = match fs::write(&temp_path, &encoded).await {
            Ok(()) => fs::rename(&temp_path, &self.path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                debug!("Could not remove {}: {}", temp_path.display(), cleanup);
            }
            return Err(e.into());
        }

        Ok(())
    }
}

/// Hidden sibling of `path` used while writing the new encoding
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.compressing", name))
}

fn reencode(
    path: &Path,
    format: ImageFormat,
    optimize: bool,
    quality: u8,
) -> Result<Vec<u8>, CompressError> {
    let image = image::io::Reader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|source| CompressError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let image = flatten_for(format, image);
    let (width, height) = image.dimensions();
    let mut output = Vec::new();

    match format {
        ImageFormat::Png => {
            let compression = if optimize {
                CompressionType::Best
            } else {
                CompressionType::Default
            };
            PngEncoder::new_with_quality(&mut output, compression, FilterType::Adaptive)
                .write_image(image.as_bytes(), width, height, image.color())?;
        }
        _ => {
            // the JPEG encoder rejects quality 0
            let mut encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));
            encoder.encode(image.as_bytes(), width, height, image.color())?;
        }
    }

    Ok(output)
}

/// Drop alpha, and bring JPEG output down to 8-bit luma or RGB
fn flatten_for(format: ImageFormat, image: DynamicImage) -> DynamicImage {
    let color = image.color();
    if color.has_alpha() {
        return DynamicImage::ImageRgb8(image.to_rgb8());
    }
    match (format, color) {
        (ImageFormat::Jpeg, ColorType::L8 | ColorType::Rgb8) => image,
        (ImageFormat::Jpeg, _) => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_jpeg, write_jpeg_with_quality, write_rgba_png};
    use tempfile::TempDir;

    #[test]
    fn test_compression_ratio() {
        assert_eq!(compression_ratio(1_000_000, 400_000), 0.6);
        assert_eq!(compression_ratio(1_000, 1_000), 0.0);
        assert_eq!(compression_ratio(0, 10), 0.0);
        assert_eq!(compression_ratio(300, 200), 0.33);
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone.jpg");

        let err = ImageHandler::open(&missing).await.unwrap_err();
        assert!(matches!(err, CompressError::NotFound(ref p) if p == &missing));
    }

    #[tokio::test]
    async fn test_open_records_size_and_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let handler = ImageHandler::open(&path).await.unwrap();
        assert_eq!(handler.original_size(), 5);
        assert_eq!(handler.extension(), "txt");
        assert_eq!(handler.compressed_size(), 0);
        assert_eq!(handler.compression_ratio(), 0.0);
    }

    #[tokio::test]
    async fn test_extension_matching_is_case_sensitive_by_default() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a.jpg", "b.jpeg", "c.png", "d.JPG", "e.gif"] {
            std::fs::write(temp_dir.path().join(name), b"x").unwrap();
        }

        let accepted = |name: &str, ignore_case: bool| {
            let path = temp_dir.path().join(name);
            async move {
                ImageHandler::open(path)
                    .await
                    .unwrap()
                    .ignore_extension_case(ignore_case)
                    .is_acceptable()
            }
        };

        assert!(accepted("a.jpg", false).await);
        assert!(accepted("b.jpeg", false).await);
        assert!(accepted("c.png", false).await);
        assert!(!accepted("d.JPG", false).await);
        assert!(!accepted("e.gif", false).await);

        assert!(accepted("d.JPG", true).await);
        assert!(!accepted("e.gif", true).await);
    }

    #[tokio::test]
    async fn test_compress_rejects_unaccepted_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.txt");
        std::fs::write(&path, b"not an image").unwrap();

        let mut handler = ImageHandler::open(&path).await.unwrap();
        let err = handler.compress(true, 80).await.unwrap_err();

        assert!(matches!(err, CompressError::Validation { ref extension, .. } if extension == "txt"));
        assert_eq!(std::fs::read(&path).unwrap(), b"not an image");
    }

    #[tokio::test]
    async fn test_compress_jpeg_shrinks_and_stays_decodable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        write_jpeg(&path, 256, 256);

        let mut handler = ImageHandler::open(&path).await.unwrap();
        handler.compress(true, 40).await.unwrap();

        let on_disk = std::fs::metadata(&path).unwrap().len();
        assert_eq!(handler.compressed_size(), on_disk);
        assert!(handler.compressed_size() < handler.original_size());
        assert_eq!(
            handler.compression_ratio(),
            compression_ratio(handler.original_size(), handler.compressed_size())
        );

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (256, 256));
    }

    #[tokio::test]
    async fn test_compress_png_drops_alpha() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logo.png");
        write_rgba_png(&path, 64, 48);

        let mut handler = ImageHandler::open(&path).await.unwrap();
        handler.compress(true, 100).await.unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!(decoded.dimensions(), (64, 48));
        assert_eq!(image::guess_format(&std::fs::read(&path).unwrap()).unwrap(), ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_compress_corrupt_image_is_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let mut handler = ImageHandler::open(&path).await.unwrap();
        let err = handler.compress(true, 80).await.unwrap_err();

        assert!(matches!(err, CompressError::Decode { .. }));
        assert!(err.is_expected());
        assert_eq!(handler.compressed_size(), 0);
        assert_eq!(handler.compression_ratio(), 0.0);
        assert_eq!(std::fs::read(&path).unwrap(), b"definitely not a jpeg");
    }

    #[tokio::test]
    async fn test_compress_upper_case_extension_when_ignoring_case() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("SHOUT.JPG");
        write_jpeg(&path, 64, 64);

        let mut handler = ImageHandler::open(&path).await.unwrap().ignore_extension_case(true);
        handler.compress(true, 50).await.unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn test_compress_never_grows_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("already_small.jpg");
        write_jpeg_with_quality(&path, 512, 512, 85);
        let before = std::fs::read(&path).unwrap();

        let mut handler = ImageHandler::open(&path).await.unwrap();
        handler.compress(true, 100).await.unwrap();

        let on_disk = std::fs::metadata(&path).unwrap().len();
        assert!(on_disk <= handler.original_size());
        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(handler.compressed_size(), handler.original_size());
        assert_eq!(handler.compression_ratio(), 0.0);
        assert!(image::open(&path).is_ok());
    }

    #[tokio::test]
    async fn test_compress_leaves_no_temporary_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        write_jpeg(&path, 128, 128);

        let mut handler = ImageHandler::open(&path).await.unwrap();
        handler.compress(true, 50).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["photo.jpg".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_the_original() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        write_jpeg(&path, 128, 128);
        let before = std::fs::read(&path).unwrap();
        // a directory in the way makes writing the temporary file fail
        std::fs::create_dir(temp_path_for(&path)).unwrap();

        let mut handler = ImageHandler::open(&path).await.unwrap();
        let err = handler.compress(true, 50).await.unwrap_err();

        assert!(matches!(err, CompressError::Io(_)));
        assert!(!err.is_expected());
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_encode_does_not_touch_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        write_jpeg(&path, 128, 128);
        let before = std::fs::read(&path).unwrap();

        let mut handler = ImageHandler::open(&path).await.unwrap();
        handler.encode(true, 40).await.unwrap();

        assert!(handler.compressed_size() < handler.original_size());
        assert_eq!(std::fs::read(&path).unwrap(), before);

        handler.commit().await.unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), handler.compressed_size());
    }
}
