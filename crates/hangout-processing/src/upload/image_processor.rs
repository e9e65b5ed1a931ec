//! Image pipeline processor: size-gated copy or JPEG re-encode into the store.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use hangout_core::{PipelineInitMessage, ProcessingError, ProcessingOutcome, StoredArtifact};
use hangout_storage::{StorageError, Store};
use hangout_worker::PipelineHandler;

use crate::compression::{self, SIZE_THRESHOLD_BYTES};

const OUTPUT_EXTENSION: &str = "jpg";

pub struct ImagePipelineProcessor {
    store: Arc<dyn Store>,
}

impl ImagePipelineProcessor {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Process one image-init message.
    ///
    /// Small files are copied byte-for-byte under a `.jpg` name even when they are not
    /// JPEGs. Larger files are decoded and re-encoded at quality 60. The source is removed
    /// only after the store write succeeds.
    pub async fn on_image_init(
        &self,
        message: &PipelineInitMessage,
    ) -> Result<StoredArtifact, ProcessingError> {
        let source = message.source_path.as_path();

        let size = tokio::fs::metadata(source)
            .await
            .map_err(|e| {
                ProcessingError::io(format!("Failed to open source {}", source.display()), e)
            })?
            .len();

        let artifact = if size <= SIZE_THRESHOLD_BYTES {
            tracing::debug!(size_bytes = size, "Copying image verbatim");
            self.store
                .put_file(source, OUTPUT_EXTENSION)
                .await
                .map_err(store_error)?
        } else {
            tracing::debug!(size_bytes = size, "Re-encoding image as JPEG");
            let encoded = self.reencode(source).await?;
            self.store
                .put_bytes(encoded, OUTPUT_EXTENSION)
                .await
                .map_err(store_error)?
        };

        remove_source(source).await;

        Ok(artifact)
    }

    async fn reencode(&self, source: &Path) -> Result<bytes::Bytes, ProcessingError> {
        let data = tokio::fs::read(source).await.map_err(|e| {
            ProcessingError::io(format!("Failed to read source {}", source.display()), e)
        })?;

        let (encoded, _dimensions) =
            tokio::task::spawn_blocking(move || compression::recompress(&data))
                .await
                .map_err(|e| ProcessingError::image("Image codec task failed", e))?
                .map_err(|e| {
                    ProcessingError::image(
                        format!("Failed to re-encode {}", source.display()),
                        e,
                    )
                })?;

        Ok(encoded)
    }
}

fn store_error(err: StorageError) -> ProcessingError {
    ProcessingError::io("Failed to write to store", err)
}

/// The artifact is already stored, so a failed delete is logged and not reported.
async fn remove_source(source: &Path) {
    if let Err(e) = tokio::fs::remove_file(source).await {
        tracing::warn!(
            source_path = %source.display(),
            error = %e,
            "Failed to delete source file after processing"
        );
    }
}

#[async_trait]
impl PipelineHandler for ImagePipelineProcessor {
    async fn handle(&self, message: PipelineInitMessage) -> ProcessingOutcome {
        super::into_outcome(self.on_image_init(&message).await)
    }

    fn name(&self) -> &'static str {
        "image-processor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangout_core::ProcessingErrorKind;
    use hangout_storage::{LocalStore, StorageResult};
    use image::codecs::jpeg::JpegEncoder;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use rand::Rng;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        store: Arc<LocalStore>,
        processor: ImagePipelineProcessor,
    }

    impl Fixture {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = Arc::new(LocalStore::new(dir.path().join("store")).await.unwrap());
            let processor = ImagePipelineProcessor::new(store.clone());
            Self {
                dir,
                store,
                processor,
            }
        }

        fn write_source(&self, name: &str, data: &[u8]) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::write(&path, data).unwrap();
            path
        }

        async fn stored(&self) -> Vec<String> {
            self.store.list().await.unwrap()
        }
    }

    fn noise(width: u32, height: u32) -> DynamicImage {
        let mut rng = rand::rng();
        let img = RgbImage::from_fn(width, height, |_, _| {
            image::Rgb([rng.random(), rng.random(), rng.random()])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn encode_png(img: &DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn encode_jpeg_q100(img: &DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, 100)
            .encode_image(&img.to_rgb8())
            .unwrap();
        buffer
    }

    /// Noisy image whose encoding exceeds the copy threshold.
    fn large_fixture(encode: fn(&DynamicImage) -> Vec<u8>) -> (Vec<u8>, (u32, u32)) {
        let mut side = 1000;
        loop {
            let img = noise(side, side);
            let data = encode(&img);
            if data.len() as u64 > SIZE_THRESHOLD_BYTES {
                return (data, (side, side));
            }
            side += 250;
        }
    }

    fn message(path: &Path) -> PipelineInitMessage {
        PipelineInitMessage::new(path, "upload")
    }

    #[tokio::test]
    async fn test_small_png_is_copied_verbatim_as_jpg() {
        let fx = Fixture::new().await;
        let mut data = encode_png(&noise(64, 64));
        // Pad to the 500,000-byte scenario; trailing bytes are ignored by decoders.
        data.resize(500_000, 0);
        let source = fx.write_source("small.png", &data);

        let artifact = fx.processor.on_image_init(&message(&source)).await.unwrap();

        // Known gap: a PNG stored under a .jpg name without transcoding.
        assert_eq!(artifact.extension(), Some("jpg"));
        assert_eq!(fx.store.read(&artifact.name).await.unwrap(), data);
        assert_eq!(
            image::guess_format(&fx.store.read(&artifact.name).await.unwrap()).unwrap(),
            ImageFormat::Png
        );
        assert!(!source.exists());
    }

    #[tokio::test]
    async fn test_file_at_threshold_takes_copy_path() {
        let fx = Fixture::new().await;
        // Not an image at all; the copy path never decodes.
        let data = vec![7u8; SIZE_THRESHOLD_BYTES as usize];
        let source = fx.write_source("exact.bin", &data);

        let artifact = fx.processor.on_image_init(&message(&source)).await.unwrap();

        assert_eq!(artifact.size_bytes, SIZE_THRESHOLD_BYTES);
        assert_eq!(fx.store.read(&artifact.name).await.unwrap(), data);
        assert!(!source.exists());
    }

    #[tokio::test]
    async fn test_large_jpeg_is_recompressed() {
        let fx = Fixture::new().await;
        let (data, dims) = large_fixture(encode_jpeg_q100);
        let source = fx.write_source("large.jpg", &data);

        let artifact = fx.processor.on_image_init(&message(&source)).await.unwrap();

        let stored = fx.store.read(&artifact.name).await.unwrap();
        assert_eq!(artifact.extension(), Some("jpg"));
        assert!(stored.len() < data.len());
        assert_eq!(image::guess_format(&stored).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&stored).unwrap();
        assert_eq!((decoded.width(), decoded.height()), dims);
        assert!(!source.exists());
    }

    #[tokio::test]
    async fn test_large_png_is_transcoded_to_jpeg() {
        let fx = Fixture::new().await;
        let (data, dims) = large_fixture(encode_png);
        let source = fx.write_source("large.png", &data);

        let artifact = fx.processor.on_image_init(&message(&source)).await.unwrap();

        let stored = fx.store.read(&artifact.name).await.unwrap();
        assert_eq!(image::guess_format(&stored).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&stored).unwrap();
        assert_eq!((decoded.width(), decoded.height()), dims);
        assert_eq!(fx.stored().await.len(), 1);
        assert!(!source.exists());
    }

    #[tokio::test]
    async fn test_large_garbage_fails_and_keeps_source() {
        let fx = Fixture::new().await;
        let data = vec![0x42u8; SIZE_THRESHOLD_BYTES as usize + 1];
        let source = fx.write_source("garbage.bin", &data);

        let err = fx
            .processor
            .on_image_init(&message(&source))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ProcessingErrorKind::ImageProcessingFailure);
        assert!(source.exists());
        assert!(fx.stored().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_source_is_io_failure() {
        let fx = Fixture::new().await;
        let source = fx.dir.path().join("never-written");

        let err = fx
            .processor
            .on_image_init(&message(&source))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ProcessingErrorKind::IoFailure);
        assert!(fx.stored().await.is_empty());
    }

    #[tokio::test]
    async fn test_unwritable_store_is_io_failure_and_keeps_source() {
        let fx = Fixture::new().await;
        let source = fx.write_source("small.png", &encode_png(&noise(16, 16)));
        std::fs::remove_dir_all(fx.store.location()).unwrap();

        let err = fx
            .processor
            .on_image_init(&message(&source))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ProcessingErrorKind::IoFailure);
        assert!(source.exists());
    }

    /// Copies the first half of the source into a new entry, then fails.
    struct TruncatingStore {
        inner: Arc<LocalStore>,
    }

    #[async_trait]
    impl Store for TruncatingStore {
        async fn put_file(
            &self,
            source: &Path,
            extension: &str,
        ) -> StorageResult<StoredArtifact> {
            let data = tokio::fs::read(source).await?;
            let name = format!("{}.{}", uuid::Uuid::new_v4(), extension);
            let partial = &data[..data.len() / 2];
            tokio::fs::write(self.inner.location().join(&name), partial).await?;
            Err(StorageError::UploadFailed(format!("disk full while writing {}", name)))
        }

        async fn put_bytes(
            &self,
            _data: bytes::Bytes,
            _extension: &str,
        ) -> StorageResult<StoredArtifact> {
            Err(StorageError::UploadFailed("disk full".to_string()))
        }

        async fn read(&self, name: &str) -> StorageResult<Vec<u8>> {
            self.inner.read(name).await
        }

        async fn exists(&self, name: &str) -> StorageResult<bool> {
            self.inner.exists(name).await
        }

        async fn list(&self) -> StorageResult<Vec<String>> {
            self.inner.list().await
        }

        fn location(&self) -> &Path {
            self.inner.location()
        }
    }

    #[tokio::test]
    async fn test_partial_copy_is_left_in_store() {
        let fx = Fixture::new().await;
        let processor = ImagePipelineProcessor::new(Arc::new(TruncatingStore {
            inner: fx.store.clone(),
        }));
        let data = encode_png(&noise(32, 32));
        let source = fx.write_source("small.png", &data);

        let err = processor.on_image_init(&message(&source)).await.unwrap_err();

        // No rollback: the truncated entry stays and the source is kept for a retry.
        assert_eq!(err.kind, ProcessingErrorKind::IoFailure);
        assert!(source.exists());
        assert_eq!(std::fs::read(&source).unwrap(), data);
        let stored = fx.stored().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(
            fx.store.read(&stored[0]).await.unwrap(),
            data[..data.len() / 2].to_vec()
        );

        let outcome = processor.handle(message(&source)).await;
        assert_eq!(outcome.label(), "failed");
        assert_eq!(fx.stored().await.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_runs_never_overwrite() {
        let fx = Fixture::new().await;
        let data = encode_png(&noise(32, 32));

        let mut names = Vec::new();
        for n in 0..3 {
            let source = fx.write_source(&format!("same-{n}.png"), &data);
            let artifact = fx.processor.on_image_init(&message(&source)).await.unwrap();
            names.push(artifact.name);
        }

        names.sort();
        names.dedup();
        assert_eq!(names.len(), 3);
        assert_eq!(fx.stored().await, names);
        for name in &names {
            assert_eq!(fx.store.read(name).await.unwrap(), data);
        }
    }

    #[tokio::test]
    async fn test_handler_reports_outcome() {
        let fx = Fixture::new().await;
        let source = fx.write_source("small.png", &encode_png(&noise(8, 8)));

        let outcome = fx.processor.handle(message(&source)).await;
        assert!(outcome.is_success());

        let outcome = fx.processor.handle(message(&source)).await;
        assert_eq!(
            outcome.error().map(|e| e.kind),
            Some(ProcessingErrorKind::IoFailure)
        );
    }
}
