//! Image uploads: naming picked files, sending them to the bucket and
//! turning the successful ones into image blocks.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::{info, warn};
use rand::Rng;

use crate::backend::ObjectStorage;
use crate::model::{Block, Dimension, Position};

/// Width given to a freshly uploaded image
pub const UPLOADED_IMAGE_WIDTH: f64 = 400.0;
const TOKEN_LEN: usize = 13;

/// A file chosen by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One file ready to upload, with its bucket path and where its block lands
#[derive(Debug, Clone, PartialEq)]
pub struct UploadJob {
    pub file_name: String,
    pub path: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub position: Position,
}

/// Extension after the last dot, or `bin` when there is none
pub fn file_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => "bin",
    }
}

pub fn content_type_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// `public/{unix_millis}_{token}.{ext}`
pub fn object_path(file_name: &str, millis: i64, token: &str) -> String {
    format!("public/{millis}_{token}.{}", file_extension(file_name))
}

/// Random lowercase base-36 string
pub fn random_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..TOKEN_LEN)
        .filter_map(|_| char::from_digit(rng.gen_range(0..36), 36))
        .collect()
}

/// Name every file and pick a slightly jittered landing spot for its block
pub fn plan_uploads<R: Rng + ?Sized>(
    files: Vec<PickedFile>,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<UploadJob> {
    let millis = now.timestamp_millis();
    files
        .into_iter()
        .map(|file| {
            let token = random_token(rng);
            let path = object_path(&file.name, millis, &token);
            let content_type = content_type_for(file_extension(&file.name));
            let position = Position::new(
                50.0 + rng.r#gen::<f64>() * 50.0,
                50.0 + rng.r#gen::<f64>() * 50.0,
            );
            UploadJob {
                file_name: file.name,
                path,
                content_type,
                bytes: file.bytes,
                position,
            }
        })
        .collect()
}

/// Upload every job concurrently.
///
/// Blocks come back in completion order. A failed upload is logged and left
/// out; the rest of the batch carries on.
pub async fn upload_images(storage: &dyn ObjectStorage, jobs: Vec<UploadJob>) -> Vec<Block> {
    let total = jobs.len();
    let mut pending: FuturesUnordered<_> = jobs
        .into_iter()
        .map(|job| async move {
            let UploadJob {
                file_name,
                path,
                content_type,
                bytes,
                position,
            } = job;
            let result = storage.upload(&path, bytes, content_type).await;
            (file_name, path, position, result)
        })
        .collect();

    let mut blocks = Vec::with_capacity(total);
    while let Some((file_name, path, position, result)) = pending.next().await {
        match result {
            Ok(()) => blocks.push(Block::new_image(
                storage.public_url(&path),
                position,
                Dimension::Px(UPLOADED_IMAGE_WIDTH),
                Dimension::Auto,
            )),
            Err(err) => warn!("Dropping image {file_name}: {err}"),
        }
    }
    info!("Uploaded {} of {total} images", blocks.len());
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryStorage;
    use crate::model::BlockKind;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    #[rstest]
    #[case("photo.png", "png")]
    #[case("archive.tar.gz", "gz")]
    #[case("README", "bin")]
    #[case("trailing.", "bin")]
    #[case("Shot.JPG", "JPG")]
    fn test_file_extension(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(file_extension(name), expected);
    }

    #[rstest]
    #[case("JPG", "image/jpeg")]
    #[case("webp", "image/webp")]
    #[case("bin", "application/octet-stream")]
    fn test_content_type(#[case] extension: &str, #[case] expected: &str) {
        assert_eq!(content_type_for(extension), expected);
    }

    #[test]
    fn test_plan_names_files_under_public() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let jobs = plan_uploads(
            vec![
                PickedFile {
                    name: "a.png".into(),
                    bytes: vec![1],
                },
                PickedFile {
                    name: "b.jpeg".into(),
                    bytes: vec![2],
                },
            ],
            &mut rng,
            now,
        );

        assert_eq!(jobs.len(), 2);
        for job in &jobs {
            let rest = job.path.strip_prefix("public/1700000000123_").unwrap();
            let (token, _) = rest.split_once('.').unwrap();
            assert_eq!(token.len(), 13);
            assert!(token.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
            assert!((50.0..100.0).contains(&job.position.x));
            assert!((50.0..100.0).contains(&job.position.y));
        }
        assert!(jobs[0].path.ends_with(".png"));
        assert_eq!(jobs[1].content_type, "image/jpeg");
        assert_ne!(jobs[0].path, jobs[1].path);
    }

    #[tokio::test]
    async fn test_failed_upload_is_left_out() {
        let storage = MemoryStorage::new("https://cdn.example").rejecting(|path| path.ends_with(".gif"));
        let mut rng = StdRng::seed_from_u64(1);
        let files = ["one.png", "two.gif", "three.png"]
            .into_iter()
            .map(|name| PickedFile {
                name: name.into(),
                bytes: name.as_bytes().to_vec(),
            })
            .collect();
        let jobs = plan_uploads(files, &mut rng, Utc::now());

        let blocks = upload_images(&storage, jobs).await;

        assert_eq!(blocks.len(), 2);
        assert_eq!(storage.len(), 2);
        for block in &blocks {
            let BlockKind::Image { src, width, height } = &block.kind else {
                panic!("expected an image block");
            };
            assert!(src.starts_with("https://cdn.example/public/"));
            assert_eq!(*width, Some(Dimension::Px(400.0)));
            assert_eq!(*height, Some(Dimension::Auto));
        }
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let storage = MemoryStorage::new("https://cdn.example");
        assert!(upload_images(&storage, Vec::new()).await.is_empty());
    }
}
