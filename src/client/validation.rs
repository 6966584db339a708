//! # Validation Gate
//!
//! Checks run on the two selected files before anything touches the network.
//! The checks run in a fixed order and the first failure wins:
//!
//! 1. both files are present
//! 2. each declared MIME type is `image/jpeg` or `image/png`
//! 3. each file is at most [`MAX_FILE_BYTES`]

use log::warn;
use std::path::Path;

use crate::common::error::{NormalizedError, MSG_BOTH_REQUIRED, MSG_INVALID_TYPE, MSG_TOO_LARGE};
use crate::common::messages::{ImageFile, UploadRequest};

/// Largest accepted image, 5 MiB.
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Declared MIME types the backend accepts.
pub const ALLOWED_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Validate a selection without taking ownership of it.
pub fn validate_selection(
    front: Option<&ImageFile>,
    back: Option<&ImageFile>,
) -> Result<(), NormalizedError> {
    let (front, back) = match (front, back) {
        (Some(f), Some(b)) => (f, b),
        _ => return Err(NormalizedError::validation(MSG_BOTH_REQUIRED)),
    };

    if ![front, back].iter().all(|f| is_allowed_type(&f.content_type)) {
        return Err(NormalizedError::validation(MSG_INVALID_TYPE));
    }

    if front.size() > MAX_FILE_BYTES || back.size() > MAX_FILE_BYTES {
        return Err(NormalizedError::validation(MSG_TOO_LARGE));
    }

    Ok(())
}

/// Validate a selection and turn it into an [`UploadRequest`].
pub fn into_request(
    front: Option<ImageFile>,
    back: Option<ImageFile>,
) -> Result<UploadRequest, NormalizedError> {
    validate_selection(front.as_ref(), back.as_ref())?;
    match (front, back) {
        (Some(front), Some(back)) => Ok(UploadRequest { front, back }),
        _ => Err(NormalizedError::validation(MSG_BOTH_REQUIRED)),
    }
}

/// Read a selected file from disk. No path means nothing was selected.
///
/// A file that cannot be read is rejected like any other invalid selection.
pub async fn read_selection(path: Option<&Path>) -> Result<Option<ImageFile>, NormalizedError> {
    let Some(path) = path else {
        return Ok(None);
    };
    match ImageFile::from_path(path).await {
        Ok(file) => Ok(Some(file)),
        Err(e) => {
            warn!("⚠️ Cannot read {}: {}", path.display(), e);
            Err(NormalizedError::validation(format!("Cannot read {}: {}", path.display(), e)))
        }
    }
}

fn is_allowed_type(content_type: &str) -> bool {
    ALLOWED_TYPES.contains(&content_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ErrorKind;

    fn image(content_type: &str, size: usize) -> ImageFile {
        ImageFile::new("card", content_type, vec![0u8; size])
    }

    #[test]
    fn test_missing_file_is_rejected_first() {
        let bad_type = image("image/gif", MAX_FILE_BYTES + 1);
        let err = validate_selection(Some(&bad_type), None).unwrap_err();
        assert_eq!(err.message, MSG_BOTH_REQUIRED);
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = validate_selection(None, None).unwrap_err();
        assert_eq!(err.message, MSG_BOTH_REQUIRED);
    }

    #[test]
    fn test_type_is_checked_before_size() {
        let ok = image("image/png", 10);
        let small_gif = image("image/gif", 10);
        let huge_gif = image("image/gif", MAX_FILE_BYTES * 2);

        assert_eq!(
            validate_selection(Some(&ok), Some(&small_gif)).unwrap_err().message,
            MSG_INVALID_TYPE
        );
        assert_eq!(
            validate_selection(Some(&huge_gif), Some(&ok)).unwrap_err().message,
            MSG_INVALID_TYPE
        );
    }

    #[test]
    fn test_type_match_is_exact() {
        let ok = image("image/jpeg", 10);
        for declared in ["image/jpg", "IMAGE/PNG", "image/png; charset=binary", ""] {
            let other = image(declared, 10);
            assert_eq!(
                validate_selection(Some(&ok), Some(&other)).unwrap_err().message,
                MSG_INVALID_TYPE,
                "{declared:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_size_limit() {
        let ok = image("image/jpeg", 10);
        let at_limit = image("image/png", MAX_FILE_BYTES);
        let over_limit = image("image/png", MAX_FILE_BYTES + 1);

        assert!(validate_selection(Some(&ok), Some(&at_limit)).is_ok());
        assert_eq!(
            validate_selection(Some(&over_limit), Some(&ok)).unwrap_err().message,
            MSG_TOO_LARGE
        );
    }

    #[test]
    fn test_into_request() {
        let request = into_request(Some(image("image/jpeg", 3)), Some(image("image/png", 4))).unwrap();
        assert_eq!(request.front.size(), 3);
        assert_eq!(request.back.content_type, "image/png");

        let err = into_request(Some(image("image/jpeg", 3)), None).unwrap_err();
        assert_eq!(err.status, Some(400));
    }

    #[tokio::test]
    async fn test_read_selection() {
        assert_eq!(read_selection(None).await.unwrap(), None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("front.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
        let file = read_selection(Some(path.as_path())).await.unwrap().unwrap();
        assert_eq!(file.name, "front.png");
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.size(), 4);

        let missing = dir.path().join("missing.jpg");
        let err = read_selection(Some(missing.as_path())).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.http_status(), 400);
        assert!(err.message.starts_with("Cannot read "), "{}", err.message);
        assert!(err.message.contains("missing.jpg"));
    }
}
