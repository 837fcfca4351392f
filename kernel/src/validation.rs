use thiserror::Error;

use crate::{ALLOWED_MIME_TYPES, MAX_FILE_SIZE};

/// Reason a candidate file never reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("unsupported file type '{0}'")]
    UnsupportedType(String),
    #[error("file size {size} bytes exceeds the limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

/// Checks a candidate against the accepted MIME types and the size limit.
///
/// The type is checked first, so a file breaking both rules reports
/// [`Rejection::UnsupportedType`].
pub fn validate(mime: &str, size: u64) -> Result<(), Rejection> {
    validate_with_limit(mime, size, MAX_FILE_SIZE)
}

pub fn validate_with_limit(mime: &str, size: u64, limit: u64) -> Result<(), Rejection> {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    if !ALLOWED_MIME_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    {
        return Err(Rejection::UnsupportedType(mime.to_owned()));
    }
    if size > limit {
        return Err(Rejection::TooLarge { size, limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const MIB: u64 = 1024 * 1024;

    #[rstest]
    #[case("image/jpeg", 0)]
    #[case("image/png", 2 * MIB)]
    #[case("image/gif", MAX_FILE_SIZE)]
    #[case("IMAGE/PNG", 10)]
    #[case("image/jpeg; charset=binary", 10)]
    #[trace]
    fn accepted(#[case] mime: &str, #[case] size: u64) {
        assert_eq!(validate(mime, size), Ok(()));
    }

    #[rstest]
    #[case("image/webp")]
    #[case("image/bmp")]
    #[case("application/pdf")]
    #[case("")]
    #[trace]
    fn unsupported_type(#[case] mime: &str) {
        assert_eq!(
            validate(mime, 1),
            Err(Rejection::UnsupportedType(mime.to_owned()))
        );
    }

    #[test]
    fn six_megabyte_jpeg_is_too_large() {
        // Act
        let result = validate("image/jpeg", 6 * MIB);

        // Assert
        assert_eq!(
            result,
            Err(Rejection::TooLarge {
                size: 6 * MIB,
                limit: MAX_FILE_SIZE
            })
        );
    }

    #[test]
    fn type_is_checked_before_size() {
        assert!(matches!(
            validate("text/plain", 6 * MIB),
            Err(Rejection::UnsupportedType(_))
        ));
    }

    #[test]
    fn custom_limit() {
        assert!(validate_with_limit("image/png", 11, 10).is_err());
        assert!(validate_with_limit("image/png", 10, 10).is_ok());
    }
}
