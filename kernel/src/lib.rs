#![warn(clippy::unwrap_in_result)]
#![warn(clippy::unwrap_used)]

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod validation;

pub use validation::{Rejection, validate};

/// Number of records the gallery shows on one page.
pub const ITEMS_PER_PAGE: usize = 5;

/// Largest accepted upload, 5 MiB.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// MIME types the upload form accepts.
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

/// Extensions the server stores.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Extensions the gallery renders as an image preview instead of an icon.
pub const PREVIEW_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Local storage key holding the client side list of uploads.
pub const LOCAL_STORE_KEY: &str = "uploadedImages";

/// One uploaded file as the gallery shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileRecord {
    /// Server assigned name, `<stem>_<uuid><ext>`
    pub filename: String,
    /// Name of the file as it was uploaded
    pub display_name: String,
    /// Location the asset is served from
    #[serde(default)]
    pub url: String,
}

impl FileRecord {
    /// Whether the gallery can show an image preview for this record.
    #[must_use]
    pub fn has_preview(&self) -> bool {
        extension(&self.filename).is_some_and(|ext| PREVIEW_EXTENSIONS.contains(&ext.as_str()))
    }
}

/// A window of records plus the total number of records stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FilesPage {
    /// Records of the requested window in insertion order
    pub items: Vec<FileRecord>,
    /// Total number of stored records
    #[serde(rename = "totalCount", default)]
    pub total_count: usize,
}

/// Reply of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadReply {
    /// Server assigned unique name
    pub filename: String,
    /// Location the stored file is served from
    pub url: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Name the file was uploaded with
    #[serde(default)]
    pub original_name: String,
    /// Lower-cased extension including the dot
    #[serde(default)]
    pub file_type: String,
}

/// Entry of the local store list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEntry {
    pub name: String,
    pub url: String,
}

/// Body of error replies and of the delete acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DetailReply {
    pub detail: String,
}

impl DetailReply {
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Lower-cased extension of a file name without the dot.
#[must_use]
pub fn extension(name: &str) -> Option<String> {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Number of pages needed to show `total` records, `page_size` per page.
#[must_use]
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cat.jpg", Some("jpg"))]
    #[case("cat.JPEG", Some("jpeg"))]
    #[case("archive.tar.gz", Some("gz"))]
    #[case("dir/cat.png", Some("png"))]
    #[case("dir.d\\cat", None)]
    #[case(".hidden", None)]
    #[case("noext", None)]
    #[case("trailing.", None)]
    #[trace]
    fn extension_tests(#[case] name: &str, #[case] expected: Option<&str>) {
        // Act
        let actual = extension(name);

        // Assert
        assert_eq!(actual.as_deref(), expected);
    }

    #[rstest]
    #[case("a_1.jpg", true)]
    #[case("a_1.webp", true)]
    #[case("a_1.GIF", true)]
    #[case("a_1.pdf", false)]
    #[case("a_1", false)]
    #[trace]
    fn has_preview_tests(#[case] filename: &str, #[case] expected: bool) {
        // Arrange
        let record = FileRecord {
            filename: filename.to_owned(),
            display_name: String::new(),
            url: String::new(),
        };

        // Act & Assert
        assert_eq!(record.has_preview(), expected);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(5, 1)]
    #[case(6, 2)]
    #[case(12, 3)]
    #[case(15, 3)]
    #[trace]
    fn total_pages_tests(#[case] total: usize, #[case] expected: usize) {
        assert_eq!(total_pages(total, ITEMS_PER_PAGE), expected);
    }

    #[test]
    fn total_pages_zero_page_size() {
        assert_eq!(total_pages(10, 0), 0);
    }

    #[test]
    fn files_page_uses_camel_case_total() {
        // Arrange
        let json = r#"{"items":[{"filename":"a_1.png","display_name":"a.png"}],"totalCount":7}"#;

        // Act
        let page: FilesPage = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(page.total_count, 7);
        assert_eq!(page.items.len(), 1);
        assert!(page.items[0].url.is_empty());
        let back = serde_json::to_string(&page).unwrap();
        assert!(back.contains("\"totalCount\":7"));
    }
}
