use std::fmt::{Debug, Display};

use chrono::{DateTime, Utc};
use kernel::FileRecord;

/// Metadata of a file that is about to be stored.
pub struct NewImage {
    pub filename: String,
    pub original_name: String,
    pub size: u64,
    pub file_type: String,
}

/// Metadata row of a stored file.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub id: i64,
    pub filename: String,
    pub original_name: String,
    pub size: u64,
    pub file_type: String,
    pub upload_time: DateTime<Utc>,
}

impl StoredImage {
    #[must_use]
    pub fn into_record(self) -> FileRecord {
        let url = media_url(&self.filename);
        FileRecord {
            filename: self.filename,
            display_name: self.original_name,
            url,
        }
    }
}

/// Path the media route serves a stored file from.
#[must_use]
pub fn media_url(filename: &str) -> String {
    format!("/media/{filename}")
}

pub trait Repository {
    type Err: Debug + Display;

    fn new_database(&self) -> Result<(), Self::Err>;

    fn create(&mut self, image: &NewImage) -> Result<StoredImage, Self::Err>;

    fn get_by_filename(&self, filename: &str) -> Result<Option<StoredImage>, Self::Err>;

    fn delete_by_filename(&mut self, filename: &str) -> Result<bool, Self::Err>;

    /// Records in insertion order, `limit` of them starting at `offset`.
    fn list(&self, limit: usize, offset: usize) -> Result<Vec<StoredImage>, Self::Err>;

    fn count(&self) -> Result<usize, Self::Err>;
}
