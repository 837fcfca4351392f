use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use kernel::{DetailReply, FileRecord, FilesPage, LocalEntry, UploadReply};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::candidate::Candidate;
use crate::error::ClientError;
use crate::local::{self, LocalStorage};
use crate::resource::Resource;

/// Identifies the record a delete control acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    /// Server assigned file name
    Filename(String),
    /// Position in the local list
    Index(usize),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Filename(name) => write!(f, "{name}"),
            RecordKey::Index(ix) => write!(f, "{ix}"),
        }
    }
}

/// Where uploaded records live.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Whether the gallery pages through records or shows them all.
    fn paginated(&self) -> bool;

    /// Key a delete control carries for `record` found at `position`.
    fn key_of(&self, record: &FileRecord, position: usize) -> RecordKey;

    /// Location a user can open the record at.
    fn link(&self, record: &FileRecord) -> String;

    async fn page(&self, limit: usize, offset: usize) -> Result<FilesPage, ClientError>;

    async fn save(&self, candidate: &Candidate) -> Result<FileRecord, ClientError>;

    async fn remove(&self, key: &RecordKey) -> Result<(), ClientError>;
}

/// List replies come either as a page object or as a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListReply {
    Page(FilesPage),
    Bare(Vec<FileRecord>),
}

impl From<ListReply> for FilesPage {
    fn from(reply: ListReply) -> Self {
        match reply {
            ListReply::Page(page) => page,
            ListReply::Bare(items) => FilesPage {
                total_count: items.len(),
                items,
            },
        }
    }
}

/// Records kept by the upload service.
#[derive(Clone, Debug)]
pub struct ServerStore {
    base: Resource,
    client: Client,
    journal: Option<Arc<LocalStorage>>,
}

impl ServerStore {
    pub fn new(uri: &str) -> Result<Self, ClientError> {
        let base = Resource::new(uri).ok_or_else(|| ClientError::InvalidUri(uri.to_owned()))?;
        Ok(Self {
            base,
            client: Client::new(),
            journal: None,
        })
    }

    /// Also records every returned `{filename, url}` pair in local storage.
    #[must_use]
    pub fn with_journal(mut self, journal: Arc<LocalStorage>) -> Self {
        self.journal = Some(journal);
        self
    }

    fn endpoint(&self, path: &str) -> Resource {
        let mut resource = self.base.clone();
        resource.append_path(path);
        resource
    }
}

impl RecordStore for ServerStore {
    fn paginated(&self) -> bool {
        true
    }

    fn key_of(&self, record: &FileRecord, _position: usize) -> RecordKey {
        RecordKey::Filename(record.filename.clone())
    }

    fn link(&self, record: &FileRecord) -> String {
        if record.url.is_empty() {
            let mut resource = self.endpoint("media");
            resource.append_component(&record.filename);
            resource.to_string()
        } else {
            self.base.resolve(&record.url)
        }
    }

    async fn page(&self, limit: usize, offset: usize) -> Result<FilesPage, ClientError> {
        let mut resource = self.endpoint("api/files");
        resource
            .append_query("limit", &limit.to_string())
            .append_query("offset", &offset.to_string());

        let response = self.client.get(resource.to_string()).send().await?;
        let reply: ListReply = success(response).await?.json().await?;
        Ok(reply.into())
    }

    async fn save(&self, candidate: &Candidate) -> Result<FileRecord, ClientError> {
        let f = File::open(&candidate.path).await?;
        let stream = reqwest::Body::wrap_stream(ReaderStream::new(f));
        let part = Part::stream_with_length(stream, candidate.size)
            .file_name(candidate.name.clone())
            .mime_str(&candidate.mime)?;
        let form = Form::new().part("file", part);

        let resource = self.endpoint("upload/");
        let response = self
            .client
            .post(resource.to_string())
            .multipart(form)
            .send()
            .await?;
        let reply: UploadReply = success(response).await?.json().await?;
        tracing::info!("file {} uploaded as {}", candidate.name, reply.filename);

        if let Some(journal) = &self.journal {
            let entry = LocalEntry {
                name: reply.filename.clone(),
                url: reply.url.clone(),
            };
            local::append_entry(journal, entry).await?;
        }

        Ok(FileRecord {
            filename: reply.filename,
            display_name: candidate.name.clone(),
            url: reply.url,
        })
    }

    async fn remove(&self, key: &RecordKey) -> Result<(), ClientError> {
        let RecordKey::Filename(filename) = key else {
            return Err(ClientError::ForeignKey);
        };
        let mut resource = self.endpoint("api/delete");
        resource.append_component(filename);

        let response = self.client.delete(resource.to_string()).send().await?;
        let status = response.status();
        if status.is_success() {
            tracing::info!("file {filename} deleted");
        } else {
            tracing::warn!("delete of {filename} answered {status}");
        }
        Ok(())
    }
}

/// Records kept in local storage as data URLs.
#[derive(Clone, Debug)]
pub struct LocalStore {
    storage: Arc<LocalStorage>,
}

impl LocalStore {
    #[must_use]
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<LocalStorage> {
        &self.storage
    }
}

impl RecordStore for LocalStore {
    fn paginated(&self) -> bool {
        false
    }

    fn key_of(&self, _record: &FileRecord, position: usize) -> RecordKey {
        RecordKey::Index(position)
    }

    fn link(&self, record: &FileRecord) -> String {
        format!("/media/{}", record.filename)
    }

    async fn page(&self, _limit: usize, _offset: usize) -> Result<FilesPage, ClientError> {
        let items: Vec<FileRecord> = local::load_entries(&self.storage)
            .await?
            .into_iter()
            .map(|entry| FileRecord {
                filename: entry.name.clone(),
                display_name: entry.name,
                url: entry.url,
            })
            .collect();
        Ok(FilesPage {
            total_count: items.len(),
            items,
        })
    }

    async fn save(&self, candidate: &Candidate) -> Result<FileRecord, ClientError> {
        let data = tokio::fs::read(&candidate.path).await?;
        let url = data_url(&candidate.mime, &data);
        let entry = LocalEntry {
            name: candidate.name.clone(),
            url: url.clone(),
        };
        let len = local::append_entry(&self.storage, entry).await?;
        tracing::info!("file {} stored locally, {len} in the list", candidate.name);

        Ok(FileRecord {
            filename: candidate.name.clone(),
            display_name: candidate.name.clone(),
            url,
        })
    }

    async fn remove(&self, key: &RecordKey) -> Result<(), ClientError> {
        let RecordKey::Index(index) = key else {
            return Err(ClientError::ForeignKey);
        };
        let removed = local::remove_entry(&self.storage, *index).await?;
        tracing::info!("file {} removed from the local list", removed.name);
        Ok(())
    }
}

/// Either storage flavour, chosen at start up.
#[derive(Clone, Debug)]
pub enum Store {
    Server(ServerStore),
    Local(LocalStore),
}

impl Store {
    /// Reads a delete key typed by a user: a list position for the local
    /// store, a file name otherwise.
    #[must_use]
    pub fn parse_key(&self, input: &str) -> Option<RecordKey> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        match self {
            Store::Server(_) => Some(RecordKey::Filename(input.to_owned())),
            Store::Local(_) => input.parse().ok().map(RecordKey::Index),
        }
    }
}

impl RecordStore for Store {
    fn paginated(&self) -> bool {
        match self {
            Store::Server(s) => s.paginated(),
            Store::Local(s) => s.paginated(),
        }
    }

    fn key_of(&self, record: &FileRecord, position: usize) -> RecordKey {
        match self {
            Store::Server(s) => s.key_of(record, position),
            Store::Local(s) => s.key_of(record, position),
        }
    }

    fn link(&self, record: &FileRecord) -> String {
        match self {
            Store::Server(s) => s.link(record),
            Store::Local(s) => s.link(record),
        }
    }

    async fn page(&self, limit: usize, offset: usize) -> Result<FilesPage, ClientError> {
        match self {
            Store::Server(s) => s.page(limit, offset).await,
            Store::Local(s) => s.page(limit, offset).await,
        }
    }

    async fn save(&self, candidate: &Candidate) -> Result<FileRecord, ClientError> {
        match self {
            Store::Server(s) => s.save(candidate).await,
            Store::Local(s) => s.save(candidate).await,
        }
    }

    async fn remove(&self, key: &RecordKey) -> Result<(), ClientError> {
        match self {
            Store::Server(s) => s.remove(key).await,
            Store::Local(s) => s.remove(key).await,
        }
    }
}

#[must_use]
pub fn data_url(mime: &str, data: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(data))
}

async fn success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = match response.json::<DetailReply>().await {
        Ok(reply) => reply.detail,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned(),
    };
    Err(ClientError::Status { status, detail })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(filename: &str, url: &str) -> FileRecord {
        FileRecord {
            filename: filename.to_owned(),
            display_name: filename.to_owned(),
            url: url.to_owned(),
        }
    }

    #[test]
    fn data_url_encodes_base64() {
        assert_eq!(data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn list_reply_page_object() {
        // Arrange
        let json = r#"{"items":[{"filename":"a_1.png","display_name":"a.png"}],"totalCount":12}"#;

        // Act
        let page: FilesPage = serde_json::from_str::<ListReply>(json).unwrap().into();

        // Assert
        assert_eq!(page.total_count, 12);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn list_reply_bare_array() {
        // Arrange
        let json = r#"[{"filename":"a_1.png","display_name":"a.png","url":"/media/a_1.png"},
                       {"filename":"b_1.png","display_name":"b.png","url":"/media/b_1.png"}]"#;

        // Act
        let page: FilesPage = serde_json::from_str::<ListReply>(json).unwrap().into();

        // Assert
        assert_eq!(page.total_count, 2);
        assert_eq!(page.items[1].filename, "b_1.png");
    }

    #[test]
    fn server_store_rejects_bad_uri() {
        assert!(matches!(
            ServerStore::new("not a uri"),
            Err(ClientError::InvalidUri(_))
        ));
    }

    #[rstest]
    #[case("a_1.png", "/media/a_1.png", "http://localhost:8000/media/a_1.png")]
    #[case("a 1.png", "", "http://localhost:8000/media/a%201.png")]
    #[trace]
    fn server_link(#[case] filename: &str, #[case] url: &str, #[case] expected: &str) {
        let store = ServerStore::new("http://localhost:8000").unwrap();

        assert_eq!(store.link(&record(filename, url)), expected);
    }

    #[test]
    fn keys_per_store() {
        // Arrange
        let server = ServerStore::new("http://localhost:8000").unwrap();
        let local = LocalStore::new(Arc::new(LocalStorage::new("unused.json")));
        let r = record("a_1.png", "");

        // Act & Assert
        assert_eq!(server.key_of(&r, 3), RecordKey::Filename("a_1.png".to_owned()));
        assert_eq!(local.key_of(&r, 3), RecordKey::Index(3));
        assert!(server.paginated());
        assert!(!local.paginated());
    }

    #[rstest]
    #[case(false, "cat_1.png", Some(RecordKey::Filename("cat_1.png".to_owned())))]
    #[case(false, " ", None)]
    #[case(true, "2", Some(RecordKey::Index(2)))]
    #[case(true, "cat_1.png", None)]
    #[trace]
    fn parse_key_tests(#[case] local: bool, #[case] input: &str, #[case] expected: Option<RecordKey>) {
        let store = if local {
            Store::Local(LocalStore::new(Arc::new(LocalStorage::new("unused.json"))))
        } else {
            Store::Server(ServerStore::new("http://localhost:8000").unwrap())
        };

        assert_eq!(store.parse_key(input), expected);
    }

    #[tokio::test]
    async fn foreign_keys_are_refused() {
        let server = ServerStore::new("http://localhost:8000").unwrap();
        let local = LocalStore::new(Arc::new(LocalStorage::new("unused.json")));

        assert!(matches!(
            server.remove(&RecordKey::Index(0)).await,
            Err(ClientError::ForeignKey)
        ));
        assert!(matches!(
            local.remove(&RecordKey::Filename("a".to_owned())).await,
            Err(ClientError::ForeignKey)
        ));
    }
}
