use kernel::{total_pages, FileRecord, FilesPage, ITEMS_PER_PAGE};

use crate::error::ClientError;
use crate::pagination::Pager;
use crate::store::{RecordKey, RecordStore};

pub const EMPTY_PLACEHOLDER: &str = "No images uploaded yet.";
pub const FAILED_PLACEHOLDER: &str = "Failed to get the list of files.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// Image preview loaded from the given location
    Image(String),
    /// Generic file icon
    Icon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub key: RecordKey,
    pub display_name: String,
    pub link: String,
    pub preview: Preview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryView {
    Empty,
    Failed(String),
    Listing { rows: Vec<Row>, pager: Option<Pager> },
}

/// Browses the records of a store page by page.
#[derive(Debug)]
pub struct Gallery<S> {
    store: S,
    current_page: usize,
    total: usize,
}

impl<S: RecordStore> Gallery<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            current_page: 1,
            total: 0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Total reported by the last successful fetch.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Fetches the current page and builds the view of it. A page past the
    /// end is pulled back to the last page and fetched again.
    pub async fn refresh(&mut self) -> GalleryView {
        let (offset, page) = match self.fetch().await {
            Ok(fetched) => fetched,
            Err(e) => return failed(&e),
        };
        self.total = page.total_count;

        let (offset, page) = if self.store.paginated() && self.current_page > self.last_page() {
            self.current_page = self.last_page();
            match self.fetch().await {
                Ok(fetched) => {
                    self.total = fetched.1.total_count;
                    fetched
                }
                Err(e) => return failed(&e),
            }
        } else {
            (offset, page)
        };

        if page.items.is_empty() {
            return GalleryView::Empty;
        }

        let rows = page
            .items
            .iter()
            .enumerate()
            .map(|(i, record)| self.row(record, offset + i))
            .collect();
        let pager = if self.store.paginated() {
            Pager::new(self.total, ITEMS_PER_PAGE, self.current_page)
        } else {
            None
        };
        GalleryView::Listing { rows, pager }
    }

    pub async fn go_to(&mut self, page: usize) -> GalleryView {
        self.current_page = page.max(1);
        self.refresh().await
    }

    /// `None` when already on the last page.
    pub async fn next(&mut self) -> Option<GalleryView> {
        if self.current_page >= total_pages(self.total, ITEMS_PER_PAGE) {
            return None;
        }
        Some(self.go_to(self.current_page + 1).await)
    }

    /// `None` when already on the first page.
    pub async fn previous(&mut self) -> Option<GalleryView> {
        if self.current_page <= 1 {
            return None;
        }
        Some(self.go_to(self.current_page - 1).await)
    }

    /// Deletes the record behind `key`, steps back from a page that became
    /// empty and refreshes. A failed delete leaves the page untouched.
    pub async fn delete(&mut self, key: &RecordKey) -> Result<GalleryView, ClientError> {
        if let Err(e) = self.store.remove(key).await {
            tracing::error!("failed to delete {key}: {e}");
            return Err(e);
        }
        if self.store.paginated() {
            let remaining = total_pages(self.total.saturating_sub(1), ITEMS_PER_PAGE).max(1);
            self.current_page = self.current_page.min(remaining);
        }
        Ok(self.refresh().await)
    }

    async fn fetch(&self) -> Result<(usize, FilesPage), ClientError> {
        let offset = if self.store.paginated() {
            (self.current_page - 1).saturating_mul(ITEMS_PER_PAGE)
        } else {
            0
        };
        let page = self.store.page(ITEMS_PER_PAGE, offset).await?;
        Ok((offset, page))
    }

    fn last_page(&self) -> usize {
        total_pages(self.total, ITEMS_PER_PAGE).max(1)
    }

    fn row(&self, record: &FileRecord, position: usize) -> Row {
        let link = self.store.link(record);
        let preview = if record.has_preview() {
            Preview::Image(link.clone())
        } else {
            Preview::Icon
        };
        Row {
            key: self.store.key_of(record, position),
            display_name: record.display_name.clone(),
            link,
            preview,
        }
    }
}

fn failed(e: &ClientError) -> GalleryView {
    tracing::error!("failed to get the list of files: {e}");
    GalleryView::Failed(e.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::candidate::Candidate;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};

    /// Keeps records in memory, paging like the server does.
    #[derive(Clone, Default)]
    pub(crate) struct MemoryStore {
        pub(crate) records: Arc<Mutex<Vec<FileRecord>>>,
        pub(crate) failing: bool,
        pub(crate) unpaged: bool,
    }

    impl MemoryStore {
        pub(crate) fn with_files(count: usize) -> Self {
            let store = Self::default();
            {
                let mut records = store.records.lock().unwrap();
                for i in 0..count {
                    records.push(record(&format!("f{i}.png")));
                }
            }
            store
        }

        fn names(&self) -> Vec<String> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.filename.clone())
                .collect()
        }
    }

    pub(crate) fn record(filename: &str) -> FileRecord {
        FileRecord {
            filename: filename.to_owned(),
            display_name: filename.to_owned(),
            url: format!("/media/{filename}"),
        }
    }

    impl RecordStore for MemoryStore {
        fn paginated(&self) -> bool {
            !self.unpaged
        }

        fn key_of(&self, record: &FileRecord, position: usize) -> RecordKey {
            if self.unpaged {
                RecordKey::Index(position)
            } else {
                RecordKey::Filename(record.filename.clone())
            }
        }

        fn link(&self, record: &FileRecord) -> String {
            record.url.clone()
        }

        async fn page(&self, limit: usize, offset: usize) -> Result<FilesPage, ClientError> {
            if self.failing {
                return Err(ClientError::NotFound(0));
            }
            let records = self.records.lock().unwrap();
            let items = if self.unpaged {
                records.clone()
            } else {
                records.iter().skip(offset).take(limit).cloned().collect()
            };
            Ok(FilesPage {
                items,
                total_count: records.len(),
            })
        }

        async fn save(&self, candidate: &Candidate) -> Result<FileRecord, ClientError> {
            if self.failing {
                return Err(ClientError::NotFound(0));
            }
            let r = record(&candidate.name);
            self.records.lock().unwrap().push(r.clone());
            Ok(r)
        }

        async fn remove(&self, key: &RecordKey) -> Result<(), ClientError> {
            if self.failing {
                return Err(ClientError::NotFound(0));
            }
            let mut records = self.records.lock().unwrap();
            match key {
                RecordKey::Filename(name) => records.retain(|r| &r.filename != name),
                RecordKey::Index(ix) if *ix < records.len() => {
                    records.remove(*ix);
                }
                RecordKey::Index(ix) => return Err(ClientError::NotFound(*ix)),
            }
            Ok(())
        }
    }

    fn rows_of(view: &GalleryView) -> usize {
        match view {
            GalleryView::Listing { rows, .. } => rows.len(),
            _ => 0,
        }
    }

    #[tokio::test]
    async fn empty_store_shows_placeholder() {
        let mut gallery = Gallery::new(MemoryStore::default());

        assert_eq!(gallery.refresh().await, GalleryView::Empty);
    }

    #[tokio::test]
    async fn failing_store_shows_failure() {
        let store = MemoryStore {
            failing: true,
            ..MemoryStore::default()
        };
        let mut gallery = Gallery::new(store);

        assert!(matches!(gallery.refresh().await, GalleryView::Failed(_)));
    }

    #[rstest]
    #[case(1, 5)]
    #[case(2, 5)]
    #[case(3, 2)]
    #[trace]
    #[tokio::test]
    async fn twelve_records_split_in_pages(#[case] page: usize, #[case] expected: usize) {
        // Arrange
        let mut gallery = Gallery::new(MemoryStore::with_files(12));

        // Act
        let view = gallery.go_to(page).await;

        // Assert
        assert_eq!(rows_of(&view), expected);
        let GalleryView::Listing { pager, .. } = view else {
            panic!("listing expected");
        };
        let pager = pager.unwrap();
        assert_eq!(pager.total_pages(), 3);
        assert_eq!(pager.current(), page);
    }

    #[rstest]
    #[case(4)]
    #[case(99)]
    #[case(usize::MAX)]
    #[trace]
    #[tokio::test]
    async fn page_past_end_shows_last_page(#[case] page: usize) {
        // Arrange
        let mut gallery = Gallery::new(MemoryStore::with_files(12));

        // Act
        let view = gallery.go_to(page).await;

        // Assert
        assert_eq!(gallery.current_page(), 3);
        assert_eq!(rows_of(&view), 2);
        assert!(gallery.next().await.is_none());
        assert!(gallery.previous().await.is_some());
        assert_eq!(gallery.current_page(), 2);
    }

    #[tokio::test]
    async fn page_past_end_of_empty_store_is_first() {
        let mut gallery = Gallery::new(MemoryStore::default());

        let view = gallery.go_to(7).await;

        assert_eq!(view, GalleryView::Empty);
        assert_eq!(gallery.current_page(), 1);
    }

    #[tokio::test]
    async fn rows_carry_key_link_and_preview() {
        // Arrange
        let store = MemoryStore::default();
        store.records.lock().unwrap().push(record("a_1.png"));
        store.records.lock().unwrap().push(record("b_1.pdf"));
        let mut gallery = Gallery::new(store);

        // Act
        let view = gallery.refresh().await;

        // Assert
        let GalleryView::Listing { rows, .. } = view else {
            panic!("listing expected");
        };
        assert_eq!(rows[0].key, RecordKey::Filename("a_1.png".to_owned()));
        assert_eq!(rows[0].link, "/media/a_1.png");
        assert_eq!(rows[0].preview, Preview::Image("/media/a_1.png".to_owned()));
        assert_eq!(rows[1].preview, Preview::Icon);
    }

    #[tokio::test]
    async fn next_and_previous_stop_at_edges() {
        // Arrange
        let mut gallery = Gallery::new(MemoryStore::with_files(6));
        gallery.refresh().await;

        // Act & Assert
        assert!(gallery.previous().await.is_none());
        assert!(gallery.next().await.is_some());
        assert_eq!(gallery.current_page(), 2);
        assert!(gallery.next().await.is_none());
        assert!(gallery.previous().await.is_some());
        assert_eq!(gallery.current_page(), 1);
    }

    #[tokio::test]
    async fn deleting_only_row_of_last_page_steps_back() {
        // Arrange
        let store = MemoryStore::with_files(6);
        let mut gallery = Gallery::new(store.clone());
        gallery.go_to(2).await;

        // Act
        let view = gallery.delete(&RecordKey::Filename("f5.png".to_owned())).await.unwrap();

        // Assert
        assert_eq!(gallery.current_page(), 1);
        assert_eq!(rows_of(&view), 5);
        assert_eq!(store.names().len(), 5);
    }

    #[tokio::test]
    async fn deleting_keeps_page_when_rows_remain() {
        // Arrange
        let store = MemoryStore::with_files(12);
        let mut gallery = Gallery::new(store);
        gallery.go_to(2).await;

        // Act
        let view = gallery.delete(&RecordKey::Filename("f5.png".to_owned())).await.unwrap();

        // Assert
        assert_eq!(gallery.current_page(), 2);
        assert_eq!(rows_of(&view), 5);
    }

    #[tokio::test]
    async fn deleting_last_record_shows_empty() {
        let mut gallery = Gallery::new(MemoryStore::with_files(1));
        gallery.refresh().await;

        let view = gallery.delete(&RecordKey::Filename("f0.png".to_owned())).await.unwrap();

        assert_eq!(gallery.current_page(), 1);
        assert_eq!(view, GalleryView::Empty);
    }

    #[tokio::test]
    async fn failed_delete_keeps_page() {
        // Arrange
        let store = MemoryStore {
            unpaged: true,
            ..MemoryStore::with_files(2)
        };
        let mut gallery = Gallery::new(store.clone());
        gallery.refresh().await;

        // Act
        let result = gallery.delete(&RecordKey::Index(7)).await;

        // Assert
        assert!(matches!(result, Err(ClientError::NotFound(7))));
        assert_eq!(gallery.current_page(), 1);
        assert_eq!(store.names().len(), 2);
    }

    #[tokio::test]
    async fn unpaged_store_lists_everything_without_pager() {
        // Arrange
        let store = MemoryStore {
            unpaged: true,
            ..MemoryStore::with_files(7)
        };
        let mut gallery = Gallery::new(store);

        // Act
        let view = gallery.refresh().await;

        // Assert
        let GalleryView::Listing { rows, pager } = view else {
            panic!("listing expected");
        };
        assert_eq!(rows.len(), 7);
        assert!(pager.is_none());
        assert_eq!(rows[6].key, RecordKey::Index(6));
    }
}
