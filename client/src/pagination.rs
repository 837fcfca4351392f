use kernel::total_pages;

/// One control of the pager line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Previous { disabled: bool },
    Page { index: usize, active: bool },
    Next { disabled: bool },
}

/// Page position within a paginated listing. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    current: usize,
    total_pages: usize,
}

impl Pager {
    /// No pager is shown when there is nothing to page through.
    #[must_use]
    pub fn new(total: usize, page_size: usize, current: usize) -> Option<Self> {
        let total_pages = total_pages(total, page_size);
        if total_pages == 0 {
            return None;
        }
        Some(Self {
            current: current.clamp(1, total_pages),
            total_pages,
        })
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current < self.total_pages
    }

    pub fn controls(&self) -> impl Iterator<Item = Control> + '_ {
        let pages = (1..=self.total_pages).map(|index| Control::Page {
            index,
            active: index == self.current,
        });
        std::iter::once(Control::Previous {
            disabled: !self.has_previous(),
        })
        .chain(pages)
        .chain(std::iter::once(Control::Next {
            disabled: !self.has_next(),
        }))
    }
}
