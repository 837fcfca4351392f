use std::fmt;

/// The two views of the uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Upload,
    Images,
}

impl View {
    /// Active view for a location path.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        if path.contains("images") {
            View::Images
        } else {
            View::Upload
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            View::Upload => "/upload/",
            View::Images => "/images/",
        }
    }

    #[must_use]
    pub fn other(self) -> Self {
        match self {
            View::Upload => View::Images,
            View::Images => View::Upload,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Upload => write!(f, "Upload"),
            View::Images => write!(f, "Images"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    F5,
    Escape,
    Other,
}

impl Key {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "f5" => Key::F5,
            "esc" | "escape" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// Tab of the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tab {
    pub view: View,
    pub active: bool,
}

/// Tracks the active view and the `pageWasVisited` session flag.
#[derive(Debug)]
pub struct Navigator {
    current: View,
    page_was_visited: bool,
}

impl Navigator {
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            current: View::from_path(path),
            page_was_visited: true,
        }
    }

    #[must_use]
    pub fn current(&self) -> View {
        self.current
    }

    #[must_use]
    pub fn page_was_visited(&self) -> bool {
        self.page_was_visited
    }

    /// F5 and Escape are intercepted: both force the upload view and clear
    /// the session flag. Returns whether the key was intercepted.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::F5 | Key::Escape => {
                self.page_was_visited = false;
                self.current = View::Upload;
                tracing::debug!("key {key:?} intercepted, back to {}", View::Upload.path());
                true
            }
            Key::Other => false,
        }
    }

    pub fn open(&mut self, path: &str) -> View {
        self.current = View::from_path(path);
        self.page_was_visited = true;
        self.current
    }

    #[must_use]
    pub fn tabs(&self) -> [Tab; 2] {
        [View::Upload, View::Images].map(|view| Tab {
            view,
            active: view == self.current,
        })
    }
}
