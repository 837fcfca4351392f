extern crate url;

use self::url::Url;
use core::fmt;
use std::ops::Add;

const SEP: char = '/';

/// Address of an endpoint of the upload service.
#[derive(Clone, Debug)]
pub struct Resource {
    url: Url,
}

impl Resource {
    #[must_use]
    pub fn new(uri: &str) -> Option<Resource> {
        let base = Url::parse(uri).ok()?;
        if base.cannot_be_a_base() {
            return None;
        }
        Some(Resource { url: base })
    }

    pub fn append_path(&mut self, path: &str) -> &mut Self {
        if let Some(segments) = self.url.path_segments() {
            let p = segments
                .chain(path.split(SEP))
                .filter(|x| !x.is_empty())
                .fold(String::new(), |s, x| {
                    let mut y = s.add(x);
                    y.push(SEP);
                    y
                });

            let path_to_set = if path.chars().next_back().unwrap_or_default() == SEP {
                &p
            } else {
                &p[..p.len().saturating_sub(1)]
            };
            self.url.set_path(path_to_set);
        } else {
            let r = self.url.join(path);
            if let Ok(u) = r {
                self.url = u;
            }
        }
        self
    }

    /// Appends one path segment, escaping separators and reserved characters.
    pub fn append_component(&mut self, component: &str) -> &mut Self {
        let escaped = urlencoding::encode(component);
        self.append_path(&escaped)
    }

    pub fn append_query(&mut self, name: &str, value: &str) -> &mut Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Resolves a server relative location such as `/media/x.png` below the
    /// base path, so a service mounted at `/app` links to `/app/media/x.png`.
    #[must_use]
    pub fn resolve(&self, location: &str) -> String {
        let mut base = self.url.clone();
        if !base.path().ends_with(SEP) {
            let path = format!("{}{SEP}", base.path());
            base.set_path(&path);
        }
        base.join(location.trim_start_matches(SEP))
            .map_or_else(|_| location.to_owned(), |u| u.to_string())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
