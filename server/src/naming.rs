use uuid::Uuid;

/// Replaces everything but ASCII letters, digits, `-` and `_` with `_`.
#[must_use]
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Splits an uploaded name into lower-cased stem and extension (with dot).
#[must_use]
pub fn split_name(name: &str) -> (String, String) {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            (stem.to_lowercase(), format!(".{}", ext.to_ascii_lowercase()))
        }
        _ => (base.to_lowercase(), String::new()),
    }
}

/// Builds the storage name `<sanitized stem>_<uuid><ext>`.
#[must_use]
pub fn unique_name(original: &str) -> String {
    let (stem, ext) = split_name(original);
    format!("{}_{}{ext}", sanitize(&stem), Uuid::new_v4())
}

/// Rejects names that could escape the image directory.
#[must_use]
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
