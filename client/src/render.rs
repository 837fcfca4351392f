use comfy_table::{presets::UTF8_HORIZONTAL_ONLY, Attribute, Cell, ContentArrangement, Table};

use crate::gallery::{GalleryView, Preview, Row, EMPTY_PLACEHOLDER, FAILED_PLACEHOLDER};
use crate::navigation::Tab;
use crate::pagination::{Control, Pager};
use crate::upload::UploadOutcome;

const TABLE_WIDTH: u16 = 120;

#[must_use]
pub fn gallery(view: &GalleryView) -> String {
    match view {
        GalleryView::Empty => EMPTY_PLACEHOLDER.to_owned(),
        GalleryView::Failed(_) => FAILED_PLACEHOLDER.to_owned(),
        GalleryView::Listing { rows, pager } => {
            let table = rows_table(rows);
            match pager {
                Some(p) => format!("{table}\n{}", pager_line(p)),
                None => table.to_string(),
            }
        }
    }
}

fn rows_table(rows: &[Row]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_HORIZONTAL_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(TABLE_WIDTH)
        .set_header(vec![
            Cell::new("Preview").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Link").add_attribute(Attribute::Bold),
            Cell::new("Delete").add_attribute(Attribute::Bold),
        ]);

    for row in rows {
        let preview = match &row.preview {
            Preview::Image(_) => "[image]",
            Preview::Icon => "[file]",
        };
        table.add_row(vec![
            Cell::new(preview),
            Cell::new(&row.display_name),
            Cell::new(&row.link),
            Cell::new(&row.key),
        ]);
    }
    table
}

/// Pager as text, e.g. `< [1] 2 3 >`; a disabled arrow is shown as `-`.
#[must_use]
pub fn pager_line(pager: &Pager) -> String {
    pager
        .controls()
        .map(|control| match control {
            Control::Previous { disabled } => (if disabled { "-" } else { "<" }).to_owned(),
            Control::Next { disabled } => (if disabled { "-" } else { ">" }).to_owned(),
            Control::Page { index, active: true } => format!("[{index}]"),
            Control::Page { index, active: false } => index.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[must_use]
pub fn tabs(tabs: &[Tab]) -> String {
    tabs.iter()
        .map(|t| {
            if t.active {
                format!("[{}]", t.view)
            } else {
                t.view.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

#[must_use]
pub fn outcomes(outcomes: &[UploadOutcome]) -> String {
    outcomes
        .iter()
        .map(UploadOutcome::notice)
        .collect::<Vec<_>>()
        .join("\n")
}
