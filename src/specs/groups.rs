// src/specs/groups.rs
//! Spec for `/groups/mine/`.
//!
//! Each group is a `<tr id="NNN">` row; somewhere inside it a cell whose class
//! ends the attribute with `group-name` holds the label:
//!
//! ```text
//! <tr id="1234">
//!     <td class="group-name">HPC</td> ...
//! </tr>
//! ```
//! Order is document order (the server sorts by name for us).

use once_cell::sync::Lazy;
use regex::Regex;

use super::Group;
use crate::core::sanitize::clean_cell;

static GROUP_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<tr\b[^>]*\bid="(\d+)"[^>]*>(.*?)</tr>"#).unwrap()
});

static GROUP_NAME_CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"group-name"[^>]*>(.*?)</td>"#).unwrap()
});

pub fn extract_groups(html: &str) -> impl Iterator<Item = Group> + '_ {
    GROUP_ROW.captures_iter(html).filter_map(|row| {
        let id = row.get(1)?.as_str();
        let body = row.get(2)?.as_str();
        let name = clean_cell(GROUP_NAME_CELL.captures(body)?.get(1)?.as_str());
        if name.is_empty() {
            return None;
        }
        Some(Group { id: s!(id), name })
    })
}
