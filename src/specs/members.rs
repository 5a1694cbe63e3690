// src/specs/members.rs
//! Spec for `/members/{gid}`.
//!
//! A member row is a `<tr id="...">` with exactly five plain `<td>` cells, then
//! the action cells (which carry a class):
//!
//! ```text
//! <tr id="8812">
//!     <td>Jane</td>            first
//!     <td>Doe</td>             last
//!     <td>Computer Science</td> department (may be empty)
//!     <td>student</td>         affiliation type
//!     <td>jdoe</td>            netid
//!     <td class="actions">...</td>
//! </tr>
//! ```
//! The cell order is positional and must not be reshuffled.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Member;
use crate::core::sanitize::clean_cell;

static MEMBER_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<tr\b[^>]*\bid="[^"]+"[^>]*>(.*?)</tr>"#).unwrap()
});

// Plain cells only; the action cells have attributes and are ignored.
static PLAIN_CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<td>(.*?)</td>"#).unwrap()
});

pub fn extract_members(html: &str) -> impl Iterator<Item = Member> + '_ {
    MEMBER_ROW.captures_iter(html).filter_map(|row| {
        let body = row.get(1)?.as_str();
        let cells: Vec<String> = PLAIN_CELL
            .captures_iter(body)
            .filter_map(|c| c.get(1).map(|m| clean_cell(m.as_str())))
            .collect();
        member_from_cells(cells)
    })
}

fn member_from_cells(cells: Vec<String>) -> Option<Member> {
    let [first_name, last_name, department, affiliation, netid]: [String; 5] =
        cells.try_into().ok()?;
    if netid.is_empty() {
        return None;
    }
    Some(Member { first_name, last_name, department, affiliation, netid })
}
