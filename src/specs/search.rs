// src/specs/search.rs
//! Spec for `/members/search/`.
//!
//! The endpoint answers with a list of quoted strings, one per person:
//! `["Doe, Jane (jdoe, Computer Science)","Doe, John (jdoe2, )"]`.
//! We pull the quoted strings out first (the wrapper characters don't matter),
//! then read each one as `Last, First (netid, department)`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::SearchHit;
use crate::core::html::quoted_strings;

static HIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*([^,]+?)\s*,\s*(.+?)\s*\((.*)\)\s*$"#).unwrap()
});

pub fn extract_search_hits(payload: &str) -> impl Iterator<Item = SearchHit> {
    quoted_strings(payload).into_iter().filter_map(|entry| parse_hit(&entry))
}

fn parse_hit(entry: &str) -> Option<SearchHit> {
    let caps = HIT.captures(entry)?;
    let rest = caps.get(3)?.as_str();
    let (netid, department) = match rest.split_once(", ") {
        Some((n, d)) => (n.trim(), d.trim()),
        None => (rest.trim(), ""),
    };
    if netid.is_empty() {
        return None;
    }
    Some(SearchHit {
        last_name: s!(caps.get(1)?.as_str()),
        first_name: s!(caps.get(2)?.as_str()),
        netid: s!(netid),
        department: s!(department),
    })
}
