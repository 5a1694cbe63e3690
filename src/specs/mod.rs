// src/specs/mod.rs
//! # Page specs
//!
//! Pure readers for the CATS pages. Each spec knows *where the data lives in the
//! HTML* of one endpoint and turns it into typed records. Nothing here touches the
//! network or any cache.
//!
//! ## Current specs
//! - `groups`  – `/groups/mine/` rows → [`Group`]
//! - `members` – `/members/{gid}` rows → [`Member`] (fixed 5-cell order)
//! - `search`  – `/members/search/` payload → [`SearchHit`]
//!
//! ## Conventions
//! - Rows that don't match the expected shape are skipped, never raised. A layout
//!   change upstream shows up as an empty result, so callers log when a page
//!   comes back empty.
//! - Extractors return iterators over the borrowed page; collect when you need to keep them.
//!
//! The markup is the only contract we have with the server. [`PageAdapter`] is the
//! seam: a new page layout means a new adapter, not changes in the client or the
//! reconciler.
pub mod groups;
pub mod members;
pub mod search;

pub use groups::extract_groups;
pub use members::extract_members;
pub use search::extract_search_hits;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub name: String,
}

/// One row of a group's member table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub first_name: String,
    pub last_name: String,
    /// May be empty.
    pub department: String,
    pub affiliation: String,
    pub netid: String,
}

/// One person from the last-name search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub last_name: String,
    pub first_name: String,
    pub netid: String,
    pub department: String,
}

/// Turns raw page text into records. Swap the implementation when the markup changes.
pub trait PageAdapter {
    fn groups(&self, html: &str) -> Vec<Group>;
    fn members(&self, html: &str) -> Vec<Member>;
    fn search_hits(&self, payload: &str) -> Vec<SearchHit>;
}

/// The current groups.richmond.edu markup.
#[derive(Clone, Copy, Debug, Default)]
pub struct CatsPages;

impl PageAdapter for CatsPages {
    fn groups(&self, html: &str) -> Vec<Group> {
        extract_groups(html).collect()
    }

    fn members(&self, html: &str) -> Vec<Member> {
        extract_members(html).collect()
    }

    fn search_hits(&self, payload: &str) -> Vec<SearchHit> {
        extract_search_hits(payload).collect()
    }
}
