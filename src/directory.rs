// src/directory.rs
//! Domain calls on top of an authenticated [`Transport`], plus the caches that
//! make add/remove idempotent.
//!
//! Caches owned here:
//! - group id → name, filled once at construction and never invalidated;
//! - group id → member netids, filled lazily by [`DirectoryClient::is_member`] and
//!   overwritten by every [`DirectoryClient::list_members`];
//! - netid → affiliation, accumulated from every member listing, across groups.
//!
//! A successful add/remove records its own netid in the member cache, so repeating
//! it is a no-op. Nothing else is refreshed: changes made elsewhere and the
//! affiliation of someone just added stay unknown until `list_members` runs again.

use std::collections::{BTreeMap, HashMap};

use crate::config::consts::*;
use crate::error::{Action, CatsError, Result};
use crate::session::Transport;
use crate::specs::{CatsPages, Member, PageAdapter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Affiliation {
    pub kind: String,
    pub department: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    AlreadyMember,
    Added,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    NotMember,
    Removed,
}

pub struct DirectoryClient<T: Transport, P: PageAdapter = CatsPages> {
    transport: T,
    pages: P,
    groups: BTreeMap<String, String>,
    members: HashMap<String, Vec<String>>,
    affiliations: HashMap<String, Affiliation>,
}

impl<T: Transport> DirectoryClient<T, CatsPages> {
    pub fn new(transport: T) -> Result<Self> {
        Self::with_pages(transport, CatsPages)
    }
}

impl<T: Transport, P: PageAdapter> DirectoryClient<T, P> {
    /// Build the client and cache the caller's groups.
    pub fn with_pages(transport: T, pages: P) -> Result<Self> {
        let mut client = Self {
            transport,
            pages,
            groups: BTreeMap::new(),
            members: HashMap::new(),
            affiliations: HashMap::new(),
        };
        client.list_groups()?;
        Ok(client)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn groups(&self) -> &BTreeMap<String, String> {
        &self.groups
    }

    /// Cached netids for `gid`, if it has been listed.
    pub fn cached_members(&self, gid: &str) -> Option<&[String]> {
        self.members.get(gid).map(Vec::as_slice)
    }

    pub fn affiliation(&self, netid: &str) -> Option<&Affiliation> {
        self.affiliations.get(netid)
    }

    /// Fetch the groups page and merge it into the group cache.
    pub fn list_groups(&mut self) -> Result<&BTreeMap<String, String>> {
        let resp = self.transport.post(GROUPS_PATH)?;
        let found = self.pages.groups(&resp.text);
        if found.is_empty() {
            logw!("groups page (HTTP {}) yielded no groups", resp.status);
        }
        logd!("found groups:");
        for g in found {
            logd!("\t{}: {}", g.name, g.id);
            self.groups.insert(g.id, g.name);
        }
        Ok(&self.groups)
    }

    /// Case-insensitive exact match on cached group names.
    pub fn resolve_group_id(&self, name: &str) -> Result<String> {
        logd!("trying to find gid for group {name}");
        let wanted = name.to_lowercase();
        match self.groups.iter().find(|(_, n)| n.to_lowercase() == wanted) {
            Some((gid, _)) => {
                logd!("\tgroup {name} has gid {gid}");
                Ok(gid.clone())
            }
            None => {
                loge!("no group named '{name}'");
                Err(CatsError::GroupNotFound { name: s!(name) })
            }
        }
    }

    /// Always hits the network. Refreshes the member cache for `gid` and merges
    /// every member's affiliation into the index.
    pub fn list_members(&mut self, gid: &str) -> Result<Vec<Member>> {
        logd!("getting users in group {gid}...");
        let resp = self.transport.post(&format!("{MEMBERS_PATH}/{gid}"))?;
        let members = self.pages.members(&resp.text);
        if members.is_empty() {
            logw!("member page for group {gid} (HTTP {}) yielded no members", resp.status);
        }

        for m in &members {
            self.affiliations.insert(
                m.netid.clone(),
                Affiliation { kind: m.affiliation.clone(), department: m.department.clone() },
            );
        }
        self.members.insert(s!(gid), members.iter().map(|m| m.netid.clone()).collect());
        logd!("found {} users in group {gid}", members.len());
        Ok(members)
    }

    /// Lists the group first if it has never been listed.
    pub fn is_member(&mut self, gid: &str, netid: &str) -> Result<bool> {
        logd!("\tchecking if user {netid} is in group {gid}...");
        if !self.members.contains_key(gid) {
            self.list_members(gid)?;
        }
        let present = self.members.get(gid).is_some_and(|v| v.iter().any(|n| n == netid));
        logd!("\tuser is {}in group", if present { "" } else { "not " });
        Ok(present)
    }

    pub fn add_member(&mut self, gid: &str, netid: &str) -> Result<AddOutcome> {
        logd!("adding user {netid} to group {gid}...");
        if self.is_member(gid, netid)? {
            logd!("\tuser {netid} was already in group, skipping");
            return Ok(AddOutcome::AlreadyMember);
        }
        self.mutate(Action::Add, gid, netid)?;
        if let Some(list) = self.members.get_mut(gid) {
            list.push(s!(netid));
        }
        logd!("\tuser {netid} added to group {gid}");
        Ok(AddOutcome::Added)
    }

    pub fn remove_member(&mut self, gid: &str, netid: &str) -> Result<RemoveOutcome> {
        logd!("removing user {netid} from group {gid}...");
        if !self.is_member(gid, netid)? {
            logd!("\tuser {netid} not in group, skipping");
            return Ok(RemoveOutcome::NotMember);
        }
        self.mutate(Action::Remove, gid, netid)?;
        if let Some(list) = self.members.get_mut(gid) {
            list.retain(|n| n != netid);
        }
        logd!("\tuser {netid} removed from group {gid}");
        Ok(RemoveOutcome::Removed)
    }

    fn mutate(&mut self, action: Action, gid: &str, netid: &str) -> Result<()> {
        let base = match action {
            Action::Add => ADD_MEMBER_PATH,
            Action::Remove => DEL_MEMBER_PATH,
        };
        let resp = self.transport.post(&format!("{base}/{gid}/{netid}"))?;
        if !resp.ok() {
            loge!("could not {action} {netid} in group {gid} (HTTP {})", resp.status);
            return Err(CatsError::MembershipMutation {
                action,
                gid: s!(gid),
                netid: s!(netid),
                status: resp.status,
            });
        }
        Ok(())
    }

    /// Exact, case-insensitive (last, first) match over the last-name search.
    /// `None` when nobody matches; an error when more than one person does.
    pub fn search_by_name(&mut self, last: &str, first: &str) -> Result<Option<String>> {
        logd!("searching directory for {last}, {first}");
        let resp = self.transport.post_form(SEARCH_PATH, &[("lname", last)])?;
        let (last_lc, first_lc) = (last.to_lowercase(), first.to_lowercase());

        let mut matches: Vec<String> = self
            .pages
            .search_hits(&resp.text)
            .into_iter()
            .filter(|h| h.last_name.to_lowercase() == last_lc && h.first_name.to_lowercase() == first_lc)
            .map(|h| h.netid)
            .collect();

        match matches.len() {
            0 => {
                logd!("\tno directory entry for {last}, {first}");
                Ok(None)
            }
            1 => {
                let netid = matches.remove(0);
                logd!("\t{last}, {first} is {netid}");
                Ok(Some(netid))
            }
            n => {
                loge!("{last}, {first} matched {n} people: {}", matches.join(", "));
                Err(CatsError::AmbiguousName { last: s!(last), first: s!(first), matches: n })
            }
        }
    }
}
