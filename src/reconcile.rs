// src/reconcile.rs
//! One batch of targets against one group.
//!
//! Remove mode is a straight loop. Add mode runs in two passes:
//!
//! 1. **mutate** – snapshot who is already in the group, then add each netid;
//! 2. **audit**  – re-list the group and take back every addition from this run
//!    whose affiliation is not the eligible type. People who were members before
//!    the run are never touched, whatever their affiliation.
//!
//! Failures are per identifier: a bad name or a failed POST is recorded in the
//! report and the batch moves on.

use std::collections::{HashMap, HashSet};

use crate::config::consts::ELIGIBLE_AFFILIATION;
use crate::config::options::Mode;
use crate::directory::{AddOutcome, DirectoryClient, RemoveOutcome};
use crate::error::Result;
use crate::progress::Progress;
use crate::session::Transport;
use crate::specs::PageAdapter;

/// A raw input token: a netid, or a `last, first` pair that needs a lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    NetId(String),
    Name { last: String, first: String },
}

impl Target {
    /// `None` for blank tokens.
    pub fn parse(token: &str) -> Option<Target> {
        let t = token.trim();
        if t.is_empty() {
            return None;
        }
        match t.split_once(',') {
            Some((last, first)) => Some(Target::Name { last: s!(last.trim()), first: s!(first.trim()) }),
            None => Some(Target::NetId(s!(t))),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Target::NetId(n) => n.clone(),
            Target::Name { last, first } => format!("{last}, {first}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Added,
    AlreadyMember,
    Removed,
    NotMember,
    WouldAdd,
    WouldRemove,
    /// Added this run, then taken back by the audit.
    Reverted { affiliation: String },
    Failed(String),
    Unresolved(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchEntry {
    /// The netid, or the raw target label when it never resolved.
    pub subject: String,
    pub outcome: Outcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    fn push(&mut self, subject: impl Into<String>, outcome: Outcome) {
        self.entries.push(BatchEntry { subject: subject.into(), outcome });
    }

    pub fn outcome_of(&self, subject: &str) -> Option<&Outcome> {
        self.entries.iter().find(|e| e.subject == subject).map(|e| &e.outcome)
    }

    pub fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    pub fn summary(&self) -> String {
        let n = |f: fn(&Outcome) -> bool| self.count(f);
        format!(
            "added {}, removed {}, reverted {}, unchanged {}, planned {}, failed {}, unresolved {}",
            n(|o| matches!(o, Outcome::Added)),
            n(|o| matches!(o, Outcome::Removed)),
            n(|o| matches!(o, Outcome::Reverted { .. })),
            n(|o| matches!(o, Outcome::AlreadyMember | Outcome::NotMember)),
            n(|o| matches!(o, Outcome::WouldAdd | Outcome::WouldRemove)),
            n(|o| matches!(o, Outcome::Failed(_))),
            n(|o| matches!(o, Outcome::Unresolved(_))),
        )
    }
}

pub struct Reconciler<'a, T: Transport, P: PageAdapter> {
    client: &'a mut DirectoryClient<T, P>,
    group: String,
    gid: String,
    dry_run: bool,
    eligible: String,
}

impl<'a, T: Transport, P: PageAdapter> Reconciler<'a, T, P> {
    /// Fails with `GroupNotFound` when the caller can't see `group`.
    pub fn new(client: &'a mut DirectoryClient<T, P>, group: &str, dry_run: bool) -> Result<Self> {
        let gid = client.resolve_group_id(group)?;
        Ok(Self {
            client,
            group: s!(group),
            gid,
            dry_run,
            eligible: s!(ELIGIBLE_AFFILIATION),
        })
    }

    pub fn gid(&self) -> &str {
        &self.gid
    }

    pub fn run(
        &mut self,
        mode: Mode,
        targets: &[Target],
        mut progress: Option<&mut dyn Progress>,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        let netids = self.resolve(targets, &mut report);

        if let Some(p) = progress.as_deref_mut() {
            let unresolved = report.entries.len();
            if unresolved > 0 {
                p.log(&format!("{unresolved} name(s) could not be resolved"));
            }
            p.begin(netids.len());
        }
        match mode {
            Mode::Remove => self.remove_all(&netids, &mut report, progress.as_deref_mut()),
            Mode::Add => self.add_all(&netids, &mut report, progress.as_deref_mut())?,
        }
        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }

        logf!("batch on {} (gid {}): {}", self.group, self.gid, report.summary());
        Ok(report)
    }

    /// Netids in input order, deduplicated. Names that don't resolve to exactly
    /// one person are reported and left out.
    fn resolve(&mut self, targets: &[Target], report: &mut BatchReport) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(targets.len());

        for t in targets {
            let netid = match t {
                Target::NetId(n) => n.clone(),
                Target::Name { last, first } => match self.client.search_by_name(last, first) {
                    Ok(Some(n)) => {
                        logf!("resolved {} to {n}", t.label());
                        n
                    }
                    Ok(None) => {
                        logw!("no directory entry for '{}', skipping", t.label());
                        report.push(t.label(), Outcome::Unresolved(s!("no match")));
                        continue;
                    }
                    Err(e) => {
                        logw!("could not resolve '{}': {e}", t.label());
                        report.push(t.label(), Outcome::Unresolved(e.to_string()));
                        continue;
                    }
                },
            };
            if seen.insert(netid.clone()) {
                out.push(netid);
            }
        }
        out
    }

    fn remove_all(
        &mut self,
        netids: &[String],
        report: &mut BatchReport,
        mut progress: Option<&mut (dyn Progress + '_)>,
    ) {
        for netid in netids {
            logf!("removing {netid} from group {} (gid {})", self.group, self.gid);
            let outcome = if self.dry_run {
                match self.client.is_member(&self.gid, netid) {
                    Ok(true) => Outcome::WouldRemove,
                    Ok(false) => Outcome::NotMember,
                    Err(e) => Outcome::Failed(e.to_string()),
                }
            } else {
                match self.client.remove_member(&self.gid, netid) {
                    Ok(RemoveOutcome::Removed) => Outcome::Removed,
                    Ok(RemoveOutcome::NotMember) => Outcome::NotMember,
                    Err(e) => Outcome::Failed(e.to_string()),
                }
            };
            self.note(netid, &outcome);
            report.push(netid.as_str(), outcome);
            if let Some(p) = progress.as_deref_mut() {
                p.item_done(netid);
            }
        }
    }

    fn add_all(
        &mut self,
        netids: &[String],
        report: &mut BatchReport,
        mut progress: Option<&mut (dyn Progress + '_)>,
    ) -> Result<()> {
        // Who was in the group before this run. Also primes the member cache.
        let prior: HashSet<String> = self
            .client
            .list_members(&self.gid)?
            .into_iter()
            .map(|m| m.netid)
            .collect();

        let mut added = Vec::new();
        for netid in netids {
            logf!("adding {netid} to group {} (gid {})", self.group, self.gid);
            let outcome = if self.dry_run {
                match self.client.is_member(&self.gid, netid) {
                    Ok(true) => Outcome::AlreadyMember,
                    Ok(false) => Outcome::WouldAdd,
                    Err(e) => Outcome::Failed(e.to_string()),
                }
            } else {
                match self.client.add_member(&self.gid, netid) {
                    Ok(AddOutcome::Added) => {
                        added.push(netid.clone());
                        Outcome::Added
                    }
                    Ok(AddOutcome::AlreadyMember) => Outcome::AlreadyMember,
                    Err(e) => Outcome::Failed(e.to_string()),
                }
            };
            self.note(netid, &outcome);
            report.push(netid.as_str(), outcome);
            if let Some(p) = progress.as_deref_mut() {
                p.item_done(netid);
            }
        }

        if self.dry_run {
            logf!("dry run: skipping affiliation audit");
            return Ok(());
        }
        if added.is_empty() {
            return Ok(());
        }
        self.audit(&added, &prior, report)
    }

    /// Take back additions whose affiliation isn't eligible. Affiliations come
    /// from this listing only; someone it doesn't show is left alone.
    fn audit(&mut self, added: &[String], prior: &HashSet<String>, report: &mut BatchReport) -> Result<()> {
        let listed: HashMap<String, String> = self
            .client
            .list_members(&self.gid)?
            .into_iter()
            .map(|m| (m.netid, m.affiliation))
            .collect();

        for netid in added {
            if prior.contains(netid) {
                continue;
            }
            let Some(kind) = listed.get(netid).cloned() else {
                logw!("{netid} is not in the refreshed listing of group {}, skipping audit", self.group);
                continue;
            };
            if kind.eq_ignore_ascii_case(&self.eligible) {
                continue;
            }

            logf!("reverting {netid}: affiliation '{kind}' is not {}", self.eligible);
            let outcome = match self.client.remove_member(&self.gid, netid) {
                Ok(RemoveOutcome::Removed) => Outcome::Reverted { affiliation: kind },
                Ok(RemoveOutcome::NotMember) => {
                    logw!("{netid} already gone from group {}, nothing to revert", self.group);
                    continue;
                }
                Err(e) => {
                    loge!("could not revert {netid} from group {}: {e}", self.group);
                    Outcome::Failed(format!("revert failed: {e}"))
                }
            };
            if let Some(entry) = report.entries.iter_mut().find(|e| &e.subject == netid) {
                entry.outcome = outcome;
            }
        }
        Ok(())
    }

    fn note(&self, netid: &str, outcome: &Outcome) {
        match outcome {
            Outcome::WouldAdd => logf!("\tdry run: would add {netid}"),
            Outcome::WouldRemove => logf!("\tdry run: would remove {netid}"),
            Outcome::Failed(e) => loge!("\t{netid}: {e}"),
            other => logd!("\t{netid}: {other:?}"),
        }
    }
}
