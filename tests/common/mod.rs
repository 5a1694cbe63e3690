// tests/common/mod.rs
//
// A scripted stand-in for the groups web app. It renders the same markup the
// real pages use and applies add/delete POSTs to its own state.
//
#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::Once;

use fast_cats::config::consts::*;
use fast_cats::{Response, Result, Transport};

#[derive(Clone)]
pub struct Person {
    pub first: String,
    pub last: String,
    pub department: String,
    pub affiliation: String,
}

#[derive(Default)]
pub struct FakeCats {
    pub groups: Vec<(String, String)>,
    /// gid → netids, in insertion order
    pub members: BTreeMap<String, Vec<String>>,
    pub people: BTreeMap<String, Person>,
    /// Every path POSTed, in order.
    pub calls: Vec<String>,
    /// netids whose add/delete answers 500
    pub failing: HashSet<String>,
    /// Answer adds with 200 but never apply them.
    pub drop_adds: bool,
}

impl FakeCats {
    pub fn new() -> Self {
        quiet_log();
        Self::default()
    }

    pub fn group(mut self, gid: &str, name: &str) -> Self {
        self.groups.push((gid.into(), name.into()));
        self.members.entry(gid.into()).or_default();
        self
    }

    pub fn person(mut self, netid: &str, first: &str, last: &str, affiliation: &str) -> Self {
        self.people.insert(netid.into(), Person {
            first: first.into(),
            last: last.into(),
            department: "Computer Science".into(),
            affiliation: affiliation.into(),
        });
        self
    }

    pub fn member(mut self, gid: &str, netid: &str) -> Self {
        self.members.entry(gid.into()).or_default().push(netid.into());
        self
    }

    pub fn failing(mut self, netid: &str) -> Self {
        self.failing.insert(netid.into());
        self
    }

    pub fn dropping_adds(mut self) -> Self {
        self.drop_adds = true;
        self
    }

    pub fn members_of(&self, gid: &str) -> Vec<String> {
        self.members.get(gid).cloned().unwrap_or_default()
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn mutating_calls(&self) -> usize {
        self.calls_to(ADD_MEMBER_PATH) + self.calls_to(DEL_MEMBER_PATH)
    }

    fn groups_page(&self) -> String {
        let mut html = String::from("<table class=\"groups\">\n");
        for (gid, name) in &self.groups {
            html.push_str(&format!(
                "  <tr id=\"{gid}\">\n    <td class=\"group-name\">{name}</td>\n    <td class=\"owner\">me</td>\n  </tr>\n"
            ));
        }
        html.push_str("</table>\n");
        html
    }

    fn members_page(&self, gid: &str) -> String {
        let mut html = String::from("<table class=\"members\">\n");
        // People the directory doesn't know are in the group but not listed.
        let listed = self.members_of(gid).into_iter().filter_map(|n| self.people.get(&n).map(|p| (n, p)));
        for (i, (netid, p)) in listed.enumerate() {
            html.push_str(&format!(
                "<tr id=\"m{i}\">\n<td>{}</td>\n<td>{}</td>\n<td>{}</td>\n<td>{}</td>\n<td>{netid}</td>\n<td class=\"actions\"><a href=\"#\">x</a></td>\n</tr>\n",
                p.first, p.last, p.department, p.affiliation
            ));
        }
        html.push_str("</table>\n");
        html
    }

    fn search_payload(&self, lname: &str) -> String {
        let hits: Vec<String> = self
            .people
            .iter()
            .filter(|(_, p)| p.last.eq_ignore_ascii_case(lname))
            .map(|(netid, p)| format!("\"{}, {} ({netid}, {})\"", p.last, p.first, p.department))
            .collect();
        format!("[{}]", hits.join(","))
    }

    fn mutate(&mut self, rest: &str, add: bool) -> Response {
        let (gid, netid) = rest.trim_start_matches('/').split_once('/').unwrap();
        if self.failing.contains(netid) {
            return Response { status: 500, text: "error".into() };
        }
        if add && self.drop_adds {
            return Response { status: 200, text: "ok".into() };
        }
        let list = self.members.entry(gid.into()).or_default();
        if add {
            if !list.iter().any(|n| n == netid) {
                list.push(netid.into());
            }
        } else {
            list.retain(|n| n != netid);
        }
        Response { status: 200, text: "ok".into() }
    }
}

impl Transport for FakeCats {
    fn post(&mut self, path: &str) -> Result<Response> {
        self.calls.push(path.to_string());
        let ok = |text: String| Ok(Response { status: 200, text });

        if path == GROUPS_PATH {
            return ok(self.groups_page());
        }
        if let Some(rest) = path.strip_prefix(ADD_MEMBER_PATH) {
            return Ok(self.mutate(rest, true));
        }
        if let Some(rest) = path.strip_prefix(DEL_MEMBER_PATH) {
            return Ok(self.mutate(rest, false));
        }
        if let Some(gid) = path.strip_prefix(&format!("{MEMBERS_PATH}/")) {
            return ok(self.members_page(gid));
        }
        Ok(Response { status: 404, text: String::new() })
    }

    fn post_form(&mut self, path: &str, form: &[(&str, &str)]) -> Result<Response> {
        self.calls.push(path.to_string());
        if path == SEARCH_PATH {
            let lname = form.iter().find(|(k, _)| *k == "lname").map(|(_, v)| *v).unwrap_or("");
            return Ok(Response { status: 200, text: self.search_payload(lname) });
        }
        Ok(Response { status: 404, text: String::new() })
    }
}

/// Keep test runs out of the working directory's log.
pub fn quiet_log() {
    static INIT: Once = Once::new();
    INIT.call_once(|| fast_cats::log::init(std::env::temp_dir().join("fast_cats_tests.log")));
}

/// The HPC group from the docs: aaa (student) and bbb (staff) are members.
pub fn hpc() -> FakeCats {
    FakeCats::new()
        .group("101", "HPC")
        .group("202", "Physics")
        .person("aaa", "Ann", "Able", "student")
        .person("bbb", "Bob", "Baker", "staff")
        .person("ccc", "Cal", "Cole", "staff")
        .person("ddd", "Dee", "Dunn", "student")
        .person("jdoe", "Jane", "Doe", "student")
        .person("jdoe2", "Jane", "Doe", "faculty")
        .person("jroe", "John", "Roe", "student")
        .member("101", "aaa")
        .member("101", "bbb")
}
