// src/input.rs
use std::fs;

use crate::reconcile::Target;

/// `input` is a file of targets (one per line) or, if it can't be read as a
/// file, a single target itself. Blank lines are skipped.
pub fn read_targets(input: &str) -> Vec<Target> {
    match fs::read_to_string(input) {
        Ok(text) => parse_targets(&text),
        Err(_) => Target::parse(input).into_iter().collect(),
    }
}

pub fn parse_targets(text: &str) -> Vec<Target> {
    text.lines().filter_map(Target::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_blanks_and_names() {
        let targets = parse_targets("jdoe\n\n  Doe, Jane  \r\nbroe\n");
        assert_eq!(targets, vec![
            Target::NetId(s!("jdoe")),
            Target::Name { last: s!("Doe"), first: s!("Jane") },
            Target::NetId(s!("broe")),
        ]);
    }

    #[test]
    fn unreadable_path_is_a_single_target() {
        assert_eq!(read_targets("zz9plural"), vec![Target::NetId(s!("zz9plural"))]);
    }

    #[test]
    fn reads_file() {
        let mut p = std::env::temp_dir();
        p.push("fast_cats_targets.txt");
        fs::write(&p, "aaa\nbbb\n").unwrap();
        let targets = read_targets(p.to_str().unwrap());
        assert_eq!(targets.len(), 2);
    }
}
