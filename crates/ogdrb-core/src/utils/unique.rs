use std::collections::{HashMap, HashSet};

use super::format::truncate_chars;

/// Renames repeated names so every emitted name is distinct.
///
/// Built from the full list of names up front. A name that occurs once is
/// returned as is, as is the first occurrence of a repeated name. Each later
/// occurrence gets the smallest counter `n >= 1` for which the base, cut
/// short to leave room for the digits, followed by `n` is neither one of the
/// original names nor something already emitted.
#[derive(Debug)]
pub struct MakeUnique {
    max_chars: usize,
    counts: HashMap<String, usize>,
    emitted: HashSet<String>,
}

impl MakeUnique {
    pub fn new<I, S>(names: I, max_chars: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts = HashMap::new();
        for name in names {
            *counts.entry(name.into()).or_insert(0) += 1;
        }
        Self {
            max_chars,
            counts,
            emitted: HashSet::new(),
        }
    }

    pub fn make(&mut self, name: &str) -> String {
        if !self.emitted.contains(name) {
            self.emitted.insert(name.to_string());
            return name.to_string();
        }

        let mut n: usize = 1;
        loop {
            let suffix = n.to_string();
            let keep = self.max_chars.saturating_sub(suffix.len());
            let candidate = format!("{}{}", truncate_chars(name, keep), suffix);
            if !self.counts.contains_key(&candidate) && !self.emitted.contains(&candidate) {
                self.emitted.insert(candidate.clone());
                return candidate;
            }
            n += 1;
        }
    }
}
