use crate::model::page::PageId;

/// Pages visited in this session, oldest first. Never empty; the last entry is the current page.
///
/// Each entry remembers the response revision it was entered at, which the loop guard uses to
/// tell a respondent-driven revisit from a cycle that would replay itself unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<PageId>,
    revisions: Vec<u64>,
}

impl History {
    pub fn new(start: impl Into<PageId>) -> Self {
        Self {
            entries: vec![start.into()],
            revisions: vec![0],
        }
    }

    /// Rebuilds a history from exported entries, all stamped with `revision`. Returns `None`
    /// for an empty list or one with duplicate consecutive entries.
    pub fn from_entries(entries: Vec<PageId>, revision: u64) -> Option<Self> {
        if entries.is_empty() || entries.windows(2).any(|pair| pair[0] == pair[1]) {
            return None;
        }
        let revisions = vec![revision; entries.len()];
        Some(Self { entries, revisions })
    }

    /// Rebuilds a history with one revision stamp per entry. Returns `None` when the lengths
    /// differ or the entries are not a valid history.
    pub fn from_parts(entries: Vec<PageId>, revisions: Vec<u64>) -> Option<Self> {
        if revisions.len() != entries.len() {
            return None;
        }
        let mut history = Self::from_entries(entries, 0)?;
        history.revisions = revisions;
        Some(history)
    }

    pub fn current(&self) -> &str {
        // non-empty by construction
        self.entries.last().map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PageId] {
        &self.entries
    }

    /// Response revision each entry was entered at, parallel to [`History::entries`].
    pub fn revisions(&self) -> &[u64] {
        &self.revisions
    }

    pub fn contains(&self, page_id: &str) -> bool {
        self.entries.iter().any(|entry| entry == page_id)
    }

    /// Appends `page_id` unless it already is the top entry.
    pub fn push(&mut self, page_id: impl Into<PageId>, revision: u64) -> bool {
        let page_id = page_id.into();
        if self.current() == page_id {
            return false;
        }
        self.entries.push(page_id);
        self.revisions.push(revision);
        true
    }

    /// Drops the top entry and returns the new current page, keeping at least one entry.
    pub fn pop(&mut self) -> Option<&str> {
        if self.entries.len() <= 1 {
            return None;
        }
        self.entries.pop();
        self.revisions.pop();
        Some(self.current())
    }

    /// Truncates back to the last occurrence of `page_id`.
    pub fn rewind_to(&mut self, page_id: &str) -> bool {
        match self.entries.iter().rposition(|entry| entry == page_id) {
            Some(index) => {
                self.entries.truncate(index + 1);
                self.revisions.truncate(index + 1);
                true
            }
            None => false,
        }
    }

    /// True when moving to `target` at response `revision` would loop.
    ///
    /// That is a move onto the current page itself, or a move back to the immediately
    /// preceding page that repeats the transition made one step earlier (current -> target)
    /// while no response has changed since `target` was last entered.
    pub fn would_loop(&self, target: &str, revision: u64) -> bool {
        let n = self.entries.len();
        let current = self.current();
        if target == current {
            return true;
        }
        n >= 3
            && self.entries[n - 2] == target
            && self.entries[n - 3] == current
            && self.revisions[n - 2] == revision
    }

    pub fn into_entries(self) -> Vec<PageId> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(entries: &[&str]) -> History {
        History::from_entries(entries.iter().map(|e| e.to_string()).collect(), 0).expect("valid")
    }

    #[test]
    fn push_skips_duplicate_top() {
        let mut h = History::new("p1");
        assert!(h.push("p2", 0));
        assert!(!h.push("p2", 0));
        assert_eq!(h.entries(), ["p1", "p2"]);
    }

    #[test]
    fn pop_keeps_first_entry() {
        let mut h = history(&["p1", "p2"]);
        assert_eq!(h.pop(), Some("p1"));
        assert_eq!(h.pop(), None);
        assert_eq!(h.current(), "p1");
    }

    #[test]
    fn rewind_truncates_to_last_occurrence() {
        let mut h = history(&["p1", "p2", "p1", "p3"]);
        assert!(h.rewind_to("p1"));
        assert_eq!(h.entries(), ["p1", "p2", "p1"]);
        assert!(!h.rewind_to("p9"));
    }

    #[test]
    fn rejects_consecutive_duplicates() {
        assert!(History::from_entries(vec!["a".into(), "a".into()], 0).is_none());
        assert!(History::from_entries(vec![], 0).is_none());
    }

    #[test]
    fn rebuilt_from_parts_keeps_stamps() {
        let h = History::from_parts(vec!["p1".into(), "p2".into()], vec![0, 3]).expect("valid");
        assert_eq!(h.revisions(), [0, 3]);
        assert!(History::from_parts(vec!["p1".into()], vec![0, 1]).is_none());
    }

    #[test]
    fn self_loop_is_always_refused() {
        assert!(history(&["p1"]).would_loop("p1", 0));
    }

    #[test]
    fn loop_guard_allows_single_loop_back() {
        assert!(!history(&["p1", "p2"]).would_loop("p1", 0));
        assert!(!history(&["p0", "p1", "p2"]).would_loop("p1", 0));
    }

    #[test]
    fn repeated_move_without_changes_is_refused() {
        let mut h = History::new("p2");
        h.push("p1", 1);
        h.push("p2", 1);
        assert!(h.would_loop("p1", 1));
        assert!(!h.would_loop("p1", 2));
    }
}
