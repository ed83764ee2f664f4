//! The user's selection set.
//!
//! Every add goes through [`find_conflict`] before committing, so the set
//! never holds two courses sharing a `(day, period)` slot, and course codes
//! stay unique.

use super::conflict::find_conflict;
use super::error::ConflictError;
use crate::catalog::Course;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Number of distinct color tokens.
pub const DEFAULT_PALETTE_SIZE: u8 = 7;

/// Minimum credit total before the timetable is flagged.
pub const DEFAULT_MIN_CREDITS: f64 = 9.0;

/// Index into the renderer's color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorToken(pub u8);

/// A selected course and its color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionEntry {
    pub course: Course,
    pub color: ColorToken,
}

/// Result of a successful toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added(ColorToken),
    Removed,
}

/// Counts reported by a bulk add.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkAddSummary {
    pub added: usize,
    pub skipped: usize,
}

/// Credit total relative to the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreditStatus {
    Empty,
    Sufficient { total: f64 },
    BelowMinimum { total: f64, minimum: f64 },
}

impl CreditStatus {
    /// Returns true if the total warrants a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, CreditStatus::BelowMinimum { .. })
    }

    pub fn total(&self) -> f64 {
        match self {
            CreditStatus::Empty => 0.0,
            CreditStatus::Sufficient { total } | CreditStatus::BelowMinimum { total, .. } => {
                *total
            }
        }
    }
}

/// Ordered, conflict-free set of selected courses.
///
/// Insertion order is display and legend order.
#[derive(Debug, Clone)]
pub struct SelectionSet {
    entries: Vec<SelectionEntry>,
    /// Monotonic for the session; only `clear` resets it
    color_counter: u64,
    palette_size: u8,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::with_palette_size(DEFAULT_PALETTE_SIZE)
    }

    /// Creates an empty set cycling over `palette_size` colors (minimum 1).
    pub fn with_palette_size(palette_size: u8) -> Self {
        Self {
            entries: Vec::new(),
            color_counter: 0,
            palette_size: palette_size.max(1),
        }
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.entries.iter().map(|entry| &entry.course)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|entry| entry.course.code == code)
    }

    pub fn get(&self, code: &str) -> Option<&SelectionEntry> {
        self.entries.iter().find(|entry| entry.course.code == code)
    }

    /// Current value of the color counter.
    pub fn color_counter(&self) -> u64 {
        self.color_counter
    }

    /// Checks whether `candidate` could be added without a conflict.
    pub fn check(&self, candidate: &Course) -> Result<(), ConflictError> {
        match find_conflict(candidate, self.courses()) {
            Some(blocker) => Err(ConflictError {
                candidate: candidate.clone(),
                blocker: blocker.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Removes the course if selected, otherwise adds it.
    ///
    /// Adding fails with [`ConflictError`] when the course overlaps an
    /// existing entry; the set is unchanged in that case.
    pub fn toggle(&mut self, course: &Course) -> Result<Toggled, ConflictError> {
        if self.remove(&course.code) {
            return Ok(Toggled::Removed);
        }

        self.insert(course).map(Toggled::Added)
    }

    /// Adds a course that is not yet selected, after the conflict check.
    fn insert(&mut self, course: &Course) -> Result<ColorToken, ConflictError> {
        self.check(course)?;

        let color = self.next_color();
        self.entries.push(SelectionEntry {
            course: course.clone(),
            color,
        });
        debug!(code = %course.code, color = color.0, "Course selected");
        Ok(color)
    }

    fn next_color(&mut self) -> ColorToken {
        let color = ColorToken((self.color_counter % self.palette_size as u64) as u8);
        self.color_counter += 1;
        color
    }

    /// Removes the entry with the given code. Returns false if not selected.
    pub fn remove(&mut self, code: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.course.code != code);
        self.entries.len() != before
    }

    /// Adds every candidate that is neither selected nor conflicting.
    ///
    /// Conflicts are counted in `skipped` and do not stop the batch;
    /// already-selected codes are ignored silently.
    pub fn bulk_add<'a, I>(&mut self, candidates: I) -> BulkAddSummary
    where
        I: IntoIterator<Item = &'a Course>,
    {
        let mut summary = BulkAddSummary::default();

        for course in candidates {
            if self.contains(&course.code) {
                continue;
            }

            match self.insert(course) {
                Ok(_) => summary.added += 1,
                Err(e) => {
                    debug!(
                        code = %course.code,
                        blocker = %e.blocker.code,
                        "Skipping conflicting course in bulk add"
                    );
                    summary.skipped += 1;
                }
            }
        }

        summary
    }

    /// Removes every entry whose code is in `codes`, keeping the order of
    /// the rest. Returns the number removed.
    pub fn bulk_remove<'a, I>(&mut self, codes: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let codes: HashSet<&str> = codes.into_iter().collect();
        let before = self.entries.len();
        self.entries
            .retain(|entry| !codes.contains(entry.course.code.as_str()));
        before - self.entries.len()
    }

    /// Empties the set and resets the color counter.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.color_counter = 0;
    }

    /// Rebuilds the set from persisted course records.
    ///
    /// Records are trusted as complete courses, but still pass through the
    /// conflict check: duplicates and conflicting records are dropped.
    /// Returns the number of records dropped.
    pub fn restore<I>(&mut self, courses: I) -> usize
    where
        I: IntoIterator<Item = Course>,
    {
        self.clear();
        let mut dropped = 0;

        for course in courses {
            if self.contains(&course.code) {
                warn!(code = %course.code, "Dropping duplicate course from saved selection");
                dropped += 1;
                continue;
            }
            if let Err(e) = self.insert(&course) {
                warn!(
                    code = %course.code,
                    blocker = %e.blocker.code,
                    "Dropping conflicting course from saved selection"
                );
                dropped += 1;
            }
        }

        dropped
    }

    /// Sum of credits over all entries; unparseable values count as zero.
    pub fn total_credits(&self) -> f64 {
        self.courses().map(|course| course.credits.value()).sum()
    }

    pub fn credit_status(&self, minimum: f64) -> CreditStatus {
        let total = self.total_credits();
        if total <= 0.0 {
            CreditStatus::Empty
        } else if total < minimum {
            CreditStatus::BelowMinimum { total, minimum }
        } else {
            CreditStatus::Sufficient { total }
        }
    }
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Credits;
    use crate::schedule::timeslot::course_slots;

    fn course(code: &str, time: &str) -> Course {
        let mut course = Course::new(code, format!("課程{code}"));
        course.class_time = Some(time.to_string());
        course
    }

    fn codes(set: &SelectionSet) -> Vec<&str> {
        set.courses().map(|c| c.code.as_str()).collect()
    }

    fn assert_conflict_free(set: &SelectionSet) {
        let mut seen = HashSet::new();
        for course in set.courses() {
            for slot in course_slots(course) {
                assert!(seen.insert(slot.clone()), "slot {slot} selected twice");
            }
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut set = SelectionSet::new();
        let a = course("A", "13,14");

        assert_eq!(set.toggle(&a).unwrap(), Toggled::Added(ColorToken(0)));
        assert!(set.contains("A"));
        assert_eq!(set.toggle(&a).unwrap(), Toggled::Removed);
        assert!(set.is_empty());
    }

    #[test]
    fn test_toggle_conflict_leaves_set_unchanged() {
        let mut set = SelectionSet::new();
        let a = course("A", "13");
        let b = course("B", "13,25");
        set.toggle(&a).unwrap();

        let err = set.toggle(&b).unwrap_err();
        assert_eq!(err.candidate.code, "B");
        assert_eq!(err.blocker.code, "A");
        assert_eq!(codes(&set), vec!["A"]);
        assert_eq!(set.color_counter(), 1);
    }

    #[test]
    fn test_color_counter_never_reused_after_removal() {
        let mut set = SelectionSet::new();
        set.toggle(&course("A", "11")).unwrap();
        set.toggle(&course("B", "12")).unwrap();
        set.toggle(&course("A", "11")).unwrap();

        let c = set.toggle(&course("C", "13")).unwrap();
        assert_eq!(c, Toggled::Added(ColorToken(2)));
        assert_eq!(set.get("B").unwrap().color, ColorToken(1));
    }

    #[test]
    fn test_color_tokens_wrap_over_palette() {
        let mut set = SelectionSet::with_palette_size(3);
        for (i, code) in ["A", "B", "C", "D"].iter().enumerate() {
            set.toggle(&course(code, &format!("1{}", i + 1))).unwrap();
        }
        let colors: Vec<u8> = set.entries().iter().map(|e| e.color.0).collect();
        assert_eq!(colors, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_bulk_add_skips_conflicts_and_keeps_order() {
        let mut set = SelectionSet::new();
        set.toggle(&course("S", "31")).unwrap();

        let x = course("X", "11");
        let y = course("Y", "31,32");
        let z = course("Z", "21");
        let summary = set.bulk_add([&x, &y, &z]);

        assert_eq!(summary, BulkAddSummary { added: 2, skipped: 1 });
        assert_eq!(codes(&set), vec!["S", "X", "Z"]);
    }

    #[test]
    fn test_bulk_add_ignores_already_selected() {
        let mut set = SelectionSet::new();
        let a = course("A", "11");
        set.toggle(&a).unwrap();

        let summary = set.bulk_add([&a, &course("B", "12")]);
        assert_eq!(summary, BulkAddSummary { added: 1, skipped: 0 });
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_bulk_add_checks_against_courses_added_in_same_batch() {
        let mut set = SelectionSet::new();
        let summary = set.bulk_add([&course("A", "11"), &course("B", "11,12")]);
        assert_eq!(summary, BulkAddSummary { added: 1, skipped: 1 });
        assert_conflict_free(&set);
    }

    #[test]
    fn test_bulk_remove_preserves_order() {
        let mut set = SelectionSet::new();
        set.bulk_add([
            &course("A", "11"),
            &course("B", "12"),
            &course("C", "13"),
            &course("D", "14"),
        ]);

        let removed = set.bulk_remove(["B", "D", "missing"]);
        assert_eq!(removed, 2);
        assert_eq!(codes(&set), vec!["A", "C"]);
        assert_eq!(set.get("C").unwrap().color, ColorToken(2));
    }

    #[test]
    fn test_clear_resets_counter() {
        let mut set = SelectionSet::new();
        set.toggle(&course("A", "11")).unwrap();
        set.toggle(&course("B", "12")).unwrap();
        set.clear();

        assert!(set.is_empty());
        assert_eq!(set.color_counter(), 0);
        assert_eq!(
            set.toggle(&course("C", "13")).unwrap(),
            Toggled::Added(ColorToken(0))
        );
    }

    #[test]
    fn test_total_credits() {
        let mut set = SelectionSet::new();
        assert_eq!(set.total_credits(), 0.0);

        let mut a = course("A", "11");
        a.credits = Credits::from(3.0);
        let mut b = course("B", "12");
        b.credits = Credits::from(2.5);
        let mut c = course("C", "13");
        c.credits = Credits::from("bad");
        set.bulk_add([&a, &b, &c]);

        assert_eq!(set.total_credits(), 5.5);
    }

    #[test]
    fn test_credit_status() {
        let mut set = SelectionSet::new();
        assert_eq!(set.credit_status(9.0), CreditStatus::Empty);

        let mut a = course("A", "11");
        a.credits = Credits::from(3.0);
        set.toggle(&a).unwrap();
        let status = set.credit_status(9.0);
        assert!(status.is_warning());
        assert_eq!(status.total(), 3.0);

        let mut b = course("B", "12");
        b.credits = Credits::from("6");
        set.toggle(&b).unwrap();
        assert_eq!(set.credit_status(9.0), CreditStatus::Sufficient { total: 9.0 });
    }

    #[test]
    fn test_restore_drops_duplicates_and_conflicts() {
        let mut set = SelectionSet::new();
        set.toggle(&course("OLD", "51")).unwrap();

        let dropped = set.restore(vec![
            course("A", "11"),
            course("A", "21"),
            course("B", "11,12"),
            course("C", "22"),
        ]);

        assert_eq!(dropped, 2);
        assert_eq!(codes(&set), vec!["A", "C"]);
        assert_eq!(set.get("C").unwrap().color, ColorToken(1));
        assert_conflict_free(&set);
    }

    #[test]
    fn test_invariant_holds_across_mixed_operations() {
        let mut set = SelectionSet::new();
        let pool = [
            course("A", "11,12"),
            course("B", "12,13"),
            course("C", "21"),
            course("D", "21,31"),
            course("E", "1T,1A"),
            course("F", "11"),
        ];

        for c in &pool {
            let _ = set.toggle(c);
            assert_conflict_free(&set);
        }
        set.bulk_remove(["A"]);
        set.bulk_add(pool.iter());
        assert_conflict_free(&set);
        assert_eq!(codes(&set), vec!["C", "E", "A"]);
    }
}
