//! Time conflict detection between a candidate and the current selection.

use super::timeslot::{course_slots, TimeSlot};
use crate::catalog::Course;

/// Returns true if any slot appears in both sequences.
pub fn slots_overlap(a: &[TimeSlot], b: &[TimeSlot]) -> bool {
    a.iter().any(|slot| b.contains(slot))
}

/// Finds the first selected course (in selection order) sharing a slot
/// with `candidate`.
pub fn find_conflict<'a, I>(candidate: &Course, selected: I) -> Option<&'a Course>
where
    I: IntoIterator<Item = &'a Course>,
{
    let candidate_slots = course_slots(candidate);
    if candidate_slots.is_empty() {
        return None;
    }

    selected
        .into_iter()
        .find(|existing| slots_overlap(&candidate_slots, &course_slots(existing)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str, time: &str) -> Course {
        let mut course = Course::new(code, code);
        course.class_time = Some(time.to_string());
        course
    }

    #[test]
    fn test_overlapping_slot_reports_blocker() {
        let a = course("A", "13");
        let b = course("B", "13,25");
        let selected = vec![a.clone()];
        assert_eq!(find_conflict(&b, &selected), Some(&a));
    }

    #[test]
    fn test_no_overlap() {
        let selected = vec![course("A", "13,14"), course("B", "21")];
        assert_eq!(find_conflict(&course("C", "15,22"), &selected), None);
    }

    #[test]
    fn test_first_conflict_in_selection_order() {
        let selected = vec![course("A", "31"), course("B", "13"), course("C", "14")];
        let candidate = course("D", "14,13");
        assert_eq!(find_conflict(&candidate, &selected).map(|c| c.code.as_str()), Some("B"));
    }

    #[test]
    fn test_same_day_different_period_token() {
        let selected = vec![course("A", "1T")];
        assert_eq!(find_conflict(&course("B", "11"), &selected), None);
        assert!(find_conflict(&course("C", "1T"), &selected).is_some());
    }

    #[test]
    fn test_course_without_slots_never_conflicts() {
        let selected = vec![course("A", "13")];
        let mut candidate = course("B", "");
        candidate.class_time = None;
        assert_eq!(find_conflict(&candidate, &selected), None);
    }

    #[test]
    fn test_empty_selection() {
        let selected: Vec<Course> = Vec::new();
        assert_eq!(find_conflict(&course("A", "13"), &selected), None);
    }
}
