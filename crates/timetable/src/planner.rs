//! The planner controller.
//!
//! Owns the catalog, the selection set, the snapshot store and the renderer.
//! Every mutation is check-then-commit, then persisted and re-rendered.

use crate::catalog::{self, Catalog, FilterCriteria};
use crate::db::KeyValueStore;
use crate::render::{CourseListView, Renderer, TimetableView};
use crate::schedule::selection::{DEFAULT_MIN_CREDITS, DEFAULT_PALETTE_SIZE};
use crate::schedule::{
    timetable_csv, BulkAddSummary, ConflictError, CreditStatus, ExportError, SelectionSet,
    SnapshotStore, Toggled,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors returned by planner operations.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// The code is neither selected nor in the catalog
    #[error("Unknown course code: {0}")]
    UnknownCourse(String),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

pub struct Planner<S, R> {
    catalog: Catalog,
    selection: SelectionSet,
    snapshots: SnapshotStore<S>,
    renderer: R,
    criteria: FilterCriteria,
    /// Codes of the current filter result, in catalog order
    filtered: Vec<String>,
    min_credits: f64,
}

impl<S: KeyValueStore, R: Renderer> Planner<S, R> {
    pub fn new(catalog: Catalog, store: S, renderer: R) -> Self {
        Self {
            catalog,
            selection: SelectionSet::with_palette_size(DEFAULT_PALETTE_SIZE),
            snapshots: SnapshotStore::new(store),
            renderer,
            criteria: FilterCriteria::default(),
            filtered: Vec::new(),
            min_credits: DEFAULT_MIN_CREDITS,
        }
    }

    /// Sets the credit warning threshold and the color palette size.
    ///
    /// Call before `restore`; changing the palette empties the selection.
    pub fn with_limits(mut self, min_credits: f64, palette_size: u8) -> Self {
        self.min_credits = min_credits;
        self.selection = SelectionSet::with_palette_size(palette_size);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn min_credits(&self) -> f64 {
        self.min_credits
    }

    /// Replaces the catalog (e.g. once a deferred load finishes) and
    /// re-applies the current filter.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        let criteria = self.criteria.clone();
        self.apply_filter(criteria);
    }

    /// Restores the saved selection and renders it.
    ///
    /// Saved records are not re-looked-up in the catalog. Returns the
    /// number of courses restored.
    pub fn restore(&mut self) -> usize {
        let Some(courses) = self.snapshots.load() else {
            self.render_grid();
            return 0;
        };

        let dropped = self.selection.restore(courses);
        if dropped > 0 {
            warn!(dropped, "Saved selection contained conflicting or duplicate courses");
            self.persist();
        }

        info!(count = self.selection.len(), "Restored saved selection");
        self.render_grid();
        self.selection.len()
    }

    /// Filters the catalog and renders the resulting course list.
    pub fn apply_filter(&mut self, criteria: FilterCriteria) -> CourseListView {
        let matches = catalog::filter(self.catalog.courses(), &criteria);
        self.filtered = matches.iter().map(|course| course.code.clone()).collect();

        let view = CourseListView::build(&matches, &self.selection, criteria.is_search());
        self.criteria = criteria;
        self.renderer.render_list(&view);
        view
    }

    /// Selects or deselects a course.
    ///
    /// A selected course is removed even if it is no longer in the catalog.
    /// Adding a conflicting course reports the conflict to the renderer and
    /// returns [`PlannerError::Conflict`] with the selection unchanged.
    pub fn toggle(&mut self, code: &str) -> Result<Toggled, PlannerError> {
        if self.selection.remove(code) {
            info!(code = %code, "Course deselected");
            self.after_mutation();
            return Ok(Toggled::Removed);
        }

        let course = self
            .catalog
            .get(code)
            .ok_or_else(|| PlannerError::UnknownCourse(code.to_string()))?;

        match self.selection.toggle(course) {
            Ok(toggled) => {
                info!(code = %code, "Course selected");
                self.after_mutation();
                Ok(toggled)
            }
            Err(conflict) => {
                info!(
                    code = %code,
                    blocker = %conflict.blocker.code,
                    "Course conflicts with current selection"
                );
                self.renderer
                    .on_conflict(&conflict.candidate, &conflict.blocker);
                Err(conflict.into())
            }
        }
    }

    /// Adds every course of the current filter result that fits.
    pub fn select_all_filtered(&mut self) -> BulkAddSummary {
        let candidates = self
            .filtered
            .iter()
            .filter_map(|code| self.catalog.get(code));
        let summary = self.selection.bulk_add(candidates);

        info!(
            added = summary.added,
            skipped = summary.skipped,
            "Selected all filtered courses"
        );
        self.after_mutation();
        summary
    }

    /// Removes every course of the current filter result from the selection.
    pub fn deselect_all_filtered(&mut self) -> usize {
        let removed = self
            .selection
            .bulk_remove(self.filtered.iter().map(String::as_str));

        info!(removed, "Deselected all filtered courses");
        self.after_mutation();
        removed
    }

    /// Empties the selection and resets color assignment.
    pub fn clear(&mut self) {
        self.selection.clear();
        info!("Selection cleared");
        self.after_mutation();
    }

    pub fn total_credits(&self) -> f64 {
        self.selection.total_credits()
    }

    pub fn credit_status(&self) -> CreditStatus {
        self.selection.credit_status(self.min_credits)
    }

    pub fn timetable(&self) -> TimetableView {
        TimetableView::build(&self.selection, self.min_credits)
    }

    pub fn export_csv(&self) -> Result<String, ExportError> {
        timetable_csv(&self.selection)
    }

    /// Time the selection was last written to the store.
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.snapshots.last_saved()
    }

    fn after_mutation(&mut self) {
        self.persist();
        self.render_grid();

        let matches: Vec<_> = self
            .filtered
            .iter()
            .filter_map(|code| self.catalog.get(code))
            .collect();
        let list = CourseListView::build(&matches, &self.selection, self.criteria.is_search());
        self.renderer.render_list(&list);
    }

    /// Writes the snapshot. A failed write is logged; the in-memory
    /// selection stays authoritative for the session.
    fn persist(&self) {
        if let Err(e) = self.snapshots.save(self.selection.courses()) {
            error!(error = %e, "Failed to save selection");
        }
    }

    fn render_grid(&mut self) {
        let grid = self.timetable();
        self.renderer.render_grid(&grid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Course, Credits};
    use crate::db::MemoryStore;
    use crate::render::ViewRenderer;
    use crate::schedule::SNAPSHOT_KEY;

    fn course(code: &str, department: &str, time: &str, credits: f64) -> Course {
        let mut course = Course::new(code, format!("課程{code}"));
        course.department = department.to_string();
        course.class_time = Some(time.to_string());
        course.credits = Credits::from(credits);
        course
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            course("X", "數學系數學組", "11,12", 3.0),
            course("Y", "數學系數學組", "31,32", 3.0),
            course("Z", "數學系數學組", "41", 2.0),
            course("S", "英語學系", "31", 2.0),
        ])
    }

    fn planner() -> Planner<MemoryStore, ViewRenderer> {
        Planner::new(catalog(), MemoryStore::new(), ViewRenderer::new())
    }

    fn selected_codes<S: KeyValueStore, R: Renderer>(planner: &Planner<S, R>) -> Vec<String> {
        planner
            .selection()
            .courses()
            .map(|c| c.code.clone())
            .collect()
    }

    #[test]
    fn test_toggle_persists_and_renders() {
        let mut planner = planner();
        planner.toggle("X").unwrap();

        assert_eq!(planner.renderer().grid().legend.len(), 1);
        let saved = planner.snapshots.load().unwrap();
        assert_eq!(saved[0].code, "X");
        assert!(planner.last_saved().is_some());

        planner.toggle("X").unwrap();
        assert!(planner.selection().is_empty());
        assert_eq!(planner.snapshots.load(), Some(Vec::new()));
    }

    #[test]
    fn test_toggle_conflict_notifies_renderer() {
        let mut planner = planner();
        planner.toggle("S").unwrap();

        let err = planner.toggle("Y").unwrap_err();
        assert!(matches!(err, PlannerError::Conflict(ref c) if c.blocker.code == "S"));
        assert_eq!(planner.renderer().last_conflict().unwrap().candidate, "Y");
        assert_eq!(selected_codes(&planner), vec!["S"]);
    }

    #[test]
    fn test_toggle_unknown_code() {
        let mut planner = planner();
        assert!(matches!(
            planner.toggle("NOPE"),
            Err(PlannerError::UnknownCourse(code)) if code == "NOPE"
        ));
    }

    #[test]
    fn test_select_all_filtered_reports_summary() {
        let mut planner = planner();
        planner.toggle("S").unwrap();
        planner.apply_filter(FilterCriteria::department("數學系數學組"));

        let summary = planner.select_all_filtered();
        assert_eq!(summary, BulkAddSummary { added: 2, skipped: 1 });
        assert_eq!(selected_codes(&planner), vec!["S", "X", "Z"]);

        let list = planner.renderer().list();
        let selected: Vec<bool> = list.courses.iter().map(|c| c.selected).collect();
        assert_eq!(selected, vec![true, false, true]);
    }

    #[test]
    fn test_deselect_all_filtered_keeps_other_courses() {
        let mut planner = planner();
        planner.toggle("S").unwrap();
        planner.apply_filter(FilterCriteria::department("數學系數學組"));
        planner.select_all_filtered();

        assert_eq!(planner.deselect_all_filtered(), 2);
        assert_eq!(selected_codes(&planner), vec!["S"]);
    }

    #[test]
    fn test_clear_resets_colors_and_snapshot() {
        let mut planner = planner();
        planner.toggle("X").unwrap();
        planner.toggle("Z").unwrap();
        planner.clear();

        assert!(planner.selection().is_empty());
        assert_eq!(planner.selection().color_counter(), 0);
        assert_eq!(planner.credit_status(), CreditStatus::Empty);
        assert_eq!(planner.snapshots.load(), Some(Vec::new()));
    }

    #[test]
    fn test_restore_from_snapshot_without_catalog() {
        let saved = serde_json::to_string(&vec![
            course("OLD", "已停開", "51", 2.0),
            course("X", "數學系數學組", "11", 3.0),
        ])
        .unwrap();
        let store = MemoryStore::with_value(SNAPSHOT_KEY, &saved);
        let mut planner = Planner::new(Catalog::empty(), store, ViewRenderer::new());

        assert_eq!(planner.restore(), 2);
        assert_eq!(selected_codes(&planner), vec!["OLD", "X"]);
        assert_eq!(planner.total_credits(), 5.0);

        // stale courses can still be removed
        planner.toggle("OLD").unwrap();
        assert_eq!(selected_codes(&planner), vec!["X"]);
    }

    #[test]
    fn test_restore_corrupt_snapshot() {
        let store = MemoryStore::with_value(SNAPSHOT_KEY, "\"not a list\"");
        let mut planner = Planner::new(catalog(), store, ViewRenderer::new());

        assert_eq!(planner.restore(), 0);
        assert!(planner.snapshots.store().get(SNAPSHOT_KEY).unwrap().is_none());
    }

    #[test]
    fn test_set_catalog_reapplies_filter() {
        let mut planner = Planner::new(Catalog::empty(), MemoryStore::new(), ViewRenderer::new());
        let view = planner.apply_filter(FilterCriteria::search("課程"));
        assert_eq!(view.count, 0);

        planner.set_catalog(catalog());
        assert_eq!(planner.renderer().list().count, 4);
        assert!(planner.renderer().list().search);
    }

    #[test]
    fn test_credit_warning_threshold() {
        let mut planner = planner().with_limits(5.0, 7);
        planner.toggle("Z").unwrap();
        assert!(planner.credit_status().is_warning());
        planner.toggle("X").unwrap();
        assert!(!planner.credit_status().is_warning());
    }
}
