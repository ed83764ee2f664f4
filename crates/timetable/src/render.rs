//! Views handed to the renderer, and the renderer capability contract.

use crate::catalog::{Course, Grade};
use crate::schedule::{
    course_slots, extract_time_encoding, ColorToken, CreditStatus, Period, SelectionSet,
};
use serde::Serialize;

/// What a front end implements to draw the planner.
pub trait Renderer {
    /// Draws the filtered course list.
    fn render_list(&mut self, list: &CourseListView);

    /// Draws the weekly grid, legend and credit summary.
    fn render_grid(&mut self, grid: &TimetableView);

    /// Tells the user a course could not be added.
    fn on_conflict(&mut self, candidate: &Course, blocker: &Course);
}

/// One row of the filtered course list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseCard {
    pub code: String,
    pub name: String,
    pub name_foreign: String,
    pub category: String,
    pub required: bool,
    pub credits: f64,
    /// Best-effort guess from the offering unit
    pub grade: Option<Grade>,
    pub instructor: Option<String>,
    pub room: Option<String>,
    /// Validated time encoding, empty if the course has none
    pub time: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CourseListView {
    pub count: usize,
    /// True if the list came from a whole-catalog search
    pub search: bool,
    pub courses: Vec<CourseCard>,
}

impl CourseListView {
    pub fn build(courses: &[&Course], selection: &SelectionSet, search: bool) -> Self {
        let courses: Vec<CourseCard> = courses
            .iter()
            .map(|course| CourseCard {
                code: course.code.clone(),
                name: course.name_local.clone(),
                name_foreign: course.name_foreign.clone(),
                category: course.category.clone(),
                required: course.category.contains("必修"),
                credits: course.credits.value(),
                grade: Grade::infer(course.offering_unit()),
                instructor: course.instructor.clone().filter(|name| !name.is_empty()),
                room: course.primary_room().map(str::to_string),
                time: extract_time_encoding(course).to_string(),
                selected: selection.contains(&course.code),
            })
            .collect();

        Self {
            count: courses.len(),
            search,
            courses,
        }
    }
}

/// One course occupying one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub day: u8,
    pub period: Period,
    pub clock_time: Option<&'static str>,
    pub code: String,
    pub name: String,
    pub instructor: Option<String>,
    pub room: Option<String>,
    pub color: ColorToken,
}

/// A legend line, in selection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub code: String,
    pub name: String,
    pub credits: f64,
    pub color: ColorToken,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimetableView {
    pub cells: Vec<GridCell>,
    pub legend: Vec<LegendEntry>,
    pub credits: CreditStatus,
}

impl TimetableView {
    pub fn build(selection: &SelectionSet, min_credits: f64) -> Self {
        let mut cells = Vec::new();
        let mut legend = Vec::with_capacity(selection.len());

        for entry in selection.entries() {
            let course = &entry.course;
            for slot in course_slots(course) {
                cells.push(GridCell {
                    day: slot.day,
                    clock_time: slot.period.clock_time(),
                    period: slot.period,
                    code: course.code.clone(),
                    name: course.name_local.clone(),
                    instructor: course.instructor.clone().filter(|name| !name.is_empty()),
                    room: course.primary_room().map(str::to_string),
                    color: entry.color,
                });
            }
            legend.push(LegendEntry {
                code: course.code.clone(),
                name: course.name_local.clone(),
                credits: course.credits.value(),
                color: entry.color,
            });
        }

        Self {
            cells,
            legend,
            credits: selection.credit_status(min_credits),
        }
    }

    pub fn empty() -> Self {
        Self {
            cells: Vec::new(),
            legend: Vec::new(),
            credits: CreditStatus::Empty,
        }
    }
}

/// The last conflict reported to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictNotice {
    pub candidate: String,
    pub candidate_name: String,
    pub blocker: String,
    pub blocker_name: String,
}

/// Renderer that keeps the most recent views, for front ends that poll.
#[derive(Debug, Clone)]
pub struct ViewRenderer {
    list: CourseListView,
    grid: TimetableView,
    last_conflict: Option<ConflictNotice>,
}

impl ViewRenderer {
    pub fn new() -> Self {
        Self {
            list: CourseListView::default(),
            grid: TimetableView::empty(),
            last_conflict: None,
        }
    }

    pub fn list(&self) -> &CourseListView {
        &self.list
    }

    pub fn grid(&self) -> &TimetableView {
        &self.grid
    }

    pub fn last_conflict(&self) -> Option<&ConflictNotice> {
        self.last_conflict.as_ref()
    }
}

impl Default for ViewRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for ViewRenderer {
    fn render_list(&mut self, list: &CourseListView) {
        self.list = list.clone();
    }

    fn render_grid(&mut self, grid: &TimetableView) {
        self.grid = grid.clone();
        self.last_conflict = None;
    }

    fn on_conflict(&mut self, candidate: &Course, blocker: &Course) {
        self.last_conflict = Some(ConflictNotice {
            candidate: candidate.code.clone(),
            candidate_name: candidate.name_local.clone(),
            blocker: blocker.code.clone(),
            blocker_name: blocker.name_local.clone(),
        });
    }
}
