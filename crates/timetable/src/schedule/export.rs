//! CSV export of the weekly timetable matrix.

use super::error::ExportError;
use super::selection::SelectionSet;
use super::timeslot::{course_slots, Period, DAY_NAMES, MAX_DAY};
use std::collections::HashMap;

/// Suggested download name for the CSV export.
pub const CSV_FILE_NAME: &str = "my_schedule_matrix.csv";

const UTF8_BOM: &str = "\u{feff}";
const CELL_SEPARATOR: &str = "\n---\n";
const UNKNOWN_INSTRUCTOR: &str = "未定";
const UNKNOWN_ROOM: &str = "未知";

/// Renders the selection as a period × weekday matrix.
///
/// The first row holds the weekday labels, the first column the period
/// label with its clock time. Slots whose period is not in the period
/// table are left out. The output starts with a UTF-8 BOM so spreadsheet
/// programs pick the right encoding.
pub fn timetable_csv(selection: &SelectionSet) -> Result<String, ExportError> {
    if selection.is_empty() {
        return Err(ExportError::EmptySchedule);
    }

    let mut cells: HashMap<(usize, u8), String> = HashMap::new();
    for course in selection.courses() {
        let content = format!(
            "{}\n({}/{})",
            course.name_local,
            course
                .instructor
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(UNKNOWN_INSTRUCTOR),
            course
                .room
                .as_deref()
                .filter(|room| !room.is_empty())
                .unwrap_or(UNKNOWN_ROOM),
        );

        for slot in course_slots(course) {
            let Some(row) = slot.period.order() else {
                continue;
            };
            cells
                .entry((row, slot.day))
                .and_modify(|cell| {
                    cell.push_str(CELL_SEPARATOR);
                    cell.push_str(&content);
                })
                .or_insert_with(|| content.clone());
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(DAY_NAMES)?;
    for (row, period) in Period::all().enumerate() {
        let mut record = Vec::with_capacity(DAY_NAMES.len());
        record.push(period_label(&period));
        for day in 1..=MAX_DAY {
            record.push(cells.get(&(row, day)).cloned().unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    let body = String::from_utf8(bytes).map_err(|e| ExportError::Buffer(e.to_string()))?;
    Ok(format!("{UTF8_BOM}{body}"))
}

fn period_label(period: &Period) -> String {
    format!("第{period}節 ({})", period.clock_time().unwrap_or_default())
}
