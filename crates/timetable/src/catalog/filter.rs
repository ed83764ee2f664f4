/// Catalog filtering: program level, department, grade, category and free-text search
use super::types::Course;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Coarse classification of a department string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramLevel {
    /// 大學部
    Undergraduate,
    /// 碩士班
    Master,
    /// 博士班
    Doctoral,
    /// 通識 (including campus physical education and military training)
    GeneralEducation,
    /// 學院 (college-wide courses)
    College,
    /// 學程 / 專長
    ProgramTrack,
}

impl ProgramLevel {
    /// Tests a department string against this level's substring rules.
    ///
    /// The physical education department (體育學系) is undergraduate, while
    /// campus physical education entries such as 體育（和平校區） are general
    /// education.
    pub fn matches(&self, department: &str) -> bool {
        let d = department;
        match self {
            ProgramLevel::Undergraduate => {
                !d.contains("碩士")
                    && !d.contains("博士")
                    && !d.contains("通識")
                    && !d.contains("軍訓")
                    && (!d.contains("體育") || d.contains("體育學系"))
                    && !d.contains("學程")
                    && !d.contains("專長")
                    && !d.contains("學院課程")
            }
            ProgramLevel::Master => d.contains("碩士"),
            ProgramLevel::Doctoral => d.contains("博士"),
            ProgramLevel::GeneralEducation => {
                d.contains("通識")
                    || (d.contains("體育") && !d.contains("體育學系"))
                    || d.contains("軍訓")
            }
            ProgramLevel::College => d.contains("學院課程"),
            ProgramLevel::ProgramTrack => d.contains("學程") || d.contains("專長"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProgramLevel::Undergraduate => "大學部",
            ProgramLevel::Master => "碩士班",
            ProgramLevel::Doctoral => "博士班",
            ProgramLevel::GeneralEducation => "通識",
            ProgramLevel::College => "學院",
            ProgramLevel::ProgramTrack => "學程",
        }
    }
}

impl FromStr for ProgramLevel {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "undergraduate" | "大學部" => Ok(ProgramLevel::Undergraduate),
            "master" | "碩士班" => Ok(ProgramLevel::Master),
            "doctoral" | "博士班" => Ok(ProgramLevel::Doctoral),
            "general_education" | "通識" => Ok(ProgramLevel::GeneralEducation),
            "college" | "學院" => Ok(ProgramLevel::College),
            "program_track" | "學程" => Ok(ProgramLevel::ProgramTrack),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

/// Grade level inferred from the offering unit text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    #[serde(rename = "一")]
    First,
    #[serde(rename = "二")]
    Second,
    #[serde(rename = "三")]
    Third,
    #[serde(rename = "四")]
    Fourth,
    #[serde(rename = "五")]
    Fifth,
    #[serde(rename = "六")]
    Sixth,
}

impl Grade {
    pub const ALL: [Grade; 6] = [
        Grade::First,
        Grade::Second,
        Grade::Third,
        Grade::Fourth,
        Grade::Fifth,
        Grade::Sixth,
    ];

    /// The token searched for in the offering unit.
    pub fn token(&self) -> &'static str {
        match self {
            Grade::First => "一",
            Grade::Second => "二",
            Grade::Third => "三",
            Grade::Fourth => "四",
            Grade::Fifth => "五",
            Grade::Sixth => "六",
        }
    }

    pub fn label(&self) -> String {
        format!("{}年級", self.token())
    }

    /// Best-effort substring test; source data quality is the limit.
    pub fn matches(&self, offering_unit: &str) -> bool {
        offering_unit.contains(self.token())
    }

    /// The lowest grade whose token appears in the offering unit.
    pub fn infer(offering_unit: &str) -> Option<Grade> {
        Grade::ALL.into_iter().find(|grade| grade.matches(offering_unit))
    }
}

impl FromStr for Grade {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::ALL
            .into_iter()
            .enumerate()
            .find(|(i, grade)| s == grade.token() || s == (i + 1).to_string())
            .map(|(_, grade)| grade)
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

/// A criterion value that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue(pub String);

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownValue {}

/// Treats missing or blank values as `None`, otherwise parses with `FromStr`.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

/// Structured criteria for narrowing the catalog.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    #[serde(rename = "level", deserialize_with = "empty_as_none")]
    pub program_level: Option<ProgramLevel>,

    /// Exact department match; ignored while `search` is non-empty
    #[serde(deserialize_with = "empty_string_as_none")]
    pub department: Option<String>,

    #[serde(deserialize_with = "empty_as_none")]
    pub grade: Option<Grade>,

    /// Substring of the course category
    #[serde(deserialize_with = "empty_string_as_none")]
    pub category: Option<String>,

    /// Case-insensitive substring over names, instructor and code
    pub search: String,
}

impl FilterCriteria {
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search: query.into(),
            ..Self::default()
        }
    }

    pub fn department(department: impl Into<String>) -> Self {
        Self {
            department: Some(department.into()),
            ..Self::default()
        }
    }

    /// Normalized search text, or `None` when not searching.
    fn search_text(&self) -> Option<String> {
        let text = self.search.trim().to_lowercase();
        (!text.is_empty()).then_some(text)
    }

    /// Returns true if the filter searches the whole catalog.
    pub fn is_search(&self) -> bool {
        self.search_text().is_some()
    }
}

/// Narrows the catalog to the candidate list, in catalog order.
///
/// With a search term the whole catalog is searched and `department` is
/// ignored, while program level and category still apply. Without one, a
/// department is required: no department yields an empty list.
pub fn filter<'a>(catalog: &'a [Course], criteria: &FilterCriteria) -> Vec<&'a Course> {
    if let Some(search) = criteria.search_text() {
        return catalog
            .iter()
            .filter(|course| matches_search(course, &search))
            .filter(|course| {
                criteria
                    .program_level
                    .map_or(true, |level| level.matches(&course.department))
            })
            .filter(|course| matches_category(course, criteria.category.as_deref()))
            .collect();
    }

    let Some(department) = criteria.department.as_deref() else {
        return Vec::new();
    };

    catalog
        .iter()
        .filter(|course| course.department == department)
        .filter(|course| {
            criteria
                .grade
                .map_or(true, |grade| grade.matches(course.offering_unit()))
        })
        .filter(|course| matches_category(course, criteria.category.as_deref()))
        .collect()
}

fn matches_search(course: &Course, search: &str) -> bool {
    [
        course.name_local.as_str(),
        course.name_foreign.as_str(),
        course.instructor_name(),
        course.code.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(search))
}

fn matches_category(course: &Course, category: Option<&str>) -> bool {
    category.map_or(true, |category| course.category.contains(category))
}

/// Grades that appear in the offering units of the (level-filtered) catalog.
pub fn available_grades(catalog: &[Course], level: Option<ProgramLevel>) -> Vec<Grade> {
    let found: BTreeSet<Grade> = catalog
        .iter()
        .filter(|course| level.map_or(true, |level| level.matches(&course.department)))
        .flat_map(|course| {
            Grade::ALL
                .into_iter()
                .filter(|grade| grade.matches(course.offering_unit()))
        })
        .collect();
    found.into_iter().collect()
}
