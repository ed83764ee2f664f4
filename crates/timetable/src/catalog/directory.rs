//! Department directory grouped by college.
//!
//! Departments are classified by an explicit table first, then by
//! prefix keywords for departments the table does not list yet.

use super::filter::ProgramLevel;
use super::types::Course;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

/// College a department belongs to, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum College {
    Liberal,
    Education,
    Science,
    Technology,
    Arts,
    Management,
    GeneralEducation,
    ProgramTrack,
    Other,
}

impl College {
    pub const ORDER: [College; 9] = [
        College::Liberal,
        College::Education,
        College::Science,
        College::Technology,
        College::Arts,
        College::Management,
        College::GeneralEducation,
        College::ProgramTrack,
        College::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            College::Liberal => "文學院",
            College::Education => "教育學院",
            College::Science => "理學院",
            College::Technology => "科技學院",
            College::Arts => "藝術學院",
            College::Management => "管理學院",
            College::GeneralEducation => "通識/體育/軍訓",
            College::ProgramTrack => "學程/專長",
            College::Other => "其他",
        }
    }
}

const COLLEGE_TABLE: &[(College, &[&str])] = &[
    (
        College::Liberal,
        &[
            "國文學系", "國文學系碩士班", "國文學系博士班",
            "英語學系", "英語學系碩士班", "英語學系博士班",
            "地理學系", "地理學系碩士班", "地理學系博士班",
            "臺灣歷史文化及語言研究所碩士班", "經學研究所碩士班",
            "華語文教學研究所碩士班", "華語文教學博士學位學程",
            "客家文化研究所", "語言與文化學士原住民專班", "文學院課程",
        ],
    ),
    (
        College::Science,
        &[
            "數學系數學組", "數學系應用數學組", "數學系碩士班",
            "物理學系", "物理學系碩士班", "物理學系博士班",
            "化學系", "化學系碩士班",
            "生物科技系", "生物科技系碩士班",
            "科學教育暨環境教育研究所碩士班", "科學教育暨環境教育研究所科學教育博士班",
            "理學院課程",
        ],
    ),
    (
        College::Education,
        &[
            "教育學系", "教育學系碩士班", "教育學系博士班",
            "特殊教育學系", "特殊教育學系特殊教育碩士班", "特殊教育學系特殊教育博士班",
            "特殊教育學系聽力學與語言治療碩士班語言治療組",
            "特殊教育學系聽力學與語言治療碩士班聽力學組",
            "體育學系", "體育學系碩士班",
            "成人教育研究所碩士班", "成人教育研究所博士班",
            "性別教育研究所碩士班", "性別教育博士學位學程",
            "諮商心理與復健諮商研究所碩士班諮商心理組",
            "諮商心理與復健諮商研究所碩士班復健諮商組",
            "諮商心理與復健諮商研究所諮商心理博士班",
            "運動競技與產業學士原住民專班", "教育學院課程",
        ],
    ),
    (
        College::Technology,
        &[
            "工業科技教育學系科技教育與訓練組", "工業科技教育學系能源與冷凍空調組",
            "工業科技教育學系碩士班", "工業科技教育學系博士班",
            "工業設計學系", "工業設計學系碩士班",
            "電子工程學系", "電子工程學系碩士班",
            "電機工程學系", "電機工程學系碩士班",
            "軟體工程與管理學系", "軟體工程與管理學系碩士班工程組",
            "軟體工程與管理學系碩士班管理組",
            "工程國際碩士學位學程",
        ],
    ),
    (
        College::Arts,
        &[
            "美術學系", "美術學系碩士班",
            "音樂學系", "音樂學系碩士班",
            "視覺設計學系", "視覺設計學系碩士班",
            "跨領域藝術研究所",
            "藝術產業學士原住民專班",
        ],
    ),
    (
        College::Management,
        &["事業經營學系", "事業經營學系碩士班", "人力與知識管理研究所"],
    ),
    (
        College::GeneralEducation,
        &[
            "通識（和平校區）", "通識（燕巢校區）",
            "體育（和平校區）", "體育（燕巢校區）",
            "軍訓（選修）",
        ],
    ),
    (
        College::ProgramTrack,
        &[
            "中等教師教育學程", "小學教師教育學程", "特教學程資優類",
            "文化學程", "流行音樂微學程", "藝術整合微學程", "多媒體配樂微學程",
            "半導體製程產業人才培育學分學程", "華語文教學微學分學程", "科技產業管理微學分學程",
            "人工智慧探索應用學分學程", "人工智慧工業應用學分學程",
            "人工智慧自然語言技術學分學程", "人工智慧視覺技術學分學程",
            "客家語文專長", "新住民語文專長",
        ],
    ),
];

static DEPARTMENT_INDEX: LazyLock<HashMap<&'static str, College>> = LazyLock::new(|| {
    COLLEGE_TABLE
        .iter()
        .flat_map(|(college, departments)| departments.iter().map(move |d| (*d, *college)))
        .collect()
});

static PREFIX_RULES: LazyLock<Vec<(College, Regex)>> = LazyLock::new(|| {
    [
        (College::Liberal, r"^(國文|英語|地理|歷史|經學|華語|客家|文學院)"),
        (College::Science, r"^(數學|物理|化學|生物|科學|理學院)"),
        (College::Education, r"^(教育|特殊|體育|成人|性別|諮商|運動)"),
        (College::Technology, r"^(工業|電子|電機|軟體|工程|科技)"),
        (College::Arts, r"^(美術|音樂|視覺|藝術)"),
        (College::Management, r"^(事業|人力|管理)"),
        (College::GeneralEducation, r"^(通識|軍訓)"),
        (College::ProgramTrack, r"^(學程|專長)"),
    ]
    .into_iter()
    .map(|(college, pattern)| (college, Regex::new(pattern).unwrap()))
    .collect()
});

/// Classifies a department into its college.
pub fn classify(department: &str) -> College {
    if let Some(college) = DEPARTMENT_INDEX.get(department) {
        return *college;
    }

    PREFIX_RULES
        .iter()
        .find(|(_, rule)| rule.is_match(department))
        .map(|(college, _)| *college)
        .unwrap_or(College::Other)
}

/// Departments of one college.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentGroup {
    pub college: College,
    pub label: &'static str,
    pub departments: Vec<String>,
}

/// Distinct catalog departments, optionally limited to a program level,
/// grouped by college in display order. Empty groups are omitted.
pub fn departments(catalog: &[Course], level: Option<ProgramLevel>) -> Vec<DepartmentGroup> {
    let distinct: BTreeSet<&str> = catalog
        .iter()
        .map(|course| course.department.as_str())
        .filter(|department| !department.is_empty())
        .filter(|department| level.map_or(true, |level| level.matches(department)))
        .collect();

    let mut grouped: HashMap<College, Vec<String>> = HashMap::new();
    for department in distinct {
        grouped
            .entry(classify(department))
            .or_default()
            .push(department.to_string());
    }

    College::ORDER
        .into_iter()
        .filter_map(|college| {
            grouped.remove(&college).map(|departments| DepartmentGroup {
                college,
                label: college.label(),
                departments,
            })
        })
        .collect()
}
