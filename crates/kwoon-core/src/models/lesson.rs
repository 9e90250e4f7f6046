use serde::{Deserialize, Serialize};

use super::common::nullable_hours;
use super::student::Branch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonType {
    Group,
    Private,
}

impl LessonType {
    pub fn label(&self) -> &'static str {
        match self {
            LessonType::Group => "Group",
            LessonType::Private => "Private",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LessonType::Group => "GROUP",
            LessonType::Private => "PRIVATE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub school_id: String,
    pub branch: Branch,
    pub lesson_type: LessonType,
    pub lesson_date: String,
    #[serde(default, deserialize_with = "nullable_hours")]
    pub duration_hours: f64,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub attendance_count: u32,
    #[serde(default)]
    pub schedule_id: Option<String>,
}

impl Lesson {
    /// Lessons produced by a weekly schedule rather than created by hand.
    pub fn is_generated(&self) -> bool {
        self.schedule_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewLesson {
    pub school_id: String,
    pub branch: Branch,
    pub lesson_type: LessonType,
    pub lesson_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LessonFilter {
    pub school_id: Option<String>,
    pub branch: Option<Branch>,
    pub lesson_type: Option<LessonType>,
    pub limit: Option<u32>,
}

/// Recurring weekly lesson slot. `day_of_week` counts from Monday = 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonSchedule {
    pub id: String,
    pub school_id: String,
    pub branch: Branch,
    pub lesson_type: LessonType,
    pub day_of_week: u8,
    pub start_time: String,
    #[serde(default, deserialize_with = "nullable_hours")]
    pub duration_hours: f64,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub generated_lesson_count: u32,
}

impl LessonSchedule {
    pub fn weekday_name(&self) -> &'static str {
        weekday_name(self.day_of_week)
    }
}

pub fn weekday_name(day: u8) -> &'static str {
    match day {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        6 => "Sunday",
        _ => "?",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewLessonSchedule {
    pub school_id: String,
    pub branch: Branch,
    pub lesson_type: LessonType,
    pub day_of_week: u8,
    /// "HH:MM"
    pub start_time: String,
    /// "YYYY-MM-DD"
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub id: String,
    pub lesson_id: String,
    pub student_id: String,
    #[serde(default, deserialize_with = "nullable_hours")]
    pub hours_credited: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
}

/// Body for `POST /attendance/`: marks every listed student present.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
    pub lesson_id: String,
    pub student_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_parses() {
        let lesson: Lesson = serde_json::from_str(
            r#"{"id": "l1", "school_id": "sc1", "branch": "WING_TSUN", "lesson_type": "GROUP",
                "lesson_date": "2026-03-02T19:00:00", "duration_hours": 2.0,
                "attendance_count": 8, "schedule_id": "ls1"}"#,
        )
        .expect("valid lesson");
        assert_eq!(lesson.lesson_type, LessonType::Group);
        assert_eq!(lesson.duration_hours, 2.0);
        assert!(lesson.is_generated());
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(weekday_name(0), "Monday");
        assert_eq!(weekday_name(6), "Sunday");
        assert_eq!(weekday_name(9), "?");
    }
}
