use serde::{Deserialize, Serialize};

use super::lesson::Lesson;
use super::media::Media;
use super::user::InstructorTitle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Create/update payload for schools. `is_active` is ignored on create.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchoolInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// A school's instructor as listed on the student's own school page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub instructor_title: Option<InstructorTitle>,
}

impl Instructor {
    pub fn titled_name(&self) -> String {
        match self.instructor_title {
            Some(title) => format!("{} {} {}", title.label(), self.first_name, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// `GET /schools/my-school`: the student's school with its instructors,
/// recent lessons and gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MySchool {
    #[serde(flatten)]
    pub school: School,
    #[serde(default)]
    pub instructors: Vec<Instructor>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub media: Vec<Media>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignManager {
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_school_defaults_active() {
        let school: School =
            serde_json::from_str(r#"{"id": "sc1", "name": "Central Kwoon"}"#).expect("valid");
        assert!(school.is_active);
        assert!(school.address.is_none());
    }

    #[test]
    fn test_my_school_flattens_school() {
        let mine: MySchool = serde_json::from_str(
            r#"{"id": "sc1", "name": "Central Kwoon", "is_active": true,
                "instructors": [{"id": "u9", "first_name": "Ada", "last_name": "Lee",
                                 "instructor_title": "SIHING"}],
                "lessons": [], "media": []}"#,
        )
        .expect("valid my-school");
        assert_eq!(mine.school.name, "Central Kwoon");
        assert_eq!(mine.instructors[0].titled_name(), "Sihing Ada Lee");
    }

    #[test]
    fn test_school_input_only_sends_set_fields() {
        let input = SchoolInput {
            name: Some("North".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&input).expect("serializes"),
            r#"{"name":"North"}"#
        );
    }
}
