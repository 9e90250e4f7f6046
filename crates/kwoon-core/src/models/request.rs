use serde::{Deserialize, Serialize};

use super::student::Branch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    Product,
    PrivateLesson,
    GroupLesson,
}

impl RequestType {
    pub fn label(&self) -> &'static str {
        match self {
            RequestType::Product => "Product",
            RequestType::PrivateLesson => "Private lesson",
            RequestType::GroupLesson => "Group lesson",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Product => "PRODUCT",
            RequestType::PrivateLesson => "PRIVATE_LESSON",
            RequestType::GroupLesson => "GROUP_LESSON",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
        }
    }
}

/// A student's product order or lesson booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: String,
    pub student_id: String,
    pub request_type: RequestType,
    pub status: RequestStatus,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub branch: Option<Branch>,
    #[serde(default)]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub handled_by: Option<String>,
    #[serde(default)]
    pub handled_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
}

impl ServiceRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// One-line description: the product (and size) or the lesson branch.
    pub fn subject(&self) -> String {
        match self.request_type {
            RequestType::Product => {
                let product = self.product_name.as_deref().unwrap_or("Product");
                match &self.size {
                    Some(size) => format!("{} ({})", product, size),
                    None => product.to_string(),
                }
            }
            _ => match self.branch {
                Some(branch) => format!("{} - {}", self.request_type.label(), branch.label()),
                None => self.request_type.label().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRequest {
    pub request_type: RequestType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<Branch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body for `POST /requests/{id}/handle`. Only `Approved` and `Rejected`
/// are accepted by the server.
#[derive(Debug, Clone, Serialize)]
pub struct HandleRequest {
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub request_type: Option<RequestType>,
    pub status: Option<RequestStatus>,
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_subject() {
        let req: ServiceRequest = serde_json::from_str(
            r#"{"id": "q1", "student_id": "s1", "request_type": "PRODUCT", "status": "PENDING",
                "product_name": "Uniform", "size": "M"}"#,
        )
        .expect("valid request");
        assert_eq!(req.subject(), "Uniform (M)");
        assert!(req.is_pending());

        let lesson: ServiceRequest = serde_json::from_str(
            r#"{"id": "q2", "student_id": "s1", "request_type": "PRIVATE_LESSON", "status": "APPROVED",
                "branch": "ESCRIMA"}"#,
        )
        .expect("valid request");
        assert_eq!(lesson.subject(), "Private lesson - Escrima");
    }
}
