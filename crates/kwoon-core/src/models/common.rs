use serde::{Deserialize, Deserializer, Serialize};

/// Paginated list envelope returned by every `GET /<resource>/` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the server holds more rows than this page carries.
    pub fn is_truncated(&self) -> bool {
        (self.items.len() as u64) < self.total
    }
}

/// Acknowledgement body for action endpoints (`{"message": ...}` plus
/// whichever counters the endpoint adds).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub generated_count: Option<u32>,
    #[serde(default)]
    pub recipient_count: Option<u32>,
    #[serde(default)]
    pub old_grade: Option<u8>,
    #[serde(default)]
    pub new_grade: Option<u8>,
}

/// Hour counters arrive as numbers, `null`, or not at all. All three
/// collapse to a plain `f64` with absent meaning zero.
pub(crate) fn nullable_hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or(0.0))
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Hours {
        #[serde(default, deserialize_with = "nullable_hours")]
        completed: f64,
    }

    #[test]
    fn test_page_parses_items_and_total() {
        let page: Page<String> =
            serde_json::from_str(r#"{"items": ["a", "b"], "total": 7}"#).expect("valid page");
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, 7);
        assert!(page.is_truncated());
    }

    #[test]
    fn test_page_missing_fields_is_empty() {
        let page: Page<String> = serde_json::from_str("{}").expect("valid page");
        assert!(page.is_empty());
        assert!(!page.is_truncated());
    }

    #[test]
    fn test_nullable_hours() {
        let h: Hours = serde_json::from_str(r#"{"completed": null}"#).expect("null hours");
        assert_eq!(h.completed, 0.0);
        let h: Hours = serde_json::from_str("{}").expect("missing hours");
        assert_eq!(h.completed, 0.0);
        let h: Hours = serde_json::from_str(r#"{"completed": 12.5}"#).expect("hours");
        assert_eq!(h.completed, 12.5);
    }

    #[test]
    fn test_action_response_extras() {
        let r: ActionResponse =
            serde_json::from_str(r#"{"message": "ok", "generated_count": 12}"#).expect("valid");
        assert_eq!(r.message, "ok");
        assert_eq!(r.generated_count, Some(12));
        assert_eq!(r.recipient_count, None);
    }
}
