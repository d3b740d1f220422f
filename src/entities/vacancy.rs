//! Vacancies and the form used to open one

use super::Projection;
use crate::core::error::ValidationError;
use crate::core::record::Fields;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// An open position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vacancy {
    #[serde(rename = "_id")]
    pub id: String,
    pub position: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<Value>,
    #[serde(default, alias = "numberOfPositions")]
    pub openings: Option<u32>,
    #[serde(default)]
    pub deadline: Option<String>,
}

impl Projection for Vacancy {
    const ENTITY: &'static str = "vacancy";
}

/// Reference to a vacancy: a bare id, or the populated document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VacancyRef {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        position: Option<String>,
        #[serde(default)]
        department: Option<String>,
    },
}

impl VacancyRef {
    pub fn id(&self) -> &str {
        match self {
            VacancyRef::Id(id) | VacancyRef::Populated { id, .. } => id,
        }
    }

    /// Position title when the reference was populated
    pub fn position(&self) -> Option<&str> {
        match self {
            VacancyRef::Id(_) => None,
            VacancyRef::Populated { position, .. } => position.as_deref(),
        }
    }
}

/// Fields entered when opening a vacancy
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VacancyDraft {
    #[validate(length(min = 1, max = 200, message = "position is required"))]
    pub position: String,

    #[validate(length(min = 1, max = 200, message = "department is required"))]
    pub department: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(range(min = 1, message = "at least one opening is required"))]
    pub openings: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "contact email is not valid"))]
    pub contact_email: Option<String>,
}

impl VacancyDraft {
    /// Validate and turn into the fields of a create request
    pub fn into_fields(self) -> Result<Fields, ValidationError> {
        self.validate()?;
        match serde_json::to_value(&self) {
            Ok(Value::Object(object)) => Ok(object.into_iter().collect()),
            Ok(_) => Err(ValidationError::InvalidRecord {
                entity: Vacancy::ENTITY.to_string(),
                message: "draft did not serialize to an object".to_string(),
            }),
            Err(e) => Err(ValidationError::InvalidRecord {
                entity: Vacancy::ENTITY.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Record;
    use serde_json::json;

    #[test]
    fn test_vacancy_from_record() {
        let record = Record::from_value(json!({
            "_id": "v1",
            "position": "Lecturer",
            "department": "Physics",
            "numberOfPositions": 2,
            "requirements": ["PhD", "Teaching"]
        }))
        .unwrap();
        let vacancy = Vacancy::from_record(&record).unwrap();
        assert_eq!(vacancy.openings, Some(2));
        assert_eq!(vacancy.department.as_deref(), Some("Physics"));
    }

    #[test]
    fn test_vacancy_ref_shapes() {
        let bare: VacancyRef = serde_json::from_value(json!("v1")).unwrap();
        assert_eq!(bare.id(), "v1");
        assert_eq!(bare.position(), None);

        let populated: VacancyRef =
            serde_json::from_value(json!({"_id": "v1", "position": "Lecturer"})).unwrap();
        assert_eq!(populated.id(), "v1");
        assert_eq!(populated.position(), Some("Lecturer"));
    }

    #[test]
    fn test_draft_validation() {
        let draft = VacancyDraft {
            position: "Lecturer".to_string(),
            department: String::new(),
            openings: 0,
            contact_email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        match draft.into_fields() {
            Err(ValidationError::FieldErrors(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"department"));
                assert!(fields.contains(&"openings"));
                assert!(fields.iter().any(|f| *f == "contact_email" || *f == "contactEmail"));
            }
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn test_draft_into_fields() {
        let draft = VacancyDraft {
            position: "Lecturer".to_string(),
            department: "Physics".to_string(),
            openings: 1,
            ..Default::default()
        };
        let fields = draft.into_fields().unwrap();
        assert_eq!(fields.get("position"), Some(&json!("Lecturer")));
        assert!(!fields.contains_key("contactEmail"));
    }
}
