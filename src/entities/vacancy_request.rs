use super::{Projection, null_as_default};
use crate::core::status::RequestStatus;
use serde::{Deserialize, Serialize};

/// A department's request to open a vacancy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacancyRequest {
    #[serde(rename = "_id")]
    pub id: String,
    pub position: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default, alias = "numberOfPositions")]
    pub openings: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: RequestStatus,
    #[serde(default)]
    pub requested_by: Option<PersonRef>,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl Projection for VacancyRequest {
    const ENTITY: &'static str = "vacancyRequest";
}

/// Reference to a person: a bare id, or the populated document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonRef {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default, rename = "fullName")]
        full_name: Option<String>,
    },
}

impl PersonRef {
    pub fn id(&self) -> &str {
        match self {
            PersonRef::Id(id) | PersonRef::Populated { id, .. } => id,
        }
    }

    pub fn full_name(&self) -> Option<&str> {
        match self {
            PersonRef::Id(_) => None,
            PersonRef::Populated { full_name, .. } => full_name.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Record;
    use serde_json::json;

    #[test]
    fn test_request_from_record() {
        let record = Record::from_value(json!({
            "_id": "r1",
            "position": "Lab Assistant",
            "status": "approved",
            "requestedBy": {"_id": "e1", "fullName": "Dr. Okafor"}
        }))
        .unwrap();
        let request = VacancyRequest::from_record(&record).unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
        let by = request.requested_by.unwrap();
        assert_eq!(by.id(), "e1");
        assert_eq!(by.full_name(), Some("Dr. Okafor"));
    }

    #[test]
    fn test_request_defaults() {
        let record =
            Record::from_value(json!({"_id": "r2", "position": "Clerk", "requestedBy": "e2"}))
                .unwrap();
        let request = VacancyRequest::from_record(&record).unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.requested_by, Some(PersonRef::Id("e2".to_string())));
    }
}
