use super::{Projection, VacancyRef, null_as_default};
use crate::core::experience::Experience;
use crate::core::status::ApplicantStatus;
use serde::{Deserialize, Serialize};

/// A job applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub vacancy_id: Option<VacancyRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ApplicantStatus,
    #[serde(default)]
    pub experience: Option<Experience>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub resume: Option<String>,
}

impl Projection for Applicant {
    const ENTITY: &'static str = "applicant";
}

impl Applicant {
    /// Position applied for, when the vacancy reference was populated
    pub fn position(&self) -> Option<&str> {
        self.vacancy_id.as_ref().and_then(VacancyRef::position)
    }

    pub fn experience_summary(&self) -> String {
        self.experience
            .as_ref()
            .map(Experience::summary)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Record;
    use serde_json::json;

    #[test]
    fn test_missing_status_is_pending() {
        let record = Record::from_value(json!({"_id": "app1", "fullName": "Jane Doe"})).unwrap();
        let applicant = Applicant::from_record(&record).unwrap();
        assert_eq!(applicant.status, ApplicantStatus::Pending);

        let record =
            Record::from_value(json!({"_id": "app1", "fullName": "Jane Doe", "status": null}))
                .unwrap();
        assert_eq!(
            Applicant::from_record(&record).unwrap().status,
            ApplicantStatus::Pending
        );
    }

    #[test]
    fn test_populated_vacancy_and_experience() {
        let record = Record::from_value(json!({
            "_id": "app1",
            "fullName": "Jane Doe",
            "status": "shortlisted",
            "vacancyId": {"_id": "v1", "position": "Lecturer"},
            "experience": [{"position": "Tutor", "company": "City College"}]
        }))
        .unwrap();
        let applicant = Applicant::from_record(&record).unwrap();
        assert_eq!(applicant.status, ApplicantStatus::Shortlisted);
        assert_eq!(applicant.position(), Some("Lecturer"));
        assert_eq!(applicant.experience_summary(), "Tutor at City College");
    }

    #[test]
    fn test_unknown_status_is_invalid() {
        let record = Record::from_value(json!({
            "_id": "app1",
            "fullName": "Jane Doe",
            "status": "approved"
        }))
        .unwrap();
        let err = Applicant::from_record(&record).unwrap_err();
        assert!(err.to_string().contains("app1"));
    }
}
