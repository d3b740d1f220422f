use super::Projection;
use crate::core::experience::Experience;
use serde::{Deserialize, Serialize};

/// An employee profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub hire_date: Option<String>,
    #[serde(default)]
    pub experience: Option<Experience>,
}

impl Projection for Employee {
    const ENTITY: &'static str = "employee";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Record;
    use serde_json::json;

    #[test]
    fn test_free_text_experience() {
        let record = Record::from_value(json!({
            "_id": "e1",
            "fullName": "Amina Yusuf",
            "experience": "10 years in administration"
        }))
        .unwrap();
        let employee = Employee::from_record(&record).unwrap();
        assert_eq!(
            employee.experience,
            Some(Experience::Unstructured("10 years in administration".to_string()))
        );
    }

    #[test]
    fn test_from_records() {
        let records = vec![
            Record::from_value(json!({"_id": "e1", "fullName": "A"})).unwrap(),
            Record::from_value(json!({"_id": "e2", "fullName": "B", "experience": null})).unwrap(),
        ];
        let employees = Employee::from_records(&records).unwrap();
        assert_eq!(employees.len(), 2);
        assert!(employees[1].experience.is_none());
    }
}
