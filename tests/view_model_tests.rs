//! Tests for the list view-model
//!
//! These tests verify that:
//! - Filters are conjunctive and commute
//! - Loading without filters shows the collection as-is
//! - Patches round-trip through their inverse
//! - Removal and updates of unknown ids leave the collection untouched

use hrms::prelude::*;

fn schema() -> ViewSchema {
    ClientConfig::default_config()
        .entity("applicant")
        .unwrap()
        .schema()
}

fn rec(value: Value) -> Record {
    Record::from_value(value).unwrap()
}

fn two_applicants() -> Vec<Record> {
    vec![
        rec(json!({"_id": "app1", "fullName": "John Smith", "status": "pending"})),
        rec(json!({"_id": "app2", "fullName": "Jane Doe", "status": "shortlisted"})),
    ]
}

fn larger_collection() -> Vec<Record> {
    vec![
        rec(json!({"_id": "a1", "fullName": "Jane Doe", "email": "jane@uni.edu", "status": "shortlisted", "vacancyId": "v1"})),
        rec(json!({"_id": "a2", "fullName": "Janet Kim", "status": "pending", "vacancyId": {"_id": "v2", "position": "Lecturer"}})),
        rec(json!({"_id": "a3", "fullName": "Ahmed Ali", "email": "ahmed@jane-street.com", "vacancyId": "v1"})),
        rec(json!({"_id": "a4", "fullName": "Sara Lund", "status": "rejected", "vacancyId": "v2"})),
        rec(json!({"_id": "a5", "fullName": null, "status": "shortlisted", "vacancyId": {"_id": "v1"}})),
    ]
}

fn loaded(records: Vec<Record>) -> ListViewModel {
    let mut vm = ListViewModel::new(schema());
    vm.load(records);
    vm
}

fn ids(vm: &ListViewModel) -> Vec<String> {
    vm.view_ids().into_iter().map(str::to_string).collect()
}

// =============================================================================
// Properties
// =============================================================================

mod property_tests {
    use super::*;

    #[test]
    fn test_filters_commute() {
        let configs = [
            (FilterKind::Status, "shortlisted"),
            (FilterKind::Status, "pending"),
            (FilterKind::Search, "jane"),
            (FilterKind::Search, "LECT"),
            (FilterKind::ForeignKey, "v1"),
            (FilterKind::ForeignKey, "v2"),
            (FilterKind::Status, "all"),
            (FilterKind::Search, ""),
        ];

        for (k1, v1) in configs {
            for (k2, v2) in configs {
                if k1 == k2 {
                    // same slot: the second replaces the first
                    continue;
                }
                let mut forward = loaded(larger_collection());
                forward.set_filter(k1, v1);
                forward.set_filter(k2, v2);

                let mut backward = loaded(larger_collection());
                backward.set_filter(k2, v2);
                backward.set_filter(k1, v1);

                assert_eq!(
                    ids(&forward),
                    ids(&backward),
                    "{k1}={v1} then {k2}={v2} differs from the reverse order"
                );
            }
        }
    }

    #[test]
    fn test_load_then_view_is_identity() {
        let records = larger_collection();
        let vm = loaded(records.clone());
        let view: Vec<Record> = vm.view().into_iter().cloned().collect();
        assert_eq!(view, records);
    }

    #[test]
    fn test_patch_then_inverse_restores_record() {
        let mut vm = loaded(larger_collection());
        let original = vm.get("a2").unwrap().clone();

        let patches = [
            Patch::new().set("status", "interviewed"),
            Patch::new().set("feedback", "Strong candidate"),
            Patch::new()
                .set("fullName", "Janet Kim-Lee")
                .set("email", "janet@uni.edu"),
            Patch::new().set("vacancyId", json!({"position": "Senior Lecturer"})),
            Patch::new().set("vacancyId.department", "Physics"),
            Patch::new().set("status", Value::Null),
        ];

        for patch in patches {
            let inverse = patch.inverse_for(vm.get("a2").unwrap());
            vm.update_field("a2", &patch).unwrap();
            vm.update_field("a2", &inverse).unwrap();
            assert_eq!(vm.get("a2").unwrap(), &original, "patch {:?}", patch);
        }
    }

    #[test]
    fn test_inverse_restores_stored_null() {
        let mut vm = loaded(larger_collection());
        let original = vm.get("a5").unwrap().clone();

        let patch = Patch::new().set("fullName", "Sam Park");
        let inverse = patch.inverse_for(&original);
        vm.update_field("a5", &patch).unwrap();
        vm.update_field("a5", &inverse).unwrap();

        assert_eq!(vm.get("a5").unwrap(), &original);
        assert_eq!(vm.get("a5").unwrap().get("fullName"), Some(&Value::Null));
    }

    #[test]
    fn test_inverse_drops_parent_created_by_patch() {
        let mut vm = loaded(two_applicants());
        let original = vm.get("app2").unwrap().clone();

        let patch = Patch::new().set("interview.room", "B12");
        let inverse = patch.inverse_for(&original);
        vm.update_field("app2", &patch).unwrap();
        assert_eq!(vm.get("app2").unwrap().get_str("interview.room"), Some("B12"));
        vm.update_field("app2", &inverse).unwrap();

        assert_eq!(vm.get("app2").unwrap(), &original);
    }

    #[test]
    fn test_dotted_patch_keeps_bare_reference() {
        let mut vm = loaded(larger_collection());
        vm.set_filter(FilterKind::ForeignKey, "v1");
        let original = vm.get("a1").unwrap().clone();
        let visible = vm.visible_len();

        let patch = Patch::new().set("vacancyId.position", "Lecturer");
        assert!(original.check_patch(&patch).is_err());
        let inverse = patch.inverse_for(&original);
        vm.update_field("a1", &patch).unwrap();
        vm.update_field("a1", &inverse).unwrap();

        assert_eq!(vm.get("a1").unwrap(), &original);
        assert_eq!(vm.visible_len(), visible);
        assert!(vm.view_ids().contains(&"a1"));
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut vm = loaded(larger_collection());
        let patch = Patch::new()
            .set("status", "selected")
            .set("vacancyId", json!({"department": "Physics"}));
        vm.update_field("a2", &patch).unwrap();
        let once = vm.get("a2").unwrap().clone();
        vm.update_field("a2", &patch).unwrap();
        assert_eq!(vm.get("a2").unwrap(), &once);
    }

    #[test]
    fn test_remove_twice() {
        let mut vm = loaded(larger_collection());
        let removed = vm.remove("a3").unwrap();
        assert_eq!(removed.id(), "a3");
        let after_first: Vec<Record> = vm.records().to_vec();

        let err = vm.remove("a3").unwrap_err();
        assert_eq!(err.id, "a3");
        assert_eq!(vm.records(), after_first.as_slice());
    }

    #[test]
    fn test_identity_is_immutable() {
        let mut vm = loaded(two_applicants());
        vm.update_field("app1", &Patch::new().set("_id", "hijacked"))
            .unwrap();
        assert!(vm.contains("app1"));
        assert!(!vm.contains("hijacked"));
    }
}

// =============================================================================
// Scenarios
// =============================================================================

mod scenario_tests {
    use super::*;

    #[test]
    fn test_status_filter() {
        let mut vm = loaded(two_applicants());
        vm.set_filter(FilterKind::Status, "shortlisted");
        assert_eq!(ids(&vm), vec!["app2"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut vm = loaded(two_applicants());
        vm.set_filter(FilterKind::Search, "jane");
        assert_eq!(ids(&vm), vec!["app2"]);
        vm.set_filter(FilterKind::Search, "JANE");
        assert_eq!(ids(&vm), vec!["app2"]);
    }

    #[test]
    fn test_update_moves_record_into_filter() {
        let mut vm = loaded(two_applicants());
        vm.set_filter(FilterKind::Status, "rejected");
        assert!(vm.view().is_empty());

        vm.update_field("app1", &Patch::new().set("status", "rejected"))
            .unwrap();
        assert_eq!(ids(&vm), vec!["app1"]);
    }

    #[test]
    fn test_update_unknown_id() {
        let mut vm = loaded(two_applicants());
        let before = vm.records().to_vec();
        let err = vm
            .update_field("unknown-id", &Patch::new().set("status", "rejected"))
            .unwrap_err();
        assert_eq!(err.id, "unknown-id");
        assert_eq!(vm.records(), before.as_slice());
    }

    #[test]
    fn test_all_clears_status_filter() {
        let mut vm = loaded(two_applicants());
        vm.set_filter(FilterKind::Status, "pending");
        assert_eq!(ids(&vm), vec!["app1"]);
        vm.set_filter(FilterKind::Status, "ALL");
        assert_eq!(ids(&vm), vec!["app1", "app2"]);
        assert!(vm.active_filters().next().is_none());
    }

    #[test]
    fn test_missing_status_counts_as_pending() {
        let mut vm = loaded(larger_collection());
        vm.set_filter(FilterKind::Status, "pending");
        assert_eq!(ids(&vm), vec!["a2", "a3"]);
    }

    #[test]
    fn test_missing_status_uses_configured_default() {
        let config = EntityConfig::new("posting", "postings").with_statuses(&["open", "closed"]);
        assert_eq!(config.default_status(), Some("open"));

        let mut vm = ListViewModel::new(config.schema());
        vm.load(vec![
            rec(json!({"_id": "p1", "title": "Registrar"})),
            rec(json!({"_id": "p2", "title": "Librarian", "status": "closed"})),
        ]);
        let counts = vm.status_counts();
        assert_eq!(counts.get("open"), Some(&1));
        assert_eq!(counts.get("pending"), None);

        vm.set_filter(FilterKind::Status, "open");
        assert_eq!(ids(&vm), vec!["p1"]);
    }

    #[test]
    fn test_foreign_key_accepts_populated_reference() {
        let mut vm = loaded(larger_collection());
        vm.set_filter(FilterKind::ForeignKey, "v1");
        assert_eq!(ids(&vm), vec!["a1", "a3", "a5"]);
    }

    #[test]
    fn test_search_skips_missing_and_null_fields() {
        let mut vm = loaded(larger_collection());
        vm.set_filter(FilterKind::Search, "jane");
        // a3 matches on its email, a5 has a null name
        assert_eq!(ids(&vm), vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn test_combined_filters_and_sort() {
        let mut vm = loaded(larger_collection());
        vm.set_filter(FilterKind::ForeignKey, "v1");
        vm.set_filter(FilterKind::Status, "shortlisted");
        vm.set_sort(Some(SortSpec::desc("fullName")));
        // a5 has no name and sorts last
        assert_eq!(ids(&vm), vec!["a1", "a5"]);

        vm.set_sort(SortSpec::parse("fullName:asc"));
        assert_eq!(ids(&vm), vec!["a1", "a5"]);
    }

    #[test]
    fn test_reload_keeps_filters() {
        let mut vm = loaded(two_applicants());
        vm.set_filter(FilterKind::Status, "shortlisted");
        vm.load(vec![
            rec(json!({"_id": "app3", "fullName": "New Person", "status": "shortlisted"})),
            rec(json!({"_id": "app1", "fullName": "John Smith", "status": "pending"})),
        ]);
        assert_eq!(ids(&vm), vec!["app3"]);
        assert!(vm.loaded_at().is_some());
    }
}
