use super::common::*;
use chrono::Duration;
use std::sync::Arc;

use crate::workflows::cases::domain::{CaseFilter, CaseId, CasePatch, CaseStatus, NewCase, Page};
use crate::workflows::cases::repository::{MemoryCaseStore, RepositoryError};
use crate::workflows::cases::{CaseService, CaseServiceError, ValidationError, MAX_CASE_SEQUENCE};
use crate::workflows::triage::{FeatureError, PriorityLabel, TriageEngine};

#[test]
fn create_assigns_sequential_ids_and_scores() {
    let (service, store) = build_service();

    let first = service.create(new_case(), now()).expect("case created");
    let second = service.create(small_case(), now()).expect("case created");

    assert_eq!(first.id.as_str(), "CASE-1000");
    assert_eq!(second.id.as_str(), "CASE-1001");
    assert_eq!(first.status, CaseStatus::Open);
    assert_eq!(first.assigned_agency, None);
    assert_eq!(first.priority, PriorityLabel::High);
    assert_eq!(first.recovery_probability, Some(0.72));
    assert_eq!(second.recovery_probability, Some(0.5));
    assert_eq!(first.created_at, now());
    assert_eq!(store.len(), 2);
}

#[test]
fn create_rejects_invalid_payloads() {
    let (service, store) = build_service();

    let blank = NewCase {
        customer_name: "   ".to_string(),
        ..new_case()
    };
    match service.create(blank, now()) {
        Err(CaseServiceError::Validation(ValidationError::BlankCustomerName)) => {}
        other => panic!("expected blank name rejection, got {other:?}"),
    }

    let negative = NewCase {
        amount: -5.0,
        ..new_case()
    };
    match service.create(negative, now()) {
        Err(CaseServiceError::Validation(ValidationError::Feature(
            FeatureError::NonPositiveAmount(_),
        ))) => {}
        other => panic!("expected amount rejection, got {other:?}"),
    }

    let unknown_segment = NewCase {
        customer_segment: Some("platinum".to_string()),
        ..new_case()
    };
    assert!(matches!(
        service.create(unknown_segment, now()),
        Err(CaseServiceError::Validation(_))
    ));
    assert!(store.is_empty());
}

#[test]
fn create_gives_up_after_repeated_conflicts() {
    let service = CaseService::new(
        Arc::new(ConflictRepository),
        Arc::new(EmptyDirectory),
        Arc::new(TriageEngine::rule_based()),
    );

    match service.create(new_case(), now()) {
        Err(CaseServiceError::Repository(RepositoryError::Conflict)) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn create_skips_ids_already_taken() {
    let (service, store) = build_service();
    let taken = service.create(new_case(), now()).expect("case created");

    let restarted = CaseService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(TriageEngine::rule_based()),
    );
    let next = restarted.create(small_case(), now()).expect("case created");

    assert_eq!(taken.id.as_str(), "CASE-1000");
    assert_eq!(next.id.as_str(), "CASE-1001");
}

#[test]
fn create_surfaces_unavailable_repository() {
    let service = CaseService::new(
        Arc::new(UnavailableRepository),
        Arc::new(EmptyDirectory),
        Arc::new(TriageEngine::rule_based()),
    );

    assert!(matches!(
        service.create(new_case(), now()),
        Err(CaseServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}

#[test]
fn update_applies_only_present_fields() {
    let (service, _) = build_service();
    let case = service.create(new_case(), now()).expect("case created");
    let later = now() + Duration::days(3);

    let updated = service
        .update(
            &case.id,
            CasePatch {
                amount: Some(75_000.0),
                priority: Some(PriorityLabel::Low),
                ..CasePatch::default()
            },
            later,
        )
        .expect("update succeeds");

    assert_eq!(updated.amount, 75_000.0);
    assert_eq!(updated.priority, PriorityLabel::Low);
    assert_eq!(updated.customer_name, case.customer_name);
    assert_eq!(updated.recovery_probability, case.recovery_probability);
    assert_eq!(updated.updated_at, later);
    assert_eq!(service.get(&case.id).expect("stored"), updated);
}

#[test]
fn update_maintains_resolution_timestamp() {
    let (service, _) = build_service();
    let case = service.create(new_case(), now()).expect("case created");
    let resolved_on = now() + Duration::days(40);

    let resolved = service
        .update(
            &case.id,
            CasePatch {
                status: Some(CaseStatus::Resolved),
                ..CasePatch::default()
            },
            resolved_on,
        )
        .expect("update succeeds");
    assert_eq!(resolved.resolved_at, Some(resolved_on));
    assert_eq!(resolved.resolution_days(), Some(40));

    let reopened = service
        .update(
            &case.id,
            CasePatch {
                status: Some(CaseStatus::Open),
                ..CasePatch::default()
            },
            resolved_on + Duration::days(1),
        )
        .expect("update succeeds");
    assert_eq!(reopened.resolved_at, None);
}

#[test]
fn update_rejects_unknown_ids_and_bad_values() {
    let (service, _) = build_service();
    let missing = CaseId("CASE-9999".to_string());

    match service.update(&missing, CasePatch::default(), now()) {
        Err(CaseServiceError::NotFound(id)) => assert_eq!(id, missing),
        other => panic!("expected not found, got {other:?}"),
    }

    let case = service.create(new_case(), now()).expect("case created");
    let negative = CasePatch {
        amount: Some(-1.0),
        ..CasePatch::default()
    };
    assert!(matches!(
        service.update(&case.id, negative, now()),
        Err(CaseServiceError::Validation(ValidationError::Feature(
            FeatureError::NonPositiveAmount(_)
        )))
    ));

    let out_of_range = CasePatch {
        recovery_probability: Some(1.4),
        ..CasePatch::default()
    };
    assert!(matches!(
        service.update(&case.id, out_of_range, now()),
        Err(CaseServiceError::Validation(
            ValidationError::RecoveryOutOfRange(_)
        ))
    ));
    assert_eq!(service.get(&case.id).expect("stored"), case);
}

#[test]
fn blank_agency_in_patch_clears_assignment() {
    let (service, _) = build_service();
    let case = service.create(new_case(), now()).expect("case created");
    service
        .allocate(&case.id, "DCA Alpha", now())
        .expect("allocation succeeds");

    let cleared = service
        .update(
            &case.id,
            CasePatch {
                assigned_agency: Some(String::new()),
                ..CasePatch::default()
            },
            now(),
        )
        .expect("update succeeds");
    assert_eq!(cleared.assigned_agency, None);
}

#[test]
fn allocate_moves_case_in_progress_unconditionally() {
    let (service, _) = build_service();
    let case = service.create(new_case(), now()).expect("case created");
    service
        .update(
            &case.id,
            CasePatch {
                status: Some(CaseStatus::Closed),
                ..CasePatch::default()
            },
            now(),
        )
        .expect("close succeeds");

    let allocated = service
        .allocate(&case.id, "DCA Gamma", now() + Duration::days(1))
        .expect("allocation succeeds");

    assert_eq!(allocated.status, CaseStatus::InProgress);
    assert_eq!(allocated.assigned_agency.as_deref(), Some("DCA Gamma"));
    assert_eq!(allocated.resolved_at, None);
}

#[test]
fn allocate_validates_input() {
    let (service, _) = build_service();
    let case = service.create(new_case(), now()).expect("case created");

    assert!(matches!(
        service.allocate(&case.id, "  ", now()),
        Err(CaseServiceError::Validation(ValidationError::BlankAgencyName))
    ));
    assert!(matches!(
        service.allocate(&CaseId("CASE-0001".to_string()), "DCA Alpha", now()),
        Err(CaseServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.allocate(&CaseId("CASE-0001".to_string()), " ", now()),
        Err(CaseServiceError::NotFound(_))
    ));
}

#[test]
fn rescore_uses_assigned_agency_performance() {
    let (service, _) = build_service();
    let case = service.create(new_case(), now()).expect("case created");

    let unassigned = service.rescore(&case.id, now()).expect("rescore succeeds");
    assert_eq!(unassigned.recovery_probability, Some(0.72));

    service
        .allocate(&case.id, "DCA Alpha", now())
        .expect("allocation succeeds");
    let strong = service.rescore(&case.id, now()).expect("rescore succeeds");
    assert_eq!(strong.recovery_probability, Some(0.74));

    service
        .allocate(&case.id, "DCA Unknown", now())
        .expect("allocation succeeds");
    let unknown = service.rescore(&case.id, now()).expect("rescore succeeds");
    assert_eq!(unknown.recovery_probability, Some(0.72));
}

#[test]
fn list_filters_and_paginates() {
    let (service, _) = build_service();
    let high = service.create(new_case(), now()).expect("case created");
    service.create(small_case(), now()).expect("case created");
    let medium = service
        .create(
            NewCase {
                amount: 25_000.0,
                overdue_days: 10,
                ..new_case()
            },
            now(),
        )
        .expect("case created");
    service
        .allocate(&high.id, "DCA Alpha", now())
        .expect("allocation succeeds");

    let all = service
        .list(CaseFilter::default(), Page::default())
        .expect("list succeeds");
    assert_eq!(all.len(), 3);

    let high_cases = service
        .list(
            CaseFilter {
                priority: Some(PriorityLabel::High),
                status: None,
            },
            Page::default(),
        )
        .expect("list succeeds");
    assert_eq!(high_cases.len(), 2);

    let in_progress = service
        .list(
            CaseFilter {
                priority: None,
                status: Some(CaseStatus::InProgress),
            },
            Page::default(),
        )
        .expect("list succeeds");
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].id, high.id);

    let page = service
        .list(CaseFilter::default(), Page { skip: 2, limit: 5 })
        .expect("list succeeds");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, medium.id);
}

#[test]
fn sla_registration_replaces_previous_record() {
    let (service, _) = build_service();
    let case = service.create(small_case(), now()).expect("case created");

    assert!(matches!(
        service.sla(&case.id),
        Err(CaseServiceError::SlaNotRecorded(_))
    ));

    let record = service.register_sla(&case.id).expect("sla registered");
    assert_eq!(record.deadline, now() + Duration::days(90));
    assert!(record.is_breached);

    service
        .update(
            &case.id,
            CasePatch {
                overdue_days: Some(20),
                ..CasePatch::default()
            },
            now(),
        )
        .expect("update succeeds");
    let refreshed = service.register_sla(&case.id).expect("sla registered");
    assert!(!refreshed.is_breached);

    let records = service.slas().expect("slas listed");
    assert_eq!(records.len(), 1);
    assert_eq!(service.sla(&case.id).expect("sla stored"), refreshed);
}

#[test]
fn snapshot_copies_cases_and_roster() {
    let (service, _) = build_service();
    service.create(new_case(), now()).expect("case created");

    let snapshot = service.snapshot().expect("snapshot");
    assert_eq!(snapshot.cases.len(), 1);
    assert_eq!(snapshot.agencies.len(), 2);
}

#[test]
fn custom_sequence_start_is_respected() {
    let store = MemoryCaseStore::default();
    let service = CaseService::with_sequence_start(
        Arc::new(store.clone()),
        Arc::new(store),
        Arc::new(TriageEngine::rule_based()),
        42,
    );

    let case = service.create(new_case(), now()).expect("case created");
    assert_eq!(case.id.as_str(), "CASE-0042");
}

#[test]
fn sequence_wraps_to_keep_four_digit_ids() {
    let store = MemoryCaseStore::default();
    let service = CaseService::with_sequence_start(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(TriageEngine::rule_based()),
        MAX_CASE_SEQUENCE,
    );

    let last = service.create(new_case(), now()).expect("case created");
    let wrapped = service.create(new_case(), now()).expect("case created");
    assert_eq!(last.id.as_str(), "CASE-9999");
    assert_eq!(wrapped.id.as_str(), "CASE-1000");

    let mut taken = wrapped.clone();
    taken.id = CaseId("CASE-1001".to_string());
    store.load_cases([taken]).expect("seeded id");

    let skipped = service.create(new_case(), now()).expect("case created");
    assert_eq!(skipped.id.as_str(), "CASE-1002");
}
