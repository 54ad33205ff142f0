//! Reporting engine tests: denial rates, staleness alerts and the
//! expiry forecast.

use std::sync::Arc;
use std::time::Duration;

use chartgate_core::{
    AccessRequest, DocumentId, DocumentType, ManagementType, PolicyDuration, PolicyScope,
    ProfessionalId, TenantId, now_utc,
};
use chartgate_db_memory::MemoryStorage;
use chartgate_engine::{AccessEngine, EngineConfig, Report, ReportKind};
use chartgate_storage::RequestStorage;

fn setup() -> (AccessEngine, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let engine = AccessEngine::new(
        storage.clone(),
        storage.clone(),
        storage.clone(),
        EngineConfig::default(),
    );
    (engine, storage)
}

fn tenant() -> TenantId {
    TenantId::new("T1")
}

const HOUR: Duration = Duration::from_secs(3600);
const DAY: Duration = Duration::from_secs(24 * 3600);

#[tokio::test]
async fn denial_rate_counts_outcomes_in_window() {
    let (engine, _) = setup();
    let p1 = ProfessionalId::new("P1");
    let p2 = ProfessionalId::new("P2");

    engine
        .create_policy(
            tenant(),
            p1.clone(),
            PolicyScope::AllDocuments,
            PolicyDuration::Indefinite,
            ManagementType::Automatic,
        )
        .await
        .unwrap();

    let doc = DocumentId::new("doc123");
    let lab = DocumentType::new("LAB_RESULT");
    engine
        .evaluate_access(&tenant(), &p1, &doc, &lab)
        .await
        .unwrap();
    engine
        .evaluate_access(&tenant(), &p2, &doc, &lab)
        .await
        .unwrap();
    engine
        .evaluate_access(&tenant(), &p2, &doc, &lab)
        .await
        .unwrap();

    let report = engine
        .generate_report(
            &tenant(),
            ReportKind::DenialRate {
                window: HOUR,
                professional_id: None,
            },
        )
        .await
        .unwrap();
    let Report::DenialRate(report) = report else {
        panic!("wrong report variant");
    };
    assert_eq!(report.evaluations, 3);
    assert_eq!(report.allowed, 1);
    assert_eq!(report.denied, 2);
    assert!((report.denial_rate - 2.0 / 3.0).abs() < f64::EPSILON);

    // Restricted to the professional holding the blanket policy.
    let report = engine
        .generate_report(
            &tenant(),
            ReportKind::DenialRate {
                window: HOUR,
                professional_id: Some(p1),
            },
        )
        .await
        .unwrap();
    let Report::DenialRate(report) = report else {
        panic!("wrong report variant");
    };
    assert_eq!(report.evaluations, 1);
    assert_eq!(report.denied, 0);
    assert!(report.denial_rate.abs() < f64::EPSILON);
}

#[tokio::test]
async fn empty_window_has_zero_denial_rate() {
    let (engine, _) = setup();
    let report = engine
        .generate_report(
            &tenant(),
            ReportKind::DenialRate {
                window: HOUR,
                professional_id: None,
            },
        )
        .await
        .unwrap();
    let Report::DenialRate(report) = report else {
        panic!("wrong report variant");
    };
    assert_eq!(report.evaluations, 0);
    assert!(report.denial_rate.abs() < f64::EPSILON);
}

#[tokio::test]
async fn stale_pending_requests_respect_threshold() {
    let (engine, storage) = setup();

    // One request backdated past the default 7-day threshold, one fresh.
    let mut old = AccessRequest::new(
        tenant(),
        ProfessionalId::new("P1"),
        PolicyScope::by_types(["LAB_RESULT"]),
        "f/u",
    );
    old.created_at = now_utc() - 10 * DAY;
    RequestStorage::create(storage.as_ref(), &old).await.unwrap();

    engine
        .submit_request(
            tenant(),
            ProfessionalId::new("P2"),
            PolicyScope::specific("doc123"),
            "second opinion",
        )
        .await
        .unwrap();

    let report = engine
        .generate_report(&tenant(), ReportKind::StalePendingRequests { older_than: None })
        .await
        .unwrap();
    let Report::StalePendingRequests(report) = report else {
        panic!("wrong report variant");
    };
    assert_eq!(report.older_than, 7 * DAY);
    assert_eq!(report.requests.len(), 1);
    assert_eq!(report.requests[0].id, old.id);

    // A wider threshold leaves nothing stale.
    let report = engine
        .generate_report(
            &tenant(),
            ReportKind::StalePendingRequests {
                older_than: Some(30 * DAY),
            },
        )
        .await
        .unwrap();
    let Report::StalePendingRequests(report) = report else {
        panic!("wrong report variant");
    };
    assert!(report.requests.is_empty());
}

#[tokio::test]
async fn expiry_forecast_splits_expiring_from_lapsed() {
    let (engine, _) = setup();
    let now = now_utc();

    let expiring_soon = engine
        .create_policy(
            tenant(),
            ProfessionalId::new("P1"),
            PolicyScope::AllDocuments,
            PolicyDuration::Temporary {
                expires_at: now + 10 * DAY,
            },
            ManagementType::Automatic,
        )
        .await
        .unwrap();
    engine
        .create_policy(
            tenant(),
            ProfessionalId::new("P2"),
            PolicyScope::AllDocuments,
            PolicyDuration::Temporary {
                expires_at: now - DAY,
            },
            ManagementType::Automatic,
        )
        .await
        .unwrap();
    engine
        .create_policy(
            tenant(),
            ProfessionalId::new("P3"),
            PolicyScope::AllDocuments,
            PolicyDuration::Indefinite,
            ManagementType::Automatic,
        )
        .await
        .unwrap();
    // Outside the 30-day horizon.
    engine
        .create_policy(
            tenant(),
            ProfessionalId::new("P4"),
            PolicyScope::AllDocuments,
            PolicyDuration::Temporary {
                expires_at: now + 90 * DAY,
            },
            ManagementType::Automatic,
        )
        .await
        .unwrap();

    let report = engine
        .generate_report(&tenant(), ReportKind::ExpiryForecast { within: None })
        .await
        .unwrap();
    let Report::ExpiryForecast(report) = report else {
        panic!("wrong report variant");
    };
    assert_eq!(report.within, 30 * DAY);
    assert_eq!(report.expiring.len(), 1);
    assert_eq!(report.expiring[0].id, expiring_soon.id);
    assert_eq!(report.lapsed, 1);
}

#[tokio::test]
async fn professional_activity_orders_by_volume() {
    let (engine, _) = setup();
    let busy = ProfessionalId::new("busy");
    let quiet = ProfessionalId::new("quiet");

    engine
        .create_policy(
            tenant(),
            busy.clone(),
            PolicyScope::AllDocuments,
            PolicyDuration::Indefinite,
            ManagementType::Automatic,
        )
        .await
        .unwrap();

    let doc = DocumentId::new("doc123");
    let lab = DocumentType::new("LAB_RESULT");
    for _ in 0..3 {
        engine
            .evaluate_access(&tenant(), &busy, &doc, &lab)
            .await
            .unwrap();
    }
    engine
        .evaluate_access(&tenant(), &quiet, &doc, &lab)
        .await
        .unwrap();

    let report = engine
        .generate_report(&tenant(), ReportKind::ProfessionalActivity { window: HOUR })
        .await
        .unwrap();
    let Report::ProfessionalActivity(report) = report else {
        panic!("wrong report variant");
    };
    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].professional_id, busy);
    assert_eq!(report.entries[0].allowed, 3);
    assert_eq!(report.entries[0].denied, 0);
    assert_eq!(report.entries[1].professional_id, quiet);
    assert_eq!(report.entries[1].denied, 1);
}
