//! Golden tests for stay billing.
//!
//! Each case is stored in a fresh database and billed through the store.

use chrono::NaiveDate;
use ipd_billing_core::billing::StayBiller;
use ipd_billing_core::config::{BillingPolicy, RateMissPolicy};
use ipd_billing_core::db::Database;
use ipd_billing_core::models::{
    Admission, BillCharges, BillingWarning, Patient, ProcedureEntry, ProcedureRate, RoomType,
    Settlement,
};
use rust_decimal::Decimal;

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    admitted: &'static str,
    discharged: &'static str,
    room_type: RoomType,
    diet_per_day: &'static str,
    doctor_per_day: &'static str,
    nursing_per_day: &'static str,
    deposit: &'static str,
    /// (name, start, end)
    procedures: Vec<(&'static str, &'static str, &'static str)>,
    expected_days: u32,
    expected_bed: &'static str,
    expected_procedures: &'static str,
    expected_total: &'static str,
    expected_settlement: Settlement,
    expected_misses: usize,
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "ac-five-days",
            admitted: "2024-01-01",
            discharged: "2024-01-05",
            room_type: RoomType::Ac,
            diet_per_day: "0",
            doctor_per_day: "0",
            nursing_per_day: "0",
            deposit: "0",
            procedures: vec![],
            expected_days: 5,
            expected_bed: "3750",
            expected_procedures: "0",
            expected_total: "3750",
            expected_settlement: Settlement::Due(dec("3750")),
            expected_misses: 0,
        },
        GoldenCase {
            id: "same-day-non-ac",
            admitted: "2024-03-10",
            discharged: "2024-03-10",
            room_type: RoomType::NonAc,
            diet_per_day: "120",
            doctor_per_day: "200",
            nursing_per_day: "80",
            deposit: "900",
            procedures: vec![],
            expected_days: 1,
            expected_bed: "500",
            expected_procedures: "0",
            expected_total: "900",
            expected_settlement: Settlement::Settled,
            expected_misses: 0,
        },
        GoldenCase {
            id: "one-procedure-refund",
            admitted: "2024-01-01",
            discharged: "2024-01-05",
            room_type: RoomType::NonAc,
            diet_per_day: "50",
            doctor_per_day: "100",
            nursing_per_day: "20",
            deposit: "5000",
            procedures: vec![("Abhyanga", "2024-01-02", "2024-01-03")],
            expected_days: 5,
            expected_bed: "2500",
            expected_procedures: "400",
            // 2500 + 400 + 250 + 500 + 100
            expected_total: "3750",
            expected_settlement: Settlement::Refund(dec("1250")),
            expected_misses: 0,
        },
        GoldenCase {
            id: "many-procedures-with-miss",
            admitted: "2024-02-27",
            discharged: "2024-03-02",
            room_type: RoomType::Ac,
            diet_per_day: "99.99",
            doctor_per_day: "0",
            nursing_per_day: "0",
            deposit: "3000",
            procedures: vec![
                ("Abhyanga", "2024-02-28", "2024-03-01"),
                ("Shirodhara", "2024-03-01", "2024-03-01"),
                ("Shirodara", "2024-03-02", "2024-03-02"),
            ],
            expected_days: 5,
            expected_bed: "3750",
            // 3 x 200 + 1 x 450 + 0
            expected_procedures: "1050",
            // 3750 + 1050 + 499.95
            expected_total: "5299.95",
            expected_settlement: Settlement::Due(dec("2299.95")),
            expected_misses: 1,
        },
    ]
}

fn setup_case(case: &GoldenCase) -> Database {
    let db = Database::open_in_memory().unwrap();
    db.insert_patient(&Patient::new("UHID-G".into(), "Golden Patient".into()))
        .unwrap();
    db.upsert_procedure_rate(&ProcedureRate::new("Abhyanga".into(), dec("200")))
        .unwrap();
    db.upsert_procedure_rate(&ProcedureRate::new("Shirodhara".into(), dec("450")))
        .unwrap();

    let mut admission = Admission::new(
        "UHID-G".into(),
        date(case.admitted),
        "Ward".into(),
        "1".into(),
    );
    admission.ipd_no = case.id.into();
    admission.deposit_amount = dec(case.deposit);
    db.insert_admission(&admission).unwrap();
    db.record_discharge(case.id, date(case.discharged)).unwrap();

    for (name, start, end) in &case.procedures {
        db.insert_procedure_entry(&ProcedureEntry::new(
            case.id.into(),
            (*name).into(),
            date(start),
            date(end),
        ))
        .unwrap();
    }
    db
}

#[test]
fn test_golden_cases() {
    let policy = BillingPolicy::default();

    for case in get_golden_cases() {
        let db = setup_case(&case);
        let charges = BillCharges {
            room_type: case.room_type,
            diet_per_day: dec(case.diet_per_day),
            doctor_per_day: dec(case.doctor_per_day),
            nursing_per_day: dec(case.nursing_per_day),
        };

        let bill = StayBiller::new(&db, &policy)
            .calculate(case.id, &charges)
            .unwrap_or_else(|e| panic!("Case '{}' failed: {}", case.id, e));
        let calc = &bill.calculation;

        assert_eq!(calc.total_days, case.expected_days, "Case '{}': days", case.id);
        assert_eq!(calc.bed_charges, dec(case.expected_bed), "Case '{}': bed", case.id);
        assert_eq!(
            calc.procedure_charges,
            dec(case.expected_procedures),
            "Case '{}': procedures",
            case.id
        );
        assert_eq!(calc.total_amount, dec(case.expected_total), "Case '{}': total", case.id);
        assert_eq!(
            calc.total_amount,
            calc.component_sum(),
            "Case '{}': total must equal its components",
            case.id
        );
        assert_eq!(
            calc.settlement(),
            case.expected_settlement,
            "Case '{}': settlement",
            case.id
        );
        assert_eq!(
            bill.warnings.len(),
            case.expected_misses,
            "Case '{}': warnings",
            case.id
        );
        assert_eq!(
            calc.procedure_details.len(),
            case.procedures.len(),
            "Case '{}': one detail per entry",
            case.id
        );
    }
}

#[test]
fn test_miss_suggests_catalog_name() {
    let case = get_golden_cases()
        .into_iter()
        .find(|c| c.id == "many-procedures-with-miss")
        .unwrap();
    let db = setup_case(&case);

    let policy = BillingPolicy::default();
    let bill = StayBiller::new(&db, &policy)
        .calculate(case.id, &BillCharges::for_room(RoomType::Ac))
        .unwrap();

    assert_eq!(
        bill.warnings,
        vec![BillingWarning::RateLookupMiss {
            procedure_name: "Shirodara".into(),
            suggestion: Some("Shirodhara".into()),
        }]
    );
    let missed = &bill.calculation.procedure_details[2];
    assert_eq!(missed.rate_per_day, Decimal::ZERO);
    assert_eq!(missed.total_cost, Decimal::ZERO);
}

#[test]
fn test_silent_policy_matches_warn_amounts() {
    let case = get_golden_cases()
        .into_iter()
        .find(|c| c.id == "many-procedures-with-miss")
        .unwrap();
    let db = setup_case(&case);
    let charges = BillCharges::for_room(RoomType::Ac);

    let warn = BillingPolicy::default();
    let silent = BillingPolicy {
        rate_miss: RateMissPolicy::Silent,
        ..BillingPolicy::default()
    };

    let warned = StayBiller::new(&db, &warn).calculate(case.id, &charges).unwrap();
    let quiet = StayBiller::new(&db, &silent).calculate(case.id, &charges).unwrap();

    assert_eq!(warned.calculation, quiet.calculation);
    assert!(warned.has_warnings());
    assert!(!quiet.has_warnings());
}

#[test]
fn test_recalculation_is_identical() {
    let policy = BillingPolicy::default();

    for case in get_golden_cases() {
        let db = setup_case(&case);
        let charges = BillCharges::for_room(case.room_type);
        let biller = StayBiller::new(&db, &policy);

        let first = biller.calculate(case.id, &charges).unwrap();
        let second = biller.calculate(case.id, &charges).unwrap();

        assert_eq!(first, second, "Case '{}'", case.id);
        assert_eq!(
            first.calculation.to_canonical_json().unwrap(),
            second.calculation.to_canonical_json().unwrap(),
            "Case '{}'",
            case.id
        );
    }
}
