// ==========================================
// KPI 聚合管线集成测试
// ==========================================
// 测试目标: SQLite 原始行 → 桶生成 → 班次合并 → KPI 汇总
// ==========================================

mod test_helpers;

use production_kpi::domain::types::{MergePolicy, Shift, ViewMode};
use production_kpi::domain::{DateRange, Machine, MachineStatus};
use production_kpi::engine::{KpiFormatter, ShiftReportEngine};
use production_kpi::logging;
use production_kpi::repository::{MachineRepository, ProductionDataRepository, ProductionRecordStore};
use production_kpi::ProductionRecord;
use test_helpers::{create_test_db, insert_raw_production_row, march, open_test_connection};

#[tokio::test]
async fn test_single_day_morning_shift() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = ProductionDataRepository::new(&db_path).expect("Failed to create repo");
    repo.insert(&ProductionRecord::new(march(1), Shift::Morning, 100, 90, "Widget"), "u1")
        .expect("insert failed");

    let range = DateRange::single_day(march(1));
    let rows = repo.fetch_records(&range).await.expect("fetch failed");
    let report = ShiftReportEngine::default()
        .build(&range, ViewMode::Month, rows, &[])
        .expect("build failed");

    assert_eq!(report.buckets.len(), 1);
    let bucket = &report.buckets[0];
    assert_eq!(bucket.totals(Shift::Morning).planned, 100);
    assert_eq!(bucket.totals(Shift::Morning).actual, 90);
    assert_eq!(bucket.totals(Shift::Afternoon).planned, 0);
    assert_eq!(bucket.totals(Shift::Night).actual, 0);
    assert_eq!(report.summary.total_planned, 100);
    assert_eq!(report.summary.total_actual, 90);
    assert_eq!(report.summary.efficiency_percent, 90.0);
    assert_eq!(report.summary.machine_utilization_percent, 0.0);
}

#[tokio::test]
async fn test_empty_week_produces_seven_zero_buckets() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = ProductionDataRepository::new(&db_path).expect("Failed to create repo");

    let range = DateRange::for_view(ViewMode::Week, march(7));
    let rows = repo.fetch_records(&range).await.expect("fetch failed");
    assert!(rows.is_empty());

    let report = ShiftReportEngine::default()
        .build(&range, ViewMode::Week, rows, &[])
        .expect("build failed");
    assert_eq!(report.buckets.len(), 7);
    assert!(report.buckets.iter().all(|b| b.is_empty()));
    assert_eq!(report.summary.efficiency_percent, 0.0);
    assert!(!report.has_error());
}

#[tokio::test]
async fn test_duplicate_shift_entries_merge_by_policy() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let repo = ProductionDataRepository::new(&db_path).expect("Failed to create repo");
    repo.insert(&ProductionRecord::new(march(1), Shift::Night, 50, 40, "A"), "u1")
        .expect("insert failed");
    repo.insert(&ProductionRecord::new(march(1), Shift::Night, 30, 25, "B"), "u1")
        .expect("insert failed");

    let range = DateRange::single_day(march(1));
    let rows = repo.fetch_records(&range).await.expect("fetch failed");

    let summed = ShiftReportEngine::new(KpiFormatter::default(), MergePolicy::Sum)
        .build(&range, ViewMode::Week, rows.clone(), &[])
        .expect("build failed");
    assert_eq!(summed.buckets[0].totals(Shift::Night).planned, 80);
    assert_eq!(summed.buckets[0].totals(Shift::Night).actual, 65);

    let last = ShiftReportEngine::new(KpiFormatter::default(), MergePolicy::LastWriteWins)
        .build(&range, ViewMode::Week, rows, &[])
        .expect("build failed");
    assert_eq!(last.buckets[0].totals(Shift::Night).planned, 30);
    assert_eq!(last.buckets[0].totals(Shift::Night).actual, 25);

    // 汇总始终为区间内全部记录之和
    assert_eq!(last.summary.total_planned, 80);
    assert_eq!(last.summary.total_actual, 65);
}

#[tokio::test]
async fn test_malformed_rows_are_skipped_not_fatal() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_raw_production_row(&conn, "ok", "2024-03-02", Some("afternoon"), Some(40), Some(20), Some("A"))
        .unwrap();
    insert_raw_production_row(&conn, "no-shift", "2024-03-02", None, Some(10), Some(10), Some("A"))
        .unwrap();
    insert_raw_production_row(&conn, "negative", "2024-03-03", Some("night"), Some(-1), Some(5), None)
        .unwrap();
    insert_raw_production_row(&conn, "bad-date", "2024-03-05x", Some("night"), Some(1), Some(1), None)
        .unwrap();

    let repo = ProductionDataRepository::new(&db_path).expect("Failed to create repo");
    let range = DateRange::new(march(1), march(7)).unwrap();
    let rows = repo.fetch_records(&range).await.expect("fetch failed");

    let report = ShiftReportEngine::default()
        .build(&range, ViewMode::Week, rows, &[])
        .expect("build failed");
    assert_eq!(report.buckets.len(), 7);
    assert_eq!(report.buckets[1].totals(Shift::Afternoon).planned, 40);
    assert_eq!(report.summary.total_planned, 40);
    assert_eq!(report.summary.efficiency_percent, 50.0);

    let mut skipped: Vec<_> = report
        .skipped_records
        .iter()
        .filter_map(|s| s.record_id.clone())
        .collect();
    skipped.sort();
    assert_eq!(skipped, vec!["bad-date", "negative", "no-shift"]);
}

#[tokio::test]
async fn test_machine_utilization_from_registry() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let machines = MachineRepository::new(&db_path).expect("Failed to create repo");
    machines
        .upsert(&Machine::new("m1", "Press A", MachineStatus::Working))
        .unwrap();
    machines
        .upsert(&Machine::new("m2", "Press B", MachineStatus::Working))
        .unwrap();
    machines
        .upsert(&Machine::new("m3", "Lathe", MachineStatus::Service))
        .unwrap();

    let list = machines.find_all().unwrap();
    let range = DateRange::single_day(march(1));
    let report = ShiftReportEngine::default()
        .build(&range, ViewMode::Week, Vec::new(), &list)
        .expect("build failed");

    assert!((report.summary.machine_utilization_percent - 66.667).abs() < 1e-3);
    assert_eq!(report.machine_summary.working, 2);
    assert_eq!(report.machine_summary.service, 1);
    assert_eq!(report.machine_summary.total, 3);
    assert_eq!(
        KpiFormatter::new("en").format_percent(report.summary.machine_utilization_percent),
        "66.7%"
    );
}

#[tokio::test]
async fn test_year_view_of_leap_year() {
    let range = DateRange::for_view(ViewMode::Year, march(15));
    let report = ShiftReportEngine::new(KpiFormatter::new("en"), MergePolicy::Sum)
        .build(&range, ViewMode::Year, Vec::new(), &[])
        .expect("build failed");

    assert_eq!(report.buckets.len(), 366);
    assert_eq!(report.buckets[59].date, chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert_eq!(report.buckets[59].display_label, "Feb");
    assert_eq!(report.buckets[365].display_label, "Dec");
}
