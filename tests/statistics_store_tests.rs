// StatisticsStore tests: full samples, per-category projection, ordering, failures

mod common;

use squzy_storage::error::StoreError;
use squzy_storage::models::*;
use squzy_storage::storage::CountScope;
use tempfile::TempDir;

const T: i64 = 1_700_000_000;

#[tokio::test]
async fn full_query_returns_complete_samples() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let store = db.statistics();

    let s = common::sample("agent-1", T);
    store.insert(&s).await.unwrap();

    let page = store.query_full("agent-1", None, None).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.records, vec![s]);
}

#[tokio::test]
async fn absent_and_empty_categories_survive_storage() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let store = db.statistics();

    let bare = common::bare_sample("agent-1", T);
    let mut empty = common::bare_sample("agent-1", T + 1);
    empty.cpu_info = Some(vec![]);
    empty.disk_info = Some(vec![]);
    empty.net_info = Some(vec![]);
    empty.memory_info = Some(MemoryInfo {
        mem: Some(common::memory(1_024, 1_000)),
        swap: None,
    });
    store.insert(&bare).await.unwrap();
    store.insert(&empty).await.unwrap();

    let page = store.query_full("agent-1", None, None).await.unwrap();
    assert_eq!(page.records, vec![bare, empty]);
}

#[tokio::test]
async fn large_counters_survive_storage() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let store = db.statistics();

    let mut s = common::sample("agent-1", T);
    s.net_info.as_mut().unwrap()[0].bytes_sent = u64::MAX;
    s.disk_info.as_mut().unwrap()[1].total = i64::MAX as u64 + 42;
    store.insert(&s).await.unwrap();

    let page = store.query_full("agent-1", None, None).await.unwrap();
    assert_eq!(page.records[0], s);
}

#[tokio::test]
async fn non_finite_floats_survive_storage() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let store = db.statistics();

    let mut s = common::sample("agent-1", T);
    s.cpu_info = Some(vec![f64::NAN, 1.5, f64::INFINITY]);
    let memory = s.memory_info.as_mut().unwrap();
    memory.swap.as_mut().unwrap().used_percent = f64::NAN;
    s.disk_info.as_mut().unwrap()[0].used_percent = f64::NAN;
    s.disk_info.as_mut().unwrap()[1].used_percent = f64::NEG_INFINITY;
    store.insert(&s).await.unwrap();

    let page = store.query_full("agent-1", None, None).await.unwrap();
    let got = &page.records[0];
    let cpu = got.cpu_info.as_ref().unwrap();
    assert!(cpu[0].is_nan());
    assert_eq!(cpu[1..], [1.5, f64::INFINITY]);
    let memory = got.memory_info.as_ref().unwrap();
    assert!(memory.swap.as_ref().unwrap().used_percent.is_nan());
    assert_eq!(memory.mem, s.memory_info.as_ref().unwrap().mem);
    let disks = got.disk_info.as_ref().unwrap();
    assert!(disks[0].used_percent.is_nan());
    assert_eq!(disks[1].used_percent, f64::NEG_INFINITY);
    assert_eq!(disks[0].name, "/");
}

#[tokio::test]
async fn nan_cpu_load_is_stored_for_bare_sample() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let store = db.statistics();
    let mut s = common::bare_sample("agent-1", T);
    s.cpu_info = Some(vec![f64::NAN]);
    store.insert(&s).await.unwrap();

    let page = store.query_cpu("agent-1", None, None).await.unwrap();
    let cpu = page.records[0].cpu_info.as_ref().unwrap();
    assert_eq!(cpu.len(), 1);
    assert!(cpu[0].is_nan());
}

#[tokio::test]
async fn category_projection_keeps_only_time_and_category() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let store = db.statistics();

    let mut s = common::sample("agent-1", T);
    s.disk_info = Some(vec![]);
    store.insert(&s).await.unwrap();

    let page = store
        .query_category("agent-1", None, None, Category::Disk)
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    let got = &page.records[0];
    assert_eq!(got.time, s.time);
    assert_eq!(got.disk_info, Some(vec![]));
    assert_eq!(got.cpu_info, None);
    assert_eq!(got.memory_info, None);
    assert_eq!(got.net_info, None);
    assert!(got.agent_id.is_empty());
    assert!(got.agent_name.is_empty());
}

#[tokio::test]
async fn each_category_accessor_returns_its_own_data() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let store = db.statistics();
    let s = common::sample("agent-1", T);
    store.insert(&s).await.unwrap();

    let cpu = store.query_cpu("agent-1", None, None).await.unwrap();
    assert_eq!(cpu.records[0].cpu_info, s.cpu_info);
    assert_eq!(cpu.records[0].memory_info, None);

    let memory = store.query_memory("agent-1", None, None).await.unwrap();
    assert_eq!(memory.records[0].memory_info, s.memory_info);
    assert_eq!(memory.records[0].cpu_info, None);
    assert_eq!(memory.records[0].disk_info, None);

    let disk = store.query_disk("agent-1", None, None).await.unwrap();
    assert_eq!(disk.records[0].disk_info, s.disk_info);
    assert_eq!(disk.records[0].net_info, None);

    let net = store.query_network("agent-1", None, None).await.unwrap();
    assert_eq!(net.records[0].net_info, s.net_info);
    assert_eq!(net.records[0].disk_info, None);
}

#[tokio::test]
async fn projection_of_unreported_category_is_absent() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let store = db.statistics();
    store
        .insert(&common::bare_sample("agent-1", T))
        .await
        .unwrap();

    for category in [Category::Cpu, Category::Memory, Category::Disk, Category::Network] {
        let page = store
            .query_category("agent-1", None, None, category)
            .await
            .unwrap();
        let got = &page.records[0];
        assert_eq!(got.time, Some(common::ts(T)), "{category:?}");
        assert!(got.cpu_info.is_none() && got.memory_info.is_none());
        assert!(got.disk_info.is_none() && got.net_info.is_none());
    }
}

#[tokio::test]
async fn samples_are_ordered_by_time_regardless_of_insertion() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let store = db.statistics();
    store.insert(&common::sample("agent-1", T + 5)).await.unwrap();
    store.insert(&common::sample("agent-1", T)).await.unwrap();

    let page = store.query_full("agent-1", None, None).await.unwrap();
    let times: Vec<i64> = page.records.iter().map(|s| s.time.unwrap().seconds).collect();
    assert_eq!(times, vec![T, T + 5]);

    let page = store.query_cpu("agent-1", None, None).await.unwrap();
    let times: Vec<i64> = page.records.iter().map(|s| s.time.unwrap().seconds).collect();
    assert_eq!(times, vec![T, T + 5]);
}

#[tokio::test]
async fn nested_rows_stay_with_their_own_sample() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let store = db.statistics();
    let mut a = common::sample("agent-1", T);
    a.cpu_info = Some(vec![1.0]);
    let mut b = common::sample("agent-1", T + 1);
    b.cpu_info = Some(vec![2.0, 3.0]);
    let other = common::sample("agent-2", T);
    store.insert(&a).await.unwrap();
    store.insert(&other).await.unwrap();
    store.insert(&b).await.unwrap();

    let page = store.query_full("agent-1", None, None).await.unwrap();
    assert_eq!(page.records, vec![a, b]);
}

#[tokio::test]
async fn pagination_and_window_apply_to_category_queries() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let store = db.statistics();
    for i in 0..6 {
        store.insert(&common::sample("agent-1", T + i)).await.unwrap();
    }

    let filter = TimeFilter {
        from: Some(common::ts(T + 1)),
        to: Some(common::ts(T + 4)),
    };
    let pagination = Pagination {
        page: 1,
        page_size: 3,
    };
    let page = store
        .query_network("agent-1", Some(&pagination), Some(&filter))
        .await
        .unwrap();
    assert_eq!(page.total_count, 4);
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].time, Some(common::ts(T + 4)));
}

#[tokio::test]
async fn owner_count_scope_counts_every_sample_of_the_agent() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Owner).await;
    let store = db.statistics();
    for i in 0..4 {
        store.insert(&common::bare_sample("agent-1", T + i)).await.unwrap();
    }
    let filter = TimeFilter {
        from: Some(common::ts(T + 3)),
        to: None,
    };
    let page = store.query_full("agent-1", None, Some(&filter)).await.unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.total_count, 4);
}

#[tokio::test]
async fn sample_without_agent_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let err = db
        .statistics()
        .insert(&common::sample("", T))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conversion(_)));
}

#[tokio::test]
async fn failed_insert_leaves_no_rows() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    let store = db.statistics();
    sqlx::query(
        "CREATE TRIGGER reject_net BEFORE INSERT ON net_info BEGIN SELECT RAISE(ABORT, 'net rejected'); END",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let err = store.insert(&common::sample("agent-1", T)).await.unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));

    let page = store.query_cpu("agent-1", None, None).await.unwrap();
    assert!(page.records.is_empty());
    assert_eq!(page.total_count, 0);
    for table in ["stat_requests", "cpu_info", "memory_info", "memory", "disk_info"] {
        let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 0, "{table}");
    }
}

#[tokio::test]
async fn deleting_a_sample_cascades_to_nested_rows() {
    let dir = TempDir::new().unwrap();
    let db = common::temp_db(&dir, CountScope::Window).await;
    db.statistics()
        .insert(&common::sample("agent-1", T))
        .await
        .unwrap();

    sqlx::query("DELETE FROM stat_requests")
        .execute(db.pool())
        .await
        .unwrap();
    for table in ["cpu_info", "memory_info", "memory", "disk_info", "net_info"] {
        let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 0, "{table}");
    }
}
