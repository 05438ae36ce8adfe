// ==========================================
// ShiftAggregator 集成测试
// ==========================================
// 测试范围:
// 1. 三班分区: 同一生产日的记录恰好落入一个班次
// 2. 缓存: 16 小时有效期、热缓存不感知新记录、到期重算
// 3. 降级: 订单缺失 / 物料缺失 / 单重缺失计 0
// 4. 缓存注入: 多个聚合器共享同一缓存存储
// ==========================================

mod helpers;

use chrono::Duration;
use helpers::test_data_builder::*;
use shift_tonnage::domain::types::ShiftName;
use shift_tonnage::engine::{
    production_day_of, InMemoryShiftCache, ShiftAggregator, ShiftCacheStore, TonnageCalculator,
};
use shift_tonnage::logging;
use std::sync::Arc;

fn aggregator() -> ShiftAggregator {
    logging::init_test();
    ShiftAggregator::new(TonnageCalculator::new(Arc::new(standard_catalog())))
}

// ==========================================
// 分区测试
// ==========================================

#[test]
fn test_records_partition_into_three_shifts() {
    let agg = aggregator();
    let orders = vec![
        OrderBuilder::new("A").product("Foil-X").build(),
        OrderBuilder::new("B").product("Cup-200").build(),
    ];
    let records = vec![
        RecordBuilder::new("A", at(10, 6, 0)).produced(10).build(), // 早班 0.005
        RecordBuilder::new("B", at(10, 14, 0)).produced(100).build(), // 中班 0.07
        RecordBuilder::new("A", at(10, 23, 0)).produced(20).build(), // 夜班 0.01
        RecordBuilder::new("B", at(11, 3, 0)).produced(50).build(), // 夜班（跨零点）0.035
        RecordBuilder::new("A", at(10, 5, 0)).produced(999).build(), // 前一生产日
        RecordBuilder::new("A", at(11, 6, 0)).produced(999).build(), // 后一生产日
    ];

    let now = at(11, 4, 0);
    let result = agg.aggregate_tonnage_by_shift(&records, &orders, now);

    assert_close(result.morning, 0.005);
    assert_close(result.afternoon, 0.07);
    assert_close(result.night, 0.045);
    assert_close(result.total(), 0.12);
}

#[test]
fn test_boundary_minutes_are_exact() {
    let agg = aggregator();
    let orders = vec![OrderBuilder::new("A").build()];
    let records = vec![
        RecordBuilder::new("A", at(10, 5, 32)).produced(2).build(),  // 早班第一分钟
        RecordBuilder::new("A", at(10, 13, 49)).produced(4).build(), // 早班最后一分钟
        RecordBuilder::new("A", at(10, 13, 50)).produced(6).build(), // 中班第一分钟
        RecordBuilder::new("A", at(10, 22, 8)).produced(8).build(),  // 夜班第一分钟
    ];

    let result = agg.aggregate_tonnage_by_shift(&records, &orders, at(10, 23, 0));
    assert_close(result.morning, 6.0 * 0.0005);
    assert_close(result.afternoon, 6.0 * 0.0005);
    assert_close(result.night, 8.0 * 0.0005);
}

// ==========================================
// 缓存测试
// ==========================================

#[test]
fn test_warm_cache_ignores_new_records_until_expiry() {
    let agg = aggregator();
    let orders = vec![OrderBuilder::new("A").build()];
    let mut records = vec![RecordBuilder::new("A", at(10, 6, 0)).produced(10).build()];

    let first = agg.aggregate_tonnage_by_shift(&records, &orders, at(10, 7, 0));
    assert_close(first.morning, 0.005);

    // 新记录进入同一班次，但缓存仍然有效
    records.push(RecordBuilder::new("A", at(10, 7, 30)).produced(10).build());
    let warm = agg.aggregate_tonnage_by_shift(&records, &orders, at(10, 8, 0));
    assert_close(warm.morning, 0.005);

    // 创建后 16 小时整视为过期
    let expired = agg.aggregate_tonnage_by_shift(&records, &orders, at(10, 23, 0));
    assert_close(expired.morning, 0.01);
}

#[test]
fn test_cache_entries_cover_all_shifts_of_production_day() {
    let agg = aggregator();
    let orders = vec![OrderBuilder::new("A").build()];
    let records = vec![RecordBuilder::new("A", at(10, 6, 0)).produced(10).build()];
    let now = at(10, 7, 0);

    agg.aggregate_tonnage_by_shift(&records, &orders, now);
    assert_eq!(agg.cache().len(), 3);

    // 新生产日使用新的缓存键
    agg.aggregate_tonnage_by_shift(&records, &orders, at(11, 7, 0));
    assert_eq!(agg.cache().len(), 6);

    assert_eq!(agg.purge_expired(now + Duration::hours(16)), 3);
    assert_eq!(agg.cache().len(), 3);

    agg.clear_cache();
    assert!(agg.cache().is_empty());
}

#[test]
fn test_invalidate_shift_only_touches_that_shift() {
    let agg = aggregator();
    let orders = vec![OrderBuilder::new("A").build()];
    let mut records = vec![
        RecordBuilder::new("A", at(10, 6, 0)).produced(10).build(),
        RecordBuilder::new("A", at(10, 14, 0)).produced(10).build(),
    ];
    let now = at(10, 15, 0);
    agg.aggregate_tonnage_by_shift(&records, &orders, now);

    records.push(RecordBuilder::new("A", at(10, 7, 0)).produced(10).build());
    records.push(RecordBuilder::new("A", at(10, 14, 30)).produced(10).build());

    assert!(agg.invalidate_shift(production_day_of(now), ShiftName::Morning));
    assert!(!agg.invalidate_shift(production_day_of(now), ShiftName::Morning));

    let result = agg.aggregate_tonnage_by_shift(&records, &orders, now);
    assert_close(result.morning, 0.01);
    assert_close(result.afternoon, 0.005);
}

#[test]
fn test_shared_cache_store_between_aggregators() {
    let catalog = Arc::new(standard_catalog());
    let cache: Arc<dyn ShiftCacheStore> = Arc::new(InMemoryShiftCache::new());
    let first = ShiftAggregator::with_cache(
        TonnageCalculator::new(Arc::clone(&catalog)),
        Arc::clone(&cache),
        Duration::hours(1),
    );
    let second = ShiftAggregator::with_cache(
        TonnageCalculator::new(catalog),
        Arc::clone(&cache),
        Duration::hours(1),
    );

    let orders = vec![OrderBuilder::new("A").build()];
    let records = vec![RecordBuilder::new("A", at(10, 6, 0)).produced(10).build()];
    first.aggregate_tonnage_by_shift(&records, &orders, at(10, 7, 0));

    // 第二个聚合器命中共享缓存，即使传入空记录
    let hit = second.aggregate_tonnage_by_shift(&[], &orders, at(10, 7, 30));
    assert_close(hit.morning, 0.005);

    // 1 小时有效期到期后重算
    let miss = second.aggregate_tonnage_by_shift(&[], &orders, at(10, 8, 0));
    assert_eq!(miss.morning, 0.0);
}

#[test]
fn test_oversized_ttl_does_not_overflow() {
    let agg = ShiftAggregator::with_cache(
        TonnageCalculator::new(Arc::new(standard_catalog())),
        Arc::new(InMemoryShiftCache::new()),
        Duration::hours(10_000_000_000),
    );

    let result = agg.aggregate_tonnage_by_shift(&[], &[], at(10, 7, 0));
    assert_eq!(result.total(), 0.0);
    assert_eq!(agg.cache().len(), 3);
}

// ==========================================
// 降级测试
// ==========================================

#[test]
fn test_data_quality_problems_contribute_zero() {
    let agg = aggregator();
    let orders = vec![
        OrderBuilder::new("A").product("Foil-X").build(),
        OrderBuilder::new("U").product("Unknown").build(),
        OrderBuilder::new("L").product("Lid-90").build(),
    ];
    let records = vec![
        RecordBuilder::new("A", at(10, 6, 0)).produced(10).build(),
        RecordBuilder::new("U", at(10, 6, 10)).produced(10).build(),
        RecordBuilder::new("L", at(10, 6, 20)).produced(10).build(),
        RecordBuilder::new("GHOST", at(10, 6, 30)).produced(10).build(),
    ];

    let result = agg.aggregate_tonnage_by_shift(&records, &orders, at(10, 7, 0));
    assert_close(result.morning, 0.005);
    assert_eq!(result.afternoon, 0.0);
    assert_eq!(result.night, 0.0);
}

#[test]
fn test_stored_shift_wins_over_timestamp() {
    let agg = aggregator();
    let orders = vec![OrderBuilder::new("A").build()];
    let records = vec![RecordBuilder::new("A", at(10, 13, 55))
        .produced(10)
        .shift(ShiftName::Morning)
        .build()];

    let result = agg.aggregate_tonnage_by_shift(&records, &orders, at(10, 15, 0));
    assert_close(result.morning, 0.005);
    assert_eq!(result.afternoon, 0.0);
}

// ==========================================
// 统计测试
// ==========================================

#[test]
fn test_statistics_and_current_shift_share_partition() {
    let agg = aggregator();
    let orders = vec![
        OrderBuilder::new("A").product("Foil-X").build(),
        OrderBuilder::new("B").product("Cup-200").build(),
    ];
    let records = vec![
        RecordBuilder::new("A", at(10, 23, 0)).produced(20).build(),
        RecordBuilder::new("B", at(11, 2, 0)).produced(100).build(),
        RecordBuilder::new("A", at(10, 9, 0)).produced(10).build(),
    ];
    let now = at(11, 3, 0);

    let stats = agg.calculate_shift_statistics(&records, &orders, now);
    assert_eq!(stats.shifts.night.record_count, 2);
    assert_close(stats.shifts.night.total_t, 0.08);
    assert_close(stats.shifts.night.average_t_per_hour, 0.01);
    assert_eq!(stats.shifts.morning.record_count, 1);

    let current = agg.calculate_current_shift_total_tonnage(&records, &orders, now);
    assert_eq!(current.shift, ShiftName::Night);
    assert_close(current.total_t, stats.shifts.night.total_t);
    assert_eq!(current.by_material[0].product_name, "Cup-200");
    assert_eq!(current.by_material[1].product_name, "Foil-X");
}
