// ==========================================
// 班次吨位引擎 - 班次吨位缓存
// ==========================================
// 键: (生产日, 班次)
// 值: 吨位 + 创建时间 + 过期时间（创建 + TTL，默认 16 小时）
// 红线: 过期条目永远不能作为权威结果，读取时即删除
// ==========================================

use crate::domain::types::ShiftName;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// 默认缓存有效期（小时）
pub const DEFAULT_CACHE_TTL_HOURS: i64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShiftCacheKey {
    pub production_day: NaiveDate,
    pub shift: ShiftName,
}

impl ShiftCacheKey {
    pub fn new(production_day: NaiveDate, shift: ShiftName) -> Self {
        Self {
            production_day,
            shift,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftCacheEntry {
    pub tonnage_t: f64,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl ShiftCacheEntry {
    /// 过期时间溢出时取 NaiveDateTime::MAX
    pub fn new(tonnage_t: f64, created_at: NaiveDateTime, ttl: Duration) -> Self {
        Self {
            tonnage_t,
            created_at,
            expires_at: created_at
                .checked_add_signed(ttl)
                .unwrap_or(NaiveDateTime::MAX),
        }
    }

    /// 仅当 now < expires_at 时有效
    pub fn is_valid_at(&self, now: NaiveDateTime) -> bool {
        now < self.expires_at
    }
}

// ==========================================
// Trait: ShiftCacheStore
// ==========================================
// 可注入的缓存存储；多实例部署时各实例独立，不做协调
pub trait ShiftCacheStore: Send + Sync {
    /// 读取有效条目；已过期的条目在此删除并返回 None
    fn get(&self, key: &ShiftCacheKey, now: NaiveDateTime) -> Option<ShiftCacheEntry>;

    /// 写入条目（后写覆盖先写）
    fn put(&self, key: ShiftCacheKey, entry: ShiftCacheEntry);

    /// 显式失效，返回是否删除了条目
    fn invalidate(&self, key: &ShiftCacheKey) -> bool;

    fn clear(&self);

    /// 清理所有过期条目，返回清理数量
    fn purge_expired(&self, now: NaiveDateTime) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ==========================================
// InMemoryShiftCache - 进程内缓存
// ==========================================
// 并发: Mutex 串行化读写
#[derive(Debug, Default)]
pub struct InMemoryShiftCache {
    entries: Mutex<HashMap<ShiftCacheKey, ShiftCacheEntry>>,
}

impl InMemoryShiftCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ShiftCacheKey, ShiftCacheEntry>> {
        // 缓存内容可随时重算，锁中毒时继续使用内部数据
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ShiftCacheStore for InMemoryShiftCache {
    fn get(&self, key: &ShiftCacheKey, now: NaiveDateTime) -> Option<ShiftCacheEntry> {
        let mut entries = self.lock();
        match entries.get(key).copied() {
            Some(entry) if entry.is_valid_at(now) => Some(entry),
            Some(entry) => {
                entries.remove(key);
                tracing::debug!(
                    production_day = %key.production_day,
                    shift = %key.shift,
                    expires_at = %entry.expires_at,
                    "shift cache entry expired"
                );
                None
            }
            None => None,
        }
    }

    fn put(&self, key: ShiftCacheKey, entry: ShiftCacheEntry) {
        self.lock().insert(key, entry);
    }

    fn invalidate(&self, key: &ShiftCacheKey) -> bool {
        self.lock().remove(key).is_some()
    }

    fn clear(&self) {
        self.lock().clear();
    }

    fn purge_expired(&self, now: NaiveDateTime) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_valid_at(now));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
