// ==========================================
// 生产监控驾驶舱 - 报表缓存
// ==========================================
// 键: (日期范围, 视图, 语言)
// 失效: 写入记录后按日期失效；更新记录后整体清空
//       每次失效推进失效纪元，纪元变化前发起的请求不得回填缓存
// 容量: 超过上限时淘汰代号最小（最早写入）的条目
// 并发: 每次请求分配递增代号；应答返回时若已有更新的、不同键的请求，
//       则该应答视为过期（最后请求者胜出）
// ==========================================

use crate::domain::date_range::DateRange;
use crate::domain::report::ShiftReport;
use crate::domain::types::ViewMode;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// 缓存键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportKey {
    pub range: DateRange,
    pub view_mode: ViewMode,
    pub locale: &'static str,
}

/// 缓存条目上限
pub const MAX_CACHED_REPORTS: usize = 64;

/// 请求票据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub generation: u64,
    /// 登记时的失效纪元
    pub epoch: u64,
    pub key: ReportKey,
}

struct CachedReport {
    generation: u64,
    report: Arc<ShiftReport>,
}

pub struct ReportCache {
    entries: Mutex<HashMap<ReportKey, CachedReport>>,
    generation: AtomicU64,
    epoch: AtomicU64,
    latest: Mutex<Option<RequestTicket>>,
    capacity: usize,
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::with_capacity(MAX_CACHED_REPORTS)
    }
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            latest: Mutex::new(None),
            capacity: capacity.max(1),
        }
    }

    /// 登记一次新请求，成为"最新请求"
    pub fn begin(&self, key: ReportKey) -> RequestTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let epoch = self.epoch.load(Ordering::SeqCst);
        let ticket = RequestTicket {
            generation,
            epoch,
            key,
        };
        if let Ok(mut latest) = self.latest.lock() {
            // 乱序登记时保留代号更大的请求
            if latest.map_or(true, |current| current.generation < generation) {
                *latest = Some(ticket);
            }
        }
        ticket
    }

    /// 应答是否仍应被展示
    ///
    /// 最新请求本身，或与最新请求同键的请求（结果相同）均视为有效
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        match self.latest.lock() {
            Ok(latest) => match *latest {
                Some(current) => current.generation == ticket.generation || current.key == ticket.key,
                None => true,
            },
            Err(_) => true,
        }
    }

    pub fn get(&self, key: &ReportKey) -> Option<Arc<ShiftReport>> {
        self.entries
            .lock()
            .ok()?
            .get(key)
            .map(|cached| Arc::clone(&cached.report))
    }

    /// 回填请求结果
    ///
    /// 请求发起后发生过失效时拒绝回填（结果可能基于写入前的数据），返回 false
    pub fn insert(&self, ticket: &RequestTicket, report: Arc<ShiftReport>) -> bool {
        let Ok(mut entries) = self.entries.lock() else {
            return false;
        };
        if self.epoch.load(Ordering::SeqCst) != ticket.epoch {
            tracing::debug!(
                generation = ticket.generation,
                range = %ticket.key.range,
                "请求期间缓存已失效，不回填"
            );
            return false;
        }

        entries.insert(
            ticket.key,
            CachedReport {
                generation: ticket.generation,
                report,
            },
        );
        while entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, cached)| cached.generation)
                .map(|(key, _)| *key);
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }
        true
    }

    /// 失效所有覆盖该日期的报表
    pub fn invalidate_date(&self, date: NaiveDate) -> usize {
        match self.entries.lock() {
            Ok(mut entries) => {
                self.epoch.fetch_add(1, Ordering::SeqCst);
                let before = entries.len();
                entries.retain(|key, _| !key.range.contains(date));
                before - entries.len()
            }
            Err(_) => 0,
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
