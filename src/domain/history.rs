// ==========================================
// 生产监控驾驶舱 - 生产数据变更历史
// ==========================================
// 对齐: production_data_history 表
// 用途: KPI 历史面板（分页，按变更时间倒序）
// ==========================================

use crate::domain::production::RawProductionRow;
use crate::domain::types::HistoryAction;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub history_id: String,
    pub production_data_id: String,
    pub user_id: Option<String>,
    pub action: HistoryAction,
    pub created_at: NaiveDateTime,
    pub snapshot: RawProductionRow, // 变更后的记录快照
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    pub total_count: u64,
    pub page: u32,     // 从 1 开始
    pub per_page: u32,
}

impl HistoryPage {
    /// 总页数（无数据时为 0）
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        let pages = self.total_count.div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total_count: u64, page: u32, per_page: u32) -> HistoryPage {
        HistoryPage {
            entries: Vec::new(),
            total_count,
            page,
            per_page,
        }
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(page(0, 1, 100).total_pages(), 0);
        assert_eq!(page(100, 1, 100).total_pages(), 1);
        assert_eq!(page(101, 1, 100).total_pages(), 2);
        assert!(page(101, 1, 100).has_next());
        assert!(!page(101, 2, 100).has_next());
    }
}
