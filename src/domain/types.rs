// ==========================================
// 生产监控驾驶舱 - 领域类型定义
// ==========================================
// 存储格式: 小写 snake_case (与 production_data / machines 表一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 班次 (Shift)
// ==========================================
// 每天三个固定 8 小时班次
// 顺序: Morning < Afternoon < Night
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Morning,   // 早班
    Afternoon, // 中班
    Night,     // 夜班
}

impl Shift {
    /// 全部班次（按日内顺序）
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Night];

    /// 从字符串解析班次（大小写不敏感）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Some(Shift::Morning),
            "afternoon" => Some(Shift::Afternoon),
            "night" => Some(Shift::Night),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Shift::Morning => "morning",
            Shift::Afternoon => "afternoon",
            Shift::Night => "night",
        }
    }

    /// 在 [`Shift::ALL`] 中的下标
    pub fn index(&self) -> usize {
        match self {
            Shift::Morning => 0,
            Shift::Afternoon => 1,
            Shift::Night => 2,
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 视图模式 (View Mode)
// ==========================================
// 决定日期范围推导方式与桶标签格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Week,  // 最近 7 天（含参考日）
    Month, // 参考日所在自然月
    Year,  // 参考日所在自然年
}

impl ViewMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "week" => Some(ViewMode::Week),
            "month" => Some(ViewMode::Month),
            "year" => Some(ViewMode::Year),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ViewMode::Week => "week",
            ViewMode::Month => "month",
            ViewMode::Year => "year",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 设备状态 (Machine Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    Working, // 运行中
    Service, // 保养中
    Failure, // 故障
    Unknown, // 存储中的状态值无法识别
}

impl MachineStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "working" => Some(MachineStatus::Working),
            "service" => Some(MachineStatus::Service),
            "failure" => Some(MachineStatus::Failure),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MachineStatus::Working => "working",
            MachineStatus::Service => "service",
            MachineStatus::Failure => "failure",
            MachineStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 用户角色 (User Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,   // 管理员
    Foreman, // 班组长
    Worker,  // 操作工
}

impl UserRole {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "foreman" => Some(UserRole::Foreman),
            "worker" => Some(UserRole::Worker),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Foreman => "foreman",
            UserRole::Worker => "worker",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 重复记录合并策略 (Merge Policy)
// ==========================================
// 同一 (日期, 班次) 出现多条记录时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergePolicy {
    #[default]
    Sum,           // 累加
    LastWriteWins, // 按输入顺序，后到覆盖先到
}

impl MergePolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SUM" => Some(MergePolicy::Sum),
            "LAST_WRITE_WINS" => Some(MergePolicy::LastWriteWins),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MergePolicy::Sum => "SUM",
            MergePolicy::LastWriteWins => "LAST_WRITE_WINS",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 变更历史动作 (History Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
}

impl HistoryAction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "create" => Some(HistoryAction::Create),
            "update" => Some(HistoryAction::Update),
            "delete" => Some(HistoryAction::Delete),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            HistoryAction::Create => "create",
            HistoryAction::Update => "update",
            HistoryAction::Delete => "delete",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_parse_and_order() {
        assert_eq!(Shift::from_str("Morning"), Some(Shift::Morning));
        assert_eq!(Shift::from_str(" night "), Some(Shift::Night));
        assert_eq!(Shift::from_str("evening"), None);
        assert!(Shift::Morning < Shift::Afternoon && Shift::Afternoon < Shift::Night);
        for (i, shift) in Shift::ALL.iter().enumerate() {
            assert_eq!(shift.index(), i);
        }
    }

    #[test]
    fn test_serde_uses_db_strings() {
        assert_eq!(serde_json::to_string(&Shift::Afternoon).unwrap(), "\"afternoon\"");
        assert_eq!(
            serde_json::to_string(&MergePolicy::LastWriteWins).unwrap(),
            "\"LAST_WRITE_WINS\""
        );
        let status: MachineStatus = serde_json::from_str("\"failure\"").unwrap();
        assert_eq!(status, MachineStatus::Failure);
    }

    #[test]
    fn test_merge_policy_default_is_sum() {
        assert_eq!(MergePolicy::default(), MergePolicy::Sum);
        assert_eq!(MergePolicy::from_str("last_write_wins"), Some(MergePolicy::LastWriteWins));
    }
}
