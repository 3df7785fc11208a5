// ==========================================
// 生产监控驾驶舱 - 设备领域模型
// ==========================================

use crate::domain::types::MachineStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// Machine - 设备
// ==========================================
// 用途: 设备利用率计算、设备状态卡片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    pub name: String,
    pub status: MachineStatus,
    pub production_line_id: Option<String>,
    pub failure_reason: Option<String>, // 仅 status=failure 时有意义
}

impl Machine {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: MachineStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            production_line_id: None,
            failure_reason: None,
        }
    }

    pub fn is_working(&self) -> bool {
        self.status == MachineStatus::Working
    }
}
