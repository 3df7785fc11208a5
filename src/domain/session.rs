// ==========================================
// 生产监控驾驶舱 - 会话上下文
// ==========================================
// 红线: 不读取全局登录状态，当前用户由调用方显式传入
// 说明: 认证本身由外部服务完成，这里只承载认证结果
// ==========================================

use crate::domain::types::UserRole;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: String,
    pub display_name: String,
    pub role: UserRole,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role,
        }
    }

    /// 录入生产数据：任何已登录用户
    pub fn can_insert_records(&self) -> bool {
        !self.user_id.trim().is_empty()
    }

    /// 修改已录入数据：管理员与班组长
    pub fn can_update_records(&self) -> bool {
        self.can_insert_records() && matches!(self.role, UserRole::Admin | UserRole::Foreman)
    }
}
