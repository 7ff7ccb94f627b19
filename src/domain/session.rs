// ==========================================
// 包装物料 BOM 系统 - 会话
// ==========================================
// 职责: 当前登录用户（显式传递，不使用全局可变状态）
// ==========================================

use serde::{Deserialize, Serialize};

/// 未登录时的默认用户名
pub const ANONYMOUS_USER: &str = "Usuario";

/// 编辑会话上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user: String,
}

impl Session {
    /// 以用户名登录（去除首尾空白，空名称返回 None）
    pub fn login(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            user: name.to_string(),
        })
    }

    pub fn anonymous() -> Self {
        Self {
            user: ANONYMOUS_USER.to_string(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn is_anonymous(&self) -> bool {
        self.user == ANONYMOUS_USER
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_trims_and_rejects_empty() {
        assert_eq!(Session::login("  maria ").unwrap().user(), "maria");
        assert!(Session::login("   ").is_none());
        assert!(Session::anonymous().is_anonymous());
    }
}
