//! 组件作用域

use serde::{Deserialize, Serialize};
use std::fmt;

/// 组件作用域
///
/// 注册时确定，之后不可更改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// 单例模式 - 重置前每次解析都返回同一个实例
    #[default]
    Singleton,
    /// 原型模式 - 每次解析都按构造规则创建新实例
    Prototype,
}

impl Scope {
    /// 是否为单例
    pub fn is_singleton(self) -> bool {
        matches!(self, Self::Singleton)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => f.write_str("singleton"),
            Self::Prototype => f.write_str("prototype"),
        }
    }
}
