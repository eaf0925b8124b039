//! 元数据定义
//!
//! 提供组件类型的元数据信息

use std::any::TypeId;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 简短类型名称（不含模块路径）
    pub name: String,
    /// 完整类型名称
    pub full_name: String,
    /// 类型ID
    pub id: TypeId,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full_name = std::any::type_name::<T>();
        Self {
            name: short_type_name(full_name).to_string(),
            full_name: full_name.to_string(),
            id: TypeId::of::<T>(),
        }
    }

    /// 获取简短的类型名称
    pub fn short_name(&self) -> &str {
        &self.name
    }
}

/// 去掉模块路径，保留泛型参数
///
/// `a::b::Wrapper<c::Inner>` -> `Wrapper<c::Inner>`
pub fn short_type_name(full_name: &str) -> &str {
    let head = full_name.split('<').next().unwrap_or(full_name);
    match head.rfind("::") {
        Some(idx) => &full_name[idx + 2..],
        None => full_name,
    }
}
