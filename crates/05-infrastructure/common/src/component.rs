//! 组件基础接口定义
//!
//! 提供所有可注册组件必须实现的基础 trait，以及组件字段依赖（图的边）的收集方式

use crate::errors::ValidationResult;
use crate::metadata::TypeInfo;
use crate::scope::Scope;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::fmt::Debug;
use std::ops::Deref;
use std::sync::{Arc, OnceLock, Weak};

/// 组件引用
///
/// 组件之间通过字段直接持有的共享引用，循环依赖检测沿这些引用遍历
pub type ComponentRef = Arc<dyn Component>;

/// 组件基础 trait
///
/// 所有可注册到容器的组件都必须实现此 trait。无法直接实现此 trait 的外部类型
/// 可以用 [`ComponentAdapter`] 包装。
pub trait Component: Any + Send + Sync + Debug {
    /// 组件名称
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// 组件类型ID
    ///
    /// 与 `Any::type_id` 相同，单独命名以免在 `dyn Component` 上产生歧义
    fn component_type_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// 组件字段中直接持有的其他组件
    ///
    /// 空引用（`None`、未设置的 `OnceLock`、已失效的 `Weak`）不产生边
    fn dependencies(&self) -> Vec<ComponentRef> {
        Vec::new()
    }

    /// 组件能力校验
    ///
    /// 注册前调用，失败时注册返回 `InvalidComponent`
    fn validate(&self) -> ValidationResult<()> {
        Ok(())
    }
}

/// 组件引用的身份标识（数据指针地址）
///
/// 两个结构相同但不同的实例身份不同
pub fn component_identity(component: &ComponentRef) -> usize {
    Arc::as_ptr(component).cast::<()>() as usize
}

/// 组件依赖字段 trait
///
/// 由 `#[derive(Component)]` 对标记为 `#[component(dependency)]` 的字段调用
pub trait DependencyField {
    /// 把字段持有的组件引用追加到 `out`
    fn collect_into(&self, out: &mut Vec<ComponentRef>);
}

impl<T: Component> DependencyField for Arc<T> {
    fn collect_into(&self, out: &mut Vec<ComponentRef>) {
        out.push(self.clone());
    }
}

impl DependencyField for Arc<dyn Component> {
    fn collect_into(&self, out: &mut Vec<ComponentRef>) {
        out.push(Arc::clone(self));
    }
}

impl<T: Component> DependencyField for Weak<T> {
    fn collect_into(&self, out: &mut Vec<ComponentRef>) {
        if let Some(component) = self.upgrade() {
            out.push(component);
        }
    }
}

impl<T: DependencyField> DependencyField for Option<T> {
    fn collect_into(&self, out: &mut Vec<ComponentRef>) {
        if let Some(field) = self {
            field.collect_into(out);
        }
    }
}

impl<T: DependencyField> DependencyField for OnceLock<T> {
    fn collect_into(&self, out: &mut Vec<ComponentRef>) {
        if let Some(field) = self.get() {
            field.collect_into(out);
        }
    }
}

impl<T: DependencyField> DependencyField for Vec<T> {
    fn collect_into(&self, out: &mut Vec<ComponentRef>) {
        for field in self {
            field.collect_into(out);
        }
    }
}

impl<T: DependencyField> DependencyField for parking_lot::RwLock<T> {
    fn collect_into(&self, out: &mut Vec<ComponentRef>) {
        self.read().collect_into(out);
    }
}

impl<T: DependencyField> DependencyField for parking_lot::Mutex<T> {
    fn collect_into(&self, out: &mut Vec<ComponentRef>) {
        self.lock().collect_into(out);
    }
}

/// 组件适配器
///
/// 为无法直接实现 [`Component`] 的类型提供委托实现，按 `ComponentAdapter<T>` 注册和解析
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentAdapter<T> {
    inner: T,
}

impl<T> ComponentAdapter<T>
where
    T: Send + Sync + Debug + 'static,
{
    /// 包装外部类型
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// 获取被包装的值
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// 取出被包装的值
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Deref for ComponentAdapter<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> Component for ComponentAdapter<T>
where
    T: Send + Sync + Debug + 'static,
{
    fn name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// 组件描述符
///
/// 注册表中已提交条目的只读视图
#[derive(Debug, Clone, Serialize)]
pub struct ComponentDescriptor {
    /// 组件名称
    pub name: String,
    /// 类型信息
    #[serde(skip)]
    pub type_info: TypeInfo,
    /// 作用域
    pub scope: Scope,
    /// 注册时间
    pub registered_at: chrono::DateTime<chrono::Utc>,
}

impl ComponentDescriptor {
    /// 创建新的组件描述符
    pub fn new<T: Component>(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            type_info: TypeInfo::of::<T>(),
            scope,
            registered_at: chrono::Utc::now(),
        }
    }

    /// 组件类型ID
    pub fn type_id(&self) -> TypeId {
        self.type_info.id
    }

    /// 完整类型名称
    pub fn type_name(&self) -> &str {
        &self.type_info.full_name
    }
}
