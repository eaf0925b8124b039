//! 组件注册表抽象接口

use aop::{Advised, Aspect};
use infrastructure_common::{
    Component, ComponentDescriptor, ComponentRef, DependencyResult, Scope,
};
use std::any::{Any, TypeId};
use std::sync::Arc;

/// 组件注册表 trait
///
/// 提供组件注册和解析的核心接口。注册是全有或全无的：任何注册错误都不会改变注册表状态。
pub trait ComponentRegistry: Send + Sync {
    /// 以单例作用域注册组件实例
    fn register<T>(&self, component: T) -> DependencyResult<Arc<T>>
    where
        T: Component;

    /// 以单例作用域注册已共享的实例，返回的 `Arc` 与参数指向同一实例
    fn register_shared<T>(&self, component: Arc<T>) -> DependencyResult<Arc<T>>
    where
        T: Component;

    /// 按指定作用域注册组件实例
    ///
    /// 原型作用域保留一份注册时的副本作为构造规则，每次解析都从该副本克隆新实例
    fn register_scoped<T>(&self, component: T, scope: Scope) -> DependencyResult<Arc<T>>
    where
        T: Component + Clone;

    /// 按指定作用域注册组件工厂
    ///
    /// 注册时调用一次工厂得到用于校验的实例；单例作用域直接保存该实例
    fn register_factory<T, F>(&self, factory: F, scope: Scope) -> DependencyResult<Arc<T>>
    where
        T: Component,
        F: Fn() -> T + Send + Sync + 'static;

    /// 解析组件
    fn lookup<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: Component;

    /// 检查组件是否已注册
    fn contains<T>(&self) -> bool
    where
        T: Component,
    {
        self.contains_type_id(TypeId::of::<T>())
    }

    /// 检查组件是否已注册（通过 TypeId）
    fn contains_type_id(&self, type_id: TypeId) -> bool;

    /// 已注册组件数量
    fn count(&self) -> usize;

    /// 按注册顺序获取所有已注册组件的描述符
    fn descriptors(&self) -> Vec<ComponentDescriptor>;

    /// 对组件图执行循环依赖检测
    fn detect_cycle(&self, component: &ComponentRef) -> DependencyResult<()>;

    /// 清空所有组件和切面
    fn reset(&self);
}

/// 切面注册表 trait
pub trait AspectRegistry: Send + Sync {
    /// 注册切面，返回共享实例以便调用方读取切面状态
    fn register_aspect<T>(&self, aspect: T) -> Arc<T>
    where
        T: Aspect;

    /// 按注册顺序获取所有切面
    fn aspects(&self) -> Vec<Arc<dyn Aspect>>;

    /// 用所有适用的切面包装调用，后注册的切面位于外层
    fn apply_aspects<A, R>(&self, target: &Advised<A, R>) -> Advised<A, R>
    where
        A: Clone + Send + 'static,
        R: Send + 'static;
}

/// 组件构造规则
///
/// 原型作用域每次解析都调用一次
pub type ComponentFactoryFn = Arc<dyn Fn() -> Arc<dyn Any + Send + Sync> + Send + Sync>;
