//! 进程级全局容器
//!
//! 首次访问时按 [`ContainerConfig::load`] 创建，配置加载失败时使用默认配置。
//! 测试之间用 [`reset`] 恢复空容器。

use crate::DiContainerImpl;
use aop::{Advised, Aspect};
use di_abstractions::{AspectRegistry, ComponentRegistry};
use infrastructure_common::{Component, ContainerConfig, DependencyResult, Scope};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{error, info};

/// 全局容器
static GLOBAL_CONTAINER: Lazy<DiContainerImpl> = Lazy::new(|| {
    let config = ContainerConfig::load().unwrap_or_else(|e| {
        error!("加载容器配置失败，使用默认配置: {}", e);
        ContainerConfig::default()
    });
    info!("创建全局容器");
    DiContainerImpl::with_config(config)
});

/// 获取全局容器
pub fn container() -> &'static DiContainerImpl {
    &GLOBAL_CONTAINER
}

/// 以单例作用域注册组件
pub fn register<T: Component>(component: T) -> DependencyResult<Arc<T>> {
    container().register(component)
}

/// 以单例作用域注册已共享的实例
pub fn register_shared<T: Component>(component: Arc<T>) -> DependencyResult<Arc<T>> {
    container().register_shared(component)
}

/// 按指定作用域注册组件
pub fn register_scoped<T: Component + Clone>(component: T, scope: Scope) -> DependencyResult<Arc<T>> {
    container().register_scoped(component, scope)
}

/// 解析组件
pub fn lookup<T: Component>() -> DependencyResult<Arc<T>> {
    container().lookup::<T>()
}

/// 注册切面
pub fn register_aspect<T: Aspect>(aspect: T) -> Arc<T> {
    container().register_aspect(aspect)
}

/// 用全局切面包装调用
pub fn apply_aspects<A, R>(target: &Advised<A, R>) -> Advised<A, R>
where
    A: Clone + Send + 'static,
    R: Send + 'static,
{
    container().apply_aspects(target)
}

/// 清空全局容器
pub fn reset() {
    container().reset();
}
