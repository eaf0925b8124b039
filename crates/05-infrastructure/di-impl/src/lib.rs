//! # 依赖注入具体实现
//!
//! 提供具体的依赖注入容器：组件注册、按类型解析、作用域管理、循环依赖检测和切面注册

pub mod global;

use aop::{weave, Advised, Aspect};
use di_abstractions::{
    AspectRegistry, CircularDependencyDetector, ComponentFactoryFn, ComponentRegistry,
    DefaultCircularDependencyDetector,
};
use indexmap::IndexMap;
use infrastructure_common::{
    Component, ComponentDescriptor, ComponentRef, ContainerConfig, DependencyError,
    DependencyResult, Scope,
};
use parking_lot::{Mutex, RwLock};
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 已注册组件的实例来源
#[derive(Clone)]
enum Instance {
    /// 单例实例
    Shared(Arc<dyn Any + Send + Sync>),
    /// 原型构造规则
    Factory(ComponentFactoryFn),
}

/// 注册表条目
#[derive(Clone)]
struct RegistryEntry {
    descriptor: ComponentDescriptor,
    instance: Instance,
}

#[derive(Default)]
struct RegistryState {
    entries: IndexMap<TypeId, RegistryEntry>,
    aspects: Vec<Arc<dyn Aspect>>,
}

/// 具体的依赖注入容器实现
pub struct DiContainerImpl {
    config: ContainerConfig,
    detector: DefaultCircularDependencyDetector,
    /// 串行化注册与重置
    registration: Mutex<()>,
    state: RwLock<RegistryState>,
}

impl DiContainerImpl {
    /// 使用默认配置创建容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            detector: DefaultCircularDependencyDetector::new(config.max_resolution_depth),
            config,
            registration: Mutex::new(()),
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 校验、查重、检测循环依赖后提交
    ///
    /// 任一步骤失败时注册表保持不变
    fn commit<T>(
        &self,
        component: Arc<T>,
        scope: Scope,
        factory: Option<ComponentFactoryFn>,
    ) -> DependencyResult<Arc<T>>
    where
        T: Component,
    {
        let _guard = self.registration.lock();
        let type_id = TypeId::of::<T>();

        component
            .validate()
            .map_err(|source| DependencyError::InvalidComponent {
                type_name: type_name::<T>().to_string(),
                source,
            })?;

        {
            let state = self.state.read();
            if state.entries.contains_key(&type_id) {
                return Err(DependencyError::DuplicateComponent {
                    type_name: type_name::<T>().to_string(),
                });
            }

            if self.config.enable_circular_dependency_detection {
                let root: ComponentRef = component.clone();
                self.detector
                    .detect_cycle(&root, &|id: TypeId| state.entries.contains_key(&id))?;
            } else {
                warn!("循环依赖检测已禁用，跳过检测: {}", type_name::<T>());
            }
        }

        let instance = match factory {
            Some(factory) => Instance::Factory(factory),
            None => Instance::Shared(component.clone() as Arc<dyn Any + Send + Sync>),
        };
        let entry = RegistryEntry {
            descriptor: ComponentDescriptor::new::<T>(component.name(), scope),
            instance,
        };
        self.state.write().entries.insert(type_id, entry);

        info!("注册组件: {} ({}, {})", component.name(), type_name::<T>(), scope);
        Ok(component)
    }
}

impl Default for DiContainerImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DiContainerImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("DiContainerImpl")
            .field("config", &self.config)
            .field("components", &state.entries.len())
            .field("aspects", &state.aspects.len())
            .finish()
    }
}

impl ComponentRegistry for DiContainerImpl {
    fn register<T>(&self, component: T) -> DependencyResult<Arc<T>>
    where
        T: Component,
    {
        self.commit(Arc::new(component), Scope::Singleton, None)
    }

    fn register_shared<T>(&self, component: Arc<T>) -> DependencyResult<Arc<T>>
    where
        T: Component,
    {
        self.commit(component, Scope::Singleton, None)
    }

    fn register_scoped<T>(&self, component: T, scope: Scope) -> DependencyResult<Arc<T>>
    where
        T: Component + Clone,
    {
        if scope.is_singleton() {
            return self.register(component);
        }
        let pristine = component.clone();
        let factory: ComponentFactoryFn =
            Arc::new(move || Arc::new(pristine.clone()) as Arc<dyn Any + Send + Sync>);
        self.commit(Arc::new(component), scope, Some(factory))
    }

    fn register_factory<T, F>(&self, factory: F, scope: Scope) -> DependencyResult<Arc<T>>
    where
        T: Component,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let first = Arc::new(factory());
        if scope.is_singleton() {
            return self.commit(first, scope, None);
        }
        let factory: ComponentFactoryFn =
            Arc::new(move || Arc::new(factory()) as Arc<dyn Any + Send + Sync>);
        self.commit(first, scope, Some(factory))
    }

    fn lookup<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: Component,
    {
        let instance = self
            .state
            .read()
            .entries
            .get(&TypeId::of::<T>())
            .map(|entry| entry.instance.clone())
            .ok_or_else(DependencyError::not_found::<T>)?;

        let instance = match instance {
            Instance::Shared(instance) => {
                debug!("解析单例组件: {}", type_name::<T>());
                instance
            }
            Instance::Factory(factory) => {
                debug!("构造原型组件: {}", type_name::<T>());
                factory()
            }
        };

        instance
            .downcast::<T>()
            .map_err(|_| DependencyError::TypeMismatch {
                type_name: type_name::<T>().to_string(),
            })
    }

    fn contains_type_id(&self, type_id: TypeId) -> bool {
        self.state.read().entries.contains_key(&type_id)
    }

    fn count(&self) -> usize {
        self.state.read().entries.len()
    }

    fn descriptors(&self) -> Vec<ComponentDescriptor> {
        self.state
            .read()
            .entries
            .values()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    fn detect_cycle(&self, component: &ComponentRef) -> DependencyResult<()> {
        let state = self.state.read();
        self.detector
            .detect_cycle(component, &|id: TypeId| state.entries.contains_key(&id))
    }

    fn reset(&self) {
        let _guard = self.registration.lock();
        let mut state = self.state.write();
        let (components, aspects) = (state.entries.len(), state.aspects.len());
        state.entries.clear();
        state.aspects.clear();
        info!("重置容器: 清除 {} 个组件, {} 个切面", components, aspects);
    }
}

impl AspectRegistry for DiContainerImpl {
    fn register_aspect<T>(&self, aspect: T) -> Arc<T>
    where
        T: Aspect,
    {
        let _guard = self.registration.lock();
        let aspect = Arc::new(aspect);
        self.state.write().aspects.push(aspect.clone());
        info!("注册切面: {}", aspect.name());
        aspect
    }

    fn aspects(&self) -> Vec<Arc<dyn Aspect>> {
        self.state.read().aspects.clone()
    }

    fn apply_aspects<A, R>(&self, target: &Advised<A, R>) -> Advised<A, R>
    where
        A: Clone + Send + 'static,
        R: Send + 'static,
    {
        weave(target, &self.aspects(), self.config.proceed_policy)
    }
}
