//! # Infrastructure Common
//!
//! 这个 crate 提供了 Lorn IoC 容器和通知链共用的 traits 和类型。
//!
//! ## 核心组件
//!
//! - [`Component`] - 组件基础 trait
//! - [`DependencyField`] - 组件字段依赖收集
//! - [`ComponentAdapter`] - 外部类型的组件适配器
//! - [`Scope`] - 组件作用域
//! - [`ContainerConfig`] - 容器配置
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 显式声明组件之间的引用关系，不依赖运行时反射
//! - 所有错误都是可恢复的类型化错误

pub mod component;
pub mod configuration;
pub mod errors;
pub mod metadata;
pub mod scope;

pub use component::*;
pub use configuration::*;
pub use errors::*;
pub use metadata::*;
pub use scope::*;
