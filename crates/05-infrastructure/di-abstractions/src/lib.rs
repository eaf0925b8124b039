//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件注册、解析和循环依赖检测的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentRegistry`] - 组件注册表接口
//! - [`AspectRegistry`] - 切面注册表接口
//! - [`CircularDependencyDetector`] - 循环依赖检测器接口

pub mod detector;
pub mod registry;

pub use detector::*;
pub use registry::*;
