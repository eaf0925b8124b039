//! # AOP
//!
//! 通知链引擎：把任意调用包装为带有前置、后置和环绕逻辑的新调用。
//!
//! ## 核心接口
//!
//! - [`Advised`] - 可被包装的调用
//! - [`before`] / [`after`] / [`after_returning`] - 简单通知
//! - [`around`] / [`around_with`] - 环绕通知，通知体通过 [`JoinPoint`] 调用 proceed
//! - [`Aspect`] / [`weave`] - 类型擦除的切面及其编织
//!
//! ## 使用示例
//!
//! ```rust
//! use aop::Advised;
//!
//! let double = Advised::new("double", |x: i32| x * 2).around(|jp| {
//!     let value = jp.proceed()?;
//!     Ok(value + 1)
//! });
//! assert_eq!(double.call(5).unwrap(), 11);
//! ```

pub mod advice;
pub mod advised;
pub mod aspect;
pub mod join_point;

pub use advice::*;
pub use advised::*;
pub use aspect::*;
pub use join_point::*;
