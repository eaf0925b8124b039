//! # Component Macros
//!
//! 这个 crate 提供了 `Component` trait 的派生宏。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::Component;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Component)]
//! #[component(name = "DB", validate = "check")]
//! pub struct Database {
//!     #[component(dependency)]
//!     config: Arc<Config>,
//!     pool_size: usize,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod component;
mod utils;

/// 组件派生宏
///
/// 为结构体实现 `infrastructure_common::Component`。
///
/// # 结构体属性
///
/// - `name = "custom_name"` - 自定义组件名称（默认为结构体名）
/// - `validate = "method"` - 注册前调用的校验方法，签名为 `fn(&self) -> ValidationResult<()>`
///
/// # 字段属性
///
/// - `dependency` - 字段持有其他组件的引用，参与循环依赖检测。
///   字段类型必须实现 `DependencyField`
#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::derive_component_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
