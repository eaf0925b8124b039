//! 宏工具函数

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Index, Result};

/// 提取结构体字段，非结构体报错
pub fn struct_fields(input: &DeriveInput) -> Result<&Fields> {
    match &input.data {
        Data::Struct(data) => Ok(&data.fields),
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(Component)] 只支持结构体",
        )),
    }
}

/// 检查字段是否标记了 `#[component(dependency)]`
pub fn is_dependency_field(field: &Field) -> Result<bool> {
    let mut dependency = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("component") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("dependency") {
                dependency = true;
                Ok(())
            } else {
                Err(meta.error("不支持的字段属性，只能使用 `dependency`"))
            }
        })?;
    }
    Ok(dependency)
}

/// 字段访问表达式：命名字段用名称，元组字段用下标
pub fn field_accessor(index: usize, field: &Field) -> TokenStream {
    match &field.ident {
        Some(ident) => quote! { #ident },
        None => {
            let index = Index::from(index);
            quote! { #index }
        }
    }
}
