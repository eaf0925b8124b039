//! 组件派生宏实现

use crate::utils::{field_accessor, is_dependency_field, struct_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Ident, LitStr, Result};

/// 组件属性参数
#[derive(Debug, Default)]
pub struct ComponentArgs {
    /// 自定义组件名称
    pub name: Option<String>,
    /// 校验方法名
    pub validate: Option<Ident>,
}

impl ComponentArgs {
    /// 解析结构体上的 `#[component(...)]`
    pub fn from_input(input: &DeriveInput) -> Result<Self> {
        let mut args = Self::default();

        for attr in &input.attrs {
            if !attr.path().is_ident("component") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    args.name = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("validate") {
                    let lit: LitStr = meta.value()?.parse()?;
                    args.validate = Some(lit.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("不支持的组件属性，可用属性: `name`, `validate`"))
                }
            })?;
        }

        Ok(args)
    }
}

/// 实现 #[derive(Component)] 宏
pub fn derive_component_impl(input: DeriveInput) -> Result<TokenStream> {
    let args = ComponentArgs::from_input(&input)?;
    let fields = struct_fields(&input)?;

    let mut accessors = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        if is_dependency_field(field)? {
            accessors.push(field_accessor(index, field));
        }
    }

    let struct_name = &input.ident;
    let component_name = args.name.unwrap_or_else(|| struct_name.to_string());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let dependencies = if accessors.is_empty() {
        quote! {}
    } else {
        quote! {
            fn dependencies(&self) -> ::std::vec::Vec<infrastructure_common::ComponentRef> {
                let mut out = ::std::vec::Vec::new();
                #(
                    infrastructure_common::DependencyField::collect_into(&self.#accessors, &mut out);
                )*
                out
            }
        }
    };

    let validate = args.validate.map(|method| {
        quote! {
            fn validate(&self) -> infrastructure_common::ValidationResult<()> {
                self.#method()
            }
        }
    });

    Ok(quote! {
        impl #impl_generics infrastructure_common::Component for #struct_name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                #component_name
            }

            #dependencies

            #validate
        }
    })
}
