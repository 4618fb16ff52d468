use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::{parse_container_attrs, parse_field_attrs};

/// Integer representations an enum may declare.
const INTEGER_REPRS: &[&str] = &["i8", "u8", "i16", "u16", "i32", "u32", "i64", "u64"];

/// Generates the `Describe` impl.
pub fn generate_describe(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, _) = input.generics.split_for_impl();
    let where_clause = build_where_clause(&input.generics);
    let path = type_path_expr(input);

    let body = match &input.data {
        syn::Data::Enum(data) if is_fieldless(data) => {
            let underlying = enum_repr(input)?;
            quote! {
                ::ligand_core::TypeDescriptor::enumeration(
                    #path,
                    <#underlying as ::ligand_core::Describe>::descriptor(),
                )
            }
        }
        syn::Data::Struct(_) | syn::Data::Enum(_) => {
            quote! { ::ligand_core::TypeDescriptor::new(#path) }
        }
        syn::Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Describe cannot be derived for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::ligand_core::Describe for #name #ty_generics #where_clause {
            fn descriptor() -> ::ligand_core::TypeDescriptor {
                #body
            }
        }
    })
}

/// Generates the `class_descriptor()` method implementation.
pub fn generate_class_descriptor(input: &DeriveInput) -> syn::Result<TokenStream> {
    let fields = match &input.data {
        syn::Data::Struct(syn::DataStruct {
            fields: syn::Fields::Named(named),
            ..
        }) => named,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Document can only be derived for structs with named fields",
            ));
        }
    };

    let container = parse_container_attrs(&input.attrs)?;
    let class_name = match container.name {
        Some(name) => quote! { #name },
        None => class_name_expr(input),
    };

    let base = container.base.map(|base| quote! { .base(#base) });

    let mut seen = HashSet::new();
    let mut members = Vec::new();
    for field in &fields.named {
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }

        let member_name = match (&attrs.rename, &field.ident) {
            (Some(rename), _) => rename.clone(),
            (None, Some(ident)) => ident.to_string(),
            (None, None) => continue,
        };
        if !seen.insert(member_name.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate ligand member name `{}`", member_name),
            ));
        }

        let ty = &field.ty;
        let descriptor = quote! { <#ty as ::ligand_core::Describe>::descriptor() };

        let constructor = if attrs.property {
            quote! { ::ligand_core::MemberDescriptor::property(#member_name, #descriptor) }
        } else {
            quote! { ::ligand_core::MemberDescriptor::field(#member_name, #descriptor) }
        };

        let visibility = match field.vis {
            syn::Visibility::Public(_) => quote! { ::ligand_core::Visibility::Public },
            _ => quote! { ::ligand_core::Visibility::NonPublic },
        };

        let base_definition = if attrs.overridable {
            Some(quote! { ::std::clone::Clone::clone(&class_name) })
        } else {
            attrs
                .overrides
                .as_ref()
                .map(|base| quote! { ::std::string::String::from(#base) })
        };
        let dispatch = base_definition.map(|base_definition| {
            quote! {
                .with_dispatch(::ligand_core::Dispatch::Virtual {
                    base_definition: #base_definition,
                })
            }
        });

        members.push(quote! {
            .member(#constructor.with_visibility(#visibility) #dispatch)
        });
    }

    Ok(quote! {
        fn class_descriptor() -> ::ligand_core::ClassDescriptor {
            let class_name = ::std::string::String::from(#class_name);
            ::ligand_core::ClassDescriptor::builder(::std::clone::Clone::clone(&class_name))
                #base
                #(#members)*
                .build()
        }
    })
}

/// Adds a `Describe` bound for every type parameter.
pub fn build_where_clause(generics: &syn::Generics) -> TokenStream {
    let type_params: Vec<_> = generics.type_params().map(|p| &p.ident).collect();
    let existing = generics.where_clause.as_ref();

    if type_params.is_empty() && existing.is_none() {
        return quote! {};
    }

    let describe_bounds = type_params.iter().map(|p| {
        quote! { #p: ::ligand_core::Describe }
    });

    let existing_predicates = existing
        .map(|w| {
            let predicates = w.predicates.iter();
            quote! { #(#predicates,)* }
        })
        .unwrap_or_default();

    quote! {
        where
            #existing_predicates
            #(#describe_bounds),*
    }
}

fn is_fieldless(data: &syn::DataEnum) -> bool {
    data.variants
        .iter()
        .all(|v| matches!(v.fields, syn::Fields::Unit))
}

/// Expression producing `<P1, P2>` from the descriptor paths of the type
/// parameters, or `None` for non-generic types.
fn type_params_expr(input: &DeriveInput) -> Option<TokenStream> {
    let params: Vec<_> = input.generics.type_params().map(|p| &p.ident).collect();
    if params.is_empty() {
        return None;
    }

    Some(quote! {
        {
            let params: ::std::vec::Vec<::std::string::String> = ::std::vec![
                #(<#params as ::ligand_core::Describe>::descriptor().path().to_string()),*
            ];
            ::std::format!("<{}>", params.join(", "))
        }
    })
}

/// Expression producing the type's path, with type parameters spelled out.
fn type_path_expr(input: &DeriveInput) -> TokenStream {
    let name = input.ident.to_string();
    match type_params_expr(input) {
        Some(params) => quote! {
            ::std::format!("{}::{}{}", ::std::module_path!(), #name, #params)
        },
        None => quote! { ::std::concat!(::std::module_path!(), "::", #name) },
    }
}

/// Expression producing the default class name: the type name, with type
/// parameters spelled out so each instantiation is a distinct class.
fn class_name_expr(input: &DeriveInput) -> TokenStream {
    let name = input.ident.to_string();
    match type_params_expr(input) {
        Some(params) => quote! { ::std::format!("{}{}", #name, #params) },
        None => quote! { #name },
    }
}

/// Finds the integer type named by `#[repr(..)]`, defaulting to `i32`.
fn enum_repr(input: &DeriveInput) -> syn::Result<syn::Ident> {
    let mut repr = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("repr") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            // align(N), packed(N)
            if meta.input.peek(syn::token::Paren) {
                let _content;
                syn::parenthesized!(_content in meta.input);
                return Ok(());
            }
            let Some(ident) = meta.path.get_ident() else {
                return Ok(());
            };
            let name = ident.to_string();
            if INTEGER_REPRS.contains(&name.as_str()) {
                repr = Some(ident.clone());
            } else if name == "C" {
                repr.get_or_insert_with(|| syn::Ident::new("i32", ident.span()));
            } else if name == "isize" || name == "usize" {
                return Err(meta.error("pointer-sized enum representations have no fixed width"));
            }
            Ok(())
        })?;
    }

    Ok(repr.unwrap_or_else(|| syn::Ident::new("i32", proc_macro2::Span::call_site())))
}
