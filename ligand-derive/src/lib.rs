use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

mod descriptor;

/// Attribute macro that derives everything a mapped document type needs.
///
/// This is syntax sugar that expands to:
/// ```ignore
/// #[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Document)]
/// ```
///
/// # Example
///
/// ```ignore
/// use ligand_derive::document;
///
/// #[document]
/// struct Person {
///     #[ligand(property, rename = "_id")]
///     pub id: String,
///     pub age: u32,
/// }
/// ```
#[proc_macro_attribute]
pub fn document(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);

    let output = quote! {
        #[derive(
            ::std::fmt::Debug,
            ::std::clone::Clone,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::ligand_core::Document
        )]
        #input
    };

    output.into()
}

/// Derive macro for the `Describe` trait.
///
/// Structs and enums with payloads describe as plain types named
/// `module_path!()::Ident`. Fieldless enums describe as enums whose
/// underlying type comes from `#[repr(..)]`, `i32` when absent.
#[proc_macro_derive(Describe)]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match descriptor::generate_describe(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive macro for the `Document` trait.
///
/// Generates `Document::class_descriptor()` and the `Describe` impl, so do not
/// derive `Describe` alongside it. Every named field becomes a member declared
/// on this class; `pub` fields are public, all others non-public.
///
/// # Example
///
/// ```ignore
/// use ligand_core::Document;
///
/// #[derive(Document)]
/// #[ligand(base = "Entity")]
/// struct Order {
///     #[ligand(property, rename = "Id", overrides = "Entity")]
///     pub id: String,
///     pub total: i64,
/// }
/// ```
///
/// # Attributes
///
/// Container:
/// - `#[ligand(name = "Name")]` - Class name (defaults to the type name)
/// - `#[ligand(base = "Base")]` - Name of the base class
///
/// Field:
/// - `#[ligand(skip)]` - Not a member of the class
/// - `#[ligand(rename = "name")]` - Member name (defaults to the field name)
/// - `#[ligand(property)]` - Declare as a property instead of a field
/// - `#[ligand(overridable)]` - Property getter is virtual, first declared here
/// - `#[ligand(overrides = "Base")]` - Property getter overrides one declared on `Base`
#[proc_macro_derive(Document, attributes(ligand))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_document_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_document_impl(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, _) = input.generics.split_for_impl();
    let where_clause = descriptor::build_where_clause(&input.generics);

    let describe_impl = descriptor::generate_describe(input)?;
    let class_descriptor_impl = descriptor::generate_class_descriptor(input)?;

    Ok(quote! {
        #describe_impl

        impl #impl_generics ::ligand_core::Document for #name #ty_generics #where_clause {
            #class_descriptor_impl
        }
    })
}

#[derive(Default)]
pub(crate) struct ContainerAttrs {
    pub name: Option<String>,
    pub base: Option<String>,
}

pub(crate) fn parse_container_attrs(attrs: &[syn::Attribute]) -> syn::Result<ContainerAttrs> {
    let mut result = ContainerAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("ligand") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: syn::LitStr = meta.value()?.parse()?;
                result.name = Some(value.value());
            } else if meta.path.is_ident("base") {
                let value: syn::LitStr = meta.value()?.parse()?;
                result.base = Some(value.value());
            } else {
                return Err(meta.error("unknown ligand container attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub skip: bool,
    pub rename: Option<String>,
    pub property: bool,
    pub overridable: bool,
    pub overrides: Option<String>,
}

pub(crate) fn parse_field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("ligand") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("rename") {
                let value: syn::LitStr = meta.value()?.parse()?;
                result.rename = Some(value.value());
            } else if meta.path.is_ident("property") {
                result.property = true;
            } else if meta.path.is_ident("overridable") {
                result.overridable = true;
            } else if meta.path.is_ident("overrides") {
                let value: syn::LitStr = meta.value()?.parse()?;
                result.overrides = Some(value.value());
            } else {
                return Err(meta.error("unknown ligand field attribute"));
            }
            Ok(())
        })?;
    }

    if (result.overridable || result.overrides.is_some()) && !result.property {
        return Err(syn::Error::new_spanned(
            field,
            "only properties have getters; add `property`",
        ));
    }
    if result.overridable && result.overrides.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "`overridable` and `overrides` are mutually exclusive",
        ));
    }

    Ok(result)
}
