//! Ligand maps Rust types onto document schemas.
//!
//! Core concepts:
//! - **TypeDescriptor**: identity of a type, produced by the `Describe` trait
//! - **PrimitiveKind**: closed set of kinds encoders dispatch on (`classify`)
//! - **ClassDescriptor**: members a class declares itself, built by
//!   `#[derive(Document)]` or by hand
//! - **ClassRegistry**: build-time table of class descriptors
//! - **ClassMap**: how one class is stored, filled in by conventions
//! - **NamedIdMemberConvention**: picks the id member from ordered candidate names
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ligand_core::{
//!     ClassDescriptor, ClassMap, ClassMapConvention, Describe, NamedIdMemberConvention,
//!     PrimitiveKind,
//! };
//!
//! let person = ClassDescriptor::builder("Person")
//!     .property("_id", String::descriptor())
//!     .build();
//! let mut class_map = ClassMap::new(Arc::new(person));
//!
//! NamedIdMemberConvention::default().apply(&mut class_map).unwrap();
//!
//! let id = class_map.id_member_map().unwrap();
//! assert_eq!(id.member_name(), "_id");
//! assert_eq!(id.primitive(), PrimitiveKind::String);
//! ```

mod class;
mod class_map;
mod config;
mod convention;
mod describe;
mod kind;
mod member;
mod registry;

pub use class::{ClassDescriptor, ClassDescriptorBuilder, Document};
pub use class_map::{ClassMap, ClassMapError, MemberMap, ID_ELEMENT_NAME};
pub use config::{load_config, ConfigError, IdConventionConfig};
pub use convention::{ClassMapConvention, ConventionError, NamedIdMemberConvention};
pub use describe::{Describe, TypeDescriptor, TypeShape};
pub use kind::{classify, PrimitiveKind};
pub use member::{
    Binding, BindingFlags, Dispatch, MemberDescriptor, MemberKind, MemberKinds, Scope, Visibility,
};
pub use registry::{ClassRegistry, RegistryError};

#[cfg(feature = "derive")]
pub use ligand_derive::{document, Describe, Document};
