use serde::{Deserialize, Serialize};

use crate::describe::{Describe, TypeDescriptor};
use crate::member::{BindingFlags, Dispatch, MemberDescriptor, MemberKinds};

/// Build-time metadata for one mapped class.
///
/// `members` holds only what the class declares itself, in declaration order.
/// Members inherited unchanged from `base` are not listed; a member appears
/// here only if the class redeclares or overrides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    name: String,
    base: Option<String>,
    members: Vec<MemberDescriptor>,
}

impl ClassDescriptor {
    pub fn builder(name: impl Into<String>) -> ClassDescriptorBuilder {
        ClassDescriptorBuilder {
            descriptor: ClassDescriptor {
                name: name.into(),
                base: None,
                members: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Returns the declared members that pass both filters.
    pub fn declared_members(
        &self,
        kinds: MemberKinds,
        binding: BindingFlags,
    ) -> impl Iterator<Item = &MemberDescriptor> + '_ {
        self.members
            .iter()
            .filter(move |m| kinds.contains(m.kind()) && binding.admits(m))
    }

    /// Returns every declared member named `name` that passes both filters.
    ///
    /// More than one result means the name is ambiguous under these filters.
    pub fn find_declared(
        &self,
        name: &str,
        kinds: MemberKinds,
        binding: BindingFlags,
    ) -> Vec<&MemberDescriptor> {
        self.declared_members(kinds, binding)
            .filter(|m| binding.names_match(m.name(), name))
            .collect()
    }

    /// Looks up a declared member by exact name, ignoring filters.
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name() == name)
    }

    pub fn declares(&self, member: &MemberDescriptor) -> bool {
        self.members.contains(member)
    }
}

pub struct ClassDescriptorBuilder {
    descriptor: ClassDescriptor,
}

impl ClassDescriptorBuilder {
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.descriptor.base = Some(base.into());
        self
    }

    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.descriptor.members.push(member);
        self
    }

    pub fn field(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.member(MemberDescriptor::field(name, ty))
    }

    pub fn property(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.member(MemberDescriptor::property(name, ty))
    }

    /// Adds a property whose virtual getter is first declared on this class.
    pub fn virtual_property(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        let base_definition = self.descriptor.name.clone();
        let dispatch = Dispatch::Virtual { base_definition };
        self.member(MemberDescriptor::property(name, ty).with_dispatch(dispatch))
    }

    /// Adds a property overriding a virtual getter first declared on `base_definition`.
    pub fn overriding_property(
        self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        base_definition: impl Into<String>,
    ) -> Self {
        self.member(MemberDescriptor::property(name, ty).with_dispatch(Dispatch::Virtual {
            base_definition: base_definition.into(),
        }))
    }

    pub fn build(self) -> ClassDescriptor {
        self.descriptor
    }
}

/// A type that can be mapped onto a document.
///
/// Usually derived with `#[derive(Document)]`:
///
/// ```
/// use ligand_core::Document;
///
/// #[derive(Document)]
/// struct Ticket {
///     #[ligand(rename = "Id")]
///     number: String,
///     seat: u64,
/// }
///
/// let class = Ticket::class_descriptor();
/// let names: Vec<_> = class.members().iter().map(|m| m.name()).collect();
/// assert_eq!(names, ["Id", "seat"]);
/// ```
///
/// Member names must be unique within a class, so the derive rejects
/// renames that collide:
///
/// ```compile_fail
/// use ligand_core::Document;
///
/// #[derive(Document)]
/// struct Ticket {
///     #[ligand(rename = "Id")]
///     number: String,
///     #[ligand(rename = "Id")]
///     seat: u64,
/// }
/// ```
pub trait Document: Describe {
    fn class_descriptor() -> ClassDescriptor;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{MemberKind, Scope, Visibility};

    fn order() -> ClassDescriptor {
        ClassDescriptor::builder("Order")
            .base("Entity")
            .overriding_property("Id", String::descriptor(), "Entity")
            .field("total", i64::descriptor())
            .member(
                MemberDescriptor::field("secret", String::descriptor())
                    .with_visibility(Visibility::NonPublic),
            )
            .member(
                MemberDescriptor::field("count", u32::descriptor()).with_scope(Scope::Static),
            )
            .build()
    }

    #[test]
    fn builder_keeps_declaration_order() {
        let class = order();
        let names: Vec<_> = class.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["Id", "total", "secret", "count"]);
        assert_eq!(class.base(), Some("Entity"));
    }

    #[test]
    fn declared_members_apply_filters() {
        let class = order();
        let public: Vec<_> = class
            .declared_members(MemberKinds::ALL, BindingFlags::default())
            .map(|m| m.name())
            .collect();
        assert_eq!(public, vec!["Id", "total"]);

        let fields: Vec<_> = class
            .declared_members(
                MemberKinds::FIELD,
                BindingFlags::PUBLIC | BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE,
            )
            .map(|m| m.name())
            .collect();
        assert_eq!(fields, vec!["total", "secret"]);
    }

    #[test]
    fn find_declared_reports_every_match() {
        let class = ClassDescriptor::builder("Odd")
            .field("Id", String::descriptor())
            .property("Id", String::descriptor())
            .build();

        assert_eq!(
            class
                .find_declared("Id", MemberKinds::ALL, BindingFlags::default())
                .len(),
            2
        );
        let only_fields =
            class.find_declared("Id", MemberKinds::FIELD, BindingFlags::default());
        assert_eq!(only_fields.len(), 1);
        assert_eq!(only_fields[0].kind(), MemberKind::Field);
    }

    #[test]
    fn virtual_property_is_declared_here() {
        let class = ClassDescriptor::builder("Entity")
            .virtual_property("Id", String::descriptor())
            .build();
        let id = class.member("Id").unwrap();
        assert_eq!(id.base_definition(), Some("Entity"));
        assert!(!id.is_overriding_accessor(class.name()));
    }
}
