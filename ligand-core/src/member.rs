use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::describe::TypeDescriptor;

/// Whether a member is a plain field or an accessor-backed property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Property,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    NonPublic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Instance,
    Static,
}

/// How a property's read accessor is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dispatch {
    /// Non-virtual accessor.
    Sealed,
    /// Virtual accessor; `base_definition` is the class that first declared it.
    Virtual { base_definition: String },
}

/// Set of member kinds a lookup accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberKinds(u8);

impl MemberKinds {
    pub const NONE: MemberKinds = MemberKinds(0);
    pub const FIELD: MemberKinds = MemberKinds(1);
    pub const PROPERTY: MemberKinds = MemberKinds(1 << 1);
    pub const ALL: MemberKinds = MemberKinds(Self::FIELD.0 | Self::PROPERTY.0);

    pub fn contains(self, kind: MemberKind) -> bool {
        self.0 & MemberKinds::from(kind).0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for MemberKinds {
    fn default() -> Self {
        MemberKinds::ALL
    }
}

impl From<MemberKind> for MemberKinds {
    fn from(kind: MemberKind) -> Self {
        match kind {
            MemberKind::Field => MemberKinds::FIELD,
            MemberKind::Property => MemberKinds::PROPERTY,
        }
    }
}

impl FromIterator<MemberKind> for MemberKinds {
    fn from_iter<I: IntoIterator<Item = MemberKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(MemberKinds::NONE, |acc, kind| acc | MemberKinds::from(kind))
    }
}

impl BitOr for MemberKinds {
    type Output = MemberKinds;

    fn bitor(self, rhs: Self) -> Self::Output {
        MemberKinds(self.0 | rhs.0)
    }
}

/// A single binding flag, as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    Public,
    NonPublic,
    Instance,
    Static,
    IgnoreCase,
}

/// Visibility, scope and name-matching filter for member lookups.
///
/// A member passes when its visibility and its scope are both admitted.
/// Lookups only ever see members declared on the class itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingFlags(u8);

impl BindingFlags {
    pub const NONE: BindingFlags = BindingFlags(0);
    pub const PUBLIC: BindingFlags = BindingFlags(1);
    pub const NON_PUBLIC: BindingFlags = BindingFlags(1 << 1);
    pub const INSTANCE: BindingFlags = BindingFlags(1 << 2);
    pub const STATIC: BindingFlags = BindingFlags(1 << 3);
    pub const IGNORE_CASE: BindingFlags = BindingFlags(1 << 4);

    pub fn contains(self, other: BindingFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if the member's visibility and scope pass this filter.
    pub fn admits(self, member: &MemberDescriptor) -> bool {
        let visibility = match member.visibility() {
            Visibility::Public => BindingFlags::PUBLIC,
            Visibility::NonPublic => BindingFlags::NON_PUBLIC,
        };
        let scope = match member.scope() {
            Scope::Instance => BindingFlags::INSTANCE,
            Scope::Static => BindingFlags::STATIC,
        };
        self.contains(visibility) && self.contains(scope)
    }

    /// Compares member names, exactly unless `IGNORE_CASE` is set.
    pub fn names_match(self, member_name: &str, wanted: &str) -> bool {
        if self.contains(BindingFlags::IGNORE_CASE) {
            member_name.to_lowercase() == wanted.to_lowercase()
        } else {
            member_name == wanted
        }
    }
}

impl Default for BindingFlags {
    fn default() -> Self {
        BindingFlags::PUBLIC | BindingFlags::INSTANCE
    }
}

impl From<Binding> for BindingFlags {
    fn from(binding: Binding) -> Self {
        match binding {
            Binding::Public => BindingFlags::PUBLIC,
            Binding::NonPublic => BindingFlags::NON_PUBLIC,
            Binding::Instance => BindingFlags::INSTANCE,
            Binding::Static => BindingFlags::STATIC,
            Binding::IgnoreCase => BindingFlags::IGNORE_CASE,
        }
    }
}

impl FromIterator<Binding> for BindingFlags {
    fn from_iter<I: IntoIterator<Item = Binding>>(iter: I) -> Self {
        iter.into_iter()
            .fold(BindingFlags::NONE, |acc, binding| acc | BindingFlags::from(binding))
    }
}

impl BitOr for BindingFlags {
    type Output = BindingFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        BindingFlags(self.0 | rhs.0)
    }
}

/// A member declared directly on a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberDescriptor {
    name: String,
    kind: MemberKind,
    visibility: Visibility,
    scope: Scope,
    ty: TypeDescriptor,
    getter: Option<Dispatch>,
}

impl MemberDescriptor {
    /// Creates a public instance field.
    pub fn field(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        MemberDescriptor {
            name: name.into(),
            kind: MemberKind::Field,
            visibility: Visibility::Public,
            scope: Scope::Instance,
            ty,
            getter: None,
        }
    }

    /// Creates a public instance property with a sealed getter.
    pub fn property(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        MemberDescriptor {
            name: name.into(),
            kind: MemberKind::Property,
            visibility: Visibility::Public,
            scope: Scope::Instance,
            ty,
            getter: Some(Dispatch::Sealed),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the getter dispatch. Fields have no getter, so this is a no-op for them.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        if self.kind == MemberKind::Property {
            self.getter = Some(dispatch);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn getter(&self) -> Option<&Dispatch> {
        self.getter.as_ref()
    }

    /// Class that originally declared this member's virtual getter.
    pub fn base_definition(&self) -> Option<&str> {
        match &self.getter {
            Some(Dispatch::Virtual { base_definition }) => Some(base_definition),
            _ => None,
        }
    }

    /// True if the getter is virtual and was first declared on a class other than `class`.
    pub fn is_overriding_accessor(&self, class: &str) -> bool {
        self.base_definition()
            .is_some_and(|base_definition| base_definition != class)
    }
}
