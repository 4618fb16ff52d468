use log::{debug, trace, warn};

use crate::class::ClassDescriptor;
use crate::class_map::{ClassMap, ClassMapError};
use crate::config::IdConventionConfig;
use crate::member::{BindingFlags, MemberDescriptor, MemberKind, MemberKinds};

/// Error type for convention construction and application.
#[derive(Debug, thiserror::Error)]
pub enum ConventionError {
    #[error("invalid argument: {0} must be present")]
    InvalidArgument(&'static str),
    #[error("{count} members of {class} match id candidate {name}")]
    AmbiguousMember {
        class: String,
        name: String,
        count: usize,
    },
    #[error(transparent)]
    ClassMap(#[from] ClassMapError),
}

/// A rule applied uniformly to every class map during mapping setup.
///
/// A convention that finds nothing to do leaves the class map unchanged and
/// returns `Ok(())`; callers may then try other conventions.
pub trait ClassMapConvention: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, class_map: &mut ClassMap) -> Result<(), ConventionError>;
}

/// Finds the id member by name.
///
/// Candidate names are tried in order and the first one naming an eligible
/// member declared on the class wins. Only members the class declares itself
/// are considered. A property whose virtual getter was first declared on
/// another class is skipped, since the id belongs to the class that declared
/// the accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedIdMemberConvention {
    names: Vec<String>,
    member_kinds: MemberKinds,
    binding: BindingFlags,
}

impl NamedIdMemberConvention {
    pub const DEFAULT_NAMES: [&'static str; 3] = ["Id", "id", "_id"];

    /// Creates a convention over fields and properties with public instance binding.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NamedIdMemberConvention {
            names: names.into_iter().map(Into::into).collect(),
            member_kinds: MemberKinds::ALL,
            binding: BindingFlags::default(),
        }
    }

    /// Creates a convention from possibly absent parts.
    ///
    /// Fails with `InvalidArgument` when `names` is `None`.
    pub fn try_new<I, S>(
        names: Option<I>,
        member_kinds: MemberKinds,
        binding: BindingFlags,
    ) -> Result<Self, ConventionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.ok_or(ConventionError::InvalidArgument("names"))?;
        Ok(NamedIdMemberConvention::new(names)
            .with_member_kinds(member_kinds)
            .with_binding(binding))
    }

    pub fn from_config(config: &IdConventionConfig) -> Result<Self, ConventionError> {
        NamedIdMemberConvention::try_new(
            config.names.as_deref(),
            config.member_kinds(),
            config.binding(),
        )
    }

    pub fn with_member_kinds(mut self, member_kinds: MemberKinds) -> Self {
        self.member_kinds = member_kinds;
        self
    }

    pub fn with_binding(mut self, binding: BindingFlags) -> Self {
        self.binding = binding;
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn member_kinds(&self) -> MemberKinds {
        self.member_kinds
    }

    pub fn binding(&self) -> BindingFlags {
        self.binding
    }

    /// Picks the id member for `class` without touching any class map.
    pub fn resolve<'a>(
        &self,
        class: &'a ClassDescriptor,
    ) -> Result<Option<&'a MemberDescriptor>, ConventionError> {
        for name in &self.names {
            let candidates = class.find_declared(name, self.member_kinds, self.binding);

            let member = match candidates.as_slice() {
                [] => {
                    trace!("{}: no declared member named {}", class.name(), name);
                    continue;
                }
                [member] => *member,
                _ => {
                    warn!(
                        "{}: id candidate {} matches {} members",
                        class.name(),
                        name,
                        candidates.len()
                    );
                    return Err(ConventionError::AmbiguousMember {
                        class: class.name().to_string(),
                        name: name.clone(),
                        count: candidates.len(),
                    });
                }
            };

            if !is_valid_id_member(class, member) {
                trace!(
                    "{}: skipping {}, its getter overrides one declared on {}",
                    class.name(),
                    member.name(),
                    member.base_definition().unwrap_or_default()
                );
                continue;
            }

            return Ok(Some(member));
        }

        Ok(None)
    }
}

impl Default for NamedIdMemberConvention {
    fn default() -> Self {
        NamedIdMemberConvention::new(Self::DEFAULT_NAMES)
    }
}

impl ClassMapConvention for NamedIdMemberConvention {
    fn name(&self) -> &str {
        "NamedIdMember"
    }

    fn apply(&self, class_map: &mut ClassMap) -> Result<(), ConventionError> {
        let class = class_map.descriptor();
        if let Some(member) = self.resolve(&class)? {
            class_map.map_id_member(member)?;
            debug!("{}: id member resolved to {}", class.name(), member.name());
        }
        Ok(())
    }
}

fn is_valid_id_member(class: &ClassDescriptor, member: &MemberDescriptor) -> bool {
    match member.kind() {
        MemberKind::Field => true,
        MemberKind::Property => !member.is_overriding_accessor(class.name()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::class_map::ID_ELEMENT_NAME;
    use crate::describe::Describe;
    use crate::kind::PrimitiveKind;
    use crate::member::Visibility;

    fn map_of(class: ClassDescriptor) -> ClassMap {
        ClassMap::new(Arc::new(class))
    }

    fn id_of(map: &ClassMap) -> Option<&str> {
        map.id_member_map().map(|m| m.member_name())
    }

    #[test]
    fn person_with_underscore_id() {
        let convention = NamedIdMemberConvention::new(["Id", "id", "_id"]);
        let mut map = map_of(
            ClassDescriptor::builder("Person")
                .property("_id", String::descriptor())
                .build(),
        );

        convention.apply(&mut map).unwrap();

        let id = map.id_member_map().unwrap();
        assert_eq!(id.member_name(), "_id");
        assert_eq!(id.element_name(), ID_ELEMENT_NAME);
        assert_eq!(id.primitive(), PrimitiveKind::String);
    }

    #[test]
    fn first_listed_name_wins() {
        let convention = NamedIdMemberConvention::default();
        let mut map = map_of(
            ClassDescriptor::builder("Both")
                .field("_id", String::descriptor())
                .field("Id", i64::descriptor())
                .build(),
        );

        convention.apply(&mut map).unwrap();
        assert_eq!(id_of(&map), Some("Id"));
        assert_eq!(map.member_maps().len(), 1);
    }

    #[test]
    fn visibility_filtered_name_falls_through() {
        let convention = NamedIdMemberConvention::default();
        let mut map = map_of(
            ClassDescriptor::builder("Hidden")
                .member(
                    MemberDescriptor::field("Id", String::descriptor())
                        .with_visibility(Visibility::NonPublic),
                )
                .field("id", String::descriptor())
                .build(),
        );

        convention.apply(&mut map).unwrap();
        assert_eq!(id_of(&map), Some("id"));
    }

    #[test]
    fn broader_binding_sees_non_public_members() {
        let convention = NamedIdMemberConvention::default().with_binding(
            BindingFlags::PUBLIC | BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE,
        );
        let mut map = map_of(
            ClassDescriptor::builder("Hidden")
                .member(
                    MemberDescriptor::field("Id", String::descriptor())
                        .with_visibility(Visibility::NonPublic),
                )
                .field("id", String::descriptor())
                .build(),
        );

        convention.apply(&mut map).unwrap();
        assert_eq!(id_of(&map), Some("Id"));
    }

    #[test]
    fn member_kind_filter_applies() {
        let convention =
            NamedIdMemberConvention::default().with_member_kinds(MemberKinds::PROPERTY);
        let mut map = map_of(
            ClassDescriptor::builder("Mixed")
                .field("Id", String::descriptor())
                .property("_id", String::descriptor())
                .build(),
        );

        convention.apply(&mut map).unwrap();
        assert_eq!(id_of(&map), Some("_id"));
    }

    #[test]
    fn overriding_property_is_skipped() {
        let convention = NamedIdMemberConvention::new(["Id", "Key"]);

        let mut base = map_of(
            ClassDescriptor::builder("Entity")
                .virtual_property("Id", String::descriptor())
                .build(),
        );
        convention.apply(&mut base).unwrap();
        assert_eq!(id_of(&base), Some("Id"));

        let mut derived = map_of(
            ClassDescriptor::builder("Order")
                .base("Entity")
                .overriding_property("Id", String::descriptor(), "Entity")
                .field("Key", u64::descriptor())
                .build(),
        );
        convention.apply(&mut derived).unwrap();
        assert_eq!(id_of(&derived), Some("Key"));

        let mut derived_only = map_of(
            ClassDescriptor::builder("Invoice")
                .base("Entity")
                .overriding_property("Id", String::descriptor(), "Entity")
                .build(),
        );
        convention.apply(&mut derived_only).unwrap();
        assert!(derived_only.id_member_map().is_none());
        assert!(derived_only.member_maps().is_empty());
    }

    #[test]
    fn inherited_member_is_not_offered() {
        let convention = NamedIdMemberConvention::default();
        let mut map = map_of(
            ClassDescriptor::builder("Derived")
                .base("Entity")
                .field("name", String::descriptor())
                .build(),
        );

        convention.apply(&mut map).unwrap();
        assert!(map.id_member_map().is_none());
    }

    #[test]
    fn matching_is_case_sensitive() {
        let convention = NamedIdMemberConvention::new(["Id"]);
        let mut map = map_of(
            ClassDescriptor::builder("Upper")
                .field("ID", String::descriptor())
                .build(),
        );
        convention.apply(&mut map).unwrap();
        assert!(map.id_member_map().is_none());

        let ignore_case =
            convention.with_binding(BindingFlags::default() | BindingFlags::IGNORE_CASE);
        ignore_case.apply(&mut map).unwrap();
        assert_eq!(id_of(&map), Some("ID"));
    }

    #[test]
    fn ambiguous_name_fails() {
        let convention = NamedIdMemberConvention::default();
        let mut map = map_of(
            ClassDescriptor::builder("Twice")
                .field("Id", String::descriptor())
                .property("Id", String::descriptor())
                .build(),
        );

        let err = convention.apply(&mut map).unwrap_err();
        assert!(matches!(
            err,
            ConventionError::AmbiguousMember { ref name, count: 2, .. } if name == "Id"
        ));
        assert!(map.id_member_map().is_none());
    }

    #[test]
    fn apply_twice_is_idempotent() {
        let convention = NamedIdMemberConvention::default();
        let mut map = map_of(
            ClassDescriptor::builder("Person")
                .field("id", String::descriptor())
                .build(),
        );

        convention.apply(&mut map).unwrap();
        convention.apply(&mut map).unwrap();
        assert_eq!(id_of(&map), Some("id"));
        assert_eq!(map.member_maps().len(), 1);
    }

    #[test]
    fn apply_on_frozen_map_propagates_error() {
        let convention = NamedIdMemberConvention::default();
        let mut map = map_of(
            ClassDescriptor::builder("Person")
                .field("Id", String::descriptor())
                .build(),
        );
        map.freeze();

        let err = convention.apply(&mut map).unwrap_err();
        assert!(matches!(
            err,
            ConventionError::ClassMap(ClassMapError::Frozen(_))
        ));
    }

    #[test]
    fn not_found_on_frozen_map_is_still_ok() {
        let convention = NamedIdMemberConvention::default();
        let mut map = map_of(ClassDescriptor::builder("Empty").build());
        map.freeze();
        convention.apply(&mut map).unwrap();
    }

    #[test]
    fn absent_names_are_invalid() {
        let err = NamedIdMemberConvention::try_new(
            None::<Vec<String>>,
            MemberKinds::ALL,
            BindingFlags::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConventionError::InvalidArgument("names")));
    }

    #[test]
    fn empty_names_resolve_nothing() {
        let convention = NamedIdMemberConvention::new(Vec::<String>::new());
        let class = ClassDescriptor::builder("Person")
            .field("Id", String::descriptor())
            .build();
        assert!(convention.resolve(&class).unwrap().is_none());
    }

    #[test]
    fn default_configuration() {
        let convention = NamedIdMemberConvention::default();
        assert_eq!(convention.names(), ["Id", "id", "_id"]);
        assert_eq!(convention.member_kinds(), MemberKinds::ALL);
        assert_eq!(
            convention.binding(),
            BindingFlags::PUBLIC | BindingFlags::INSTANCE
        );
        assert_eq!(convention.name(), "NamedIdMember");
    }
}
