use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;

use crate::class::{ClassDescriptor, Document};
use crate::class_map::ClassMap;

/// Error type for registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("class already registered: {0}")]
    DuplicateClass(String),
    #[error("class not registered: {0}")]
    UnknownClass(String),
    #[error("class {class} names unregistered base {base}")]
    UnknownBase { class: String, base: String },
    #[error("inheritance cycle through {0}")]
    InheritanceCycle(String),
    #[error(
        "{class}.{member} overrides a getter declared on {base_definition}, which is not {class} or one of its ancestors"
    )]
    UnknownOverrideTarget {
        class: String,
        member: String,
        base_definition: String,
    },
    #[error("failed to encode registry: {0}")]
    Encode(#[from] ciborium::ser::Error<std::io::Error>),
    #[error("failed to decode registry: {0}")]
    Decode(#[from] ciborium::de::Error<std::io::Error>),
}

/// Build-time table of class metadata, keyed by class name.
///
/// Stands in for runtime reflection: every class the mapper may see is
/// registered once, then class maps are created from the shared descriptors.
/// Iteration follows registration order.
#[derive(Debug, Default, Clone)]
pub struct ClassRegistry {
    classes: IndexMap<String, Arc<ClassDescriptor>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        ClassRegistry {
            classes: IndexMap::new(),
        }
    }

    /// Registers the descriptor derived for `T`.
    pub fn register<T: Document>(&mut self) -> Result<Arc<ClassDescriptor>, RegistryError> {
        self.insert(T::class_descriptor())
    }

    /// Adds a descriptor, returning the shared handle to it.
    pub fn insert(
        &mut self,
        descriptor: ClassDescriptor,
    ) -> Result<Arc<ClassDescriptor>, RegistryError> {
        if self.classes.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateClass(descriptor.name().to_string()));
        }

        debug!(
            "registering class {} ({} declared members)",
            descriptor.name(),
            descriptor.members().len()
        );
        let descriptor = Arc::new(descriptor);
        self.classes
            .insert(descriptor.name().to_string(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ClassDescriptor>> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClassDescriptor>> {
        self.classes.values()
    }

    /// Walks the base chain of `name`, nearest ancestor first.
    ///
    /// Stops at the first base that is not registered. Never loops, even if
    /// the registered bases form a cycle.
    pub fn ancestors<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Arc<ClassDescriptor>> {
        let mut seen = HashSet::new();
        seen.insert(name.to_string());
        let mut next = self.get(name).and_then(|class| class.base());

        std::iter::from_fn(move || {
            let base = self.get(next?)?;
            if !seen.insert(base.name().to_string()) {
                return None;
            }
            next = base.base();
            Some(base)
        })
    }

    /// Creates a fresh class map for a registered class.
    pub fn class_map(&self, name: &str) -> Result<ClassMap, RegistryError> {
        self.get(name)
            .map(|class| ClassMap::new(Arc::clone(class)))
            .ok_or_else(|| RegistryError::UnknownClass(name.to_string()))
    }

    /// Checks that the inheritance metadata is consistent.
    ///
    /// Every base must be registered, base chains must be acyclic, and every
    /// virtual getter must name this class or one of its ancestors as the
    /// declaring class of the original accessor.
    pub fn verify(&self) -> Result<(), RegistryError> {
        for class in self.classes.values() {
            self.verify_chain(class)?;

            for member in class.members() {
                let Some(base_definition) = member.base_definition() else {
                    continue;
                };
                let known = base_definition == class.name()
                    || self
                        .ancestors(class.name())
                        .any(|ancestor| ancestor.name() == base_definition);
                if !known {
                    return Err(RegistryError::UnknownOverrideTarget {
                        class: class.name().to_string(),
                        member: member.name().to_string(),
                        base_definition: base_definition.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn verify_chain(&self, class: &ClassDescriptor) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();
        let mut current = class;
        seen.insert(current.name());

        while let Some(base) = current.base() {
            let Some(next) = self.get(base) else {
                return Err(RegistryError::UnknownBase {
                    class: current.name().to_string(),
                    base: base.to_string(),
                });
            };
            if !seen.insert(next.name()) {
                return Err(RegistryError::InheritanceCycle(class.name().to_string()));
            }
            current = next.as_ref();
        }
        Ok(())
    }

    /// Encodes all descriptors as CBOR, in registration order.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RegistryError> {
        let classes: Vec<&ClassDescriptor> = self.classes.values().map(Arc::as_ref).collect();
        let mut bytes = Vec::new();
        ciborium::into_writer(&classes, &mut bytes)?;
        Ok(bytes)
    }

    /// Rebuilds a registry from bytes produced by [`ClassRegistry::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RegistryError> {
        let classes: Vec<ClassDescriptor> = ciborium::from_reader(bytes)?;
        let mut registry = ClassRegistry::new();
        for class in classes {
            registry.insert(class)?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::Describe;

    fn hierarchy() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry
            .insert(
                ClassDescriptor::builder("Entity")
                    .virtual_property("Id", String::descriptor())
                    .build(),
            )
            .unwrap();
        registry
            .insert(
                ClassDescriptor::builder("Order")
                    .base("Entity")
                    .overriding_property("Id", String::descriptor(), "Entity")
                    .build(),
            )
            .unwrap();
        registry
            .insert(
                ClassDescriptor::builder("RushOrder")
                    .base("Order")
                    .field("deadline", i64::descriptor())
                    .build(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn duplicate_class_rejected() {
        let mut registry = hierarchy();
        let err = registry
            .insert(ClassDescriptor::builder("Order").build())
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateClass(name) if name == "Order"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn ancestors_nearest_first() {
        let registry = hierarchy();
        let names: Vec<_> = registry.ancestors("RushOrder").map(|c| c.name()).collect();
        assert_eq!(names, vec!["Order", "Entity"]);
        assert_eq!(registry.ancestors("Entity").count(), 0);
        assert_eq!(registry.ancestors("Missing").count(), 0);
    }

    #[test]
    fn ancestors_terminate_on_cycle() {
        let mut registry = ClassRegistry::new();
        registry
            .insert(ClassDescriptor::builder("A").base("B").build())
            .unwrap();
        registry
            .insert(ClassDescriptor::builder("B").base("A").build())
            .unwrap();
        let names: Vec<_> = registry.ancestors("A").map(|c| c.name()).collect();
        assert_eq!(names, vec!["B"]);
        assert!(matches!(
            registry.verify(),
            Err(RegistryError::InheritanceCycle(_))
        ));
    }

    #[test]
    fn verify_accepts_consistent_hierarchy() {
        hierarchy().verify().unwrap();
    }

    #[test]
    fn verify_rejects_missing_base() {
        let mut registry = ClassRegistry::new();
        registry
            .insert(ClassDescriptor::builder("Order").base("Entity").build())
            .unwrap();
        let err = registry.verify().unwrap_err();
        assert!(matches!(err, RegistryError::UnknownBase { base, .. } if base == "Entity"));
    }

    #[test]
    fn verify_rejects_override_of_non_ancestor() {
        let mut registry = ClassRegistry::new();
        registry
            .insert(ClassDescriptor::builder("Entity").build())
            .unwrap();
        registry
            .insert(
                ClassDescriptor::builder("Order")
                    .base("Entity")
                    .overriding_property("Id", String::descriptor(), "Document")
                    .build(),
            )
            .unwrap();
        match registry.verify().unwrap_err() {
            RegistryError::UnknownOverrideTarget {
                base_definition, ..
            } => assert_eq!(base_definition, "Document"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn class_map_for_unknown_class() {
        let registry = hierarchy();
        assert!(registry.class_map("Order").is_ok());
        assert!(matches!(
            registry.class_map("Nope"),
            Err(RegistryError::UnknownClass(_))
        ));
    }

    #[test]
    fn cbor_preserves_descriptors_and_order() {
        let registry = hierarchy();
        let bytes = registry.to_bytes().unwrap();
        let recovered = ClassRegistry::from_bytes(&bytes).unwrap();

        let names: Vec<_> = recovered.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Entity", "Order", "RushOrder"]);
        assert_eq!(recovered.get("Order"), registry.get("Order"));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            ClassRegistry::from_bytes(&[0xff, 0x00, 0x13]),
            Err(RegistryError::Decode(_))
        ));
    }
}
