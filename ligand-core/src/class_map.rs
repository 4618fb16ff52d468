use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::class::{ClassDescriptor, Document};
use crate::kind::{classify, PrimitiveKind};
use crate::member::{MemberDescriptor, MemberKind};

/// Element name the identifier member is stored under.
pub const ID_ELEMENT_NAME: &str = "_id";

/// Error type for class map mutations.
#[derive(Debug, thiserror::Error)]
pub enum ClassMapError {
    #[error("class map for {0} is frozen")]
    Frozen(String),
    #[error("{class} does not declare member {member}")]
    MemberNotFound { class: String, member: String },
    #[error("{class} already maps {existing} as its id member, cannot map {requested}")]
    IdMemberConflict {
        class: String,
        existing: String,
        requested: String,
    },
}

/// How one member is stored in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberMap {
    member_name: String,
    element_name: String,
    kind: MemberKind,
    primitive: PrimitiveKind,
}

impl MemberMap {
    fn new(member: &MemberDescriptor) -> Self {
        MemberMap {
            member_name: member.name().to_string(),
            element_name: member.name().to_string(),
            kind: member.kind(),
            primitive: classify(Some(member.ty())),
        }
    }

    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Primitive kind of the member's type, for encoder dispatch.
    pub fn primitive(&self) -> PrimitiveKind {
        self.primitive
    }

    fn is_for(&self, member: &MemberDescriptor) -> bool {
        self.member_name == member.name() && self.kind == member.kind()
    }
}

/// Mapping of one class onto a document.
///
/// Conventions fill a class map in place; once frozen it rejects further
/// changes. The descriptor is shared, so many class maps may be built from
/// one registry.
#[derive(Debug, Clone)]
pub struct ClassMap {
    class: Arc<ClassDescriptor>,
    member_maps: Vec<MemberMap>,
    id_member: Option<usize>,
    frozen: bool,
}

impl ClassMap {
    pub fn new(class: Arc<ClassDescriptor>) -> Self {
        ClassMap {
            class,
            member_maps: Vec::new(),
            id_member: None,
            frozen: false,
        }
    }

    pub fn for_document<T: Document>() -> Self {
        ClassMap::new(Arc::new(T::class_descriptor()))
    }

    pub fn class(&self) -> &ClassDescriptor {
        &self.class
    }

    /// Shared handle to the descriptor, usable while the map is borrowed mutably.
    pub fn descriptor(&self) -> Arc<ClassDescriptor> {
        Arc::clone(&self.class)
    }

    pub fn member_maps(&self) -> &[MemberMap] {
        &self.member_maps
    }

    pub fn id_member_map(&self) -> Option<&MemberMap> {
        self.id_member.map(|index| &self.member_maps[index])
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Maps a declared member, returning the existing map if it is already mapped.
    pub fn map_member(&mut self, member: &MemberDescriptor) -> Result<&MemberMap, ClassMapError> {
        let index = self.member_index(member)?;
        Ok(&self.member_maps[index])
    }

    /// Maps the declared member with the given name.
    pub fn map_member_named(&mut self, name: &str) -> Result<&MemberMap, ClassMapError> {
        let class = self.descriptor();
        let member = class
            .member(name)
            .ok_or_else(|| ClassMapError::MemberNotFound {
                class: class.name().to_string(),
                member: name.to_string(),
            })?;
        self.map_member(member)
    }

    /// Maps `member` as the document identifier, stored under [`ID_ELEMENT_NAME`].
    ///
    /// Mapping the current id member again is a no-op. Mapping a different
    /// member once an id member exists fails with `IdMemberConflict`.
    pub fn map_id_member(
        &mut self,
        member: &MemberDescriptor,
    ) -> Result<&MemberMap, ClassMapError> {
        self.ensure_not_frozen()?;

        if let Some(existing) = self.id_member {
            let existing = &self.member_maps[existing];
            if existing.is_for(member) {
                return Ok(existing);
            }
            return Err(ClassMapError::IdMemberConflict {
                class: self.class.name().to_string(),
                existing: existing.member_name.clone(),
                requested: member.name().to_string(),
            });
        }

        let index = self.member_index(member)?;
        self.member_maps[index].element_name = ID_ELEMENT_NAME.to_string();
        self.id_member = Some(index);
        debug!(
            "mapped {}.{} as id member",
            self.class.name(),
            member.name()
        );
        Ok(&self.member_maps[index])
    }

    fn member_index(&mut self, member: &MemberDescriptor) -> Result<usize, ClassMapError> {
        self.ensure_not_frozen()?;

        if !self.class.declares(member) {
            return Err(ClassMapError::MemberNotFound {
                class: self.class.name().to_string(),
                member: member.name().to_string(),
            });
        }

        if let Some(index) = self.member_maps.iter().position(|m| m.is_for(member)) {
            return Ok(index);
        }

        self.member_maps.push(MemberMap::new(member));
        Ok(self.member_maps.len() - 1)
    }

    fn ensure_not_frozen(&self) -> Result<(), ClassMapError> {
        if self.frozen {
            return Err(ClassMapError::Frozen(self.class.name().to_string()));
        }
        Ok(())
    }
}
