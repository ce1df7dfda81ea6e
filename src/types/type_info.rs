//! TypeInfo: the computed shape and constraints of a value.
//!
//! TypeInfo lives in an arena and is addressed by [`TypeInfoId`]. During
//! transformation an id can be reserved before its contents are known; every
//! consumer embeds the id, and filling the slot later completes all of them at
//! once. This is what lets a recursive type (a node holding a list of itself)
//! refer to its own TypeInfo.

use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::fundamental::FundamentalType;
use crate::item::{Arity, Value};

/// Identity of a TypeInfo within its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeInfoId(u32);

impl TypeInfoId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeInfoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// The legal shape of a value together with its repetition bound.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub arity: Arity,
    pub shape: Shape,
}

impl TypeInfo {
    pub fn new(arity: Arity, shape: Shape) -> Self {
        Self { arity, shape }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Fundamental(FundamentalTypeInfo),
    Class(ClassTypeInfo),
    /// Exactly one of the listed alternatives.
    AnyOf(Vec<TypeInfoId>),
    /// Same shape as the target, under this TypeInfo's own arity.
    Ref(TypeInfoId),
    Any,
    Custom,
    Extension,
}

/// A scalar type with its resolved constraint values.
#[derive(Debug, Clone, PartialEq)]
pub struct FundamentalTypeInfo {
    pub ty: FundamentalType,
    pub constraints: IndexMap<SmolStr, Value>,
}

/// A structured type: inherited bases plus named fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassTypeInfo {
    pub bases: Vec<TypeInfoId>,
    pub fields: IndexMap<SmolStr, TypeInfoId>,
}

// ============================================================================
// ARENA
// ============================================================================

/// Arena of TypeInfo slots, some of which may still be placeholders.
#[derive(Debug, Clone, Default)]
pub struct TypeInfoArena {
    slots: Vec<Option<TypeInfo>>,
}

impl TypeInfoArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an identity whose contents will be filled later.
    pub fn reserve(&mut self) -> TypeInfoId {
        let id = TypeInfoId(self.slots.len() as u32);
        self.slots.push(None);
        id
    }

    pub fn alloc(&mut self, info: TypeInfo) -> TypeInfoId {
        let id = TypeInfoId(self.slots.len() as u32);
        self.slots.push(Some(info));
        id
    }

    /// Replace the contents of `id`, keeping its identity.
    pub fn fill(&mut self, id: TypeInfoId, info: TypeInfo) {
        self.slots[id.index()] = Some(info);
    }

    pub fn get(&self, id: TypeInfoId) -> Option<&TypeInfo> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: TypeInfoId) -> Option<&mut TypeInfo> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_placeholder(&self, id: TypeInfoId) -> bool {
        self.get(id).is_none()
    }

    /// Follow `Ref` shapes to the first non-reference slot.
    pub fn resolve(&self, mut id: TypeInfoId) -> TypeInfoId {
        let mut steps = 0;
        while let Some(TypeInfo {
            shape: Shape::Ref(target),
            ..
        }) = self.get(id)
        {
            if steps > self.slots.len() {
                break;
            }
            id = *target;
            steps += 1;
        }
        id
    }

    /// Convert into a finished table, or report the first placeholder.
    pub fn finish(self) -> Result<TypeInfoTable, TypeInfoId> {
        let mut infos = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.into_iter().enumerate() {
            match slot {
                Some(info) => infos.push(info),
                None => return Err(TypeInfoId(index as u32)),
            }
        }
        Ok(TypeInfoTable { infos })
    }
}

/// Finished TypeInfo arena; every slot is filled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeInfoTable {
    infos: Vec<TypeInfo>,
}

impl TypeInfoTable {
    pub fn get(&self, id: TypeInfoId) -> Option<&TypeInfo> {
        self.infos.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeInfoId, &TypeInfo)> {
        self.infos
            .iter()
            .enumerate()
            .map(|(index, info)| (TypeInfoId(index as u32), info))
    }

    /// Follow [`Shape::Ref`] links to the first non-reference TypeInfo.
    pub fn resolve(&self, mut id: TypeInfoId) -> TypeInfoId {
        let mut steps = 0;
        while let Some(TypeInfo {
            shape: Shape::Ref(target),
            ..
        }) = self.get(id)
        {
            id = *target;
            steps += 1;
            if steps > self.infos.len() {
                break;
            }
        }
        id
    }
}

impl Index<TypeInfoId> for TypeInfoTable {
    type Output = TypeInfo;

    fn index(&self, id: TypeInfoId) -> &TypeInfo {
        &self.infos[id.index()]
    }
}
