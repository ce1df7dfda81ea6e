//! Type layer: builtin fundamentals, attribute schemas, and TypeInfo.
//!
//! ## Key Types
//!
//! - [`FundamentalType`] / [`BuiltinType`] - Reserved scalar and sentinel types
//! - [`Attribute`] / [`AttributeType`] - Typed metadata declarations
//! - [`TypeInfo`] / [`TypeInfoArena`] - Computed value shapes with placeholder identities
//! - [`schema`] - Universal, per-kind, optional, and collection attribute sets

mod attribute;
mod fundamental;
pub mod schema;
mod type_info;

pub use attribute::{
    Attribute, AttributeSchema, AttributeType, ElementCheck, ValueCheck, schema_from,
};
pub use fundamental::{BuiltinType, FundamentalType};
pub use type_info::{
    ClassTypeInfo, FundamentalTypeInfo, Shape, TypeInfo, TypeInfoArena, TypeInfoId, TypeInfoTable,
};
