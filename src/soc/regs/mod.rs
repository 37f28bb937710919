//! Register hierarchy: bitfield codecs, register accessors, and the block/vector
//! addressing layer built from a static schema.

pub mod bitfield;
pub mod block;
pub mod register;
pub mod schema;

pub use bitfield::BitField;
pub use block::{Block, Node, Vector};
pub use register::{Access, FieldAccess, FieldFuture, Register, RegisterSchema, RegisterSchemaBuilder};
pub use schema::{BlockSchema, BlockSchemaBuilder, Element, FieldSchema, Identity};
