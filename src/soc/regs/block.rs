//! Address hierarchy accessors. Blocks and vectors hold nothing but a bus handle, a base
//! address and their schema; every lookup builds a fresh child accessor at
//! `base + offset (+ index * stride)`.
use std::sync::Arc;

use tracing::debug;

use crate::soc::bus::{AccessError, AccessResult, BusRef};

use super::{
    register::Register,
    schema::{BlockSchema, Element, FieldSchema},
};

const ID_REGISTER: &str = "ID";
const VER_REGISTER: &str = "VER";

/// Accessor produced by resolving a name or index.
#[derive(Clone)]
pub enum Node {
    Register(Register),
    Block(Block),
    Vector(Vector),
}

impl Node {
    pub fn address(&self) -> u32 {
        match self {
            Node::Register(register) => register.address(),
            Node::Block(block) => block.address(),
            Node::Vector(vector) => vector.address(),
        }
    }

    pub fn into_register(self, name: &str) -> AccessResult<Register> {
        match self {
            Node::Register(register) => Ok(register),
            _ => Err(kind_error(name, "register")),
        }
    }

    pub fn into_block(self, name: &str) -> AccessResult<Block> {
        match self {
            Node::Block(block) => Ok(block),
            _ => Err(kind_error(name, "block")),
        }
    }

    pub fn into_vector(self, name: &str) -> AccessResult<Vector> {
        match self {
            Node::Vector(vector) => Ok(vector),
            _ => Err(kind_error(name, "vector")),
        }
    }
}

fn kind_error(field: &str, expected: &'static str) -> AccessError {
    AccessError::FieldKind {
        field: field.to_string(),
        expected,
    }
}

fn offset_address(base: u32, offset: u64) -> AccessResult<u32> {
    u32::try_from(offset)
        .ok()
        .and_then(|offset| base.checked_add(offset))
        .ok_or(AccessError::AddressOverflow { base, offset })
}

fn element_at(bus: &BusRef, address: u32, element: &Element) -> Node {
    match element {
        Element::Register(schema) => Node::Register(Register::new(bus.clone(), address, schema.clone())),
        Element::Block(schema) => Node::Block(Block::new(bus.clone(), address, schema.clone())),
    }
}

#[derive(Clone)]
pub struct Block {
    bus: BusRef,
    base: u32,
    schema: Arc<BlockSchema>,
}

impl Block {
    pub fn new(bus: BusRef, base: u32, schema: Arc<BlockSchema>) -> Self {
        Self { bus, base, schema }
    }

    #[inline(always)]
    pub fn address(&self) -> u32 {
        self.base
    }

    pub fn schema(&self) -> &Arc<BlockSchema> {
        &self.schema
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.schema.fields().iter().map(|f| f.name.as_str())
    }

    pub fn resolve(&self, name: &str) -> AccessResult<Node> {
        let field = self
            .schema
            .field(name)
            .ok_or_else(|| AccessError::UnknownField {
                scope: self.schema.name().to_string(),
                field: name.to_string(),
            })?;
        self.child(field)
    }

    pub fn register(&self, name: &str) -> AccessResult<Register> {
        self.resolve(name)?.into_register(name)
    }

    pub fn block(&self, name: &str) -> AccessResult<Block> {
        self.resolve(name)?.into_block(name)
    }

    pub fn vector(&self, name: &str) -> AccessResult<Vector> {
        self.resolve(name)?.into_vector(name)
    }

    pub fn dispatch(&self) -> AccessResult<()> {
        self.bus.borrow_mut().dispatch()
    }

    /// Checks the `ID` and `VER` registers of this block and, recursively, of every
    /// non-blackbox sub-block (vector elements included) against the schema constants.
    /// Sub-blocks are checked before the block itself; the walk stops at the first
    /// mismatch. Nothing inside a blackbox is read, even when it is the starting block.
    pub fn verify_id_and_version(&self) -> AccessResult<()> {
        if self.schema.is_blackbox() {
            return Ok(());
        }
        for field in self.schema.fields() {
            let Element::Block(schema) = &field.element else {
                continue;
            };
            if schema.is_blackbox() {
                continue;
            }
            match self.child(field)? {
                Node::Block(block) => block.verify_id_and_version()?,
                Node::Vector(vector) => {
                    for index in 0..vector.len() {
                        vector.block_at(index)?.verify_id_and_version()?;
                    }
                }
                Node::Register(_) => {}
            }
        }

        if let Some(identity) = self.schema.identity() {
            self.verify_register(ID_REGISTER, identity.id)?;
            self.verify_register(VER_REGISTER, identity.ver)?;
            debug!(block = self.schema.name(), base = self.base, "identity verified");
        }
        Ok(())
    }

    fn verify_register(&self, name: &'static str, expected: u32) -> AccessResult<()> {
        let found = self.register(name)?.read()?;
        if found != expected {
            return Err(AccessError::IdentityMismatch {
                block: self.schema.name().to_string(),
                register: name,
                expected,
                found,
            });
        }
        Ok(())
    }

    fn child(&self, field: &FieldSchema) -> AccessResult<Node> {
        let address = offset_address(self.base, field.offset.into())?;
        Ok(match field.count {
            Some(len) => Node::Vector(Vector {
                bus: self.bus.clone(),
                base: address,
                len,
                element: field.element.clone(),
            }),
            None => element_at(&self.bus, address, &field.element),
        })
    }
}

/// Run of `len` identical registers or blocks laid out back to back.
#[derive(Clone)]
pub struct Vector {
    bus: BusRef,
    base: u32,
    len: usize,
    element: Element,
}

impl Vector {
    #[inline(always)]
    pub fn address(&self) -> u32 {
        self.base
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn stride(&self) -> u32 {
        self.element.stride()
    }

    pub fn at(&self, index: usize) -> AccessResult<Node> {
        if index >= self.len {
            return Err(AccessError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let offset = index as u64 * u64::from(self.stride());
        let address = offset_address(self.base, offset)?;
        Ok(element_at(&self.bus, address, &self.element))
    }

    pub fn register_at(&self, index: usize) -> AccessResult<Register> {
        self.at(index)?.into_register(&format!("[{index}]"))
    }

    pub fn block_at(&self, index: usize) -> AccessResult<Block> {
        self.at(index)?.into_block(&format!("[{index}]"))
    }
}
