//! Static description of a block hierarchy: which names exist in a block, where they sit
//! relative to the block base, and what kind of accessor each one produces. Schemas are
//! built once (usually by generated code) and shared read-only between accessors.

use std::sync::Arc;

use ahash::AHashMap;

use super::register::RegisterSchema;

/// Constants a block reports through its `ID` and `VER` registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    pub id: u32,
    pub ver: u32,
}

#[derive(Clone, Debug)]
pub enum Element {
    Register(Arc<RegisterSchema>),
    Block(Arc<BlockSchema>),
}

impl Element {
    /// Address span of one element.
    pub fn stride(&self) -> u32 {
        match self {
            Element::Register(_) => 1,
            Element::Block(block) => block.size,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Element::Register(_) => "register",
            Element::Block(_) => "block",
        }
    }
}

#[derive(Clone, Debug)]
pub struct FieldSchema {
    pub name: String,
    pub offset: u32,
    /// Element count for vectors; `None` for a single element.
    pub count: Option<usize>,
    pub element: Element,
}

#[derive(Debug)]
pub struct BlockSchema {
    name: String,
    size: u32,
    identity: Option<Identity>,
    blackbox: bool,
    fields: Vec<FieldSchema>,
    index: AHashMap<String, usize>,
}

impl BlockSchema {
    pub fn builder(name: impl Into<String>, size: u32) -> BlockSchemaBuilder {
        BlockSchemaBuilder::new(name.into(), size)
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline(always)]
    pub fn identity(&self) -> Option<Identity> {
        self.identity
    }

    #[inline(always)]
    pub fn is_blackbox(&self) -> bool {
        self.blackbox
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }
}

pub struct BlockSchemaBuilder {
    name: String,
    size: u32,
    identity: Option<Identity>,
    blackbox: bool,
    fields: Vec<FieldSchema>,
    index: AHashMap<String, usize>,
}

impl BlockSchemaBuilder {
    fn new(name: String, size: u32) -> Self {
        Self {
            name,
            size,
            identity: None,
            blackbox: false,
            fields: Vec::new(),
            index: AHashMap::new(),
        }
    }

    pub fn identity(mut self, id: u32, ver: u32) -> Self {
        self.identity = Some(Identity { id, ver });
        self
    }

    /// Marks the block as opaque: it is skipped by identity verification.
    pub fn blackbox(mut self) -> Self {
        self.blackbox = true;
        self
    }

    pub fn register(self, name: impl Into<String>, offset: u32, schema: Arc<RegisterSchema>) -> Self {
        self.push(name.into(), offset, None, Element::Register(schema))
    }

    pub fn registers(
        self,
        name: impl Into<String>,
        offset: u32,
        count: usize,
        schema: Arc<RegisterSchema>,
    ) -> Self {
        self.push(name.into(), offset, Some(count), Element::Register(schema))
    }

    pub fn block(self, name: impl Into<String>, offset: u32, schema: Arc<BlockSchema>) -> Self {
        self.push(name.into(), offset, None, Element::Block(schema))
    }

    pub fn blocks(
        self,
        name: impl Into<String>,
        offset: u32,
        count: usize,
        schema: Arc<BlockSchema>,
    ) -> Self {
        self.push(name.into(), offset, Some(count), Element::Block(schema))
    }

    pub fn finish(self) -> Arc<BlockSchema> {
        Arc::new(BlockSchema {
            name: self.name,
            size: self.size,
            identity: self.identity,
            blackbox: self.blackbox,
            fields: self.fields,
            index: self.index,
        })
    }

    fn push(mut self, name: String, offset: u32, count: Option<usize>, element: Element) -> Self {
        let previous = self.index.insert(name.clone(), self.fields.len());
        assert!(
            previous.is_none(),
            "field '{name}' declared twice in block '{}'",
            self.name
        );
        self.fields.push(FieldSchema {
            name,
            offset,
            count,
            element,
        });
        self
    }
}
