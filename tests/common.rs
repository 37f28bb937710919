#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc, sync::Arc};

use regbus::{BatchingBus, BitField, BlockSchema, QueueConfig, RegisterFile, RegisterSchema};
use tracing_subscriber::EnvFilter;

pub type SharedBus = Rc<RefCell<BatchingBus<RegisterFile>>>;

/// Installs a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn batching_bus(words: u32) -> SharedBus {
    batching_bus_with(words, QueueConfig::default())
}

pub fn batching_bus_with(words: u32, config: QueueConfig) -> SharedBus {
    init_tracing();
    Rc::new(RefCell::new(BatchingBus::with_config(
        RegisterFile::new("sim", 0..words),
        config,
    )))
}

/// Small hierarchy with vectors of blocks and registers:
///
/// ```text
/// c1 (size 100)
///   f1   @0   10 x c2
///   f2   @11  c2
///   size @32  c2
///   x1   @40  5 x regs
/// c2 (size 3)   r1 @1 { t1: 3..1, t2: 9..4 }
/// regs (size 4) rv @1
/// ```
pub fn demo_schema() -> Arc<BlockSchema> {
    let r1 = RegisterSchema::control()
        .field("t1", BitField::unsigned(3, 1))
        .field("t2", BitField::unsigned(9, 4))
        .finish();
    let c2 = BlockSchema::builder("c2", 3).register("r1", 1, r1).finish();
    let regs = BlockSchema::builder("regs", 4)
        .register("rv", 1, RegisterSchema::control().finish())
        .finish();
    BlockSchema::builder("c1", 100)
        .blocks("f1", 0, 10, c2.clone())
        .block("f2", 11, c2.clone())
        .block("size", 32, c2)
        .blocks("x1", 40, 5, regs)
        .finish()
}

pub const MAIN_ID: u32 = 0x5A1E_C0DE;
pub const MAIN_VER: u32 = 0x0001_0002;
pub const LINK_ID: u32 = 0x11A7_0001;
pub const LINK_VER: u32 = 0x0000_0003;

/// Device-level hierarchy with identity registers, a link vector and opaque externals:
///
/// ```text
/// MAIN (size 0x100)  ID @0, VER @1, CTRL @2, TEST_OUT @4 x4, TEST_IN @8 x4
///   LINKS  @0x10  5 x LINK (size 0x10)  ID, VER, CTRL { START }, STATUS
///   EXTERN @0x80  2 x EXT  (size 0x10, blackbox)  reg @0 x16
/// ```
pub fn main_schema() -> Arc<BlockSchema> {
    let ro = RegisterSchema::status().finish();
    let link = BlockSchema::builder("LINK", 0x10)
        .identity(LINK_ID, LINK_VER)
        .register("ID", 0, ro.clone())
        .register("VER", 1, ro.clone())
        .register(
            "CTRL",
            2,
            RegisterSchema::control()
                .field("START", BitField::unsigned(0, 0))
                .finish(),
        )
        .register("STATUS", 3, ro.clone())
        .finish();
    let ext = BlockSchema::builder("EXT", 0x10)
        .identity(0xFFFF_FFFF, 0xFFFF_FFFF)
        .blackbox()
        .registers("reg", 0, 0x10, RegisterSchema::control().finish())
        .finish();
    let ctrl = RegisterSchema::control()
        .field("CLK_ENABLE", BitField::unsigned(0, 0))
        .field("CLK_FREQ", BitField::unsigned(4, 1))
        .field("PLL_RESET", BitField::unsigned(5, 5))
        .field("TRIM", BitField::signed(11, 8))
        .finish();
    BlockSchema::builder("MAIN", 0x100)
        .identity(MAIN_ID, MAIN_VER)
        .register("ID", 0, ro.clone())
        .register("VER", 1, ro.clone())
        .register("CTRL", 2, ctrl)
        .registers("TEST_OUT", 4, 4, RegisterSchema::control().finish())
        .registers("TEST_IN", 8, 4, ro)
        .blocks("LINKS", 0x10, 5, link)
        .blocks("EXTERN", 0x80, 2, ext)
        .finish()
}

/// Loads the identity constants `main_schema` expects at `base`.
pub fn preset_main_identity(bus: &SharedBus, base: u32) {
    let mut bus = bus.borrow_mut();
    let file = bus.device_mut();
    file.preset(base, MAIN_ID).expect("MAIN ID");
    file.preset(base + 1, MAIN_VER).expect("MAIN VER");
    for link in 0..5 {
        let link_base = base + 0x10 + link * 0x10;
        file.preset(link_base, LINK_ID).expect("LINK ID");
        file.preset(link_base + 1, LINK_VER).expect("LINK VER");
    }
}
