pub mod batch;
pub mod error;
pub mod future;
pub mod queue;
pub mod register_bus;
pub mod rmw;

pub use batch::BatchingBus;
pub use error::{AccessError, AccessResult};
pub use future::{ReadFuture, ReadSlot};
pub use queue::{DispatchQueue, Operation, QueueConfig};
pub use register_bus::{BusRef, DirectBus, RegisterBus, shared};
pub use rmw::{PendingRmw, RmwCoalescer};
