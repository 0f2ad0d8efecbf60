mod clock;
mod store;
mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{ActionClass, DedupKey, DedupStore, MemoryDedupStore};
pub use sweeper::spawn_sweeper;
