pub mod clock;
pub mod record_store;

pub use clock::Clock;
pub use record_store::{BookPatch, ReaderPatch, RecordStore};
