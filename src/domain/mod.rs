pub mod book;
pub mod borrowing;
pub mod commands;
pub mod errors;
pub mod reader;
pub mod value_objects;

pub use book::{Book, BookStatus};
pub use borrowing::{Borrowing, BorrowingCore, OpenBorrowing, ReturnedBorrowing};
pub use errors::*;
pub use reader::Reader;
pub use value_objects::*;
