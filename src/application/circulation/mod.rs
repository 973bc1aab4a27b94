mod borrowing_service;
mod errors;

pub use borrowing_service::{
    ServiceDependencies, borrow_book, open_borrowings_for_reader, return_book,
};
pub use errors::{CirculationError, Result};
