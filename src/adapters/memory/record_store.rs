use crate::domain::{
    Book, Borrowing, Reader,
    value_objects::{BookId, BorrowingId, ReaderId},
};
use crate::ports::record_store::{BookPatch, ReaderPatch, RecordStore as RecordStoreTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

/// Raised when a patch or update targets an id the store has never seen.
#[derive(Debug, Error)]
#[error("{entity} {id} not found in record store")]
pub struct RecordNotFound {
    entity: &'static str,
    id: uuid::Uuid,
}

#[derive(Default)]
struct Collections {
    books: Vec<Book>,
    readers: Vec<Reader>,
    borrowings: Vec<Borrowing>,
}

/// In-memory implementation of the RecordStore port.
///
/// Collections are plain Vecs guarded by a single Mutex, so list order is
/// insertion order. That order is load-bearing: category distribution and
/// top-N tie-breaking both follow it. Constructed once at process start;
/// there is no durable storage in this system.
#[derive(Default)]
pub struct MemoryRecordStore {
    collections: Mutex<Collections>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a book. Book management flows are external to the core,
    /// so this doubles as the seeding hook for bootstrap and tests.
    pub fn add_book(&self, book: Book) {
        self.collections.lock().unwrap().books.push(book);
    }

    /// Register a reader. Same role as `add_book`.
    pub fn add_reader(&self, reader: Reader) {
        self.collections.lock().unwrap().readers.push(reader);
    }
}

#[async_trait]
impl RecordStoreTrait for MemoryRecordStore {
    async fn list_books(&self) -> Result<Vec<Book>> {
        Ok(self.collections.lock().unwrap().books.clone())
    }

    async fn list_readers(&self) -> Result<Vec<Reader>> {
        Ok(self.collections.lock().unwrap().readers.clone())
    }

    async fn list_borrowings(&self) -> Result<Vec<Borrowing>> {
        Ok(self.collections.lock().unwrap().borrowings.clone())
    }

    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .books
            .iter()
            .find(|b| b.book_id == book_id)
            .cloned())
    }

    async fn get_reader(&self, reader_id: ReaderId) -> Result<Option<Reader>> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .readers
            .iter()
            .find(|r| r.reader_id == reader_id)
            .cloned())
    }

    async fn get_borrowing(&self, borrowing_id: BorrowingId) -> Result<Option<Borrowing>> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .borrowings
            .iter()
            .find(|b| b.borrowing_id() == borrowing_id)
            .cloned())
    }

    async fn update_book(&self, book_id: BookId, patch: BookPatch) -> Result<()> {
        let mut collections = self.collections.lock().unwrap();
        let book = collections
            .books
            .iter_mut()
            .find(|b| b.book_id == book_id)
            .ok_or(RecordNotFound {
                entity: "book",
                id: book_id.value(),
            })?;

        if let Some(title) = patch.title {
            book.title = title;
        }
        if let Some(category) = patch.category {
            book.category = category;
        }
        if let Some(status) = patch.status {
            book.status = status;
        }
        Ok(())
    }

    async fn update_reader(&self, reader_id: ReaderId, patch: ReaderPatch) -> Result<()> {
        let mut collections = self.collections.lock().unwrap();
        let reader = collections
            .readers
            .iter_mut()
            .find(|r| r.reader_id == reader_id)
            .ok_or(RecordNotFound {
                entity: "reader",
                id: reader_id.value(),
            })?;

        if let Some(full_name) = patch.full_name {
            reader.full_name = full_name;
        }
        if let Some(reader_code) = patch.reader_code {
            reader.reader_code = reader_code;
        }
        Ok(())
    }

    async fn create_borrowing(&self, borrowing: Borrowing) -> Result<BorrowingId> {
        let borrowing_id = borrowing.borrowing_id();
        self.collections.lock().unwrap().borrowings.push(borrowing);
        Ok(borrowing_id)
    }

    async fn update_borrowing(
        &self,
        borrowing_id: BorrowingId,
        borrowing: Borrowing,
    ) -> Result<()> {
        let mut collections = self.collections.lock().unwrap();
        let slot = collections
            .borrowings
            .iter_mut()
            .find(|b| b.borrowing_id() == borrowing_id)
            .ok_or(RecordNotFound {
                entity: "borrowing",
                id: borrowing_id.value(),
            })?;

        *slot = borrowing;
        Ok(())
    }
}
