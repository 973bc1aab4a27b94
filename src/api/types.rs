use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Book, BookCondition, Borrowing, OpenBorrowing, Reader, ReturnedBorrowing,
    commands::{BorrowBook, ReturnBook},
    value_objects::{BookId, BorrowingId, ReaderId},
};

/// 貸出作成リクエスト（POST /borrowings）
#[derive(Debug, Deserialize)]
pub struct BorrowRequest {
    pub book_id: Uuid,
    pub reader_id: Uuid,
    pub due_date: DateTime<Utc>,
}

impl BorrowRequest {
    pub fn to_command(&self) -> BorrowBook {
        BorrowBook {
            book_id: BookId::from_uuid(self.book_id),
            reader_id: ReaderId::from_uuid(self.reader_id),
            due_date: self.due_date,
        }
    }
}

/// 返却リクエスト（POST /borrowings/:id/return）
#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    pub condition: BookCondition,
}

impl ReturnRequest {
    pub fn to_command(&self, borrowing_id: Uuid) -> ReturnBook {
        ReturnBook {
            borrowing_id: BorrowingId::from_uuid(borrowing_id),
            condition: self.condition,
        }
    }
}

/// 貸出作成レスポンス
#[derive(Debug, Serialize)]
pub struct BorrowingCreatedResponse {
    pub borrowing_id: Uuid,
    pub book_id: Uuid,
    pub reader_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

impl From<OpenBorrowing> for BorrowingCreatedResponse {
    fn from(borrowing: OpenBorrowing) -> Self {
        Self {
            borrowing_id: borrowing.borrowing_id.value(),
            book_id: borrowing.book_id.value(),
            reader_id: borrowing.reader_id.value(),
            borrowed_at: borrowing.borrowed_at,
            due_date: borrowing.due_date,
        }
    }
}

/// 返却レスポンス
#[derive(Debug, Serialize)]
pub struct BookReturnedResponse {
    pub borrowing_id: Uuid,
    pub book_id: Uuid,
    pub returned_at: DateTime<Utc>,
}

impl From<ReturnedBorrowing> for BookReturnedResponse {
    fn from(borrowing: ReturnedBorrowing) -> Self {
        Self {
            borrowing_id: borrowing.borrowing_id.value(),
            book_id: borrowing.book_id.value(),
            returned_at: borrowing.returned_at,
        }
    }
}

/// 貸出レスポンス（GET /borrowings）
#[derive(Debug, Serialize)]
pub struct BorrowingResponse {
    pub borrowing_id: Uuid,
    pub book_id: Uuid,
    pub reader_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: &'static str,
}

impl From<Borrowing> for BorrowingResponse {
    fn from(borrowing: Borrowing) -> Self {
        Self {
            borrowing_id: borrowing.borrowing_id().value(),
            book_id: borrowing.book_id().value(),
            reader_id: borrowing.reader_id().value(),
            borrowed_at: borrowing.borrowed_at(),
            due_date: borrowing.due_date(),
            returned_at: borrowing.returned_at(),
            status: if borrowing.is_open() {
                "borrowed"
            } else {
                "returned"
            },
        }
    }
}

/// 書籍レスポンス（GET /books）
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub book_id: Uuid,
    pub title: String,
    pub category: String,
    pub status: &'static str,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            book_id: book.book_id.value(),
            title: book.title,
            category: book.category,
            status: book.status.as_str(),
        }
    }
}

/// 読者レスポンス（GET /readers）
#[derive(Debug, Serialize)]
pub struct ReaderResponse {
    pub reader_id: Uuid,
    pub full_name: String,
    pub reader_code: String,
}

impl From<Reader> for ReaderResponse {
    fn from(reader: Reader) -> Self {
        Self {
            reader_id: reader.reader_id.value(),
            full_name: reader.full_name,
            reader_code: reader.reader_code.to_string(),
        }
    }
}

/// 貸出一覧のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListBorrowingsQuery {
    /// ステータスでフィルタリング（borrowed / returned）
    pub status: Option<String>,
}

/// 書籍一覧のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    /// ステータスでフィルタリング（available / borrowed / damaged）
    pub status: Option<String>,
}

/// 月次推移のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    /// 集計する月数（省略時は6）
    pub months: Option<u32>,
}

/// ランキングのクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    /// 返す件数の上限（省略時は5）
    pub limit: Option<usize>,
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
