use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookCondition, BookId, BorrowingId, ReaderId};

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub book_id: BookId,
    pub reader_id: ReaderId,
    pub due_date: DateTime<Utc>,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub borrowing_id: BorrowingId,
    pub condition: BookCondition,
}
