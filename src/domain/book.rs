use serde::{Deserialize, Serialize};

use super::{BookCondition, BookId};

/// 書籍ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    /// 貸出可能
    Available,
    /// 貸出中
    Borrowed,
    /// 破損
    Damaged,
}

impl BookStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
            BookStatus::Damaged => "damaged",
        }
    }

    /// 返却時の書籍の状態から次のステータスを決定する
    ///
    /// ビジネスルール：
    /// - 良好なら再び貸出可能
    /// - 破損なら破損扱い（貸出不可）
    pub fn after_return(condition: BookCondition) -> Self {
        match condition {
            BookCondition::Good => BookStatus::Available,
            BookCondition::Damaged => BookStatus::Damaged,
        }
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(BookStatus::Available),
            "borrowed" => Ok(BookStatus::Borrowed),
            "damaged" => Ok(BookStatus::Damaged),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

/// 書籍エンティティ
///
/// 蔵書管理フロー（タイトルやカテゴリの編集）はスコープ外。
/// 貸出サービスはstatusのみを遷移させる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub category: String,
    pub status: BookStatus,
}

impl Book {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            book_id: BookId::new(),
            title: title.into(),
            category: category.into(),
            status: BookStatus::Available,
        }
    }

    /// 貸出可能か
    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }
}
