use crate::domain::{
    Book, BookStatus, Borrowing, Reader,
    value_objects::{BookId, BorrowingId, ReaderCode, ReaderId},
};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍の部分更新
///
/// Noneのフィールドは変更しない。
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub status: Option<BookStatus>,
}

impl BookPatch {
    /// ステータスのみを変更するパッチ
    pub fn status(status: BookStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// 読者の部分更新
///
/// Noneのフィールドは変更しない。
#[derive(Debug, Clone, Default)]
pub struct ReaderPatch {
    pub full_name: Option<String>,
    pub reader_code: Option<ReaderCode>,
}

/// レコードストアポート
///
/// 書籍・読者・貸出の3コレクションを保持する唯一の記録系。
/// セッション開始時に一度だけ構築され、貸出サービスと統計集計の
/// 双方から参照される。貸出記録は削除されない（追記と状態遷移のみ）。
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 全書籍を登録順で取得する
    ///
    /// 登録順はカテゴリ分布の表示順とランキングの同数時の順序を決める。
    async fn list_books(&self) -> Result<Vec<Book>>;

    /// 全読者を登録順で取得する
    async fn list_readers(&self) -> Result<Vec<Reader>>;

    /// 全貸出記録を作成順で取得する
    async fn list_borrowings(&self) -> Result<Vec<Borrowing>>;

    /// IDで書籍を取得する
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>>;

    /// IDで読者を取得する
    async fn get_reader(&self, reader_id: ReaderId) -> Result<Option<Reader>>;

    /// IDで貸出記録を取得する
    async fn get_borrowing(&self, borrowing_id: BorrowingId) -> Result<Option<Borrowing>>;

    /// 書籍を部分更新する
    ///
    /// IDが未知の場合はエラーを返す。
    async fn update_book(&self, book_id: BookId, patch: BookPatch) -> Result<()>;

    /// 読者を部分更新する
    ///
    /// IDが未知の場合はエラーを返す。
    async fn update_reader(&self, reader_id: ReaderId, patch: ReaderPatch) -> Result<()>;

    /// 貸出記録を作成し、そのIDを返す
    async fn create_borrowing(&self, borrowing: Borrowing) -> Result<BorrowingId>;

    /// 貸出記録を新しい状態で置き換える
    ///
    /// 状態遷移（borrowed → returned）は記録全体の差し替えとして扱う。
    /// IDが未知の場合はエラーを返す。
    async fn update_borrowing(&self, borrowing_id: BorrowingId, borrowing: Borrowing)
    -> Result<()>;
}
