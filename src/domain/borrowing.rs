use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, BorrowValidationError, BorrowingId, ReaderId, ReturnBorrowingError};

// ============================================================================
// 型安全な状態パターン
// ============================================================================

/// Borrowing集約の共通フィールド
///
/// すべての貸出状態（Open, Returned）で共有されるコアデータ。
/// 返却後はborrowed_at / due_dateを変更しない（不変の取引記録）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowingCore {
    // 識別子
    pub borrowing_id: BorrowingId,

    // 他のエンティティへの参照（IDのみ）
    pub book_id: BookId,
    pub reader_id: ReaderId,

    // 貸出管理の責務
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// 貸出中状態
///
/// ビジネスルール：
/// - 作成時にdue_date >= borrowed_at（暦日比較）
/// - 返却されるまで書籍はBorrowedのまま
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenBorrowing {
    #[serde(flatten)]
    pub core: BorrowingCore,
}

impl std::ops::Deref for OpenBorrowing {
    type Target = BorrowingCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 返却済み状態
///
/// ビジネスルール：
/// - returned_atが必須（型で保証）
/// - 操作不可（読み取り専用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedBorrowing {
    #[serde(flatten)]
    pub core: BorrowingCore,
    pub returned_at: DateTime<Utc>,
}

impl std::ops::Deref for ReturnedBorrowing {
    type Target = BorrowingCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// Borrowing集約の統合型
///
/// 型安全な状態パターン：
/// - 不正な状態（返却日時のない返却済みなど）を型システムで排除
/// - シリアライズ時はstatusタグ（"borrowed" / "returned"）で判別
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Borrowing {
    #[serde(rename = "borrowed")]
    Open(OpenBorrowing),
    Returned(ReturnedBorrowing),
}

impl Borrowing {
    pub fn core(&self) -> &BorrowingCore {
        match self {
            Borrowing::Open(open) => &open.core,
            Borrowing::Returned(returned) => &returned.core,
        }
    }

    pub fn borrowing_id(&self) -> BorrowingId {
        self.core().borrowing_id
    }

    pub fn book_id(&self) -> BookId {
        self.core().book_id
    }

    pub fn reader_id(&self) -> ReaderId {
        self.core().reader_id
    }

    pub fn borrowed_at(&self) -> DateTime<Utc> {
        self.core().borrowed_at
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.core().due_date
    }

    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Borrowing::Open(_) => None,
            Borrowing::Returned(returned) => Some(returned.returned_at),
        }
    }

    /// 未返却（貸出中）か
    pub fn is_open(&self) -> bool {
        matches!(self, Borrowing::Open(_))
    }
}

// ============================================================================
// 純粋関数
// ============================================================================

/// 純粋関数：貸出を開始する
///
/// ビジネスルール：
/// - 返却期限は貸出日より前であってはならない（暦日で比較。
///   当日を期限とする貸出は許可する）
///
/// 副作用なし。新しいOpenBorrowingを返す。
/// 書籍の可用性や読者の貸出上限はアプリケーション層が検証する。
pub fn open_borrowing(
    book_id: BookId,
    reader_id: ReaderId,
    borrowed_at: DateTime<Utc>,
    due_date: DateTime<Utc>,
) -> Result<OpenBorrowing, BorrowValidationError> {
    if due_date.date_naive() < borrowed_at.date_naive() {
        return Err(BorrowValidationError::DueDateBeforeBorrowDate);
    }

    Ok(OpenBorrowing {
        core: BorrowingCore {
            borrowing_id: BorrowingId::new(),
            book_id,
            reader_id,
            borrowed_at,
            due_date,
        },
    })
}

/// 純粋関数：貸出を返却する
///
/// ビジネスルール：
/// - 延滞していても返却は受け付ける
/// - 既に返却済みの貸出は返却不可
///
/// 副作用なし。ReturnedBorrowingを返す。
pub fn return_borrowing(
    borrowing: Borrowing,
    returned_at: DateTime<Utc>,
) -> Result<ReturnedBorrowing, ReturnBorrowingError> {
    match borrowing {
        Borrowing::Open(open) => Ok(ReturnedBorrowing {
            core: open.core,
            returned_at,
        }),
        Borrowing::Returned(_) => Err(ReturnBorrowingError::AlreadyReturned),
    }
}

/// 純粋関数：延滞判定
///
/// 返却期限を厳密に過ぎた未返却の貸出のみを延滞とする。
pub fn is_overdue(borrowing: &Borrowing, now: DateTime<Utc>) -> bool {
    borrowing.is_open() && now > borrowing.due_date()
}

/// 純粋関数：延滞日数
///
/// 期限からの経過時間を日単位で切り上げる。期限前は0を返す
/// （元システムは絶対値を取っていたため未延滞でも正の日数になり得たが、
/// 意図しない挙動と判断し0に丸める）。
pub fn days_overdue(due_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed_secs = (now - due_date).num_seconds();
    if elapsed_secs <= 0 {
        return 0;
    }
    (elapsed_secs + 86_399) / 86_400
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn open_sample(borrowed_at: DateTime<Utc>, due_date: DateTime<Utc>) -> OpenBorrowing {
        open_borrowing(BookId::new(), ReaderId::new(), borrowed_at, due_date).unwrap()
    }

    // TDD: open_borrowing() のテスト
    #[test]
    fn test_open_borrowing_success() {
        let book_id = BookId::new();
        let reader_id = ReaderId::new();
        let borrowed_at = Utc::now();
        let due_date = borrowed_at + Duration::days(14);

        let result = open_borrowing(book_id, reader_id, borrowed_at, due_date);
        assert!(result.is_ok());

        let borrowing = result.unwrap();
        assert_eq!(borrowing.book_id, book_id);
        assert_eq!(borrowing.reader_id, reader_id);
        assert_eq!(borrowing.borrowed_at, borrowed_at);
        assert_eq!(borrowing.due_date, due_date);
    }

    #[test]
    fn test_open_borrowing_allows_due_date_same_day() {
        let borrowed_at = Utc::now();
        // 同一暦日であれば時刻が貸出より前でも許可する
        let result = open_borrowing(BookId::new(), ReaderId::new(), borrowed_at, borrowed_at);
        assert!(result.is_ok());
    }

    #[test]
    fn test_open_borrowing_rejects_due_date_before_borrow_date() {
        let borrowed_at = Utc::now();
        let due_date = borrowed_at - Duration::days(1);

        let result = open_borrowing(BookId::new(), ReaderId::new(), borrowed_at, due_date);
        assert_eq!(
            result.unwrap_err(),
            BorrowValidationError::DueDateBeforeBorrowDate
        );
    }

    // TDD: return_borrowing() のテスト
    #[test]
    fn test_return_borrowing_success() {
        let borrowed_at = Utc::now();
        let open = open_sample(borrowed_at, borrowed_at + Duration::days(14));
        let borrowing_id = open.borrowing_id;
        let returned_at = borrowed_at + Duration::days(7);

        let result = return_borrowing(Borrowing::Open(open), returned_at);
        assert!(result.is_ok());

        let returned = result.unwrap();
        assert_eq!(returned.borrowing_id, borrowing_id);
        assert_eq!(returned.returned_at, returned_at);
    }

    #[test]
    fn test_return_borrowing_accepts_overdue_return() {
        let borrowed_at = Utc::now();
        let open = open_sample(borrowed_at, borrowed_at + Duration::days(14));
        let returned_at = borrowed_at + Duration::days(30);

        let result = return_borrowing(Borrowing::Open(open), returned_at);
        assert!(result.is_ok());
    }

    #[test]
    fn test_return_borrowing_fails_when_already_returned() {
        let borrowed_at = Utc::now();
        let open = open_sample(borrowed_at, borrowed_at + Duration::days(14));
        let returned_at = borrowed_at + Duration::days(7);
        let returned = return_borrowing(Borrowing::Open(open), returned_at).unwrap();

        // 2回目の返却は失敗
        let result = return_borrowing(
            Borrowing::Returned(returned),
            returned_at + Duration::days(1),
        );
        assert_eq!(result.unwrap_err(), ReturnBorrowingError::AlreadyReturned);
    }

    // TDD: is_overdue() のテスト
    #[test]
    fn test_is_overdue_false_before_due_date() {
        let borrowed_at = Utc::now();
        let open = open_sample(borrowed_at, borrowed_at + Duration::days(14));
        let check_time = borrowed_at + Duration::days(7);

        assert!(!is_overdue(&Borrowing::Open(open), check_time));
    }

    #[test]
    fn test_is_overdue_true_after_due_date() {
        let borrowed_at = Utc::now();
        let open = open_sample(borrowed_at, borrowed_at + Duration::days(14));
        let check_time = borrowed_at + Duration::days(20);

        assert!(is_overdue(&Borrowing::Open(open), check_time));
    }

    #[test]
    fn test_is_overdue_false_when_returned() {
        let borrowed_at = Utc::now();
        let open = open_sample(borrowed_at, borrowed_at + Duration::days(14));
        let returned = return_borrowing(Borrowing::Open(open), borrowed_at + Duration::days(20))
            .unwrap();
        let check_time = borrowed_at + Duration::days(30);

        // 返却済みは期限を過ぎていても延滞ではない
        assert!(!is_overdue(&Borrowing::Returned(returned), check_time));
    }

    // TDD: days_overdue() のテスト
    #[test]
    fn test_days_overdue_zero_before_due_date() {
        let due_date = Utc::now();
        let now = due_date - Duration::days(3);

        assert_eq!(days_overdue(due_date, now), 0);
    }

    #[test]
    fn test_days_overdue_zero_at_due_date() {
        let due_date = Utc::now();

        assert_eq!(days_overdue(due_date, due_date), 0);
    }

    #[test]
    fn test_days_overdue_rounds_partial_day_up() {
        let due_date = Utc::now();
        let now = due_date + Duration::hours(1);

        assert_eq!(days_overdue(due_date, now), 1);
    }

    #[test]
    fn test_days_overdue_exact_days() {
        let due_date = Utc::now();
        let now = due_date + Duration::days(3);

        assert_eq!(days_overdue(due_date, now), 3);
    }

    #[test]
    fn test_days_overdue_just_under_full_day_boundary() {
        let due_date = Utc::now();
        let now = due_date + Duration::days(2) - Duration::seconds(1);

        assert_eq!(days_overdue(due_date, now), 2);
    }

    // シリアライズのテスト
    #[test]
    fn test_borrowing_serializes_with_status_tag() {
        let borrowed_at = Utc::now();
        let open = open_sample(borrowed_at, borrowed_at + Duration::days(14));

        let json = serde_json::to_value(Borrowing::Open(open.clone())).unwrap();
        assert_eq!(json["status"], "borrowed");

        let returned =
            return_borrowing(Borrowing::Open(open), borrowed_at + Duration::days(7)).unwrap();
        let json = serde_json::to_value(Borrowing::Returned(returned)).unwrap();
        assert_eq!(json["status"], "returned");
        assert!(json["returned_at"].is_string());
    }
}
