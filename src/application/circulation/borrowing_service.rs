use crate::domain::{self, BookStatus, Borrowing, OpenBorrowing, ReturnedBorrowing, commands::*};
use crate::ports::{BookPatch, Clock, RecordStore};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::errors::{CirculationError, Result};

/// 読者1人あたりの同時貸出上限
const MAX_OPEN_BORROWINGS: usize = 5;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
///
/// `write_lock`は貸出・返却の2操作を直列化する。上限チェックと
/// 3エンティティの更新はひとつの論理トランザクションであり、
/// 並行実行すると読者が上限を超えたり書籍が二重貸出され得るため、
/// サービス全体でひとつのクリティカルセクションとする。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub record_store: Arc<dyn RecordStore>,
    pub clock: Arc<dyn Clock>,
    write_lock: Arc<Mutex<()>>,
}

impl ServiceDependencies {
    pub fn new(record_store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            record_store,
            clock,
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// 読者の現在の貸出冊数を導出する
///
/// 元システムが読者エンティティにキャッシュしていた値の置き換え。
/// 貸出記録のうち未返却のものを数えるため、更新漏れでずれることがない。
pub async fn open_borrowings_for_reader(
    deps: &ServiceDependencies,
    reader_id: domain::ReaderId,
) -> Result<usize> {
    let borrowings = deps
        .record_store
        .list_borrowings()
        .await
        .map_err(CirculationError::StoreError)?;

    Ok(borrowings
        .iter()
        .filter(|b| b.is_open() && b.reader_id() == reader_id)
        .count())
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍が存在し、貸出可能であること
/// - 読者が存在すること
/// - 返却期限が今日より前でないこと
/// - 読者の貸出中の冊数が上限（5冊）未満であること
///
/// すべての検証はストアへの変更に先行する。失敗時にストアは
/// 一切変更されない。
///
/// 成功時の効果：
/// - 貸出記録を作成（borrowed_atは現在時刻）
/// - 書籍のステータスをBorrowedに更新
///
/// # 戻り値
/// 作成された貸出記録
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<OpenBorrowing> {
    let _guard = deps.write_lock.lock().await;
    let now = deps.clock.now();

    // 1. 書籍の存在と貸出可能性の確認
    let book = deps
        .record_store
        .get_book(cmd.book_id)
        .await
        .map_err(CirculationError::StoreError)?
        .ok_or(CirculationError::InvalidBook)?;

    if !book.is_available() {
        return Err(CirculationError::InvalidBook);
    }

    // 2. 読者の存在確認
    deps.record_store
        .get_reader(cmd.reader_id)
        .await
        .map_err(CirculationError::StoreError)?
        .ok_or(CirculationError::InvalidReader)?;

    // 3. ドメイン層の純粋関数で貸出記録を作成（期限の検証を含む）
    let open = domain::borrowing::open_borrowing(cmd.book_id, cmd.reader_id, now, cmd.due_date)
        .map_err(|_| CirculationError::InvalidDueDate)?;

    // 4. 貸出上限の確認（5冊まで）
    let open_count = open_borrowings_for_reader(deps, cmd.reader_id).await?;
    if open_count >= MAX_OPEN_BORROWINGS {
        return Err(CirculationError::CapacityExceeded);
    }

    // 5. ストアへ反映：貸出記録の作成と書籍ステータスの遷移
    let borrowing_id = deps
        .record_store
        .create_borrowing(Borrowing::Open(open.clone()))
        .await
        .map_err(CirculationError::StoreError)?;

    deps.record_store
        .update_book(cmd.book_id, BookPatch::status(BookStatus::Borrowed))
        .await
        .map_err(CirculationError::StoreError)?;

    tracing::info!(
        borrowing_id = %borrowing_id.value(),
        book_id = %cmd.book_id.value(),
        reader_id = %cmd.reader_id.value(),
        "book borrowed"
    );

    Ok(open)
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 貸出記録が存在すること
/// - 既に返却済みでないこと
/// - 延滞していても返却は受け付ける
///
/// 成功時の効果：
/// - 貸出記録をreturnedに遷移（returned_atは現在時刻）
/// - 書籍のステータスを返却時の状態に応じてAvailableまたはDamagedに更新
///
/// # 戻り値
/// 返却済みとなった貸出記録
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<ReturnedBorrowing> {
    let _guard = deps.write_lock.lock().await;
    let now = deps.clock.now();

    // 1. 貸出記録の取得
    let borrowing = deps
        .record_store
        .get_borrowing(cmd.borrowing_id)
        .await
        .map_err(CirculationError::StoreError)?
        .ok_or(CirculationError::BorrowingNotFound)?;

    // 2. ドメイン層の純粋関数で返却遷移
    let returned = domain::borrowing::return_borrowing(borrowing, now)
        .map_err(|_| CirculationError::AlreadyReturned)?;

    let book_id = returned.book_id;

    // 3. ストアへ反映：貸出記録の差し替えと書籍ステータスの遷移
    deps.record_store
        .update_borrowing(cmd.borrowing_id, Borrowing::Returned(returned.clone()))
        .await
        .map_err(CirculationError::StoreError)?;

    deps.record_store
        .update_book(book_id, BookPatch::status(BookStatus::after_return(cmd.condition)))
        .await
        .map_err(CirculationError::StoreError)?;

    tracing::info!(
        borrowing_id = %cmd.borrowing_id.value(),
        book_id = %book_id.value(),
        condition = ?cmd.condition,
        "book returned"
    );

    Ok(returned)
}
