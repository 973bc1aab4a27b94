use crate::domain::{
    Book, BookStatus, Borrowing, Reader,
    borrowing::{days_overdue, is_overdue},
    value_objects::{BookId, BorrowingId, ReaderId},
};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use super::super::circulation::{CirculationError, Result, ServiceDependencies};

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// 月次推移の集計対象月数の上限（10年分）
///
/// monthsはクエリパラメータ由来のため、極端な値がそのまま
/// ベクタの確保数とループ回数になってしまう。ここで制限する。
const MAX_MONTHS: u32 = 120;

// ============================================================================
// 集計ビュー
// ============================================================================

/// サマリーカード用の集計値
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_books: usize,
    pub available_books: usize,
    pub borrowed_count: usize,
    pub overdue_count: usize,
}

/// 延滞一覧の1行
///
/// 帳票表示のために書籍タイトルと読者情報を結合済み。
/// 参照先が見つからない場合は元システムの表示に合わせた
/// プレースホルダを入れる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueEntry {
    pub borrowing_id: BorrowingId,
    pub book_id: BookId,
    pub reader_id: ReaderId,
    pub book_title: String,
    pub reader_name: String,
    pub reader_code: String,
    pub due_date: DateTime<Utc>,
    pub days_overdue: i64,
}

/// 月次推移（貸出数・返却数）
///
/// labels / borrowed / returnedは同じ長さで、古い月から新しい月の順。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySeries {
    pub labels: Vec<String>,
    pub borrowed: Vec<usize>,
    pub returned: Vec<usize>,
}

/// カテゴリごとの蔵書数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// 貸出回数の多い書籍のランキング行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRanking {
    pub book_id: BookId,
    pub title: String,
    pub category: String,
    pub times_borrowed: usize,
}

/// 貸出回数の多い読者のランキング行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaderRanking {
    pub reader_id: ReaderId,
    pub full_name: String,
    pub reader_code: String,
    pub times_borrowed: usize,
}

// ============================================================================
// 純粋関数：コレクションのスナップショットに対する集計
// ============================================================================

/// 純粋関数：サマリー集計
///
/// - 蔵書総数
/// - 貸出可能数（書籍ステータスで判定）
/// - 貸出中数（未返却の貸出記録数で判定）
/// - 延滞数
fn summarize(books: &[Book], borrowings: &[Borrowing], now: DateTime<Utc>) -> Summary {
    Summary {
        total_books: books.len(),
        available_books: books
            .iter()
            .filter(|b| b.status == BookStatus::Available)
            .count(),
        borrowed_count: borrowings.iter().filter(|b| b.is_open()).count(),
        overdue_count: borrowings.iter().filter(|b| is_overdue(b, now)).count(),
    }
}

/// 純粋関数：延滞一覧
///
/// 未返却かつ期限を過ぎた貸出を、書籍・読者情報と結合して返す。
/// 並びは貸出記録の作成順。
fn overdue_entries(
    books: &[Book],
    readers: &[Reader],
    borrowings: &[Borrowing],
    now: DateTime<Utc>,
) -> Vec<OverdueEntry> {
    borrowings
        .iter()
        .filter(|b| is_overdue(b, now))
        .map(|borrowing| {
            let book = books.iter().find(|b| b.book_id == borrowing.book_id());
            let reader = readers
                .iter()
                .find(|r| r.reader_id == borrowing.reader_id());

            OverdueEntry {
                borrowing_id: borrowing.borrowing_id(),
                book_id: borrowing.book_id(),
                reader_id: borrowing.reader_id(),
                book_title: book
                    .map(|b| b.title.clone())
                    .unwrap_or_else(|| "Unknown Book".to_string()),
                reader_name: reader
                    .map(|r| r.full_name.clone())
                    .unwrap_or_else(|| "Unknown Reader".to_string()),
                reader_code: reader
                    .map(|r| r.reader_code.to_string())
                    .unwrap_or_default(),
                due_date: borrowing.due_date(),
                days_overdue: days_overdue(borrowing.due_date(), now),
            }
        })
        .collect()
}

/// 今日からback個前の暦月を(年, 月)で返す
fn month_back(now: DateTime<Utc>, back: u32) -> (i32, u32) {
    let mut year = now.year();
    let mut month = now.month() as i32 - back as i32;
    while month <= 0 {
        month += 12;
        year -= 1;
    }
    (year, month as u32)
}

/// "Aug 25" のような短い月ラベル
fn month_label(year: i32, month: u32) -> String {
    format!(
        "{} {:02}",
        MONTH_ABBREV[(month - 1) as usize],
        year.rem_euclid(100)
    )
}

/// 純粋関数：月次推移の集計
///
/// 直近monthsヶ月（当月を含む）を古い順に並べ、各月について
/// その月に開始された貸出数と、その月に返却された件数を数える。
/// 月の一致は(年, 月)の組で判定する（日は見ない）。
fn monthly_counts(borrowings: &[Borrowing], now: DateTime<Utc>, months: u32) -> MonthlySeries {
    let mut labels = Vec::with_capacity(months as usize);
    let mut borrowed = Vec::with_capacity(months as usize);
    let mut returned = Vec::with_capacity(months as usize);

    for back in (0..months).rev() {
        let (year, month) = month_back(now, back);
        labels.push(month_label(year, month));

        borrowed.push(
            borrowings
                .iter()
                .filter(|b| {
                    let at = b.borrowed_at();
                    at.year() == year && at.month() == month
                })
                .count(),
        );

        returned.push(
            borrowings
                .iter()
                .filter(|b| {
                    b.returned_at()
                        .is_some_and(|at| at.year() == year && at.month() == month)
                })
                .count(),
        );
    }

    MonthlySeries {
        labels,
        borrowed,
        returned,
    }
}

/// 純粋関数：カテゴリ分布
///
/// 蔵書をカテゴリごとに数える。並びは蔵書コレクションで
/// カテゴリが最初に現れた順。
fn categories(books: &[Book]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();

    for book in books {
        match counts.iter_mut().find(|c| c.category == book.category) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                category: book.category.clone(),
                count: 1,
            }),
        }
    }

    counts
}

/// 純粋関数：貸出回数の多い書籍ランキング
///
/// 全期間の貸出記録数（返却済みを含む）で降順に並べる。
/// 安定ソートのため同数の場合は蔵書コレクションの順序を保つ。
fn rank_books(books: &[Book], borrowings: &[Borrowing], limit: usize) -> Vec<BookRanking> {
    let mut rankings: Vec<BookRanking> = books
        .iter()
        .map(|book| BookRanking {
            book_id: book.book_id,
            title: book.title.clone(),
            category: book.category.clone(),
            times_borrowed: borrowings
                .iter()
                .filter(|b| b.book_id() == book.book_id)
                .count(),
        })
        .collect();

    rankings.sort_by(|a, b| b.times_borrowed.cmp(&a.times_borrowed));
    rankings.truncate(limit);
    rankings
}

/// 純粋関数：貸出回数の多い読者ランキング
///
/// 書籍ランキングと同じ規則を読者に対して適用する。
fn rank_readers(readers: &[Reader], borrowings: &[Borrowing], limit: usize) -> Vec<ReaderRanking> {
    let mut rankings: Vec<ReaderRanking> = readers
        .iter()
        .map(|reader| ReaderRanking {
            reader_id: reader.reader_id,
            full_name: reader.full_name.clone(),
            reader_code: reader.reader_code.to_string(),
            times_borrowed: borrowings
                .iter()
                .filter(|b| b.reader_id() == reader.reader_id)
                .count(),
        })
        .collect();

    rankings.sort_by(|a, b| b.times_borrowed.cmp(&a.times_borrowed));
    rankings.truncate(limit);
    rankings
}

// ============================================================================
// ストアを読むラッパー（変更は一切行わない）
// ============================================================================

/// サマリー集計を取得する
pub async fn summary(deps: &ServiceDependencies) -> Result<Summary> {
    let books = deps
        .record_store
        .list_books()
        .await
        .map_err(CirculationError::StoreError)?;
    let borrowings = deps
        .record_store
        .list_borrowings()
        .await
        .map_err(CirculationError::StoreError)?;

    Ok(summarize(&books, &borrowings, deps.clock.now()))
}

/// 延滞一覧を取得する
pub async fn overdue_report(deps: &ServiceDependencies) -> Result<Vec<OverdueEntry>> {
    let books = deps
        .record_store
        .list_books()
        .await
        .map_err(CirculationError::StoreError)?;
    let readers = deps
        .record_store
        .list_readers()
        .await
        .map_err(CirculationError::StoreError)?;
    let borrowings = deps
        .record_store
        .list_borrowings()
        .await
        .map_err(CirculationError::StoreError)?;

    Ok(overdue_entries(
        &books,
        &readers,
        &borrowings,
        deps.clock.now(),
    ))
}

/// 月次推移を取得する
///
/// monthsは`MAX_MONTHS`（120ヶ月）で打ち切る。
pub async fn monthly_series(deps: &ServiceDependencies, months: u32) -> Result<MonthlySeries> {
    let months = months.min(MAX_MONTHS);
    let borrowings = deps
        .record_store
        .list_borrowings()
        .await
        .map_err(CirculationError::StoreError)?;

    Ok(monthly_counts(&borrowings, deps.clock.now(), months))
}

/// カテゴリ分布を取得する
pub async fn category_distribution(deps: &ServiceDependencies) -> Result<Vec<CategoryCount>> {
    let books = deps
        .record_store
        .list_books()
        .await
        .map_err(CirculationError::StoreError)?;

    Ok(categories(&books))
}

/// 貸出回数の多い書籍を取得する
pub async fn top_borrowed_books(
    deps: &ServiceDependencies,
    limit: usize,
) -> Result<Vec<BookRanking>> {
    let books = deps
        .record_store
        .list_books()
        .await
        .map_err(CirculationError::StoreError)?;
    let borrowings = deps
        .record_store
        .list_borrowings()
        .await
        .map_err(CirculationError::StoreError)?;

    Ok(rank_books(&books, &borrowings, limit))
}

/// 貸出回数の多い読者を取得する
pub async fn top_active_readers(
    deps: &ServiceDependencies,
    limit: usize,
) -> Result<Vec<ReaderRanking>> {
    let readers = deps
        .record_store
        .list_readers()
        .await
        .map_err(CirculationError::StoreError)?;
    let borrowings = deps
        .record_store
        .list_borrowings()
        .await
        .map_err(CirculationError::StoreError)?;

    Ok(rank_readers(&readers, &borrowings, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::borrowing::{open_borrowing, return_borrowing};
    use crate::domain::{Reader, ReaderCode};
    use chrono::{Duration, TimeZone};

    fn book(title: &str, category: &str) -> Book {
        Book::new(title, category)
    }

    fn open(
        book_id: BookId,
        reader_id: ReaderId,
        borrowed_at: DateTime<Utc>,
        due: DateTime<Utc>,
    ) -> Borrowing {
        Borrowing::Open(open_borrowing(book_id, reader_id, borrowed_at, due).unwrap())
    }

    fn closed(
        book_id: BookId,
        reader_id: ReaderId,
        borrowed_at: DateTime<Utc>,
        returned_at: DateTime<Utc>,
    ) -> Borrowing {
        let b = open_borrowing(book_id, reader_id, borrowed_at, borrowed_at + Duration::days(14))
            .unwrap();
        Borrowing::Returned(return_borrowing(Borrowing::Open(b), returned_at).unwrap())
    }

    // TDD: summarize() のテスト
    #[test]
    fn test_summarize_counts_each_bucket() {
        let now = Utc::now();
        let mut available = book("A", "Fiction");
        available.status = BookStatus::Available;
        let mut borrowed = book("B", "Fiction");
        borrowed.status = BookStatus::Borrowed;
        let mut damaged = book("C", "Science");
        damaged.status = BookStatus::Damaged;

        let reader_id = ReaderId::new();
        let borrowings = vec![
            // 貸出中・期限内
            open(borrowed.book_id, reader_id, now, now + Duration::days(7)),
            // 貸出中・延滞
            open(
                damaged.book_id,
                reader_id,
                now - Duration::days(10),
                now - Duration::days(3),
            ),
            // 返却済み
            closed(available.book_id, reader_id, now - Duration::days(30), now),
        ];

        let summary = summarize(&[available, borrowed, damaged], &borrowings, now);
        assert_eq!(summary.total_books, 3);
        assert_eq!(summary.available_books, 1);
        assert_eq!(summary.borrowed_count, 2);
        assert_eq!(summary.overdue_count, 1);
    }

    // TDD: overdue_entries() のテスト
    #[test]
    fn test_overdue_entries_includes_only_overdue_open_borrowings() {
        let now = Utc::now();
        let b = book("Overdue Book", "Fiction");
        let reader = Reader::new("Suzuki Ichiro", ReaderCode::new("R-0007"));

        let borrowings = vec![
            // 昨日が期限 → 延滞
            open(
                b.book_id,
                reader.reader_id,
                now - Duration::days(8),
                now - Duration::days(1),
            ),
            // 明日が期限 → 延滞ではない
            open(b.book_id, reader.reader_id, now, now + Duration::days(1)),
            // 期限超過だが返却済み → 延滞ではない
            closed(
                b.book_id,
                reader.reader_id,
                now - Duration::days(40),
                now - Duration::days(2),
            ),
        ];

        let entries = overdue_entries(&[b], std::slice::from_ref(&reader), &borrowings, now);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].book_title, "Overdue Book");
        assert_eq!(entries[0].reader_name, "Suzuki Ichiro");
        assert_eq!(entries[0].reader_code, "R-0007");
        assert_eq!(entries[0].days_overdue, 1);
    }

    #[test]
    fn test_overdue_entries_uses_placeholders_for_missing_references() {
        let now = Utc::now();
        let borrowings = vec![open(
            BookId::new(),
            ReaderId::new(),
            now - Duration::days(10),
            now - Duration::days(5),
        )];

        let entries = overdue_entries(&[], &[], &borrowings, now);
        assert_eq!(entries[0].book_title, "Unknown Book");
        assert_eq!(entries[0].reader_name, "Unknown Reader");
        assert_eq!(entries[0].reader_code, "");
    }

    // TDD: month_back() / month_label() のテスト
    #[test]
    fn test_month_back_crosses_year_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 2, 15, 12, 0, 0).unwrap();
        assert_eq!(month_back(now, 0), (2026, 2));
        assert_eq!(month_back(now, 1), (2026, 1));
        assert_eq!(month_back(now, 2), (2025, 12));
        assert_eq!(month_back(now, 13), (2025, 1));
        assert_eq!(month_back(now, 14), (2024, 12));
    }

    #[test]
    fn test_month_label_format() {
        assert_eq!(month_label(2025, 8), "Aug 25");
        assert_eq!(month_label(2026, 1), "Jan 26");
        assert_eq!(month_label(2003, 12), "Dec 03");
    }

    // TDD: monthly_counts() のテスト
    #[test]
    fn test_monthly_counts_has_exactly_n_entries_oldest_first() {
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 9, 0, 0).unwrap();
        let series = monthly_counts(&[], now, 6);

        assert_eq!(series.labels.len(), 6);
        assert_eq!(series.borrowed.len(), 6);
        assert_eq!(series.returned.len(), 6);
        assert_eq!(series.labels.first().unwrap(), "Mar 26");
        // 当月が最後
        assert_eq!(series.labels.last().unwrap(), "Aug 26");
    }

    #[test]
    fn test_monthly_counts_buckets_by_year_and_month() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        let book_id = BookId::new();
        let reader_id = ReaderId::new();

        let in_feb = Utc.with_ymd_and_hms(2026, 2, 5, 0, 0, 0).unwrap();
        let in_mar = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        // 1年前の同月はバケットに入らないこと
        let year_ago = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap();

        let borrowings = vec![
            open(book_id, reader_id, in_feb, in_feb + Duration::days(14)),
            closed(book_id, reader_id, in_feb, in_mar),
            open(book_id, reader_id, year_ago, year_ago + Duration::days(14)),
        ];

        let series = monthly_counts(&borrowings, now, 2);
        assert_eq!(series.labels, vec!["Feb 26", "Mar 26"]);
        // 2月に2件貸出、3月に0件
        assert_eq!(series.borrowed, vec![2, 0]);
        // 3月に1件返却
        assert_eq!(series.returned, vec![0, 1]);
    }

    #[test]
    fn test_monthly_counts_zero_months_is_empty() {
        let series = monthly_counts(&[], Utc::now(), 0);
        assert!(series.labels.is_empty());
        assert!(series.borrowed.is_empty());
        assert!(series.returned.is_empty());
    }

    // TDD: categories() のテスト
    #[test]
    fn test_categories_counts_in_first_seen_order() {
        let books = vec![
            book("A", "Fiction"),
            book("B", "Science"),
            book("C", "Fiction"),
            book("D", "History"),
            book("E", "Science"),
        ];

        let counts = categories(&books);
        let pairs: Vec<(&str, usize)> = counts
            .iter()
            .map(|c| (c.category.as_str(), c.count))
            .collect();
        assert_eq!(
            pairs,
            vec![("Fiction", 2), ("Science", 2), ("History", 1)]
        );
    }

    // TDD: rank_books() / rank_readers() のテスト
    #[test]
    fn test_rank_books_descending_with_stable_ties() {
        let now = Utc::now();
        let reader_id = ReaderId::new();
        let books = vec![book("A", "Fiction"), book("B", "Fiction"), book("C", "SF")];

        let mut borrowings = Vec::new();
        // B: 2回、A: 1回、C: 1回（AとCは同数なのでコレクション順を保つ）
        for _ in 0..2 {
            borrowings.push(closed(books[1].book_id, reader_id, now - Duration::days(30), now));
        }
        borrowings.push(open(books[0].book_id, reader_id, now, now + Duration::days(7)));
        borrowings.push(open(books[2].book_id, reader_id, now, now + Duration::days(7)));

        let rankings = rank_books(&books, &borrowings, 5);
        let titles: Vec<&str> = rankings.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A", "C"]);
        assert_eq!(rankings[0].times_borrowed, 2);
    }

    #[test]
    fn test_rank_books_truncates_to_limit() {
        let books: Vec<Book> = (0..8).map(|i| book(&format!("B{}", i), "Fiction")).collect();
        let rankings = rank_books(&books, &[], 5);
        assert_eq!(rankings.len(), 5);
    }

    #[test]
    fn test_rank_books_returns_fewer_when_fewer_books_exist() {
        let books = vec![book("Only", "Fiction")];
        let rankings = rank_books(&books, &[], 5);
        assert_eq!(rankings.len(), 1);
    }

    #[test]
    fn test_rank_readers_counts_all_time_borrowings() {
        let now = Utc::now();
        let book_id = BookId::new();
        let readers = vec![
            Reader::new("Quiet Reader", ReaderCode::new("R-0001")),
            Reader::new("Busy Reader", ReaderCode::new("R-0002")),
        ];

        let mut borrowings = Vec::new();
        for _ in 0..3 {
            // 返却済みも全期間の回数に数える
            borrowings.push(closed(
                book_id,
                readers[1].reader_id,
                now - Duration::days(60),
                now - Duration::days(50),
            ));
        }
        borrowings.push(open(
            book_id,
            readers[0].reader_id,
            now,
            now + Duration::days(7),
        ));

        let rankings = rank_readers(&readers, &borrowings, 5);
        assert_eq!(rankings[0].full_name, "Busy Reader");
        assert_eq!(rankings[0].times_borrowed, 3);
        assert_eq!(rankings[1].times_borrowed, 1);
    }
}
