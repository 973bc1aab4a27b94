mod reports;

pub use reports::{
    BookRanking, CategoryCount, MonthlySeries, OverdueEntry, ReaderRanking, Summary,
    category_distribution, monthly_series, overdue_report, summary, top_active_readers,
    top_borrowed_books,
};
