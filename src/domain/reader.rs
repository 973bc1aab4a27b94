use serde::{Deserialize, Serialize};

use super::{ReaderCode, ReaderId};

/// 読者エンティティ
///
/// 読者の登録・編集フローはスコープ外。
///
/// 元システムはエンティティ上に貸出冊数のキャッシュ（borrowCount）を
/// 持っていたが、更新漏れでずれるクラスのバグを排除するため、
/// 本実装では貸出記録から都度導出する
/// （`application::circulation::open_borrowings_for_reader`を参照）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reader {
    pub reader_id: ReaderId,
    pub full_name: String,
    pub reader_code: ReaderCode,
}

impl Reader {
    pub fn new(full_name: impl Into<String>, reader_code: ReaderCode) -> Self {
        Self {
            reader_id: ReaderId::new(),
            full_name: full_name.into(),
            reader_code,
        }
    }
}
