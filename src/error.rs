//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! エラーは2段階に分類されます。
//!
//! - 呼び出し全体を中断する致命的エラー（`InvalidWorkbook`, `TooManySheets`,
//!   `Timeout`, `Cancelled`）
//! - シート単位で記録され、後続シートの処理は継続されるエラー
//!   （`SheetTooLarge`, `SheetUnreadable`, `RowRead`）

use thiserror::Error;

/// 変換処理全体で使用するエラー型
///
/// `Display`の文字列は変換結果（`SheetOutcome::error`）や監査レコードに
/// そのまま書き出されるため、固定文言として扱います。
///
/// # 使用例
///
/// ```rust
/// use xlsxmd::ConvertError;
///
/// let error = ConvertError::TooManySheets { count: 12, limit: 10 };
/// assert_eq!(error.to_string(), "workbook has too many sheets");
/// assert!(error.is_fatal());
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConvertError {
    /// 入力がXLSXとして解釈できない
    ///
    /// ZIPコンテナの破損、XLSX以外の形式、アーカイブ制限違反などが原因となります。
    #[error("invalid xlsx file: {0}")]
    InvalidWorkbook(String),

    /// シート数が上限（`max_sheets`）を超えた
    ///
    /// ワークブック全体に対するガードで、シート単位の結果は一切生成されません。
    #[error("workbook has too many sheets")]
    TooManySheets {
        /// ワークブック内のシート数
        count: usize,
        /// 設定された上限
        limit: usize,
    },

    /// シート内のセル数の累計が上限（`max_cells_per_sheet`）を超えた
    ///
    /// シート単位のエラーです。切り詰めではなく、そのシートの抽出を中断します。
    #[error("sheet exceeds cell limit")]
    SheetTooLarge {
        /// 設定された上限
        limit: usize,
    },

    /// 期限切れによるキャンセル
    #[error("conversion timed out")]
    Timeout,

    /// 呼び出し側によるキャンセル
    #[error("conversion cancelled: {0}")]
    Cancelled(String),

    /// シートの読み込み開始に失敗した（シート構造の破損など）
    #[error("unable to read sheet: {source}")]
    SheetUnreadable {
        /// 対象シート名
        sheet: String,
        /// 下位のエラー
        #[source]
        source: WorkbookError,
    },

    /// 行の走査中に下位イテレータがエラーを返した
    #[error("failed to read row: {source}")]
    RowRead {
        /// 対象シート名
        sheet: String,
        /// 失敗した行番号（1始まり）
        row: usize,
        /// 下位のエラー
        #[source]
        source: WorkbookError,
    },

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に無効な設定が検出された場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O操作中に発生したエラー（`Read`ベースの入口で入力を読み込む際など）
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// 呼び出し全体を中断すべきエラーかどうか
    ///
    /// `false`の場合、エラーは該当シートの`SheetOutcome::error`に記録され、
    /// 残りのシートの処理は継続されます。
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ConvertError::SheetTooLarge { .. }
                | ConvertError::SheetUnreadable { .. }
                | ConvertError::RowRead { .. }
        )
    }

    /// キャンセル（期限切れを含む）に由来するエラーかどうか
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ConvertError::Timeout | ConvertError::Cancelled(_))
    }
}

/// ワークブック読み込み層（`WorkbookSource`）のエラー
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WorkbookError {
    /// calamine由来のエラー
    #[error("{0}")]
    Calamine(#[from] calamine::Error),

    /// その他のバックエンドが報告するエラー
    #[error("{0}")]
    Message(String),
}

impl From<calamine::XlsxError> for WorkbookError {
    fn from(error: calamine::XlsxError) -> Self {
        WorkbookError::Calamine(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_fixed_messages() {
        assert_eq!(
            ConvertError::TooManySheets { count: 3, limit: 2 }.to_string(),
            "workbook has too many sheets"
        );
        assert_eq!(
            ConvertError::SheetTooLarge { limit: 10 }.to_string(),
            "sheet exceeds cell limit"
        );
        assert_eq!(ConvertError::Timeout.to_string(), "conversion timed out");
    }

    #[test]
    fn test_invalid_workbook_display() {
        let error = ConvertError::InvalidWorkbook("zip header missing".to_string());
        let message = error.to_string();
        assert!(message.starts_with("invalid xlsx file"));
        assert!(message.contains("zip header missing"));
    }

    #[test]
    fn test_sheet_local_errors_are_not_fatal() {
        assert!(!ConvertError::SheetTooLarge { limit: 1 }.is_fatal());

        let unreadable = ConvertError::SheetUnreadable {
            sheet: "Sheet1".to_string(),
            source: WorkbookError::Message("broken xml".to_string()),
        };
        assert!(!unreadable.is_fatal());
        assert_eq!(unreadable.to_string(), "unable to read sheet: broken xml");

        let row = ConvertError::RowRead {
            sheet: "Sheet1".to_string(),
            row: 4,
            source: WorkbookError::Message("truncated row".to_string()),
        };
        assert!(!row.is_fatal());
        assert_eq!(row.to_string(), "failed to read row: truncated row");
    }

    #[test]
    fn test_whole_call_errors_are_fatal() {
        assert!(ConvertError::InvalidWorkbook("x".to_string()).is_fatal());
        assert!(ConvertError::TooManySheets { count: 2, limit: 1 }.is_fatal());
        assert!(ConvertError::Timeout.is_fatal());
        assert!(ConvertError::Cancelled("client closed".to_string()).is_fatal());
    }

    #[test]
    fn test_cancellation_classification() {
        assert!(ConvertError::Timeout.is_cancellation());
        assert!(ConvertError::Cancelled("abort".to_string()).is_cancellation());
        assert!(!ConvertError::SheetTooLarge { limit: 1 }.is_cancellation());
    }

    #[test]
    fn test_io_error_conversion() {
        fn read_missing() -> Result<(), ConvertError> {
            let _file = std::fs::File::open("nonexistent_workbook.xlsx")?;
            Ok(())
        }

        match read_missing() {
            Err(ConvertError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_workbook_error_from_calamine() {
        let error: WorkbookError = calamine::Error::Msg("Corrupted file").into();
        assert!(error.to_string().contains("Corrupted file"));
    }
}
