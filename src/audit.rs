//! Audit Module
//!
//! 変換ごとの監査レコードと、その書き込み先（外部の永続化層）の境界を定義するモジュール。
//! 書き込みは変換結果に影響しません（失敗はログに記録されるだけです）。

use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ConversionResult;
use crate::error::ConvertError;

/// 1回の変換呼び出しの監査レコード
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub filename: String,
    pub sheet_count: usize,
    pub processed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    /// 呼び出し全体のエラー
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub sheets: Vec<SheetRecord>,
}

/// シートごとの統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRecord {
    pub name: String,
    pub row_count: usize,
    pub col_count: usize,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionRecord {
    /// 変換の結果からレコードを生成する
    ///
    /// 呼び出し全体が失敗した場合、シートは空でエラー文字列が設定されます。
    /// `sheet_count`はシート数の上限超過時のみ列挙したシート数、それ以外は`0`です。
    pub fn from_outcome(
        filename: impl Into<String>,
        outcome: &Result<ConversionResult, ConvertError>,
        duration: Duration,
    ) -> Self {
        let mut record = ConversionRecord {
            filename: filename.into(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            ..ConversionRecord::default()
        };

        match outcome {
            Ok(result) => {
                record.sheet_count = result.meta.sheet_count;
                record.processed = result.meta.processed;
                record.skipped = result.meta.skipped_count;
                record.sheets = result
                    .sheets
                    .iter()
                    .map(|sheet| SheetRecord {
                        name: sheet.name.clone(),
                        row_count: sheet.row_count,
                        col_count: sheet.col_count,
                        warnings: sheet.warnings.clone(),
                        error: sheet.error.clone(),
                    })
                    .collect();
            }
            Err(e) => {
                // シート数の上限超過ではシートを列挙済み
                if let ConvertError::TooManySheets { count, .. } = e {
                    record.sheet_count = *count;
                }
                record.error = Some(e.to_string());
            }
        }

        record
    }
}

/// 監査レコードの書き込み先
///
/// 実装はデータベースやログ収集基盤など、変換コアの外側にあります。
pub trait AuditSink: Send + Sync {
    fn record_conversion(&self, record: &ConversionRecord) -> io::Result<()>;
}

/// JSON Lines形式で書き込む監査シンク
///
/// 1レコードを1行のJSONオブジェクトとして書き込みます。
pub struct JsonLinesAuditSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesAuditSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// 内部のライターを取り出す
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> AuditSink for JsonLinesAuditSink<W> {
    fn record_conversion(&self, record: &ConversionRecord) -> io::Result<()> {
        let line = serde_json::to_string(record)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "audit writer lock poisoned"))?;
        writeln!(writer, "{}", line)?;
        writer.flush()
    }
}
