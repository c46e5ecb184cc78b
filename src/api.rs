//! Public API Types
//!
//! 変換オプションと変換結果のデータモデルを定義するモジュール。
//! 結果型のフィールド名はJSON APIのワイヤー形式と一致します。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 非表示シートをスキップした場合の理由
pub const HIDDEN_SHEET_REASON: &str = "hidden sheet";

/// 1回の変換呼び出しに対するオプション
///
/// 呼び出し中は不変です。上限値の`0`は無制限を意味します。
///
/// # 使用例
///
/// ```rust
/// use xlsxmd::ConversionOptions;
///
/// let options = ConversionOptions {
///     include_hidden_sheets: true,
///     ..ConversionOptions::default()
/// };
/// assert_eq!(options.max_sheets, 50);
/// assert_eq!(options.max_cells_per_sheet, 200_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// 非表示シートも変換対象に含めるか
    pub include_hidden_sheets: bool,
    /// ワークブック内の最大シート数（0 = 無制限）
    pub max_sheets: usize,
    /// シートあたりの最大セル数（0 = 無制限）
    pub max_cells_per_sheet: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            include_hidden_sheets: false,
            max_sheets: 50,
            max_cells_per_sheet: 200_000,
        }
    }
}

/// シート単位の変換結果
///
/// 処理後は`markdown`と`error`のどちらか一方のみが設定されます。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetOutcome {
    /// シート名
    pub name: String,
    /// 描画済みのMarkdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    /// 警告（検出順）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// 失敗理由
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 行数
    pub row_count: usize,
    /// 列数
    pub col_count: usize,
}

impl SheetOutcome {
    /// 変換に失敗したシートかどうか
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// 抽出前に除外されたシート
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSheet {
    /// シート名
    pub name: String,
    /// 除外理由
    pub reason: String,
}

/// 変換のメタデータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// ワークブック内のシート数
    pub sheet_count: usize,
    /// 処理したシート数（`sheets`の要素数）
    pub processed: usize,
    /// 除外したシート数（`skipped`の要素数）
    pub skipped_count: usize,
    /// 生成日時（UTC）
    pub generated_at: DateTime<Utc>,
}

/// ワークブック全体の変換結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// シートごとの結果（ワークブック内の順序）
    pub sheets: Vec<SheetOutcome>,
    /// 除外したシート
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedSheet>,
    /// 全シートを結合したMarkdown文書
    pub combined_markdown: String,
    /// メタデータ
    pub meta: Meta,
}

impl ConversionResult {
    /// 整形済みJSONにシリアライズする
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// エラーが記録されたシートの数
    pub fn error_count(&self) -> usize {
        self.sheets.iter().filter(|sheet| sheet.is_error()).count()
    }
}
