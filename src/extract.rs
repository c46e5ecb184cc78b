//! Sheet Extractor
//!
//! 1シート分の行をワークブックから読み出すモジュール。
//! セル数の上限とキャンセルを行単位で確認し、結合セル・数式の存在を警告として収集します。

use tracing::debug;

use crate::api::ConversionOptions;
use crate::cancel::Cancellation;
use crate::error::ConvertError;
use crate::grid::trim_trailing_empty;
use crate::parser::WorkbookSource;
use crate::types::{CellCoord, Row};

/// 結合セルを検出した場合の警告
pub const MERGED_CELLS_WARNING: &str = "Merged cells were flattened to their top-left value.";

/// 数式を検出した場合の警告
pub const FORMULA_WARNING: &str = "Formulas were detected; output uses stored values.";

/// シートの表示状態を判定できなかった場合の警告
pub const VISIBILITY_WARNING: &str =
    "Sheet visibility could not be determined; processed as visible.";

/// 抽出結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetExtraction {
    /// 行末の空セルを取り除いた行（シート内の順序）
    pub rows: Vec<Row>,
    /// 警告（検出順）
    pub warnings: Vec<String>,
    /// 走査した行数
    pub row_count: usize,
    /// 走査中に見つかった最大の列数
    pub col_count: usize,
}

/// 抽出の失敗
///
/// 行数・列数は失敗した時点までの走査結果です。
#[derive(Debug)]
pub struct ExtractionFailure {
    pub error: ConvertError,
    /// 失敗までに収集した警告
    pub warnings: Vec<String>,
    pub row_count: usize,
    pub col_count: usize,
}

/// 1シートの行を抽出する
///
/// 開始前と各行の処理前にキャンセルを確認します。期限切れの場合は
/// `ConvertError::Timeout`、呼び出し側によるキャンセルの場合は`ConvertError::Cancelled`
/// で失敗します（呼び出し元はこれを変換全体のエラーとして扱います）。
///
/// # 引数
///
/// * `workbook` - ワークブック
/// * `sheet` - シート名
/// * `options` - 変換オプション（`max_cells_per_sheet`のみ使用）
/// * `cancel` - キャンセルトークン
///
/// # 戻り値
///
/// * `Ok(SheetExtraction)` - 抽出に成功した場合
/// * `Err(ExtractionFailure)` - セル数の上限超過、行の読み込み失敗、キャンセルの場合
pub fn extract_sheet<W: WorkbookSource + ?Sized>(
    workbook: &mut W,
    sheet: &str,
    options: &ConversionOptions,
    cancel: &Cancellation,
) -> Result<SheetExtraction, ExtractionFailure> {
    let mut extraction = SheetExtraction::default();

    if let Err(error) = cancel.check() {
        return Err(extraction.fail(error));
    }

    // 結合範囲の取得に失敗した場合は結合なしとして扱う
    match workbook.merged_regions(sheet) {
        Ok(regions) if !regions.is_empty() => {
            debug!(sheet, regions = regions.len(), "merged regions detected");
            extraction.warnings.push(MERGED_CELLS_WARNING.to_string());
        }
        Ok(_) => {}
        Err(e) => debug!(sheet, error = %e, "merged region lookup failed"),
    }

    let stream = match workbook.rows(sheet) {
        Ok(stream) => stream,
        Err(source) => {
            return Err(extraction.fail(ConvertError::SheetUnreadable {
                sheet: sheet.to_string(),
                source,
            }))
        }
    };

    let mut cell_count = 0usize;
    let mut formula_found = false;

    for next in stream {
        if let Err(error) = cancel.check() {
            return Err(extraction.fail(error));
        }
        extraction.row_count += 1;

        let cells = match next {
            Ok(cells) => cells,
            Err(source) => {
                let row = extraction.row_count;
                return Err(extraction.fail(ConvertError::RowRead {
                    sheet: sheet.to_string(),
                    row,
                    source,
                }));
            }
        };

        let trimmed = trim_trailing_empty(&cells);
        cell_count += trimmed.len();
        if options.max_cells_per_sheet > 0 && cell_count > options.max_cells_per_sheet {
            return Err(extraction.fail(ConvertError::SheetTooLarge {
                limit: options.max_cells_per_sheet,
            }));
        }
        extraction.col_count = extraction.col_count.max(trimmed.len());

        if !formula_found {
            let row = (extraction.row_count - 1) as u32;
            formula_found = has_formula(workbook, sheet, row, trimmed.len());
        }

        extraction.rows.push(trimmed);
    }

    if formula_found {
        extraction.warnings.push(FORMULA_WARNING.to_string());
    }

    debug!(
        sheet,
        rows = extraction.row_count,
        cols = extraction.col_count,
        cells = cell_count,
        "sheet extracted"
    );

    Ok(extraction)
}

/// 行内に数式セルが1つでもあるか
///
/// 個々の問い合わせの失敗は「数式なし」として扱います。
fn has_formula<W: WorkbookSource + ?Sized>(
    workbook: &mut W,
    sheet: &str,
    row: u32,
    width: usize,
) -> bool {
    for col in 0..width as u32 {
        let cell = CellCoord::new(row, col);
        match workbook.formula(sheet, cell) {
            Ok(Some(_)) => return true,
            Ok(None) => {}
            Err(e) => debug!(sheet, %cell, error = %e, "formula lookup failed"),
        }
    }
    false
}

impl SheetExtraction {
    fn fail(self, error: ConvertError) -> ExtractionFailure {
        ExtractionFailure {
            error,
            warnings: self.warnings,
            row_count: self.row_count,
            col_count: self.col_count,
        }
    }
}
