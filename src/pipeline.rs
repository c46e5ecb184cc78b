//! Workbook Conversion Orchestrator
//!
//! ワークブックの全シートを順番に処理し、シートごとの結果と結合済みMarkdownを
//! 組み立てるモジュール。
//!
//! 呼び出し全体を中断するのは、ワークブックを開けない場合・シート数の上限超過・
//! キャンセル（期限切れを含む）のみです。シート単位の失敗は結果に記録され、
//! 残りのシートの処理は継続されます。

use std::io::Cursor;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::{
    ConversionOptions, ConversionResult, Meta, SheetOutcome, SkippedSheet, HIDDEN_SHEET_REASON,
};
use crate::cancel::Cancellation;
use crate::error::ConvertError;
use crate::extract::{extract_sheet, VISIBILITY_WARNING};
use crate::metrics::{ConversionObserver, NoopObserver};
use crate::output::{combine_markdown, render_sheet};
use crate::parser::{CalamineWorkbook, SheetVisibility, WorkbookSource};
use crate::security::{inspect_archive, ArchiveLimits};

/// XLSXのバイト列をMarkdownに変換する
///
/// デフォルトのアーカイブ制限を使用し、オブザーバーには通知しません。
/// 設定を保持して繰り返し変換する場合は[`crate::ConverterBuilder`]を使用してください。
///
/// # 引数
///
/// * `input` - XLSXファイルの内容
/// * `options` - 変換オプション
/// * `cancel` - 呼び出し全体を対象とするキャンセルトークン
///
/// # 戻り値
///
/// * `Ok(ConversionResult)` - 変換結果（シート単位のエラーを含む場合があります）
/// * `Err(ConvertError)` - 呼び出し全体が失敗した場合
///
/// # 使用例
///
/// ```rust,no_run
/// use std::time::Duration;
/// use xlsxmd::{convert, Cancellation, ConversionOptions};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("report.xlsx")?;
/// let cancel = Cancellation::with_timeout(Duration::from_secs(10));
/// let result = convert(&bytes, &ConversionOptions::default(), &cancel)?;
/// println!("{}", result.combined_markdown);
/// # Ok(())
/// # }
/// ```
pub fn convert(
    input: &[u8],
    options: &ConversionOptions,
    cancel: &Cancellation,
) -> Result<ConversionResult, ConvertError> {
    convert_with(input, options, &ArchiveLimits::default(), cancel, &NoopObserver)
}

/// アーカイブ制限とオブザーバーを指定して変換する
pub(crate) fn convert_with(
    input: &[u8],
    options: &ConversionOptions,
    limits: &ArchiveLimits,
    cancel: &Cancellation,
    observer: &dyn ConversionObserver,
) -> Result<ConversionResult, ConvertError> {
    observer.conversion_started();

    let result = open_and_convert(input, options, limits, cancel, observer);

    observer.conversion_finished(result.as_ref());
    result
}

fn open_and_convert(
    input: &[u8],
    options: &ConversionOptions,
    limits: &ArchiveLimits,
    cancel: &Cancellation,
    observer: &dyn ConversionObserver,
) -> Result<ConversionResult, ConvertError> {
    cancel.check()?;

    inspect_archive(Cursor::new(input), limits)?;
    // ワークブックはこの呼び出しの間だけ保持され、どの経路でも関数を抜ける時点で解放される
    let mut workbook = CalamineWorkbook::open(Cursor::new(input))?;

    convert_workbook(&mut workbook, options, cancel, observer)
}

/// 開いたワークブックの全シートを変換する
///
/// 処理順序:
///
/// 1. シート数が`max_sheets`（> 0）を超える場合は`TooManySheets`で失敗
/// 2. 各シートの前にキャンセルを確認し、キャンセル済みなら呼び出し全体を中断
/// 3. 非表示シートは`include_hidden_sheets`が`false`の場合にスキップ
/// 4. 抽出に失敗したシートはエラーを記録して次のシートへ
/// 5. 成功したシートはMarkdownに描画
///
/// 処理した各シートの結果は`observer.sheet_processed`に通知されます。
pub fn convert_workbook<W: WorkbookSource + ?Sized>(
    workbook: &mut W,
    options: &ConversionOptions,
    cancel: &Cancellation,
    observer: &dyn ConversionObserver,
) -> Result<ConversionResult, ConvertError> {
    let generated_at = Utc::now();

    let sheet_names = workbook.sheet_names();
    let sheet_count = sheet_names.len();
    if options.max_sheets > 0 && sheet_count > options.max_sheets {
        return Err(ConvertError::TooManySheets {
            count: sheet_count,
            limit: options.max_sheets,
        });
    }

    let mut sheets = Vec::with_capacity(sheet_count);
    let mut skipped = Vec::new();

    for name in sheet_names {
        cancel.check()?;

        let visibility = workbook.visibility(&name);
        if visibility.is_hidden() && !options.include_hidden_sheets {
            info!(sheet = %name, "skipping hidden sheet");
            skipped.push(SkippedSheet {
                name,
                reason: HIDDEN_SHEET_REASON.to_string(),
            });
            continue;
        }

        debug!(sheet = %name, "processing sheet");
        let outcome = process_sheet(workbook, name, &visibility, options, cancel)?;
        observer.sheet_processed(&outcome);
        sheets.push(outcome);
    }

    let combined_markdown = combine_markdown(&sheets);
    let meta = Meta {
        sheet_count,
        processed: sheets.len(),
        skipped_count: skipped.len(),
        generated_at,
    };

    info!(
        sheet_count = meta.sheet_count,
        processed = meta.processed,
        skipped = meta.skipped_count,
        "conversion completed"
    );

    Ok(ConversionResult {
        sheets,
        skipped,
        combined_markdown,
        meta,
    })
}

/// 1シートを抽出・描画する
///
/// キャンセルのみを`Err`として返し、それ以外の抽出エラーは結果に記録します。
fn process_sheet<W: WorkbookSource + ?Sized>(
    workbook: &mut W,
    name: String,
    visibility: &SheetVisibility,
    options: &ConversionOptions,
    cancel: &Cancellation,
) -> Result<SheetOutcome, ConvertError> {
    let visibility_warning = match visibility {
        SheetVisibility::Indeterminate(reason) => {
            debug!(sheet = %name, %reason, "sheet visibility indeterminate");
            Some(VISIBILITY_WARNING.to_string())
        }
        _ => None,
    };

    match extract_sheet(workbook, &name, options, cancel) {
        Ok(extraction) => {
            let rendered = render_sheet(&extraction.rows);
            let mut warnings = extraction.warnings;
            warnings.extend(visibility_warning);

            debug!(
                sheet = %name,
                rows = rendered.row_count,
                cols = rendered.col_count,
                "sheet rendered"
            );

            // 件数は描画後の表ではなく走査結果（エラー時と同じ基準）
            Ok(SheetOutcome {
                name,
                markdown: Some(rendered.markdown),
                warnings,
                error: None,
                row_count: extraction.row_count,
                col_count: extraction.col_count,
            })
        }
        Err(failure) if failure.error.is_cancellation() => Err(failure.error),
        Err(failure) => {
            warn!(sheet = %name, error = %failure.error, "sheet conversion failed");

            let mut warnings = failure.warnings;
            warnings.extend(visibility_warning);

            Ok(SheetOutcome {
                name,
                markdown: None,
                warnings,
                error: Some(failure.error.to_string()),
                row_count: failure.row_count,
                col_count: failure.col_count,
            })
        }
    }
}
