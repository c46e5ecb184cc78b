//! Workbook Capability Module
//!
//! 抽出処理が必要とするワークブック操作を定義するトレイト。

use crate::error::WorkbookError;
use crate::types::{CellCoord, MergedRegion, Row};

/// シートの行ストリーム（シート順）
///
/// 各要素は1行分のセル値です。下位の読み込みが構造の破損を検出した場合は`Err`を返します。
pub type RowStream = Box<dyn Iterator<Item = Result<Row, WorkbookError>>>;

/// シートの表示状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetVisibility {
    /// 表示
    Visible,
    /// 非表示
    Hidden,
    /// VBAからのみ再表示可能な非表示
    VeryHidden,
    /// 表示状態を判定できなかった（理由を保持）
    ///
    /// 変換処理は表示シートとして扱い、警告を付与します。
    Indeterminate(String),
}

impl SheetVisibility {
    /// 非表示シートかどうか（判定不能は表示扱い）
    pub fn is_hidden(&self) -> bool {
        matches!(self, SheetVisibility::Hidden | SheetVisibility::VeryHidden)
    }
}

/// ワークブックのケイパビリティ
///
/// 1回の変換呼び出しの間、オーケストレーターが排他的に所有します。
/// すべてのメソッドはシート名でスコープされ、シートは逐次処理されます。
pub trait WorkbookSource {
    /// ファイル内の順序でシート名を列挙
    fn sheet_names(&self) -> Vec<String>;

    /// シートの表示状態
    fn visibility(&self, sheet: &str) -> SheetVisibility;

    /// シートの行をストリームとして取得
    ///
    /// 行はA列・1行目を基準とした絶対位置で返されます（先頭の空行・空セルを含む）。
    fn rows(&mut self, sheet: &str) -> Result<RowStream, WorkbookError>;

    /// シート内の結合セル範囲
    fn merged_regions(&mut self, sheet: &str) -> Result<Vec<MergedRegion>, WorkbookError>;

    /// セルの数式（数式がない場合は`None`）
    fn formula(&mut self, sheet: &str, cell: CellCoord) -> Result<Option<String>, WorkbookError>;
}

impl<W: WorkbookSource + ?Sized> WorkbookSource for &mut W {
    fn sheet_names(&self) -> Vec<String> {
        (**self).sheet_names()
    }

    fn visibility(&self, sheet: &str) -> SheetVisibility {
        (**self).visibility(sheet)
    }

    fn rows(&mut self, sheet: &str) -> Result<RowStream, WorkbookError> {
        (**self).rows(sheet)
    }

    fn merged_regions(&mut self, sheet: &str) -> Result<Vec<MergedRegion>, WorkbookError> {
        (**self).merged_regions(sheet)
    }

    fn formula(&mut self, sheet: &str, cell: CellCoord) -> Result<Option<String>, WorkbookError> {
        (**self).formula(sheet, cell)
    }
}
