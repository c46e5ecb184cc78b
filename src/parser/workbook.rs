//! Calamine Workbook Module
//!
//! calamineを使用した[`WorkbookSource`]の実装。XLSX形式のみサポートします。

use std::collections::{HashMap, VecDeque};
use std::io::{Read, Seek};

use calamine::{Data, DataRef, Reader, SheetVisible, Xlsx, XlsxError};

use crate::error::{ConvertError, WorkbookError};
use crate::formatter::CellFormatter;
use crate::parser::source::{RowStream, SheetVisibility, WorkbookSource};
use crate::types::{CellCoord, MergedRegion, Row};

/// シートの数式セル（位置 -> 数式）
type FormulaMap = HashMap<(u32, u32), String>;

/// calamineのワークブック
///
/// セルは`worksheet_cells_reader()`で1つずつ読み出し、値を持つセルだけを保持します。
///
/// 数式はシートごとに1回だけ読み込み、同じシートへの問い合わせで再利用します。
pub struct CalamineWorkbook<R: Read + Seek> {
    workbook: Xlsx<R>,
    formatter: CellFormatter,
    merges_loaded: bool,
    formula_cache: Option<(String, Result<FormulaMap, String>)>,
}

impl<R: Read + Seek> CalamineWorkbook<R> {
    /// ワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(CalamineWorkbook)` - 読み込みに成功した場合
    /// * `Err(ConvertError::InvalidWorkbook)` - XLSXとして解釈できない場合
    pub fn open(reader: R) -> Result<Self, ConvertError> {
        let workbook: Xlsx<R> =
            Xlsx::new(reader).map_err(|e| ConvertError::InvalidWorkbook(e.to_string()))?;

        Ok(Self {
            workbook,
            formatter: CellFormatter::new(),
            merges_loaded: false,
            formula_cache: None,
        })
    }

    fn formulas(&mut self, sheet: &str) -> Option<&Result<FormulaMap, String>> {
        let cached = matches!(&self.formula_cache, Some((name, _)) if name == sheet);
        if !cached {
            let formulas = read_formulas(&mut self.workbook, sheet).map_err(|e| e.to_string());
            self.formula_cache = Some((sheet.to_string(), formulas));
        }

        self.formula_cache.as_ref().map(|(_, formulas)| formulas)
    }
}

fn read_formulas<R: Read + Seek>(
    workbook: &mut Xlsx<R>,
    sheet: &str,
) -> Result<FormulaMap, XlsxError> {
    let mut reader = match workbook.worksheet_cells_reader(sheet) {
        Ok(reader) => reader,
        Err(XlsxError::NotAWorksheet(_)) => return Ok(FormulaMap::new()),
        Err(e) => return Err(e),
    };

    let mut formulas = FormulaMap::new();
    while let Some(cell) = reader.next_formula()? {
        if !cell.get_value().is_empty() {
            formulas.insert(cell.get_position(), cell.get_value().clone());
        }
    }
    Ok(formulas)
}

impl<R: Read + Seek> WorkbookSource for CalamineWorkbook<R> {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    fn visibility(&self, sheet: &str) -> SheetVisibility {
        match self
            .workbook
            .sheets_metadata()
            .iter()
            .find(|meta| meta.name == sheet)
        {
            Some(meta) => match meta.visible {
                SheetVisible::Visible => SheetVisibility::Visible,
                SheetVisible::Hidden => SheetVisibility::Hidden,
                _ => SheetVisibility::VeryHidden,
            },
            None => SheetVisibility::Indeterminate(format!(
                "sheet '{}' not present in workbook metadata",
                sheet
            )),
        }
    }

    fn rows(&mut self, sheet: &str) -> Result<RowStream, WorkbookError> {
        let formatter = self.formatter;
        let mut reader = match self.workbook.worksheet_cells_reader(sheet) {
            Ok(reader) => reader,
            // グラフシートはデータなし
            Err(XlsxError::NotAWorksheet(_)) => return Ok(Box::new(SparseRows::default())),
            Err(e) => return Err(e.into()),
        };

        let mut cells = Vec::new();
        let mut failure: Option<WorkbookError> = None;
        loop {
            match reader.next_cell() {
                Ok(Some(cell)) => {
                    if matches!(cell.get_value(), DataRef::Empty) {
                        continue;
                    }
                    let (row, col) = cell.get_position();
                    let value = formatter.format_cell(&Data::from(cell.get_value().clone()));
                    cells.push((row, col, value));
                }
                Ok(None) => break,
                Err(e) => {
                    failure = Some(e.into());
                    break;
                }
            }
        }

        Ok(Box::new(SparseRows::new(cells, failure)))
    }

    fn merged_regions(&mut self, sheet: &str) -> Result<Vec<MergedRegion>, WorkbookError> {
        if !self.merges_loaded {
            self.workbook.load_merged_regions()?;
            self.merges_loaded = true;
        }

        match self.workbook.worksheet_merge_cells(sheet) {
            Some(Ok(regions)) => Ok(regions
                .iter()
                .map(|dims| {
                    MergedRegion::new(
                        CellCoord::new(dims.start.0, dims.start.1),
                        CellCoord::new(dims.end.0, dims.end.1),
                    )
                })
                .collect()),
            Some(Err(e)) => Err(WorkbookError::Message(e.to_string())),
            None => Err(WorkbookError::Message(format!(
                "sheet '{}' not found",
                sheet
            ))),
        }
    }

    fn formula(&mut self, sheet: &str, cell: CellCoord) -> Result<Option<String>, WorkbookError> {
        match self.formulas(sheet) {
            Some(Ok(formulas)) => Ok(formulas.get(&(cell.row, cell.col)).cloned()),
            Some(Err(message)) => Err(WorkbookError::Message(message.clone())),
            None => Ok(None),
        }
    }
}

/// 値を持つセルだけから組み立てる行イテレータ
///
/// 1行目・A列を基準にした絶対位置で行を返します。セルのない行は空行、
/// 行内の欠けた列は空セルとして補います。メモリ使用量は値を持つセル数に比例し、
/// シートの外接矩形の面積には依存しません。
///
/// 読み込み中にエラーが発生した場合は、それまでに読めた行を返した後に`Err`を1回返します。
#[derive(Default)]
struct SparseRows {
    cells: VecDeque<(u32, u32, String)>,
    failure: Option<WorkbookError>,
    next_row: u32,
}

impl SparseRows {
    fn new(mut cells: Vec<(u32, u32, String)>, failure: Option<WorkbookError>) -> Self {
        // 通常はXML上で行優先順に並んでいるが、順序の乱れたファイルにも対応する
        cells.sort_by_key(|&(row, col, _)| (row, col));

        Self {
            cells: cells.into(),
            failure,
            next_row: 0,
        }
    }
}

impl Iterator for SparseRows {
    type Item = Result<Row, WorkbookError>;

    fn next(&mut self) -> Option<Self::Item> {
        let first_row = match self.cells.front() {
            Some(&(row, _, _)) => row,
            None => return self.failure.take().map(Err),
        };

        let row_idx = self.next_row;
        self.next_row += 1;

        if row_idx < first_row {
            return Some(Ok(Vec::new()));
        }

        let mut row = Row::new();
        while self.cells.front().map_or(false, |&(r, _, _)| r == row_idx) {
            if let Some((_, col, value)) = self.cells.pop_front() {
                let col = col as usize;
                if row.len() <= col {
                    row.resize(col + 1, String::new());
                }
                row[col] = value;
            }
        }
        Some(Ok(row))
    }
}
