//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::api::{ConversionOptions, ConversionResult};
use crate::audit::{AuditSink, ConversionRecord};
use crate::cancel::Cancellation;
use crate::error::ConvertError;
use crate::metrics::{ConversionObserver, NoopObserver};
use crate::pipeline::convert_with;
use crate::security::ArchiveLimits;

/// 変換1回あたりのデフォルトの制限時間
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use std::time::Duration;
/// use xlsxmd::ConverterBuilder;
///
/// # fn main() -> Result<(), xlsxmd::ConvertError> {
/// let converter = ConverterBuilder::new()
///     .include_hidden_sheets(true)
///     .with_max_sheets(10)
///     .with_timeout(Duration::from_secs(30))
///     .build()?;
/// assert_eq!(converter.options().max_sheets, 10);
/// # Ok(())
/// # }
/// ```
pub struct ConverterBuilder {
    options: ConversionOptions,
    timeout: Option<Duration>,
    archive_limits: ArchiveLimits,
    observer: Option<Arc<dyn ConversionObserver>>,
    audit_sink: Option<Arc<dyn AuditSink>>,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterBuilder")
            .field("options", &self.options)
            .field("timeout", &self.timeout)
            .field("archive_limits", &self.archive_limits)
            .field("observer", &self.observer.is_some())
            .field("audit_sink", &self.audit_sink.is_some())
            .finish()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 非表示シート: スキップ
    /// - 最大シート数: 50
    /// - シートあたりの最大セル数: 200,000
    /// - 制限時間: 10秒
    /// - アーカイブ制限: [`ArchiveLimits::default()`]
    pub fn new() -> Self {
        Self {
            options: ConversionOptions::default(),
            timeout: Some(DEFAULT_TIMEOUT),
            archive_limits: ArchiveLimits::default(),
            observer: None,
            audit_sink: None,
        }
    }

    /// 非表示シートを変換対象に含めるかを指定する
    ///
    /// # 引数
    ///
    /// * `include: bool`:
    ///   * `true`: 非表示シートも変換する
    ///   * `false`: 非表示シートをスキップし、`skipped`に記録する（デフォルト）
    pub fn include_hidden_sheets(mut self, include: bool) -> Self {
        self.options.include_hidden_sheets = include;
        self
    }

    /// ワークブック内の最大シート数を指定する（`0`は無制限）
    ///
    /// 超過した場合、変換全体が`ConvertError::TooManySheets`で失敗します。
    pub fn with_max_sheets(mut self, max_sheets: usize) -> Self {
        self.options.max_sheets = max_sheets;
        self
    }

    /// シートあたりの最大セル数を指定する（`0`は無制限）
    ///
    /// 超過したシートのみがエラーとなり、他のシートの処理は継続されます。
    pub fn with_max_cells_per_sheet(mut self, max_cells: usize) -> Self {
        self.options.max_cells_per_sheet = max_cells;
        self
    }

    /// 変換1回あたりの制限時間を指定する
    ///
    /// `Duration::ZERO`は`build()`時に`ConvertError::Config`となります。
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 制限時間を無効にする
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// ZIPアーカイブの制限値を指定する
    pub fn with_archive_limits(mut self, limits: ArchiveLimits) -> Self {
        self.archive_limits = limits;
        self
    }

    /// 変換のオブザーバー（メトリクスなど）を指定する
    pub fn with_observer(mut self, observer: Arc<dyn ConversionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// 監査レコードの書き込み先を指定する
    ///
    /// レコードは[`Converter::convert_named`]の呼び出しごとに書き込まれます。
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Converter)`: 設定が有効な場合、Converterインスタンス
    /// * `Err(ConvertError::Config)`: 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * 制限時間が0
    /// * アーカイブ制限のいずれかが0
    pub fn build(self) -> Result<Converter, ConvertError> {
        // 1. 制限時間の検証
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConvertError::Config(
                "Invalid timeout: must be greater than zero".to_string(),
            ));
        }

        // 2. アーカイブ制限の検証
        let limits = &self.archive_limits;
        if limits.max_file_count == 0 {
            return Err(ConvertError::Config(
                "Invalid archive limits: max_file_count must be greater than zero".to_string(),
            ));
        }
        if limits.max_file_size == 0 || limits.max_decompressed_size == 0 {
            return Err(ConvertError::Config(
                "Invalid archive limits: size limits must be greater than zero".to_string(),
            ));
        }

        // 3. Converterインスタンス生成
        let observer: Arc<dyn ConversionObserver> = match self.observer {
            Some(observer) => observer,
            None => Arc::new(NoopObserver),
        };

        Ok(Converter {
            options: self.options,
            timeout: self.timeout,
            archive_limits: self.archive_limits,
            observer,
            audit_sink: self.audit_sink,
        })
    }
}

/// 変換処理のファサード
///
/// XLSXファイルをMarkdown形式に変換するためのメインエントリーポイントです。
/// 設定は構築後に変更されず、複数のスレッドから同時に使用できます
/// （各呼び出しは独立したワークブックハンドルを持ちます）。
///
/// # 使用例
///
/// ```rust,no_run
/// use std::fs::File;
/// use xlsxmd::ConverterBuilder;
///
/// # fn main() -> Result<(), xlsxmd::ConvertError> {
/// let converter = ConverterBuilder::new().build()?;
/// let input = File::open("example.xlsx")?;
/// let result = converter.convert_reader(input)?;
/// for sheet in &result.sheets {
///     println!("{}: {} rows", sheet.name, sheet.row_count);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Converter {
    options: ConversionOptions,
    timeout: Option<Duration>,
    archive_limits: ArchiveLimits,
    observer: Arc<dyn ConversionObserver>,
    audit_sink: Option<Arc<dyn AuditSink>>,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("options", &self.options)
            .field("timeout", &self.timeout)
            .field("archive_limits", &self.archive_limits)
            .field("audit_sink", &self.audit_sink.is_some())
            .finish_non_exhaustive()
    }
}

impl Converter {
    /// 変換オプション
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// 制限時間
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// 設定された制限時間でキャンセルトークンを生成する
    pub fn new_cancellation(&self) -> Cancellation {
        self.timeout
            .map_or_else(Cancellation::new, Cancellation::with_timeout)
    }

    /// XLSXのバイト列を変換する
    ///
    /// 呼び出しごとに設定された制限時間のキャンセルトークンを生成します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionResult)` - 変換結果（シート単位のエラーを含む場合があります）
    /// * `Err(ConvertError)` - 呼び出し全体が失敗した場合
    pub fn convert(&self, input: &[u8]) -> Result<ConversionResult, ConvertError> {
        self.convert_with_cancellation(input, &self.new_cancellation())
    }

    /// 呼び出し側のキャンセルトークンを使用して変換する
    ///
    /// 設定された制限時間は適用されず、トークンの期限のみが使用されます。
    pub fn convert_with_cancellation(
        &self,
        input: &[u8],
        cancel: &Cancellation,
    ) -> Result<ConversionResult, ConvertError> {
        convert_with(
            input,
            &self.options,
            &self.archive_limits,
            cancel,
            &*self.observer,
        )
    }

    /// ファイル名付きで変換し、監査レコードを書き込む
    ///
    /// ファイル名は監査レコードにのみ使用されます。監査シンクへの書き込みが失敗しても
    /// ログに記録されるだけで、戻り値は変わりません。
    pub fn convert_named(
        &self,
        filename: &str,
        input: &[u8],
    ) -> Result<ConversionResult, ConvertError> {
        let started = Instant::now();
        let outcome = self.convert(input);

        if let Some(sink) = &self.audit_sink {
            let record = ConversionRecord::from_outcome(filename, &outcome, started.elapsed());
            if let Err(e) = sink.record_conversion(&record) {
                warn!(filename, error = %e, "failed to write audit record");
            }
        }

        outcome
    }

    /// リーダーから読み込んで変換する
    ///
    /// 入力サイズの上限は呼び出し側（転送層）の責務です。
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionResult)` - 変換結果
    /// * `Err(ConvertError::Io)` - 入力の読み込みに失敗した場合
    /// * `Err(ConvertError)` - その他、呼び出し全体が失敗した場合
    pub fn convert_reader<R: Read>(&self, mut input: R) -> Result<ConversionResult, ConvertError> {
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer)?;
        self.convert(&buffer)
    }

    /// リーダーから読み込み、結合済みMarkdown文書のみを返す
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use std::fs::File;
    /// use xlsxmd::ConverterBuilder;
    ///
    /// # fn main() -> Result<(), xlsxmd::ConvertError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let markdown = converter.convert_to_markdown(File::open("example.xlsx")?)?;
    /// println!("{}", markdown);
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert_to_markdown<R: Read>(&self, input: R) -> Result<String, ConvertError> {
        self.convert_reader(input)
            .map(|result| result.combined_markdown)
    }
}
