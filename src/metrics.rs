//! Metrics Module
//!
//! 変換処理の観測ポート。オーケストレーターは注入されたオブザーバーを通じてのみ
//! カウンターを更新し、グローバルな可変状態は持ちません。

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::api::{ConversionResult, SheetOutcome};
use crate::error::ConvertError;

/// 変換処理のオブザーバー
///
/// すべてのメソッドにデフォルト実装（何もしない）があり、必要なものだけを実装できます。
/// 変換は同期的に行われるため、実装は短時間で戻る必要があります。
pub trait ConversionObserver: Send + Sync {
    /// 変換呼び出しの開始
    fn conversion_started(&self) {}

    /// 1シートの処理完了（スキップしたシートは含まない）
    fn sheet_processed(&self, _outcome: &SheetOutcome) {}

    /// 変換呼び出しの終了
    fn conversion_finished(&self, _outcome: Result<&ConversionResult, &ConvertError>) {}
}

/// 何もしないオブザーバー
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ConversionObserver for NoopObserver {}

/// カウンターの読み取り結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub conversions_total: u64,
    pub conversion_errors_total: u64,
    pub sheet_errors_total: u64,
}

/// アトミックカウンターによるオブザーバー実装
///
/// プロセス起動時に1つ生成し、`Arc`で共有して使用します。
///
/// # 使用例
///
/// ```rust
/// use std::sync::Arc;
/// use xlsxmd::{ConversionMetrics, ConverterBuilder};
///
/// # fn main() -> Result<(), xlsxmd::ConvertError> {
/// let metrics = Arc::new(ConversionMetrics::new());
/// let _converter = ConverterBuilder::new()
///     .with_observer(metrics.clone())
///     .build()?;
/// assert_eq!(metrics.snapshot().requests_total, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConversionMetrics {
    requests_total: AtomicU64,
    conversions_total: AtomicU64,
    conversion_errors_total: AtomicU64,
    sheet_errors_total: AtomicU64,
}

impl ConversionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在のカウンター値
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            conversions_total: self.conversions_total.load(Ordering::Relaxed),
            conversion_errors_total: self.conversion_errors_total.load(Ordering::Relaxed),
            sheet_errors_total: self.sheet_errors_total.load(Ordering::Relaxed),
        }
    }
}

impl ConversionObserver for ConversionMetrics {
    fn conversion_started(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    fn sheet_processed(&self, outcome: &SheetOutcome) {
        if outcome.is_error() {
            self.sheet_errors_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn conversion_finished(&self, outcome: Result<&ConversionResult, &ConvertError>) {
        match outcome {
            Ok(_) => self.conversions_total.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.conversion_errors_total.fetch_add(1, Ordering::Relaxed),
        };
    }
}
