//! Cancellation Module
//!
//! 1回の変換呼び出しを対象とするキャンセルシグナル（期限付き／呼び出し側による中断）。
//! チェックはブロッキングしないポーリングで、ワークブックを開く前・各シートの前・
//! 各行の前に行われます。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::ConvertError;

/// 変換呼び出しのキャンセルトークン
///
/// `Clone`したトークンは同じシグナルを共有します。別スレッドから
/// [`Cancellation::cancel`]を呼ぶと、変換は次の行またはシートの境界で停止します。
///
/// # 使用例
///
/// ```rust
/// use std::time::Duration;
/// use xlsxmd::{Cancellation, ConvertError};
///
/// let token = Cancellation::with_timeout(Duration::from_secs(10));
/// assert!(token.check().is_ok());
///
/// token.cancel("client disconnected");
/// assert!(matches!(token.check(), Err(ConvertError::Cancelled(_))));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    deadline: Option<Instant>,
    inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    reason: Mutex<Option<String>>,
}

impl Cancellation {
    /// 期限なしのトークンを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在時刻から`timeout`後を期限とするトークンを生成
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// 指定時刻を期限とするトークンを生成
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            inner: Arc::default(),
        }
    }

    /// 期限
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// 呼び出し側からキャンセルする
    ///
    /// 最初の理由のみが保持されます。
    pub fn cancel(&self, reason: impl Into<String>) {
        if let Ok(mut slot) = self.inner.reason.lock() {
            if slot.is_none() {
                *slot = Some(reason.into());
            }
        }
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    /// キャンセル済み、または期限切れかどうか
    pub fn is_cancelled(&self) -> bool {
        self.check().is_err()
    }

    /// シグナルをポーリングする
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 処理を継続してよい場合
    /// * `Err(ConvertError::Timeout)` - 期限を過ぎた場合
    /// * `Err(ConvertError::Cancelled)` - 呼び出し側がキャンセルした場合
    pub fn check(&self) -> Result<(), ConvertError> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ConvertError::Timeout);
            }
        }

        if self.inner.cancelled.load(Ordering::SeqCst) {
            let reason = self
                .inner
                .reason
                .lock()
                .ok()
                .and_then(|slot| slot.clone())
                .unwrap_or_else(|| "cancelled by caller".to_string());
            return Err(ConvertError::Cancelled(reason));
        }

        Ok(())
    }
}
