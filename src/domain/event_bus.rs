use crate::domain::event::DomainEvent;
use async_trait::async_trait;

/// イベントハンドラーエラー
#[derive(Debug, Clone, thiserror::Error)]
pub enum HandlerError {
    #[error("Handler processing failed: {0}")]
    ProcessingFailed(String),
}

/// イベントハンドラートレイト
/// 発行されたドメインイベントを受け取る購読者を定義する
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError>;

    /// ログ出力に使用するハンドラー名
    fn handler_name(&self) -> &str;
}
