// イベントハンドラー
// 状態遷移イベントを観測して副作用を起こす購読者

use crate::domain::event::DomainEvent;
use crate::domain::event_bus::{EventHandler, HandlerError};
use crate::domain::logging::{LogEntry, LogLevel};
use async_trait::async_trait;

/// 通知ハンドラー
/// 状態遷移を観測し、通知の発火点をログに記録する
/// 通知内容の組み立てと配送はこのコアの責務外
#[derive(Clone)]
pub struct NotificationHandler;

impl NotificationHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NotificationHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHandler for NotificationHandler {
    async fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        let entry = LogEntry::new(
            LogLevel::Info,
            format!(
                "Notification trigger: {} -> {}",
                event.event_type(),
                event.new_status()
            ),
            "NotificationHandler".to_string(),
        )
        .with_context("booking_id".to_string(), event.booking_id().to_string());

        println!("{}", entry.format());
        Ok(())
    }

    fn handler_name(&self) -> &str {
        "NotificationHandler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::BookingStarted;
    use crate::domain::model::{BookingId, UserId};

    #[tokio::test]
    async fn test_notification_handler_accepts_any_event() {
        let handler = NotificationHandler::new();
        let event = DomainEvent::BookingStarted(BookingStarted::new(
            BookingId::new(),
            UserId::new(),
        ));

        let result = handler.handle(&event).await;
        assert!(result.is_ok());
    }
}
