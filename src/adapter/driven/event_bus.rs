use crate::domain::event::DomainEvent;
use crate::domain::event_bus::EventHandler;
use crate::domain::logging::EventLogger;
use crate::domain::port::{EventBus, EventBusError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// インメモリイベントバス
/// 発行されたイベントを登録済みハンドラーへ順次配信する。
/// ハンドラーの失敗はログに残すのみで、発行元の操作は失敗させない
pub struct InMemoryEventBus {
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
}

impl InMemoryEventBus {
    /// 新しいインメモリイベントバスを作成
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// ハンドラーを登録する
    pub async fn subscribe(&self, handler: Arc<dyn EventHandler>) {
        let mut handlers = self.handlers.write().await;
        handlers.push(handler);
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: DomainEvent) -> Result<(), EventBusError> {
        EventLogger::log_event_published(event.event_type(), &event.booking_id().to_string());

        let handlers = self.handlers.read().await;
        for handler in handlers.iter() {
            match handler.handle(&event).await {
                Ok(()) => {
                    EventLogger::log_handler_success(handler.handler_name(), event.event_type());
                }
                Err(err) => {
                    EventLogger::log_handler_failure(
                        handler.handler_name(),
                        event.event_type(),
                        &err.to_string(),
                    );
                }
            }
        }

        Ok(())
    }
}
