use chrono::{DateTime, Utc};

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// ログエントリ
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub component: String,
    pub additional_context: std::collections::HashMap<String, String>,
}

impl LogEntry {
    /// 新しいログエントリを作成
    pub fn new(level: LogLevel, message: String, component: String) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message,
            component,
            additional_context: std::collections::HashMap::new(),
        }
    }

    /// 追加コンテキストを設定
    pub fn with_context(mut self, key: String, value: String) -> Self {
        self.additional_context.insert(key, value);
        self
    }

    /// ログエントリを文字列として出力
    pub fn format(&self) -> String {
        let mut parts = vec![
            format!("[{}]", self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")),
            format!("[{}]", self.level.as_str()),
            format!("[{}]", self.component),
        ];

        parts.push(self.message.clone());

        // 追加コンテキストがある場合は追加
        if !self.additional_context.is_empty() {
            let mut pairs: Vec<_> = self
                .additional_context
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            pairs.sort();
            parts.push(format!("[{}]", pairs.join(", ")));
        }

        parts.join(" ")
    }
}

/// イベントロガー
/// ドメインイベントの発行とハンドラーの処理に特化したロガー
pub struct EventLogger;

impl EventLogger {
    /// イベント発行ログ
    pub fn log_event_published(event_type: &str, booking_id: &str) {
        let entry = LogEntry::new(
            LogLevel::Info,
            format!("Event published: {}", event_type),
            "EventBus".to_string(),
        )
        .with_context("booking_id".to_string(), booking_id.to_string());

        println!("{}", entry.format());
    }

    /// ハンドラー処理成功ログ
    pub fn log_handler_success(handler_name: &str, event_type: &str) {
        let entry = LogEntry::new(
            LogLevel::Info,
            format!("Handler {} processed {}", handler_name, event_type),
            "EventBus".to_string(),
        );

        println!("{}", entry.format());
    }

    /// ハンドラー処理失敗ログ
    pub fn log_handler_failure(handler_name: &str, event_type: &str, error: &str) {
        let entry = LogEntry::new(
            LogLevel::Error,
            format!("Handler {} failed for {}", handler_name, event_type),
            "EventBus".to_string(),
        )
        .with_context("error".to_string(), error.to_string());

        println!("{}", entry.format());
    }
}
