// ドメイン層
// 予約ライフサイクル・空き状況検索・在庫台帳のビジネスルールを持つ

pub mod error;
pub mod event;
pub mod event_bus;
pub mod handler;
pub mod logging;
pub mod model;
pub mod port;
pub mod service;
