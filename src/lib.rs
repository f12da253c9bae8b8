// 車両サービスセンターの予約管理システム
// 予約ライフサイクル・整備士の空き状況検索・部品在庫台帳を提供する

pub mod adapter;
pub mod application;
pub mod domain;
