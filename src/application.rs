// アプリケーション層
// ユースケースごとにドメインを調停するサービス群

pub mod error;
pub mod service;

pub use error::ApplicationError;
