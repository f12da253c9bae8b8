// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::event::DomainEvent;
use crate::domain::model::{
    Booking, BookingId, BookingPart, BookingPartId, BookingStatus, BookingStatusLog, CustomerId,
    Part, PartId, PartInventory, PartStockMovement, ServiceCenterId, Technician, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    ConnectionFailed(String),
    /// 操作に失敗
    OperationFailed(String),
    /// データの取得に失敗
    FetchFailed(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// 予約リポジトリトレイト
/// 予約集約・部品明細・ステータス履歴の永続化を抽象化する
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// 予約を保存する（UPSERT）
    async fn save(&self, booking: &Booking) -> Result<(), RepositoryError>;

    /// 予約とステータス履歴行を単一トランザクションで保存する
    /// 状態遷移は必ずこの経路を通し、履歴のない状態変更を残さない
    async fn save_with_log(
        &self,
        booking: &Booking,
        log: &BookingStatusLog,
    ) -> Result<(), RepositoryError>;

    /// 予約IDで予約を検索する
    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError>;

    /// すべての予約を取得する
    /// 作成日時の降順で並べて返す
    async fn find_all(&self) -> Result<Vec<Booking>, RepositoryError>;

    /// 指定されたステータスの予約を取得する
    async fn find_by_status(&self, status: BookingStatus)
        -> Result<Vec<Booking>, RepositoryError>;

    /// 指定された顧客の予約を取得する
    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Booking>, RepositoryError>;

    /// 指定された整備士が担当する予約を取得する
    async fn find_by_technician(
        &self,
        technician_id: UserId,
    ) -> Result<Vec<Booking>, RepositoryError>;

    /// 指定されたサービスセンターの予約を取得する
    async fn find_by_service_center(
        &self,
        service_center_id: ServiceCenterId,
    ) -> Result<Vec<Booking>, RepositoryError>;

    /// 空き状況検索の候補予約を取得する
    /// 条件: 指定センター、アクティブステータス（Pending/Approved/InProgress）、
    /// 整備士割当済み、実効開始時刻（確定 or 希望）が [day_start, day_end) に
    /// 含まれる予約。exclude で指定された予約は除外する
    async fn find_scheduled_for_day(
        &self,
        service_center_id: ServiceCenterId,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
        exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, RepositoryError>;

    /// ステータス履歴行を追記する
    async fn append_status_log(&self, log: &BookingStatusLog) -> Result<(), RepositoryError>;

    /// 指定された予約のステータス履歴を取得する
    /// 変更日時の昇順で並べて返す
    async fn find_status_logs(
        &self,
        booking_id: BookingId,
    ) -> Result<Vec<BookingStatusLog>, RepositoryError>;

    /// 予約部品明細を保存する
    async fn save_booking_part(&self, part: &BookingPart) -> Result<(), RepositoryError>;

    /// 明細IDで予約部品明細を検索する
    async fn find_booking_part_by_id(
        &self,
        booking_part_id: BookingPartId,
    ) -> Result<Option<BookingPart>, RepositoryError>;

    /// 指定された予約の部品明細を取得する
    async fn find_booking_parts(
        &self,
        booking_id: BookingId,
    ) -> Result<Vec<BookingPart>, RepositoryError>;

    /// 予約部品明細を削除する
    async fn delete_booking_part(
        &self,
        booking_part_id: BookingPartId,
    ) -> Result<(), RepositoryError>;

    /// 新しい一意の予約IDを生成する
    fn next_identity(&self) -> BookingId;
}

/// 在庫リポジトリトレイト
/// 部品在庫集約と在庫移動記録の永続化を抽象化する
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// 在庫を保存する（UPSERT、移動記録なしの変更に使用）
    async fn save(&self, inventory: &PartInventory) -> Result<(), RepositoryError>;

    /// 在庫と移動記録を単一トランザクションで保存する
    /// 数量を変更する操作は必ずこの経路を通す
    async fn save_with_movement(
        &self,
        inventory: &PartInventory,
        movement: &PartStockMovement,
    ) -> Result<(), RepositoryError>;

    /// 部品IDで在庫を検索する
    async fn find_by_part_id(
        &self,
        part_id: PartId,
    ) -> Result<Option<PartInventory>, RepositoryError>;

    /// すべての在庫を取得する
    /// 部品IDの昇順で並べて返す
    async fn find_all(&self) -> Result<Vec<PartInventory>, RepositoryError>;

    /// 最低在庫水準を下回っている在庫を取得する
    async fn find_low_stock(&self) -> Result<Vec<PartInventory>, RepositoryError>;

    /// 移動記録を追記する（在庫数量を変更しない監査記録に使用）
    async fn append_movement(&self, movement: &PartStockMovement)
        -> Result<(), RepositoryError>;

    /// 指定された部品の移動記録を取得する
    /// 発生日時の降順で並べて返す
    async fn find_movements_by_part(
        &self,
        part_id: PartId,
    ) -> Result<Vec<PartStockMovement>, RepositoryError>;
}

/// 部品カタログリポジトリトレイト
#[async_trait]
pub trait PartRepository: Send + Sync {
    /// 部品を保存する
    async fn save(&self, part: &Part) -> Result<(), RepositoryError>;

    /// 部品IDで部品を検索する
    async fn find_by_id(&self, part_id: PartId) -> Result<Option<Part>, RepositoryError>;

    /// すべての部品を取得する
    async fn find_all(&self) -> Result<Vec<Part>, RepositoryError>;
}

/// 整備士リポジトリトレイト
#[async_trait]
pub trait TechnicianRepository: Send + Sync {
    /// 整備士を保存する
    async fn save(&self, technician: &Technician) -> Result<(), RepositoryError>;

    /// 整備士IDで整備士を検索する
    async fn find_by_id(&self, id: UserId) -> Result<Option<Technician>, RepositoryError>;

    /// 指定されたサービスセンターの稼働中整備士を取得する
    async fn find_active_by_service_center(
        &self,
        service_center_id: ServiceCenterId,
    ) -> Result<Vec<Technician>, RepositoryError>;
}

/// イベントバスエラー
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event publishing failed: {0}")]
    PublishingFailed(String),
}

/// イベントバストレイト
/// イベントの発行と配信を管理するポート
#[async_trait]
pub trait EventBus: Send + Sync {
    /// イベントを発行し、登録されたハンドラーに配信
    async fn publish(&self, event: DomainEvent) -> Result<(), EventBusError>;
}
