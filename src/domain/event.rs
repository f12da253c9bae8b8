use crate::domain::model::{BookingId, BookingStatus, CustomerId, ServiceCenterId, UserId};
use chrono::{DateTime, Utc};

/// ドメインイベント列挙型
/// 予約の状態遷移を表現する
/// 通知などの副作用は周辺アプリケーションがこれらを観測して発火する
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// 予約が承認された
    BookingApproved(BookingApproved),
    /// 予約が却下された
    BookingRejected(BookingRejected),
    /// 作業が開始された
    BookingStarted(BookingStarted),
    /// 作業が完了した
    BookingCompleted(BookingCompleted),
    /// 予約がキャンセルされた
    BookingCancelled(BookingCancelled),
}

impl DomainEvent {
    /// イベント種別名を取得（ログ出力用）
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::BookingApproved(_) => "BookingApproved",
            DomainEvent::BookingRejected(_) => "BookingRejected",
            DomainEvent::BookingStarted(_) => "BookingStarted",
            DomainEvent::BookingCompleted(_) => "BookingCompleted",
            DomainEvent::BookingCancelled(_) => "BookingCancelled",
        }
    }

    /// 対象の予約IDを取得
    pub fn booking_id(&self) -> BookingId {
        match self {
            DomainEvent::BookingApproved(e) => e.booking_id,
            DomainEvent::BookingRejected(e) => e.booking_id,
            DomainEvent::BookingStarted(e) => e.booking_id,
            DomainEvent::BookingCompleted(e) => e.booking_id,
            DomainEvent::BookingCancelled(e) => e.booking_id,
        }
    }

    /// 遷移後のステータスを取得
    pub fn new_status(&self) -> BookingStatus {
        match self {
            DomainEvent::BookingApproved(_) => BookingStatus::Approved,
            DomainEvent::BookingRejected(_) => BookingStatus::Rejected,
            DomainEvent::BookingStarted(_) => BookingStatus::InProgress,
            DomainEvent::BookingCompleted(_) => BookingStatus::Completed,
            DomainEvent::BookingCancelled(_) => BookingStatus::Cancelled,
        }
    }
}

/// 予約承認イベント
#[derive(Debug, Clone)]
pub struct BookingApproved {
    /// 予約ID
    pub booking_id: BookingId,
    /// 顧客ID
    pub customer_id: CustomerId,
    /// サービスセンターID
    pub service_center_id: ServiceCenterId,
    /// 担当整備士ID（割当済みの場合）
    pub technician_id: Option<UserId>,
    /// 確定開始時刻（設定済みの場合）
    pub confirmed_start: Option<DateTime<Utc>>,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl BookingApproved {
    /// 新しい予約承認イベントを作成
    pub fn new(
        booking_id: BookingId,
        customer_id: CustomerId,
        service_center_id: ServiceCenterId,
        technician_id: Option<UserId>,
        confirmed_start: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            booking_id,
            customer_id,
            service_center_id,
            technician_id,
            confirmed_start,
            occurred_at: Utc::now(),
        }
    }
}

/// 予約却下イベント
#[derive(Debug, Clone)]
pub struct BookingRejected {
    /// 予約ID
    pub booking_id: BookingId,
    /// 顧客ID
    pub customer_id: CustomerId,
    /// 却下理由
    pub reason: Option<String>,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl BookingRejected {
    /// 新しい予約却下イベントを作成
    pub fn new(booking_id: BookingId, customer_id: CustomerId, reason: Option<String>) -> Self {
        Self {
            booking_id,
            customer_id,
            reason,
            occurred_at: Utc::now(),
        }
    }
}

/// 作業開始イベント
#[derive(Debug, Clone)]
pub struct BookingStarted {
    /// 予約ID
    pub booking_id: BookingId,
    /// 担当整備士ID
    pub technician_id: UserId,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl BookingStarted {
    /// 新しい作業開始イベントを作成
    pub fn new(booking_id: BookingId, technician_id: UserId) -> Self {
        Self {
            booking_id,
            technician_id,
            occurred_at: Utc::now(),
        }
    }
}

/// 作業完了イベント
#[derive(Debug, Clone)]
pub struct BookingCompleted {
    /// 予約ID
    pub booking_id: BookingId,
    /// 顧客ID
    pub customer_id: CustomerId,
    /// 完了日時
    pub completed_at: DateTime<Utc>,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl BookingCompleted {
    /// 新しい作業完了イベントを作成
    pub fn new(
        booking_id: BookingId,
        customer_id: CustomerId,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            booking_id,
            customer_id,
            completed_at,
            occurred_at: Utc::now(),
        }
    }
}

/// 予約キャンセルイベント
#[derive(Debug, Clone)]
pub struct BookingCancelled {
    /// 予約ID
    pub booking_id: BookingId,
    /// キャンセル操作者
    pub cancelled_by: UserId,
    /// キャンセル理由
    pub reason: Option<String>,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl BookingCancelled {
    /// 新しい予約キャンセルイベントを作成
    pub fn new(booking_id: BookingId, cancelled_by: UserId, reason: Option<String>) -> Self {
        Self {
            booking_id,
            cancelled_by,
            reason,
            occurred_at: Utc::now(),
        }
    }
}
