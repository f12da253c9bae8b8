use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 予約作成用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub service_center_id: Uuid,
    pub service_type: String,
    pub preferred_start: DateTime<Utc>,
    pub preferred_end: Option<DateTime<Utc>>,
    pub estimated_duration_minutes: Option<i64>,
    pub customer_note: Option<String>,
}

/// 予約承認用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct ApproveBookingRequest {
    pub approved_by: Uuid,
    pub technician_id: Option<Uuid>,
    pub confirmed_start: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub note: Option<String>,
}

/// 予約却下用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct RejectBookingRequest {
    pub approved_by: Uuid,
    pub reason: Option<String>,
}

/// 作業開始用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct StartBookingRequest {
    pub technician_id: Uuid,
}

/// 作業完了用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CompleteBookingRequest {
    pub technician_id: Uuid,
    pub note: Option<String>,
}

/// 予約キャンセル用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CancelBookingRequest {
    pub cancelled_by: Uuid,
    pub reason: Option<String>,
}

/// 部品使用明細追加用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct AddBookingPartRequest {
    pub part_id: Uuid,
    pub quantity: u32,
    /// 未指定なら部品単価 × 数量で算出
    pub cost: Option<i64>,
    pub note: Option<String>,
    pub actor_id: Uuid,
}

/// 部品使用明細削除用のクエリパラメータ
#[derive(Deserialize)]
pub struct RemoveBookingPartParams {
    pub actor_id: Uuid,
}

/// 在庫手動調整用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i64,
    /// IN / OUT / ADJUSTMENT のいずれか
    pub movement_type: String,
    pub reason: Option<String>,
    pub actor_id: Uuid,
}

/// 最低在庫水準更新用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct UpdateMinStockRequest {
    pub min_stock_level: Option<u32>,
    pub actor_id: Uuid,
}

/// クレーム部品操作用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct ClaimPartRequest {
    pub part_id: Uuid,
    pub quantity: u32,
    pub actor_id: Uuid,
}

/// 部品作成用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CreatePartRequest {
    pub part_number: String,
    pub name: String,
    pub unit_price: i64,
}

/// 予約一覧取得用のクエリパラメータ
#[derive(Deserialize)]
pub struct BookingsQueryParams {
    pub status: Option<String>,
    pub customer_id: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub service_center_id: Option<Uuid>,
}

/// 空き状況検索用のクエリパラメータ
#[derive(Deserialize)]
pub struct AvailabilityQueryParams {
    pub service_center_id: Uuid,
    pub start: DateTime<Utc>,
    pub duration_minutes: Option<i64>,
    pub exclude_booking_id: Option<Uuid>,
}
