use crate::domain::model::{
    Booking, BookingPart, BookingStatusLog, Part, PartInventory, PartStockMovement, Technician,
};
use serde::Serialize;

/// 予約一覧用のレスポンスDTO
#[derive(Serialize)]
pub struct BookingSummaryResponse {
    pub booking_id: String,
    pub customer_id: String,
    pub vehicle_id: String,
    pub service_center_id: String,
    pub technician_id: Option<String>,
    pub service_type: String,
    pub status: String,
    pub preferred_start: String,
    pub confirmed_start: Option<String>,
    pub created_at: String,
}

/// 予約詳細用のレスポンスDTO
#[derive(Serialize)]
pub struct BookingDetailResponse {
    pub booking_id: String,
    pub customer_id: String,
    pub vehicle_id: String,
    pub service_center_id: String,
    pub technician_id: Option<String>,
    pub approved_by: Option<String>,
    pub cancelled_by: Option<String>,
    pub service_type: String,
    pub status: String,
    pub preferred_start: String,
    pub preferred_end: Option<String>,
    pub confirmed_start: Option<String>,
    pub confirmed_end: Option<String>,
    pub customer_note: Option<String>,
    pub internal_note: Option<String>,
    pub rejection_reason: Option<String>,
    pub estimated_duration_minutes: i64,
    pub created_at: String,
    pub updated_at: String,
    pub approved_at: Option<String>,
    pub completed_at: Option<String>,
    pub cancelled_at: Option<String>,
}

/// 部品使用明細用のレスポンスDTO
#[derive(Serialize)]
pub struct BookingPartResponse {
    pub booking_part_id: String,
    pub booking_id: String,
    pub part_id: String,
    pub quantity: u32,
    pub cost_amount: i64,
    pub cost_currency: String,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: String,
}

/// ステータス履歴用のレスポンスDTO
#[derive(Serialize)]
pub struct StatusLogResponse {
    pub id: String,
    pub booking_id: String,
    pub old_status: Option<String>,
    pub new_status: String,
    pub changed_by: Option<String>,
    pub note: Option<String>,
    pub changed_at: String,
}

/// 整備士用のレスポンスDTO
#[derive(Serialize)]
pub struct TechnicianResponse {
    pub technician_id: String,
    pub service_center_id: String,
    pub full_name: String,
}

/// 在庫用のレスポンスDTO
#[derive(Serialize)]
pub struct InventoryResponse {
    pub part_id: String,
    pub stock_quantity: u32,
    pub min_stock_level: Option<u32>,
    pub below_min_stock: bool,
}

/// 在庫移動記録用のレスポンスDTO
#[derive(Serialize)]
pub struct MovementResponse {
    pub id: String,
    pub part_id: String,
    pub movement_type: String,
    pub quantity_delta: i64,
    pub reference_type: String,
    pub reference_id: Option<String>,
    pub note: Option<String>,
    pub performed_by: String,
    pub occurred_at: String,
}

/// 部品カタログ用のレスポンスDTO
#[derive(Serialize)]
pub struct PartResponse {
    pub part_id: String,
    pub part_number: String,
    pub name: String,
    pub unit_price_amount: i64,
    pub unit_price_currency: String,
}

impl BookingSummaryResponse {
    /// ドメインオブジェクトからBookingSummaryResponseを作成
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id().to_string(),
            customer_id: booking.customer_id().to_string(),
            vehicle_id: booking.vehicle_id().to_string(),
            service_center_id: booking.service_center_id().to_string(),
            technician_id: booking.technician_id().map(|id| id.to_string()),
            service_type: booking.service_type().to_string(),
            status: booking.status().to_string(),
            preferred_start: booking.preferred_start().to_rfc3339(),
            confirmed_start: booking.confirmed_start().map(|ts| ts.to_rfc3339()),
            created_at: booking.created_at().to_rfc3339(),
        }
    }
}

impl BookingDetailResponse {
    /// ドメインオブジェクトからBookingDetailResponseを作成
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            booking_id: booking.id().to_string(),
            customer_id: booking.customer_id().to_string(),
            vehicle_id: booking.vehicle_id().to_string(),
            service_center_id: booking.service_center_id().to_string(),
            technician_id: booking.technician_id().map(|id| id.to_string()),
            approved_by: booking.approved_by().map(|id| id.to_string()),
            cancelled_by: booking.cancelled_by().map(|id| id.to_string()),
            service_type: booking.service_type().to_string(),
            status: booking.status().to_string(),
            preferred_start: booking.preferred_start().to_rfc3339(),
            preferred_end: booking.preferred_end().map(|ts| ts.to_rfc3339()),
            confirmed_start: booking.confirmed_start().map(|ts| ts.to_rfc3339()),
            confirmed_end: booking.confirmed_end().map(|ts| ts.to_rfc3339()),
            customer_note: booking.customer_note().map(|s| s.to_string()),
            internal_note: booking.internal_note().map(|s| s.to_string()),
            rejection_reason: booking.rejection_reason().map(|s| s.to_string()),
            estimated_duration_minutes: booking.estimated_duration_minutes(),
            created_at: booking.created_at().to_rfc3339(),
            updated_at: booking.updated_at().to_rfc3339(),
            approved_at: booking.approved_at().map(|ts| ts.to_rfc3339()),
            completed_at: booking.completed_at().map(|ts| ts.to_rfc3339()),
            cancelled_at: booking.cancelled_at().map(|ts| ts.to_rfc3339()),
        }
    }
}

impl BookingPartResponse {
    /// ドメインオブジェクトからBookingPartResponseを作成
    pub fn from_booking_part(part: &BookingPart) -> Self {
        Self {
            booking_part_id: part.id().to_string(),
            booking_id: part.booking_id().to_string(),
            part_id: part.part_id().to_string(),
            quantity: part.quantity(),
            cost_amount: part.cost().amount(),
            cost_currency: part.cost().currency(),
            note: part.note().map(|s| s.to_string()),
            created_by: part.created_by().to_string(),
            created_at: part.created_at().to_rfc3339(),
        }
    }
}

impl StatusLogResponse {
    /// ドメインオブジェクトからStatusLogResponseを作成
    pub fn from_status_log(log: &BookingStatusLog) -> Self {
        Self {
            id: log.id().to_string(),
            booking_id: log.booking_id().to_string(),
            old_status: log.old_status().map(|s| s.to_string()),
            new_status: log.new_status().to_string(),
            changed_by: log.changed_by().map(|id| id.to_string()),
            note: log.note().map(|s| s.to_string()),
            changed_at: log.changed_at().to_rfc3339(),
        }
    }
}

impl TechnicianResponse {
    /// ドメインオブジェクトからTechnicianResponseを作成
    pub fn from_technician(technician: &Technician) -> Self {
        Self {
            technician_id: technician.id().to_string(),
            service_center_id: technician.service_center_id().to_string(),
            full_name: technician.full_name().to_string(),
        }
    }
}

impl InventoryResponse {
    /// ドメインオブジェクトからInventoryResponseを作成
    pub fn from_inventory(inventory: &PartInventory) -> Self {
        Self {
            part_id: inventory.part_id().to_string(),
            stock_quantity: inventory.stock_quantity(),
            min_stock_level: inventory.min_stock_level(),
            below_min_stock: inventory.is_below_min_stock(),
        }
    }
}

impl MovementResponse {
    /// ドメインオブジェクトからMovementResponseを作成
    pub fn from_movement(movement: &PartStockMovement) -> Self {
        Self {
            id: movement.id().to_string(),
            part_id: movement.part_id().to_string(),
            movement_type: movement.movement_type().to_string(),
            quantity_delta: movement.quantity_delta(),
            reference_type: movement.reference_type().to_string(),
            reference_id: movement.reference_id().map(|id| id.to_string()),
            note: movement.note().map(|s| s.to_string()),
            performed_by: movement.performed_by().to_string(),
            occurred_at: movement.occurred_at().to_rfc3339(),
        }
    }
}

impl PartResponse {
    /// ドメインオブジェクトからPartResponseを作成
    pub fn from_part(part: &Part) -> Self {
        Self {
            part_id: part.id().to_string(),
            part_number: part.part_number().to_string(),
            name: part.name().to_string(),
            unit_price_amount: part.unit_price().amount(),
            unit_price_currency: part.unit_price().currency(),
        }
    }
}
