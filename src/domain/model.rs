// ドメインモデル（エンティティと値オブジェクト）

mod value_objects;
mod booking;
mod booking_part;
mod inventory;
mod part;
mod status_log;
mod stock_movement;
mod technician;

pub use value_objects::{
    BookingId, BookingPartId, ClaimId, CustomerId, MovementId, PartId, ServiceCenterId,
    StatusLogId, UserId, VehicleId,
    Money,
    BookingStatus, MovementType, StockReferenceType,
};

pub use booking::Booking;
pub use booking_part::BookingPart;
pub use inventory::PartInventory;
pub use part::Part;
pub use status_log::BookingStatusLog;
pub use stock_movement::PartStockMovement;
pub use technician::Technician;
