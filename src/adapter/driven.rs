// 駆動される側アダプター（リポジトリ実装など）

mod booking_repository;
mod event_bus;
mod inventory_repository;
mod part_repository;
mod technician_repository;

pub use booking_repository::MySqlBookingRepository;
pub use event_bus::InMemoryEventBus;
pub use inventory_repository::MySqlInventoryRepository;
pub use part_repository::MySqlPartRepository;
pub use technician_repository::MySqlTechnicianRepository;
