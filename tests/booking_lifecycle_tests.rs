use workshop_booking_management::adapter::driven::InMemoryEventBus;
use workshop_booking_management::application::service::{
    BookingApplicationService, ClaimPartApplicationService, InventoryApplicationService,
};
use workshop_booking_management::application::ApplicationError;
use workshop_booking_management::domain::error::DomainError;
use workshop_booking_management::domain::model::{
    Booking, BookingId, BookingPart, BookingPartId, BookingStatus, BookingStatusLog, ClaimId,
    CustomerId, Money, MovementType, Part, PartId, PartInventory, PartStockMovement,
    ServiceCenterId, StockReferenceType, Technician, UserId, VehicleId,
};
use workshop_booking_management::domain::port::{
    BookingRepository, InventoryRepository, PartRepository, RepositoryError,
    TechnicianRepository,
};
use workshop_booking_management::domain::service::{AvailabilityService, StockLedgerService};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

// テスト用のモックリポジトリ
#[derive(Clone)]
struct MockBookingRepository {
    bookings: Arc<Mutex<HashMap<BookingId, Booking>>>,
    booking_parts: Arc<Mutex<HashMap<BookingPartId, BookingPart>>>,
    status_logs: Arc<Mutex<Vec<BookingStatusLog>>>,
}

impl MockBookingRepository {
    fn new() -> Self {
        Self {
            bookings: Arc::new(Mutex::new(HashMap::new())),
            booking_parts: Arc::new(Mutex::new(HashMap::new())),
            status_logs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn status_log_count(&self, booking_id: BookingId) -> usize {
        let logs = self.status_logs.lock().await;
        logs.iter().filter(|log| log.booking_id() == booking_id).count()
    }

    async fn booking_part_count(&self) -> usize {
        let parts = self.booking_parts.lock().await;
        parts.len()
    }
}

#[async_trait]
impl BookingRepository for MockBookingRepository {
    async fn save(&self, booking: &Booking) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.lock().await;
        bookings.insert(booking.id(), booking.clone());
        Ok(())
    }

    async fn save_with_log(
        &self,
        booking: &Booking,
        log: &BookingStatusLog,
    ) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.lock().await;
        bookings.insert(booking.id(), booking.clone());
        let mut logs = self.status_logs.lock().await;
        logs.push(log.clone());
        Ok(())
    }

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings.get(&booking_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings.values().cloned().collect())
    }

    async fn find_by_status(
        &self,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.status() == status)
            .cloned()
            .collect())
    }

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.customer_id() == customer_id)
            .cloned()
            .collect())
    }

    async fn find_by_technician(
        &self,
        technician_id: UserId,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.technician_id() == Some(technician_id))
            .cloned()
            .collect())
    }

    async fn find_by_service_center(
        &self,
        service_center_id: ServiceCenterId,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.service_center_id() == service_center_id)
            .cloned()
            .collect())
    }

    async fn find_scheduled_for_day(
        &self,
        service_center_id: ServiceCenterId,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
        exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|booking| {
                booking.service_center_id() == service_center_id
                    && booking.status().is_active()
                    && booking.technician_id().is_some()
                    && exclude != Some(booking.id())
                    && booking.effective_start() >= day_start
                    && booking.effective_start() < day_end
            })
            .cloned()
            .collect())
    }

    async fn append_status_log(&self, log: &BookingStatusLog) -> Result<(), RepositoryError> {
        let mut logs = self.status_logs.lock().await;
        logs.push(log.clone());
        Ok(())
    }

    async fn find_status_logs(
        &self,
        booking_id: BookingId,
    ) -> Result<Vec<BookingStatusLog>, RepositoryError> {
        let logs = self.status_logs.lock().await;
        Ok(logs
            .iter()
            .filter(|log| log.booking_id() == booking_id)
            .cloned()
            .collect())
    }

    async fn save_booking_part(&self, part: &BookingPart) -> Result<(), RepositoryError> {
        let mut parts = self.booking_parts.lock().await;
        parts.insert(part.id(), part.clone());
        Ok(())
    }

    async fn find_booking_part_by_id(
        &self,
        booking_part_id: BookingPartId,
    ) -> Result<Option<BookingPart>, RepositoryError> {
        let parts = self.booking_parts.lock().await;
        Ok(parts.get(&booking_part_id).cloned())
    }

    async fn find_booking_parts(
        &self,
        booking_id: BookingId,
    ) -> Result<Vec<BookingPart>, RepositoryError> {
        let parts = self.booking_parts.lock().await;
        Ok(parts
            .values()
            .filter(|part| part.booking_id() == booking_id)
            .cloned()
            .collect())
    }

    async fn delete_booking_part(
        &self,
        booking_part_id: BookingPartId,
    ) -> Result<(), RepositoryError> {
        let mut parts = self.booking_parts.lock().await;
        parts.remove(&booking_part_id);
        Ok(())
    }

    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}

#[derive(Clone)]
struct MockInventoryRepository {
    inventories: Arc<Mutex<HashMap<PartId, PartInventory>>>,
    movements: Arc<Mutex<Vec<PartStockMovement>>>,
}

impl MockInventoryRepository {
    fn new() -> Self {
        Self {
            inventories: Arc::new(Mutex::new(HashMap::new())),
            movements: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn stock_of(&self, part_id: PartId) -> u32 {
        let inventories = self.inventories.lock().await;
        inventories
            .get(&part_id)
            .map(|inventory| inventory.stock_quantity())
            .unwrap_or(0)
    }

    async fn movements_of(&self, part_id: PartId) -> Vec<PartStockMovement> {
        let movements = self.movements.lock().await;
        movements
            .iter()
            .filter(|movement| movement.part_id() == part_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl InventoryRepository for MockInventoryRepository {
    async fn save(&self, inventory: &PartInventory) -> Result<(), RepositoryError> {
        let mut inventories = self.inventories.lock().await;
        inventories.insert(inventory.part_id(), inventory.clone());
        Ok(())
    }

    async fn save_with_movement(
        &self,
        inventory: &PartInventory,
        movement: &PartStockMovement,
    ) -> Result<(), RepositoryError> {
        let mut inventories = self.inventories.lock().await;
        inventories.insert(inventory.part_id(), inventory.clone());
        let mut movements = self.movements.lock().await;
        movements.push(movement.clone());
        Ok(())
    }

    async fn find_by_part_id(
        &self,
        part_id: PartId,
    ) -> Result<Option<PartInventory>, RepositoryError> {
        let inventories = self.inventories.lock().await;
        Ok(inventories.get(&part_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<PartInventory>, RepositoryError> {
        let inventories = self.inventories.lock().await;
        Ok(inventories.values().cloned().collect())
    }

    async fn find_low_stock(&self) -> Result<Vec<PartInventory>, RepositoryError> {
        let inventories = self.inventories.lock().await;
        Ok(inventories
            .values()
            .filter(|inventory| inventory.is_below_min_stock())
            .cloned()
            .collect())
    }

    async fn append_movement(
        &self,
        movement: &PartStockMovement,
    ) -> Result<(), RepositoryError> {
        let mut movements = self.movements.lock().await;
        movements.push(movement.clone());
        Ok(())
    }

    async fn find_movements_by_part(
        &self,
        part_id: PartId,
    ) -> Result<Vec<PartStockMovement>, RepositoryError> {
        let movements = self.movements.lock().await;
        Ok(movements
            .iter()
            .filter(|movement| movement.part_id() == part_id)
            .cloned()
            .collect())
    }
}

struct MockPartRepository {
    parts: HashMap<PartId, Part>,
}

impl MockPartRepository {
    fn with_parts(parts: Vec<Part>) -> Self {
        Self {
            parts: parts.into_iter().map(|part| (part.id(), part)).collect(),
        }
    }
}

#[async_trait]
impl PartRepository for MockPartRepository {
    async fn save(&self, _part: &Part) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, part_id: PartId) -> Result<Option<Part>, RepositoryError> {
        Ok(self.parts.get(&part_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Part>, RepositoryError> {
        Ok(self.parts.values().cloned().collect())
    }
}

struct MockTechnicianRepository {
    technicians: Vec<Technician>,
}

impl MockTechnicianRepository {
    fn with_technicians(technicians: Vec<Technician>) -> Self {
        Self { technicians }
    }
}

#[async_trait]
impl TechnicianRepository for MockTechnicianRepository {
    async fn save(&self, _technician: &Technician) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Technician>, RepositoryError> {
        Ok(self
            .technicians
            .iter()
            .find(|technician| technician.id() == id)
            .cloned())
    }

    async fn find_active_by_service_center(
        &self,
        service_center_id: ServiceCenterId,
    ) -> Result<Vec<Technician>, RepositoryError> {
        Ok(self
            .technicians
            .iter()
            .filter(|technician| {
                technician.service_center_id() == service_center_id && technician.is_active()
            })
            .cloned()
            .collect())
    }
}

// テスト用ヘルパー
fn t(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, hour, minute, 0).unwrap()
}

async fn seed_stock(repo: &MockInventoryRepository, part_id: PartId, quantity: u32) {
    let mut inventory = PartInventory::new(part_id);
    inventory.release(quantity, UserId::new());
    repo.save(&inventory).await.unwrap();
}

fn build_booking_service(
    booking_repo: &MockBookingRepository,
    inventory_repo: &Arc<MockInventoryRepository>,
    parts: Vec<Part>,
) -> BookingApplicationService<MockBookingRepository> {
    BookingApplicationService::new(
        booking_repo.clone(),
        Arc::new(MockPartRepository::with_parts(parts)),
        StockLedgerService::new(inventory_repo.clone()),
        Arc::new(InMemoryEventBus::new()),
    )
}

fn brake_pad() -> Part {
    Part::new(
        PartId::new(),
        "BP-1042".to_string(),
        "ブレーキパッド".to_string(),
        Money::jpy(4500),
    )
}

/// 予約ライフサイクル全体のシナリオ
/// 作成 → 承認（90分） → 作業開始 → 部品使用 → 完了
#[tokio::test]
async fn test_full_booking_lifecycle() {
    let booking_repo = MockBookingRepository::new();
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let part = brake_pad();
    let part_id = part.id();
    seed_stock(&inventory_repo, part_id, 10).await;

    let service = build_booking_service(&booking_repo, &inventory_repo, vec![part]);
    let technician = UserId::new();
    let approver = UserId::new();

    // 作成
    let booking_id = service
        .create_booking(
            CustomerId::new(),
            VehicleId::new(),
            ServiceCenterId::new(),
            "12ヶ月点検".to_string(),
            t(9, 0),
            None,
            60,
            None,
        )
        .await
        .unwrap();

    let booking = service.get_booking_by_id(booking_id).await.unwrap().unwrap();
    assert_eq!(booking.status(), BookingStatus::Pending);
    assert_eq!(booking_repo.status_log_count(booking_id).await, 1);

    // 承認（確定開始9:00、所要90分 → 確定終了10:30）
    service
        .approve_booking(booking_id, approver, Some(technician), Some(t(9, 0)), Some(90), None)
        .await
        .unwrap();

    let booking = service.get_booking_by_id(booking_id).await.unwrap().unwrap();
    assert_eq!(booking.status(), BookingStatus::Approved);
    assert_eq!(booking.confirmed_end(), Some(t(10, 30)));

    // 作業開始（確定開始時刻は承認時のまま）
    service.start_booking(booking_id, technician).await.unwrap();
    let booking = service.get_booking_by_id(booking_id).await.unwrap().unwrap();
    assert_eq!(booking.status(), BookingStatus::InProgress);
    assert_eq!(booking.confirmed_start(), Some(t(9, 0)));

    // 部品使用（在庫10 → 8、OUT -2の移動記録）
    service
        .add_booking_part(booking_id, part_id, 2, None, None, technician)
        .await
        .unwrap();

    assert_eq!(inventory_repo.stock_of(part_id).await, 8);
    let movements = inventory_repo.movements_of(part_id).await;
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].movement_type(), MovementType::Out);
    assert_eq!(movements[0].quantity_delta(), -2);
    assert_eq!(movements[0].reference_type(), StockReferenceType::Booking);
    assert_eq!(movements[0].reference_id(), Some(booking_id.as_uuid()));

    // 費用は単価 × 数量で算出される
    let parts = service.get_booking_parts(booking_id).await.unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].cost().amount(), 9000);

    // 完了（確定終了 = 完了日時）
    service
        .complete_booking(booking_id, technician, Some("交換作業完了".to_string()))
        .await
        .unwrap();

    let booking = service.get_booking_by_id(booking_id).await.unwrap().unwrap();
    assert_eq!(booking.status(), BookingStatus::Completed);
    assert_eq!(booking.confirmed_end(), booking.completed_at());

    // 遷移ごとに履歴行がちょうど1行ずつ（作成・承認・開始・完了）
    let logs = service.get_status_history(booking_id).await.unwrap();
    assert_eq!(logs.len(), 4);
    assert_eq!(logs[0].old_status(), None);
    assert_eq!(logs[0].new_status(), BookingStatus::Pending);
    assert_eq!(logs[3].old_status(), Some(BookingStatus::InProgress));
    assert_eq!(logs[3].new_status(), BookingStatus::Completed);
}

/// 在庫不足シナリオ: 消費が失敗したら明細は作られず在庫も変わらない
#[tokio::test]
async fn test_add_booking_part_insufficient_stock() {
    let booking_repo = MockBookingRepository::new();
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let part = brake_pad();
    let part_id = part.id();
    seed_stock(&inventory_repo, part_id, 1).await;

    let service = build_booking_service(&booking_repo, &inventory_repo, vec![part]);
    let technician = UserId::new();

    let booking_id = service
        .create_booking(
            CustomerId::new(),
            VehicleId::new(),
            ServiceCenterId::new(),
            "修理".to_string(),
            t(9, 0),
            None,
            60,
            None,
        )
        .await
        .unwrap();
    service.start_booking(booking_id, technician).await.unwrap();

    let result = service
        .add_booking_part(booking_id, part_id, 3, None, None, technician)
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(DomainError::InsufficientStock))
    ));
    // 在庫は変わらず、明細も移動記録も作られない
    assert_eq!(inventory_repo.stock_of(part_id).await, 1);
    assert_eq!(booking_repo.booking_part_count().await, 0);
    assert!(inventory_repo.movements_of(part_id).await.is_empty());
}

/// 担当整備士以外は部品を操作できない
#[tokio::test]
async fn test_add_booking_part_requires_assigned_technician() {
    let booking_repo = MockBookingRepository::new();
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let part = brake_pad();
    let part_id = part.id();
    seed_stock(&inventory_repo, part_id, 10).await;

    let service = build_booking_service(&booking_repo, &inventory_repo, vec![part]);
    let technician = UserId::new();

    let booking_id = service
        .create_booking(
            CustomerId::new(),
            VehicleId::new(),
            ServiceCenterId::new(),
            "修理".to_string(),
            t(9, 0),
            None,
            60,
            None,
        )
        .await
        .unwrap();
    service.start_booking(booking_id, technician).await.unwrap();

    let result = service
        .add_booking_part(booking_id, part_id, 1, None, None, UserId::new())
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(
            DomainError::NotAssignedTechnician(_)
        ))
    ));
    assert_eq!(inventory_repo.stock_of(part_id).await, 10);
}

/// InProgress以外では部品を追加できない
#[tokio::test]
async fn test_add_booking_part_requires_in_progress() {
    let booking_repo = MockBookingRepository::new();
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let part = brake_pad();
    let part_id = part.id();
    seed_stock(&inventory_repo, part_id, 10).await;

    let service = build_booking_service(&booking_repo, &inventory_repo, vec![part]);
    let technician = UserId::new();

    let booking_id = service
        .create_booking(
            CustomerId::new(),
            VehicleId::new(),
            ServiceCenterId::new(),
            "修理".to_string(),
            t(9, 0),
            None,
            60,
            None,
        )
        .await
        .unwrap();
    service
        .approve_booking(booking_id, UserId::new(), Some(technician), None, None, None)
        .await
        .unwrap();

    let result = service
        .add_booking_part(booking_id, part_id, 1, None, None, technician)
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(
            DomainError::InvalidStateTransition(_)
        ))
    ));
}

/// 明細削除で同数量が在庫へ戻り、IN移動が記録される
#[tokio::test]
async fn test_remove_booking_part_releases_stock() {
    let booking_repo = MockBookingRepository::new();
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let part = brake_pad();
    let part_id = part.id();
    seed_stock(&inventory_repo, part_id, 10).await;

    let service = build_booking_service(&booking_repo, &inventory_repo, vec![part]);
    let technician = UserId::new();

    let booking_id = service
        .create_booking(
            CustomerId::new(),
            VehicleId::new(),
            ServiceCenterId::new(),
            "修理".to_string(),
            t(9, 0),
            None,
            60,
            None,
        )
        .await
        .unwrap();
    service.start_booking(booking_id, technician).await.unwrap();

    let booking_part_id = service
        .add_booking_part(booking_id, part_id, 4, None, None, technician)
        .await
        .unwrap();
    assert_eq!(inventory_repo.stock_of(part_id).await, 6);

    service
        .remove_booking_part(booking_part_id, technician)
        .await
        .unwrap();

    assert_eq!(inventory_repo.stock_of(part_id).await, 10);
    assert_eq!(booking_repo.booking_part_count().await, 0);

    let movements = inventory_repo.movements_of(part_id).await;
    assert_eq!(movements.len(), 2);
    assert_eq!(movements[1].movement_type(), MovementType::In);
    assert_eq!(movements[1].quantity_delta(), 4);
}

/// 承認済みの予約の却下は成功する（ブロックされるのはCompleted/Cancelledのみ）
#[tokio::test]
async fn test_reject_after_approval_succeeds() {
    let booking_repo = MockBookingRepository::new();
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let service = build_booking_service(&booking_repo, &inventory_repo, vec![]);
    let approver = UserId::new();

    let booking_id = service
        .create_booking(
            CustomerId::new(),
            VehicleId::new(),
            ServiceCenterId::new(),
            "修理".to_string(),
            t(9, 0),
            None,
            60,
            None,
        )
        .await
        .unwrap();
    service
        .approve_booking(booking_id, approver, None, None, None, None)
        .await
        .unwrap();

    service
        .reject_booking(booking_id, approver, Some("部品の入荷待ち".to_string()))
        .await
        .unwrap();

    let booking = service.get_booking_by_id(booking_id).await.unwrap().unwrap();
    assert_eq!(booking.status(), BookingStatus::Rejected);
    assert_eq!(booking.rejection_reason(), Some("部品の入荷待ち"));
}

/// 完了済みの予約はキャンセルできない
#[tokio::test]
async fn test_cancel_completed_booking_fails() {
    let booking_repo = MockBookingRepository::new();
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let service = build_booking_service(&booking_repo, &inventory_repo, vec![]);
    let technician = UserId::new();

    let booking_id = service
        .create_booking(
            CustomerId::new(),
            VehicleId::new(),
            ServiceCenterId::new(),
            "修理".to_string(),
            t(9, 0),
            None,
            60,
            None,
        )
        .await
        .unwrap();
    service.start_booking(booking_id, technician).await.unwrap();
    service
        .complete_booking(booking_id, technician, None)
        .await
        .unwrap();

    let result = service
        .cancel_booking(booking_id, UserId::new(), None)
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(
            DomainError::InvalidStateTransition(_)
        ))
    ));
}

/// 存在しない部品の追加はNotFoundで失敗する
#[tokio::test]
async fn test_add_unknown_part_fails_with_not_found() {
    let booking_repo = MockBookingRepository::new();
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let service = build_booking_service(&booking_repo, &inventory_repo, vec![]);
    let technician = UserId::new();

    let booking_id = service
        .create_booking(
            CustomerId::new(),
            VehicleId::new(),
            ServiceCenterId::new(),
            "修理".to_string(),
            t(9, 0),
            None,
            60,
            None,
        )
        .await
        .unwrap();
    service.start_booking(booking_id, technician).await.unwrap();

    let result = service
        .add_booking_part(booking_id, PartId::new(), 1, None, None, technician)
        .await;

    assert!(matches!(result, Err(ApplicationError::NotFound(_))));
}

/// 空き状況検索のシナリオ
/// 10:00-11:00の予約を持つ整備士は、接するウィンドウでは空き、
/// 重なるウィンドウでは埋まりとして扱われる
#[tokio::test]
async fn test_availability_half_open_overlap() {
    let booking_repo = MockBookingRepository::new();
    let center = ServiceCenterId::new();
    let alice = UserId::new();
    let bob = UserId::new();

    let technician_repo = Arc::new(MockTechnicianRepository::with_technicians(vec![
        Technician::new(alice, center, "安藤 彩".to_string(), true),
        Technician::new(bob, center, "坂本 豊".to_string(), true),
    ]));

    // 安藤に10:00-11:00の承認済み予約を割り当てる
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let service = build_booking_service(&booking_repo, &inventory_repo, vec![]);
    let booking_id = service
        .create_booking(
            CustomerId::new(),
            VehicleId::new(),
            center,
            "修理".to_string(),
            t(10, 0),
            None,
            60,
            None,
        )
        .await
        .unwrap();
    service
        .approve_booking(booking_id, UserId::new(), Some(alice), Some(t(10, 0)), Some(60), None)
        .await
        .unwrap();

    let availability =
        AvailabilityService::new(Arc::new(booking_repo.clone()), technician_repo.clone());

    // [11:00, 12:00) は接しているだけなので両名とも空き
    let available = availability
        .find_available_technicians(center, t(11, 0), Some(60), None)
        .await
        .unwrap();
    assert_eq!(available.len(), 2);

    // [10:30, 11:30) は重なるので安藤は埋まり
    let available = availability
        .find_available_technicians(center, t(10, 30), Some(60), None)
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id(), bob);

    // 対象の予約自身を除外すれば安藤も空きに戻る（再調整のケース）
    let available = availability
        .find_available_technicians(center, t(10, 30), Some(60), Some(booking_id))
        .await
        .unwrap();
    assert_eq!(available.len(), 2);
}

/// 結果は氏名の昇順で返り、稼働していない整備士と
/// キャンセル済み予約は判定に影響しない
#[tokio::test]
async fn test_availability_ordering_and_filters() {
    let booking_repo = MockBookingRepository::new();
    let center = ServiceCenterId::new();
    let alice = UserId::new();
    let bob = UserId::new();
    let carl = UserId::new();

    let technician_repo = Arc::new(MockTechnicianRepository::with_technicians(vec![
        Technician::new(bob, center, "坂本 豊".to_string(), true),
        Technician::new(alice, center, "安藤 彩".to_string(), true),
        Technician::new(carl, center, "田村 健".to_string(), false),
    ]));

    // 坂本の10:00-11:00の予約をキャンセル済みにする
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let service = build_booking_service(&booking_repo, &inventory_repo, vec![]);
    let booking_id = service
        .create_booking(
            CustomerId::new(),
            VehicleId::new(),
            center,
            "修理".to_string(),
            t(10, 0),
            None,
            60,
            None,
        )
        .await
        .unwrap();
    service
        .approve_booking(booking_id, UserId::new(), Some(bob), Some(t(10, 0)), Some(60), None)
        .await
        .unwrap();
    service
        .cancel_booking(booking_id, UserId::new(), None)
        .await
        .unwrap();

    let availability =
        AvailabilityService::new(Arc::new(booking_repo.clone()), technician_repo.clone());

    let available = availability
        .find_available_technicians(center, t(10, 0), Some(60), None)
        .await
        .unwrap();

    // キャンセル済み予約はカレンダーを占有せず、稼働外の田村は含まれない
    assert_eq!(available.len(), 2);
    assert_eq!(available[0].full_name(), "坂本 豊");
    assert_eq!(available[1].full_name(), "安藤 彩");
}

/// クレームの引当 → 監査消費 → 解放のフロー
/// 監査消費は在庫数量を変更しない
#[tokio::test]
async fn test_claim_reserve_consume_release_flow() {
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let part_id = PartId::new();
    seed_stock(&inventory_repo, part_id, 10).await;

    let ledger = StockLedgerService::new(inventory_repo.clone());
    let service = ClaimPartApplicationService::new(ledger);
    let claim_id = ClaimId::new();
    let actor = UserId::new();

    // 引当: 10 → 5、RESERVED -5
    service
        .reserve_part(part_id, 5, claim_id, actor)
        .await
        .unwrap();
    assert_eq!(inventory_repo.stock_of(part_id).await, 5);

    // 監査消費: 数量は変わらず、OUT -5の記録だけが追記される
    service
        .consume_reserved_part(part_id, 5, claim_id, actor)
        .await
        .unwrap();
    assert_eq!(inventory_repo.stock_of(part_id).await, 5);

    // 解放: 5 → 7、RELEASED +2
    service
        .release_part(part_id, 2, claim_id, actor)
        .await
        .unwrap();
    assert_eq!(inventory_repo.stock_of(part_id).await, 7);

    let movements = inventory_repo.movements_of(part_id).await;
    assert_eq!(movements.len(), 3);
    assert_eq!(movements[0].movement_type(), MovementType::Reserved);
    assert_eq!(movements[0].quantity_delta(), -5);
    assert_eq!(movements[1].movement_type(), MovementType::Out);
    assert_eq!(movements[1].quantity_delta(), -5);
    assert_eq!(movements[2].movement_type(), MovementType::Released);
    assert_eq!(movements[2].quantity_delta(), 2);
    for movement in &movements {
        assert_eq!(movement.reference_type(), StockReferenceType::Claim);
        assert_eq!(movement.reference_id(), Some(claim_id.as_uuid()));
    }
}

/// 在庫不足の引当は失敗し、在庫も移動記録も変わらない
#[tokio::test]
async fn test_claim_reserve_insufficient_stock() {
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let part_id = PartId::new();
    seed_stock(&inventory_repo, part_id, 2).await;

    let service = ClaimPartApplicationService::new(StockLedgerService::new(inventory_repo.clone()));

    let result = service
        .reserve_part(part_id, 3, ClaimId::new(), UserId::new())
        .await;

    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(DomainError::InsufficientStock))
    ));
    assert_eq!(inventory_repo.stock_of(part_id).await, 2);
    assert!(inventory_repo.movements_of(part_id).await.is_empty());
}

/// 在庫手動調整のシナリオ
/// OUTは在庫不足で失敗し、ADJUSTMENTは0で打ち止めになる
#[tokio::test]
async fn test_manual_stock_adjustment() {
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let part_id = PartId::new();
    seed_stock(&inventory_repo, part_id, 10).await;

    let service = InventoryApplicationService::new(
        inventory_repo.clone(),
        StockLedgerService::new(inventory_repo.clone()),
    );
    let actor = UserId::new();

    // OUT: 10 → 7、記録は -abs(delta)
    service
        .adjust_stock(part_id, 3, MovementType::Out, None, actor)
        .await
        .unwrap();
    assert_eq!(inventory_repo.stock_of(part_id).await, 7);
    let movements = inventory_repo.movements_of(part_id).await;
    assert_eq!(movements[0].quantity_delta(), -3);

    // OUT（過大）: 在庫不足で失敗、数量は変わらない
    let result = service
        .adjust_stock(part_id, 20, MovementType::Out, None, actor)
        .await;
    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(DomainError::InsufficientStock))
    ));
    assert_eq!(inventory_repo.stock_of(part_id).await, 7);

    // IN: 7 → 12
    service
        .adjust_stock(part_id, 5, MovementType::In, None, actor)
        .await
        .unwrap();
    assert_eq!(inventory_repo.stock_of(part_id).await, 12);

    // ADJUSTMENT（大きな負数）: 0で打ち止め、記録は指定値のまま
    service
        .adjust_stock(
            part_id,
            -50,
            MovementType::Adjustment,
            Some("棚卸で全数不明".to_string()),
            actor,
        )
        .await
        .unwrap();
    assert_eq!(inventory_repo.stock_of(part_id).await, 0);
    let movements = inventory_repo.movements_of(part_id).await;
    assert_eq!(movements.last().unwrap().quantity_delta(), -50);

    // RESERVEDは調整には使えない
    let result = service
        .adjust_stock(part_id, 1, MovementType::Reserved, None, actor)
        .await;
    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(DomainError::Validation(_)))
    ));
}

/// 最低在庫水準の設定と低在庫の検出
/// 設定自体は移動記録を残さない
#[tokio::test]
async fn test_min_stock_level_and_low_stock_query() {
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let part_id = PartId::new();
    seed_stock(&inventory_repo, part_id, 3).await;

    let service = InventoryApplicationService::new(
        inventory_repo.clone(),
        StockLedgerService::new(inventory_repo.clone()),
    );
    let actor = UserId::new();

    service
        .update_min_stock_level(part_id, Some(5), actor)
        .await
        .unwrap();

    // 移動記録は増えない
    assert!(inventory_repo.movements_of(part_id).await.is_empty());

    let low_stock = service.get_low_stock_inventories().await.unwrap();
    assert_eq!(low_stock.len(), 1);
    assert_eq!(low_stock[0].part_id(), part_id);

    // 水準以上まで入庫すれば低在庫から外れる
    service
        .adjust_stock(part_id, 10, MovementType::In, None, actor)
        .await
        .unwrap();
    let low_stock = service.get_low_stock_inventories().await.unwrap();
    assert!(low_stock.is_empty());
}

/// 未知の在庫行は最初の変更時に数量0で遅延作成される
#[tokio::test]
async fn test_inventory_lazily_created_on_first_mutation() {
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let part_id = PartId::new();

    let service = ClaimPartApplicationService::new(StockLedgerService::new(inventory_repo.clone()));

    // 在庫行がない状態で解放 → 0から加算される
    service
        .release_part(part_id, 3, ClaimId::new(), UserId::new())
        .await
        .unwrap();

    assert_eq!(inventory_repo.stock_of(part_id).await, 3);

    // 在庫行がない状態での引当は在庫0として失敗する
    let other_part = PartId::new();
    let result = service
        .reserve_part(other_part, 1, ClaimId::new(), UserId::new())
        .await;
    assert!(matches!(
        result,
        Err(ApplicationError::DomainError(DomainError::InsufficientStock))
    ));
}

/// Pendingからの直接開始フォールバック
#[tokio::test]
async fn test_start_booking_pending_fallback() {
    let booking_repo = MockBookingRepository::new();
    let inventory_repo = Arc::new(MockInventoryRepository::new());
    let service = build_booking_service(&booking_repo, &inventory_repo, vec![]);
    let technician = UserId::new();

    let booking_id = service
        .create_booking(
            CustomerId::new(),
            VehicleId::new(),
            ServiceCenterId::new(),
            "緊急修理".to_string(),
            t(9, 0),
            None,
            60,
            None,
        )
        .await
        .unwrap();

    // 承認を経ずに直接開始できる
    service.start_booking(booking_id, technician).await.unwrap();

    let booking = service.get_booking_by_id(booking_id).await.unwrap().unwrap();
    assert_eq!(booking.status(), BookingStatus::InProgress);
    assert_eq!(booking.technician_id(), Some(technician));
    assert!(booking.confirmed_start().is_some());
    assert!(booking.confirmed_end().is_some());
}
