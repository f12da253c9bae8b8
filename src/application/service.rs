use crate::application::ApplicationError;
use crate::domain::event::{
    BookingApproved, BookingCancelled, BookingCompleted, BookingRejected, BookingStarted,
    DomainEvent,
};
use crate::domain::logging::{LogEntry, LogLevel};
use crate::domain::model::{
    Booking, BookingId, BookingPart, BookingPartId, BookingStatus, BookingStatusLog, ClaimId,
    CustomerId, Money, MovementType, PartId, PartInventory, PartStockMovement, ServiceCenterId,
    Technician, UserId, VehicleId,
};
use crate::domain::port::{BookingRepository, EventBus, InventoryRepository, PartRepository};
use crate::domain::service::{AvailabilityService, StockLedgerService};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 予約アプリケーションサービス
/// 予約の状態遷移を調停し、遷移ごとに履歴行の追記とイベント発行を行う
pub struct BookingApplicationService<BR>
where
    BR: BookingRepository,
{
    booking_repository: BR,
    part_repository: Arc<dyn PartRepository>,
    stock_ledger: StockLedgerService,
    event_bus: Arc<dyn EventBus>,
}

impl<BR> BookingApplicationService<BR>
where
    BR: BookingRepository,
{
    /// 新しい予約アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `booking_repository` - 予約リポジトリ
    /// * `part_repository` - 部品カタログリポジトリ
    /// * `stock_ledger` - 在庫台帳サービス
    /// * `event_bus` - イベントバス
    pub fn new(
        booking_repository: BR,
        part_repository: Arc<dyn PartRepository>,
        stock_ledger: StockLedgerService,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            booking_repository,
            part_repository,
            stock_ledger,
            event_bus,
        }
    }

    /// 新しい予約を作成
    /// ステータスはPendingで開始し、作成自体も履歴行として残す
    ///
    /// # Returns
    /// * `Ok(BookingId)` - 作成された予約のID
    /// * `Err(ApplicationError)` - 作成失敗
    #[allow(clippy::too_many_arguments)]
    pub async fn create_booking(
        &self,
        customer_id: CustomerId,
        vehicle_id: VehicleId,
        service_center_id: ServiceCenterId,
        service_type: String,
        preferred_start: DateTime<Utc>,
        preferred_end: Option<DateTime<Utc>>,
        estimated_duration_minutes: i64,
        customer_note: Option<String>,
    ) -> Result<BookingId, ApplicationError> {
        let booking_id = self.booking_repository.next_identity();
        let booking = Booking::new(
            booking_id,
            customer_id,
            vehicle_id,
            service_center_id,
            service_type,
            preferred_start,
            preferred_end,
            estimated_duration_minutes,
            customer_note,
        );
        let log = BookingStatusLog::new(booking_id, None, BookingStatus::Pending, None, None);
        self.booking_repository.save_with_log(&booking, &log).await?;
        Ok(booking_id)
    }

    /// 予約を承認
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    /// * `approved_by` - 承認者
    /// * `technician_id` - 担当整備士の上書き（オプション）
    /// * `confirmed_start` - 確定開始時刻（オプション、希望開始も同期する）
    /// * `duration_minutes` - 所要時間の上書き（オプション、15分を下限）
    /// * `note` - 内部メモの上書き（オプション）
    pub async fn approve_booking(
        &self,
        booking_id: BookingId,
        approved_by: UserId,
        technician_id: Option<UserId>,
        confirmed_start: Option<DateTime<Utc>>,
        duration_minutes: Option<i64>,
        note: Option<String>,
    ) -> Result<(), ApplicationError> {
        let mut booking = self.load_booking(booking_id).await?;
        let old_status = booking.status();

        booking.approve(
            approved_by,
            technician_id,
            confirmed_start,
            duration_minutes,
            note,
        )?;

        let log = BookingStatusLog::new(
            booking_id,
            Some(old_status),
            BookingStatus::Approved,
            Some(approved_by),
            None,
        );
        self.booking_repository.save_with_log(&booking, &log).await?;

        let event = BookingApproved::new(
            booking.id(),
            booking.customer_id(),
            booking.service_center_id(),
            booking.technician_id(),
            booking.confirmed_start(),
        );
        self.publish(DomainEvent::BookingApproved(event)).await
    }

    /// 予約を却下
    pub async fn reject_booking(
        &self,
        booking_id: BookingId,
        approved_by: UserId,
        reason: Option<String>,
    ) -> Result<(), ApplicationError> {
        let mut booking = self.load_booking(booking_id).await?;
        let old_status = booking.status();

        booking.reject(approved_by, reason.clone())?;

        let log = BookingStatusLog::new(
            booking_id,
            Some(old_status),
            BookingStatus::Rejected,
            Some(approved_by),
            reason.clone(),
        );
        self.booking_repository.save_with_log(&booking, &log).await?;

        let event = BookingRejected::new(booking.id(), booking.customer_id(), reason);
        self.publish(DomainEvent::BookingRejected(event)).await
    }

    /// 作業を開始
    pub async fn start_booking(
        &self,
        booking_id: BookingId,
        technician_id: UserId,
    ) -> Result<(), ApplicationError> {
        let mut booking = self.load_booking(booking_id).await?;
        let old_status = booking.status();

        booking.start(technician_id)?;

        let log = BookingStatusLog::new(
            booking_id,
            Some(old_status),
            BookingStatus::InProgress,
            Some(technician_id),
            None,
        );
        self.booking_repository.save_with_log(&booking, &log).await?;

        let event = BookingStarted::new(booking.id(), technician_id);
        self.publish(DomainEvent::BookingStarted(event)).await
    }

    /// 作業を完了
    pub async fn complete_booking(
        &self,
        booking_id: BookingId,
        technician_id: UserId,
        note: Option<String>,
    ) -> Result<(), ApplicationError> {
        let mut booking = self.load_booking(booking_id).await?;
        let old_status = booking.status();

        booking.complete(technician_id, note)?;

        let log = BookingStatusLog::new(
            booking_id,
            Some(old_status),
            BookingStatus::Completed,
            Some(technician_id),
            None,
        );
        self.booking_repository.save_with_log(&booking, &log).await?;

        let completed_at = booking
            .completed_at()
            .expect("完了済みの予約には完了日時が必須です");
        let event = BookingCompleted::new(booking.id(), booking.customer_id(), completed_at);
        self.publish(DomainEvent::BookingCompleted(event)).await
    }

    /// 予約をキャンセル
    pub async fn cancel_booking(
        &self,
        booking_id: BookingId,
        cancelled_by: UserId,
        reason: Option<String>,
    ) -> Result<(), ApplicationError> {
        let mut booking = self.load_booking(booking_id).await?;
        let old_status = booking.status();

        booking.cancel(cancelled_by, reason.clone())?;

        let log = BookingStatusLog::new(
            booking_id,
            Some(old_status),
            BookingStatus::Cancelled,
            Some(cancelled_by),
            reason.clone(),
        );
        self.booking_repository.save_with_log(&booking, &log).await?;

        let event = BookingCancelled::new(booking.id(), cancelled_by, reason);
        self.publish(DomainEvent::BookingCancelled(event)).await
    }

    /// 予約に部品使用明細を追加
    /// 在庫台帳の消費が成功してから明細行を作成する。
    /// 在庫不足なら明細は作られず、明細の保存に失敗した場合は
    /// 消費済みの在庫を補償解放する
    ///
    /// # Returns
    /// * `Ok(BookingPartId)` - 作成された明細のID
    pub async fn add_booking_part(
        &self,
        booking_id: BookingId,
        part_id: PartId,
        quantity: u32,
        cost: Option<Money>,
        note: Option<String>,
        actor: UserId,
    ) -> Result<BookingPartId, ApplicationError> {
        let mut booking = self.load_booking(booking_id).await?;
        booking.authorize_part_change(actor)?;

        let part = self
            .part_repository
            .find_by_id(part_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("部品が見つかりません: {}", part_id))
            })?;
        let effective_cost = cost.unwrap_or_else(|| part.unit_price().multiply(quantity));

        // ストアに触れる前に入力を検証する（数量0はここで弾かれる）
        let booking_part = BookingPart::new(
            BookingPartId::new(),
            booking_id,
            part_id,
            quantity,
            effective_cost,
            note,
            actor,
        )?;

        // 台帳の消費が成功してから明細行を作成する
        self.stock_ledger
            .consume_for_booking(part_id, quantity, booking_id, actor)
            .await?;

        if let Err(err) = self.booking_repository.save_booking_part(&booking_part).await {
            // 明細が残らないまま在庫だけ減った状態を補償する
            let compensation = self
                .stock_ledger
                .release_for_booking(part_id, quantity, booking_id, actor)
                .await;
            if let Err(comp_err) = compensation {
                let entry = LogEntry::new(
                    LogLevel::Error,
                    format!("部品消費の補償解放に失敗: {}", comp_err),
                    "BookingApplicationService".to_string(),
                )
                .with_context("booking_id".to_string(), booking_id.to_string());
                println!("{}", entry.format());
            }
            return Err(err.into());
        }

        booking.touch();
        self.booking_repository.save(&booking).await?;

        Ok(booking_part.id())
    }

    /// 予約から部品使用明細を削除
    /// 明細行を削除してから同数量を在庫へ戻す
    pub async fn remove_booking_part(
        &self,
        booking_part_id: BookingPartId,
        actor: UserId,
    ) -> Result<(), ApplicationError> {
        let booking_part = self
            .booking_repository
            .find_booking_part_by_id(booking_part_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!(
                    "部品使用明細が見つかりません: {}",
                    booking_part_id
                ))
            })?;

        let mut booking = self.load_booking(booking_part.booking_id()).await?;
        booking.authorize_part_change(actor)?;

        self.booking_repository
            .delete_booking_part(booking_part_id)
            .await?;
        self.stock_ledger
            .release_for_booking(
                booking_part.part_id(),
                booking_part.quantity(),
                booking_part.booking_id(),
                actor,
            )
            .await?;

        booking.touch();
        self.booking_repository.save(&booking).await?;

        Ok(())
    }

    /// 予約IDで予約を取得
    pub async fn get_booking_by_id(
        &self,
        booking_id: BookingId,
    ) -> Result<Option<Booking>, ApplicationError> {
        self.booking_repository
            .find_by_id(booking_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// すべての予約を取得
    /// 作成日時の降順で並べて返す
    pub async fn get_all_bookings(&self) -> Result<Vec<Booking>, ApplicationError> {
        self.booking_repository
            .find_all()
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定されたステータス文字列の予約を取得
    pub async fn get_bookings_by_status_string(
        &self,
        status_str: String,
    ) -> Result<Vec<Booking>, ApplicationError> {
        let status = BookingStatus::from_string(&status_str).map_err(|_| {
            ApplicationError::NotFound(format!("無効なステータス値: {}", status_str))
        })?;
        self.get_bookings_by_status(status).await
    }

    /// 指定されたステータスの予約を取得
    pub async fn get_bookings_by_status(
        &self,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, ApplicationError> {
        self.booking_repository
            .find_by_status(status)
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定された顧客の予約を取得
    pub async fn get_bookings_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Booking>, ApplicationError> {
        self.booking_repository
            .find_by_customer(customer_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定された整備士が担当する予約を取得
    pub async fn get_bookings_by_technician(
        &self,
        technician_id: UserId,
    ) -> Result<Vec<Booking>, ApplicationError> {
        self.booking_repository
            .find_by_technician(technician_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定されたサービスセンターの予約を取得
    pub async fn get_bookings_by_service_center(
        &self,
        service_center_id: ServiceCenterId,
    ) -> Result<Vec<Booking>, ApplicationError> {
        self.booking_repository
            .find_by_service_center(service_center_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定された予約のステータス履歴を取得
    /// 変更日時の昇順で並べて返す
    pub async fn get_status_history(
        &self,
        booking_id: BookingId,
    ) -> Result<Vec<BookingStatusLog>, ApplicationError> {
        self.booking_repository
            .find_status_logs(booking_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定された予約の部品使用明細を取得
    pub async fn get_booking_parts(
        &self,
        booking_id: BookingId,
    ) -> Result<Vec<BookingPart>, ApplicationError> {
        self.booking_repository
            .find_booking_parts(booking_id)
            .await
            .map_err(ApplicationError::from)
    }

    async fn load_booking(&self, booking_id: BookingId) -> Result<Booking, ApplicationError> {
        self.booking_repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("予約が見つかりません: {}", booking_id))
            })
    }

    async fn publish(&self, event: DomainEvent) -> Result<(), ApplicationError> {
        self.event_bus
            .publish(event)
            .await
            .map_err(|e| ApplicationError::EventPublishingFailed(e.to_string()))
    }
}

/// 空き状況検索アプリケーションサービス
/// ドメインサービスへの薄い委譲
pub struct AvailabilityApplicationService {
    availability: AvailabilityService,
}

impl AvailabilityApplicationService {
    /// 新しい空き状況検索アプリケーションサービスを作成
    pub fn new(availability: AvailabilityService) -> Self {
        Self { availability }
    }

    /// 提案ウィンドウで空いている整備士を取得
    pub async fn find_available_technicians(
        &self,
        service_center_id: ServiceCenterId,
        proposed_start: DateTime<Utc>,
        duration_minutes: Option<i64>,
        exclude_booking: Option<BookingId>,
    ) -> Result<Vec<Technician>, ApplicationError> {
        self.availability
            .find_available_technicians(
                service_center_id,
                proposed_start,
                duration_minutes,
                exclude_booking,
            )
            .await
            .map_err(ApplicationError::from)
    }
}

/// 在庫アプリケーションサービス
/// 手動調整・最低在庫水準・照会系を担当する
pub struct InventoryApplicationService {
    inventory_repository: Arc<dyn InventoryRepository>,
    stock_ledger: StockLedgerService,
}

impl InventoryApplicationService {
    /// 新しい在庫アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `inventory_repository` - 在庫リポジトリ
    /// * `stock_ledger` - 在庫台帳サービス
    pub fn new(
        inventory_repository: Arc<dyn InventoryRepository>,
        stock_ledger: StockLedgerService,
    ) -> Self {
        Self {
            inventory_repository,
            stock_ledger,
        }
    }

    /// 在庫を手動調整
    pub async fn adjust_stock(
        &self,
        part_id: PartId,
        delta: i64,
        movement_type: MovementType,
        reason: Option<String>,
        actor: UserId,
    ) -> Result<(), ApplicationError> {
        self.stock_ledger
            .adjust_stock(part_id, delta, movement_type, reason, actor)
            .await
            .map_err(ApplicationError::from)
    }

    /// 最低在庫水準を更新
    pub async fn update_min_stock_level(
        &self,
        part_id: PartId,
        level: Option<u32>,
        actor: UserId,
    ) -> Result<(), ApplicationError> {
        self.stock_ledger
            .update_min_stock_level(part_id, level, actor)
            .await
            .map_err(ApplicationError::from)
    }

    /// 部品IDで在庫を取得
    pub async fn get_inventory_by_part_id(
        &self,
        part_id: PartId,
    ) -> Result<Option<PartInventory>, ApplicationError> {
        self.inventory_repository
            .find_by_part_id(part_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// すべての在庫を取得
    /// 部品IDの昇順で並べて返す
    pub async fn get_all_inventories(&self) -> Result<Vec<PartInventory>, ApplicationError> {
        self.inventory_repository
            .find_all()
            .await
            .map_err(ApplicationError::from)
    }

    /// 最低在庫水準を下回っている在庫を取得
    pub async fn get_low_stock_inventories(
        &self,
    ) -> Result<Vec<PartInventory>, ApplicationError> {
        self.inventory_repository
            .find_low_stock()
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定された部品の移動記録を取得
    /// 発生日時の降順で並べて返す
    pub async fn get_movements_by_part(
        &self,
        part_id: PartId,
    ) -> Result<Vec<PartStockMovement>, ApplicationError> {
        self.inventory_repository
            .find_movements_by_part(part_id)
            .await
            .map_err(ApplicationError::from)
    }
}

/// クレーム部品アプリケーションサービス
/// 保証クレームに紐づく部品を同じ在庫台帳プリミティブで扱う
pub struct ClaimPartApplicationService {
    stock_ledger: StockLedgerService,
}

impl ClaimPartApplicationService {
    /// 新しいクレーム部品アプリケーションサービスを作成
    pub fn new(stock_ledger: StockLedgerService) -> Self {
        Self { stock_ledger }
    }

    /// クレームのために部品在庫を引き当てる
    pub async fn reserve_part(
        &self,
        part_id: PartId,
        quantity: u32,
        claim_id: ClaimId,
        actor: UserId,
    ) -> Result<(), ApplicationError> {
        self.stock_ledger
            .reserve(part_id, quantity, claim_id, actor)
            .await
            .map_err(ApplicationError::from)
    }

    /// クレームの引当を解放する
    pub async fn release_part(
        &self,
        part_id: PartId,
        quantity: u32,
        claim_id: ClaimId,
        actor: UserId,
    ) -> Result<(), ApplicationError> {
        self.stock_ledger
            .release(part_id, quantity, claim_id, actor)
            .await
            .map_err(ApplicationError::from)
    }

    /// クレーム完了時の消費を監査記録として残す
    /// 数量は引当時に減算済みのため、在庫数量は変化しない
    pub async fn consume_reserved_part(
        &self,
        part_id: PartId,
        quantity: u32,
        claim_id: ClaimId,
        actor: UserId,
    ) -> Result<(), ApplicationError> {
        self.stock_ledger
            .consume_reserved(part_id, quantity, claim_id, actor)
            .await
            .map_err(ApplicationError::from)
    }
}
