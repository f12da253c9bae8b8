// ドメインサービス
// 複数の集約にまたがるビジネスロジックを実装

use crate::domain::error::DomainError;
use crate::domain::model::{
    Booking, BookingId, ClaimId, MovementType, PartId, PartInventory, PartStockMovement,
    ServiceCenterId, StockReferenceType, Technician, UserId,
};
use crate::domain::port::{BookingRepository, InventoryRepository, TechnicianRepository};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// 提案ウィンドウの所要時間が未指定だった場合のデフォルト（分）
const DEFAULT_PROPOSED_DURATION_MINUTES: i64 = 60;

/// 候補予約の実効終了時刻を補完する際の所要時間の下限（分）
const MIN_CANDIDATE_DURATION_MINUTES: i64 = 15;

/// 在庫台帳サービス
/// 部品在庫の引当・解放・消費・調整を担当する
/// 数量を変更する操作は在庫行と移動記録を1トランザクションで永続化する
#[derive(Clone)]
pub struct StockLedgerService {
    inventory_repository: Arc<dyn InventoryRepository>,
}

impl StockLedgerService {
    /// 新しい在庫台帳サービスを作成
    ///
    /// # Arguments
    /// * `inventory_repository` - 在庫リポジトリ
    pub fn new(inventory_repository: Arc<dyn InventoryRepository>) -> Self {
        Self {
            inventory_repository,
        }
    }

    /// クレームのために在庫を引き当てる
    ///
    /// # Returns
    /// * `Ok(())` - 引当成功
    /// * `Err(DomainError::InsufficientStock)` - 在庫不足（在庫は変化しない）
    pub async fn reserve(
        &self,
        part_id: PartId,
        quantity: u32,
        claim_id: ClaimId,
        actor: UserId,
    ) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }

        let mut inventory = self.load_or_create(part_id).await?;
        inventory.reserve(quantity, actor)?;

        let movement = PartStockMovement::new(
            part_id,
            MovementType::Reserved,
            -(quantity as i64),
            StockReferenceType::Claim,
            Some(claim_id.as_uuid()),
            None,
            actor,
        );
        self.persist(&inventory, &movement).await
    }

    /// クレームの引当を解放する
    /// 上限チェックは行わず、常に成功する
    pub async fn release(
        &self,
        part_id: PartId,
        quantity: u32,
        claim_id: ClaimId,
        actor: UserId,
    ) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }

        let mut inventory = self.load_or_create(part_id).await?;
        inventory.release(quantity, actor);

        let movement = PartStockMovement::new(
            part_id,
            MovementType::Released,
            quantity as i64,
            StockReferenceType::Claim,
            Some(claim_id.as_uuid()),
            None,
            actor,
        );
        self.persist(&inventory, &movement).await
    }

    /// 予約の部品使用として在庫を消費する
    /// 予約部品明細の作成前に必ず成功している必要がある
    pub async fn consume_for_booking(
        &self,
        part_id: PartId,
        quantity: u32,
        booking_id: BookingId,
        actor: UserId,
    ) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }

        let mut inventory = self.load_or_create(part_id).await?;
        inventory.reserve(quantity, actor)?;

        let movement = PartStockMovement::new(
            part_id,
            MovementType::Out,
            -(quantity as i64),
            StockReferenceType::Booking,
            Some(booking_id.as_uuid()),
            None,
            actor,
        );
        self.persist(&inventory, &movement).await
    }

    /// 予約の部品使用を取り消して在庫へ戻す
    /// consume_for_booking と対称、常に成功する
    pub async fn release_for_booking(
        &self,
        part_id: PartId,
        quantity: u32,
        booking_id: BookingId,
        actor: UserId,
    ) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }

        let mut inventory = self.load_or_create(part_id).await?;
        inventory.release(quantity, actor);

        let movement = PartStockMovement::new(
            part_id,
            MovementType::In,
            quantity as i64,
            StockReferenceType::Booking,
            Some(booking_id.as_uuid()),
            None,
            actor,
        );
        self.persist(&inventory, &movement).await
    }

    /// クレーム完了時の消費を監査記録として追記する
    /// 数量の減算は引当時に済んでいるため在庫数量は変更しない。
    /// 意図的な非対称であり、二重減算を防ぐため専用の操作として公開する
    pub async fn consume_reserved(
        &self,
        part_id: PartId,
        quantity: u32,
        claim_id: ClaimId,
        actor: UserId,
    ) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }

        let movement = PartStockMovement::new(
            part_id,
            MovementType::Out,
            -(quantity as i64),
            StockReferenceType::Claim,
            Some(claim_id.as_uuid()),
            Some("引当済み在庫の消費記録（数量は引当時に減算済み）".to_string()),
            actor,
        );
        self.inventory_repository
            .append_movement(&movement)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("移動記録の追記に失敗: {}", e)))
    }

    /// 在庫を手動調整する
    ///
    /// * `MovementType::In` - abs(delta) を加算
    /// * `MovementType::Out` - abs(delta) を減算、在庫不足ならエラー
    /// * `MovementType::Adjustment` - 符号付きのdeltaをそのまま適用、0未満は0で打ち止め
    ///
    /// 記録される移動数量はOutの場合 -abs(delta)、それ以外は指定されたdeltaのまま
    pub async fn adjust_stock(
        &self,
        part_id: PartId,
        delta: i64,
        movement_type: MovementType,
        reason: Option<String>,
        actor: UserId,
    ) -> Result<(), DomainError> {
        if delta == 0 {
            return Err(DomainError::InvalidQuantity);
        }

        let mut inventory = self.load_or_create(part_id).await?;
        let recorded_delta = match movement_type {
            MovementType::In => {
                inventory.release(delta.unsigned_abs() as u32, actor);
                delta
            }
            MovementType::Out => {
                inventory.reserve(delta.unsigned_abs() as u32, actor)?;
                -(delta.abs())
            }
            MovementType::Adjustment => {
                inventory.apply_adjustment(delta, actor);
                delta
            }
            MovementType::Reserved | MovementType::Released => {
                return Err(DomainError::Validation(
                    "在庫調整に使用できる移動種別はIN/OUT/ADJUSTMENTのみです".to_string(),
                ));
            }
        };

        let movement = PartStockMovement::new(
            part_id,
            movement_type,
            recorded_delta,
            StockReferenceType::Adjustment,
            None,
            reason,
            actor,
        );
        self.persist(&inventory, &movement).await
    }

    /// 最低在庫水準を更新する
    /// 在庫数量の変更ではないため移動記録は残さない
    pub async fn update_min_stock_level(
        &self,
        part_id: PartId,
        level: Option<u32>,
        actor: UserId,
    ) -> Result<(), DomainError> {
        let mut inventory = self.load_or_create(part_id).await?;
        inventory.set_min_stock_level(level, actor);
        self.inventory_repository
            .save(&inventory)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("在庫の保存に失敗: {}", e)))
    }

    /// 在庫行を取得し、存在しなければ数量0で作成する
    async fn load_or_create(&self, part_id: PartId) -> Result<PartInventory, DomainError> {
        let inventory = self
            .inventory_repository
            .find_by_part_id(part_id)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("在庫の取得に失敗: {}", e)))?;
        Ok(inventory.unwrap_or_else(|| PartInventory::new(part_id)))
    }

    async fn persist(
        &self,
        inventory: &PartInventory,
        movement: &PartStockMovement,
    ) -> Result<(), DomainError> {
        self.inventory_repository
            .save_with_movement(inventory, movement)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("在庫の保存に失敗: {}", e)))
    }
}

/// 半開区間 [a_start, a_end) と [b_start, b_end) が重なるか判定する
/// 端点が接するだけの場合は重なりとみなさない
pub fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// 空き状況検索サービス
/// 指定センター・指定ウィンドウで予定の重ならない整備士を求める
///
/// 対象日のセンター内予約を走査する方式であり、センター1日あたりの
/// 予約件数が小さい前提に立つ
#[derive(Clone)]
pub struct AvailabilityService {
    booking_repository: Arc<dyn BookingRepository>,
    technician_repository: Arc<dyn TechnicianRepository>,
}

impl AvailabilityService {
    /// 新しい空き状況検索サービスを作成
    pub fn new(
        booking_repository: Arc<dyn BookingRepository>,
        technician_repository: Arc<dyn TechnicianRepository>,
    ) -> Self {
        Self {
            booking_repository,
            technician_repository,
        }
    }

    /// 提案ウィンドウと重なる予約を持たない稼働中整備士を返す
    ///
    /// # Arguments
    /// * `service_center_id` - サービスセンターID
    /// * `proposed_start` - 提案開始時刻
    /// * `duration_minutes` - 所要時間（未指定なら60分）
    /// * `exclude_booking` - 除外する予約ID（既存予約の再調整時に使用）
    ///
    /// # Returns
    /// * `Ok(Vec<Technician>)` - 空いている整備士（氏名の昇順）
    pub async fn find_available_technicians(
        &self,
        service_center_id: ServiceCenterId,
        proposed_start: DateTime<Utc>,
        duration_minutes: Option<i64>,
        exclude_booking: Option<BookingId>,
    ) -> Result<Vec<Technician>, DomainError> {
        let duration = duration_minutes.unwrap_or(DEFAULT_PROPOSED_DURATION_MINUTES);
        if duration <= 0 {
            return Err(DomainError::InvalidValue(
                "所要時間は1分以上である必要があります".to_string(),
            ));
        }
        let proposed_end = proposed_start + Duration::minutes(duration);

        let (day_start, day_end) = day_window(proposed_start);
        let candidates = self
            .booking_repository
            .find_scheduled_for_day(service_center_id, day_start, day_end, exclude_booking)
            .await
            .map_err(|e| {
                DomainError::RepositoryError(format!("候補予約の取得に失敗: {}", e))
            })?;

        let mut technicians = self
            .technician_repository
            .find_active_by_service_center(service_center_id)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("整備士の取得に失敗: {}", e)))?;

        let mut unavailable: HashSet<UserId> = HashSet::new();
        for candidate in &candidates {
            let technician_id = match candidate.technician_id() {
                Some(id) => id,
                None => continue,
            };
            let candidate_start = candidate.effective_start();
            let candidate_end = candidate_end(candidate, candidate_start);
            if windows_overlap(candidate_start, candidate_end, proposed_start, proposed_end) {
                unavailable.insert(technician_id);
            }
        }

        technicians.retain(|technician| !unavailable.contains(&technician.id()));
        technicians.sort_by(|a, b| a.full_name().cmp(b.full_name()));
        Ok(technicians)
    }
}

/// 指定時刻を含むUTC暦日のウィンドウ [0時, 翌0時) を返す
fn day_window(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let day_start = at.date_naive().and_time(NaiveTime::MIN).and_utc();
    (day_start, day_start + Duration::days(1))
}

/// 候補予約の実効終了時刻を解決する
/// 確定終了 → 希望終了 → 実効開始 + max(所要時間, 15分) の順
fn candidate_end(candidate: &Booking, candidate_start: DateTime<Utc>) -> DateTime<Utc> {
    candidate
        .confirmed_end()
        .or(candidate.preferred_end())
        .unwrap_or_else(|| {
            candidate_start
                + Duration::minutes(
                    candidate
                        .estimated_duration_minutes()
                        .max(MIN_CANDIDATE_DURATION_MINUTES),
                )
        })
}
