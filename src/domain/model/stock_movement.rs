use crate::domain::model::{MovementId, MovementType, PartId, StockReferenceType, UserId};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 在庫移動記録
/// 在庫数量の変更ごとに必ず1行追記される監査レコード
/// 符号規約: 負 = 在庫の流出、正 = 在庫の流入
#[derive(Debug, Clone, PartialEq)]
pub struct PartStockMovement {
    id: MovementId,
    part_id: PartId,
    movement_type: MovementType,
    quantity_delta: i64,
    reference_type: StockReferenceType,
    reference_id: Option<Uuid>,
    note: Option<String>,
    performed_by: UserId,
    occurred_at: DateTime<Utc>,
}

impl PartStockMovement {
    /// 新しい移動記録を作成
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        part_id: PartId,
        movement_type: MovementType,
        quantity_delta: i64,
        reference_type: StockReferenceType,
        reference_id: Option<Uuid>,
        note: Option<String>,
        performed_by: UserId,
    ) -> Self {
        Self {
            id: MovementId::new(),
            part_id,
            movement_type,
            quantity_delta,
            reference_type,
            reference_id,
            note,
            performed_by,
            occurred_at: Utc::now(),
        }
    }

    /// データベースから取得したデータで移動記録を再構築
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: MovementId,
        part_id: PartId,
        movement_type: MovementType,
        quantity_delta: i64,
        reference_type: StockReferenceType,
        reference_id: Option<Uuid>,
        note: Option<String>,
        performed_by: UserId,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            part_id,
            movement_type,
            quantity_delta,
            reference_type,
            reference_id,
            note,
            performed_by,
            occurred_at,
        }
    }

    pub fn id(&self) -> MovementId {
        self.id
    }

    pub fn part_id(&self) -> PartId {
        self.part_id
    }

    pub fn movement_type(&self) -> MovementType {
        self.movement_type
    }

    pub fn quantity_delta(&self) -> i64 {
        self.quantity_delta
    }

    pub fn reference_type(&self) -> StockReferenceType {
        self.reference_type
    }

    pub fn reference_id(&self) -> Option<Uuid> {
        self.reference_id
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn performed_by(&self) -> UserId {
        self.performed_by
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
