use crate::domain::error::DomainError;
use crate::domain::model::{BookingId, BookingPartId, Money, PartId, UserId};
use chrono::{DateTime, Utc};

/// 予約部品明細
/// 特定の予約で消費された部品を表す
/// 作成・削除は親予約がInProgressの間、担当整備士のみが行える
#[derive(Debug, Clone, PartialEq)]
pub struct BookingPart {
    id: BookingPartId,
    booking_id: BookingId,
    part_id: PartId,
    quantity: u32,
    cost: Money,
    note: Option<String>,
    created_by: UserId,
    created_at: DateTime<Utc>,
}

impl BookingPart {
    /// 新しい予約部品明細を作成
    /// 数量は1以上である必要がある
    pub fn new(
        id: BookingPartId,
        booking_id: BookingId,
        part_id: PartId,
        quantity: u32,
        cost: Money,
        note: Option<String>,
        created_by: UserId,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        Ok(Self {
            id,
            booking_id,
            part_id,
            quantity,
            cost,
            note,
            created_by,
            created_at: Utc::now(),
        })
    }

    /// データベースから取得したデータで明細を再構築
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: BookingPartId,
        booking_id: BookingId,
        part_id: PartId,
        quantity: u32,
        cost: Money,
        note: Option<String>,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            booking_id,
            part_id,
            quantity,
            cost,
            note,
            created_by,
            created_at,
        }
    }

    pub fn id(&self) -> BookingPartId {
        self.id
    }

    pub fn booking_id(&self) -> BookingId {
        self.booking_id
    }

    pub fn part_id(&self) -> PartId {
        self.part_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn cost(&self) -> Money {
        self.cost
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_part_creation() {
        let part = BookingPart::new(
            BookingPartId::new(),
            BookingId::new(),
            PartId::new(),
            2,
            Money::jpy(3000),
            None,
            UserId::new(),
        )
        .unwrap();

        assert_eq!(part.quantity(), 2);
        assert_eq!(part.cost().amount(), 3000);
    }

    #[test]
    fn test_booking_part_zero_quantity_fails() {
        let result = BookingPart::new(
            BookingPartId::new(),
            BookingId::new(),
            PartId::new(),
            0,
            Money::jpy(3000),
            None,
            UserId::new(),
        );
        assert_eq!(result.unwrap_err(), DomainError::InvalidQuantity);
    }
}
