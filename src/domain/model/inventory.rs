use crate::domain::error::DomainError;
use crate::domain::model::{PartId, UserId};
use chrono::{DateTime, Utc};

/// 部品在庫集約
/// 部品ごとの現在数量と最低在庫水準を管理する
/// 在庫行は初回の変更時に数量0で遅延作成される
#[derive(Debug, Clone, PartialEq)]
pub struct PartInventory {
    part_id: PartId,
    stock_quantity: u32,
    min_stock_level: Option<u32>,
    updated_at: DateTime<Utc>,
    updated_by: Option<UserId>,
}

impl PartInventory {
    /// 新しい在庫行を作成（数量0）
    pub fn new(part_id: PartId) -> Self {
        Self {
            part_id,
            stock_quantity: 0,
            min_stock_level: None,
            updated_at: Utc::now(),
            updated_by: None,
        }
    }

    /// データベースから取得したデータで在庫を再構築
    pub fn reconstruct(
        part_id: PartId,
        stock_quantity: u32,
        min_stock_level: Option<u32>,
        updated_at: DateTime<Utc>,
        updated_by: Option<UserId>,
    ) -> Self {
        Self {
            part_id,
            stock_quantity,
            min_stock_level,
            updated_at,
            updated_by,
        }
    }

    pub fn part_id(&self) -> PartId {
        self.part_id
    }

    pub fn stock_quantity(&self) -> u32 {
        self.stock_quantity
    }

    pub fn min_stock_level(&self) -> Option<u32> {
        self.min_stock_level
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn updated_by(&self) -> Option<UserId> {
        self.updated_by
    }

    /// 指定された数量の在庫が利用可能かチェック
    pub fn has_available_stock(&self, quantity: u32) -> bool {
        self.stock_quantity >= quantity
    }

    /// 在庫を引き落とす（クレーム引当・予約消費の共通処理）
    ///
    /// # Returns
    /// * `Ok(())` - 引き落とし成功
    /// * `Err(DomainError::InsufficientStock)` - 在庫不足（数量は変化しない）
    pub fn reserve(&mut self, quantity: u32, actor: UserId) -> Result<(), DomainError> {
        if !self.has_available_stock(quantity) {
            return Err(DomainError::InsufficientStock);
        }
        self.stock_quantity -= quantity;
        self.mark_updated(actor);
        Ok(())
    }

    /// 在庫を戻す（引当解放・明細削除時の返却）
    /// 上限チェックは行わない
    pub fn release(&mut self, quantity: u32, actor: UserId) {
        self.stock_quantity += quantity;
        self.mark_updated(actor);
    }

    /// 符号付きの棚卸調整を適用する
    /// 負方向に行き過ぎた場合はエラーにせず0で打ち止めにする
    pub fn apply_adjustment(&mut self, delta: i64, actor: UserId) {
        let adjusted = self.stock_quantity as i64 + delta;
        self.stock_quantity = adjusted.max(0) as u32;
        self.mark_updated(actor);
    }

    /// 最低在庫水準を設定する（在庫数量は変化しない）
    pub fn set_min_stock_level(&mut self, level: Option<u32>, actor: UserId) {
        self.min_stock_level = level;
        self.mark_updated(actor);
    }

    /// 最低在庫水準を下回っているか
    /// 操作をブロックせず、呼び出し側への通知にのみ使われる派生値
    pub fn is_below_min_stock(&self) -> bool {
        match self.min_stock_level {
            Some(level) => self.stock_quantity < level,
            None => false,
        }
    }

    fn mark_updated(&mut self, actor: UserId) {
        self.updated_at = Utc::now();
        self.updated_by = Some(actor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory_with(quantity: u32) -> PartInventory {
        let mut inventory = PartInventory::new(PartId::new());
        inventory.release(quantity, UserId::new());
        inventory
    }

    #[test]
    fn test_new_inventory_starts_at_zero() {
        let inventory = PartInventory::new(PartId::new());
        assert_eq!(inventory.stock_quantity(), 0);
        assert!(inventory.min_stock_level().is_none());
    }

    #[test]
    fn test_reserve_success() {
        let mut inventory = inventory_with(10);
        let result = inventory.reserve(4, UserId::new());
        assert!(result.is_ok());
        assert_eq!(inventory.stock_quantity(), 6);
    }

    #[test]
    fn test_reserve_insufficient_stock() {
        let mut inventory = inventory_with(5);
        let result = inventory.reserve(10, UserId::new());
        assert_eq!(result.unwrap_err(), DomainError::InsufficientStock);
        assert_eq!(inventory.stock_quantity(), 5); // 在庫数は変わらない
    }

    #[test]
    fn test_reserve_exact_quantity() {
        let mut inventory = inventory_with(10);
        assert!(inventory.reserve(10, UserId::new()).is_ok());
        assert_eq!(inventory.stock_quantity(), 0);
    }

    #[test]
    fn test_release_increments() {
        let mut inventory = inventory_with(5);
        inventory.release(3, UserId::new());
        assert_eq!(inventory.stock_quantity(), 8);
    }

    #[test]
    fn test_adjustment_floors_at_zero() {
        let mut inventory = inventory_with(5);
        inventory.apply_adjustment(-20, UserId::new());
        assert_eq!(inventory.stock_quantity(), 0);
    }

    #[test]
    fn test_adjustment_positive_delta() {
        let mut inventory = inventory_with(5);
        inventory.apply_adjustment(7, UserId::new());
        assert_eq!(inventory.stock_quantity(), 12);
    }

    #[test]
    fn test_below_min_stock() {
        let mut inventory = inventory_with(5);
        assert!(!inventory.is_below_min_stock());

        inventory.set_min_stock_level(Some(10), UserId::new());
        assert!(inventory.is_below_min_stock());

        inventory.release(10, UserId::new());
        assert!(!inventory.is_below_min_stock());
    }

    #[test]
    fn test_mutation_records_actor() {
        let mut inventory = PartInventory::new(PartId::new());
        let actor = UserId::new();
        inventory.release(1, actor);
        assert_eq!(inventory.updated_by(), Some(actor));
    }
}
