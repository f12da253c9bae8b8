use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    MovementId, MovementType, PartId, PartInventory, PartStockMovement, StockReferenceType,
    UserId,
};
use crate::domain::port::{InventoryRepository, RepositoryError};
use async_trait::async_trait;
use uuid::Uuid;

use sqlx::{MySql, Pool, Row};

/// MySQL在庫リポジトリ
/// MySQLデータベースを使用して部品在庫と移動記録を永続化する
#[derive(Clone)]
pub struct MySqlInventoryRepository {
    pool: Pool<MySql>,
}

impl MySqlInventoryRepository {
    /// 新しいMySQL在庫リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// 在庫のUPSERT文を実行する
    async fn upsert_inventory<'e, E>(
        executor: E,
        inventory: &PartInventory,
    ) -> Result<(), RepositoryError>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        sqlx::query(
            r#"
            INSERT INTO part_inventories (part_id, stock_quantity, min_stock_level, updated_at, updated_by)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                stock_quantity = VALUES(stock_quantity),
                min_stock_level = VALUES(min_stock_level),
                updated_at = VALUES(updated_at),
                updated_by = VALUES(updated_by)
            "#,
        )
        .bind(inventory.part_id().to_string())
        .bind(inventory.stock_quantity())
        .bind(inventory.min_stock_level())
        .bind(inventory.updated_at())
        .bind(inventory.updated_by().map(|id| id.to_string()))
        .execute(executor)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("在庫の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    /// 移動記録のINSERT文を実行する
    async fn insert_movement<'e, E>(
        executor: E,
        movement: &PartStockMovement,
    ) -> Result<(), RepositoryError>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        sqlx::query(
            r#"
            INSERT INTO part_stock_movements (
                id, part_id, movement_type, quantity_delta,
                reference_type, reference_id, note, performed_by, occurred_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(movement.id().to_string())
        .bind(movement.part_id().to_string())
        .bind(movement.movement_type().to_string())
        .bind(movement.quantity_delta())
        .bind(movement.reference_type().to_string())
        .bind(movement.reference_id().map(|id| id.to_string()))
        .bind(movement.note())
        .bind(movement.performed_by().to_string())
        .bind(movement.occurred_at())
        .execute(executor)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("移動記録の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    /// データベースの行から在庫を再構築する
    fn inventory_from_row(row: &sqlx::mysql::MySqlRow) -> Result<PartInventory, RepositoryError> {
        let part_id = PartId::from_string(row.get("part_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("部品IDの解析に失敗しました: {}", e))
        })?;
        let updated_by = match row.get::<Option<String>, _>("updated_by") {
            Some(value) => Some(UserId::from_string(&value).map_err(|e| {
                RepositoryError::FetchFailed(format!("更新者IDの解析に失敗しました: {}", e))
            })?),
            None => None,
        };

        Ok(PartInventory::reconstruct(
            part_id,
            row.get("stock_quantity"),
            row.get("min_stock_level"),
            row.get("updated_at"),
            updated_by,
        ))
    }

    /// データベースの行から移動記録を再構築する
    fn movement_from_row(
        row: &sqlx::mysql::MySqlRow,
    ) -> Result<PartStockMovement, RepositoryError> {
        let id = MovementId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("移動記録IDの解析に失敗しました: {}", e))
        })?;
        let part_id = PartId::from_string(row.get("part_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("部品IDの解析に失敗しました: {}", e))
        })?;
        let movement_type = MovementType::from_string(row.get("movement_type")).map_err(|e| {
            RepositoryError::FetchFailed(format!("移動種別の解析に失敗しました: {}", e))
        })?;
        let reference_type =
            StockReferenceType::from_string(row.get("reference_type")).map_err(|e| {
                RepositoryError::FetchFailed(format!("参照先種別の解析に失敗しました: {}", e))
            })?;
        let reference_id = match row.get::<Option<String>, _>("reference_id") {
            Some(value) => Some(Uuid::parse_str(&value).map_err(|e| {
                RepositoryError::FetchFailed(format!("参照先IDの解析に失敗しました: {}", e))
            })?),
            None => None,
        };
        let performed_by = UserId::from_string(row.get("performed_by")).map_err(|e| {
            RepositoryError::FetchFailed(format!("操作者IDの解析に失敗しました: {}", e))
        })?;

        Ok(PartStockMovement::reconstruct(
            id,
            part_id,
            movement_type,
            row.get("quantity_delta"),
            reference_type,
            reference_id,
            row.get("note"),
            performed_by,
            row.get("occurred_at"),
        ))
    }
}

#[async_trait]
impl InventoryRepository for MySqlInventoryRepository {
    async fn save(&self, inventory: &PartInventory) -> Result<(), RepositoryError> {
        Self::upsert_inventory(&self.pool, inventory).await
    }

    async fn save_with_movement(
        &self,
        inventory: &PartInventory,
        movement: &PartStockMovement,
    ) -> Result<(), RepositoryError> {
        // 在庫行と移動記録を1コミットで書き、台帳と数量の乖離を防ぐ
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| {
                DatabaseError::ConnectionError(format!(
                    "トランザクション開始に失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        Self::upsert_inventory(&mut *tx, inventory).await?;
        Self::insert_movement(&mut *tx, movement).await?;

        tx.commit()
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "トランザクションのコミットに失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_part_id(
        &self,
        part_id: PartId,
    ) -> Result<Option<PartInventory>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT part_id, stock_quantity, min_stock_level, updated_at, updated_by
            FROM part_inventories
            WHERE part_id = ?
            "#,
        )
        .bind(part_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("在庫の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(Self::inventory_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<PartInventory>, RepositoryError> {
        // 部品IDの昇順で並べる
        let rows = sqlx::query(
            r#"
            SELECT part_id, stock_quantity, min_stock_level, updated_at, updated_by
            FROM part_inventories
            ORDER BY part_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("在庫一覧の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::inventory_from_row).collect()
    }

    async fn find_low_stock(&self) -> Result<Vec<PartInventory>, RepositoryError> {
        // 最低在庫水準が設定されていて、それを下回っている在庫のみ
        let rows = sqlx::query(
            r#"
            SELECT part_id, stock_quantity, min_stock_level, updated_at, updated_by
            FROM part_inventories
            WHERE min_stock_level IS NOT NULL
              AND stock_quantity < min_stock_level
            ORDER BY part_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("低在庫一覧の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::inventory_from_row).collect()
    }

    async fn append_movement(
        &self,
        movement: &PartStockMovement,
    ) -> Result<(), RepositoryError> {
        Self::insert_movement(&self.pool, movement).await
    }

    async fn find_movements_by_part(
        &self,
        part_id: PartId,
    ) -> Result<Vec<PartStockMovement>, RepositoryError> {
        // 発生日時の降順で並べる
        let rows = sqlx::query(
            r#"
            SELECT id, part_id, movement_type, quantity_delta,
                   reference_type, reference_id, note, performed_by, occurred_at
            FROM part_stock_movements
            WHERE part_id = ?
            ORDER BY occurred_at DESC
            "#,
        )
        .bind(part_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("移動記録の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::movement_from_row).collect()
    }
}
