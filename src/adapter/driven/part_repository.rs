use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Money, Part, PartId};
use crate::domain::port::{PartRepository, RepositoryError};
use async_trait::async_trait;

use sqlx::{MySql, Pool, Row};

/// MySQL部品カタログリポジトリ
#[derive(Clone)]
pub struct MySqlPartRepository {
    pool: Pool<MySql>,
}

impl MySqlPartRepository {
    /// 新しいMySQL部品カタログリポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn part_from_row(row: &sqlx::mysql::MySqlRow) -> Result<Part, RepositoryError> {
        let part_id = PartId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("部品IDの解析に失敗しました: {}", e))
        })?;
        let unit_price =
            Money::new(row.get("unit_price_amount"), row.get("unit_price_currency")).map_err(
                |e| RepositoryError::FetchFailed(format!("単価の構築に失敗しました: {}", e)),
            )?;

        Ok(Part::new(
            part_id,
            row.get("part_number"),
            row.get("name"),
            unit_price,
        ))
    }
}

#[async_trait]
impl PartRepository for MySqlPartRepository {
    async fn save(&self, part: &Part) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO parts (id, part_number, name, unit_price_amount, unit_price_currency)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                part_number = VALUES(part_number),
                name = VALUES(name),
                unit_price_amount = VALUES(unit_price_amount),
                unit_price_currency = VALUES(unit_price_currency)
            "#,
        )
        .bind(part.id().to_string())
        .bind(part.part_number())
        .bind(part.name())
        .bind(part.unit_price().amount())
        .bind(part.unit_price().currency())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("部品の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, part_id: PartId) -> Result<Option<Part>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, part_number, name, unit_price_amount, unit_price_currency FROM parts WHERE id = ?",
        )
        .bind(part_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("部品の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(Self::part_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<Part>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, part_number, name, unit_price_amount, unit_price_currency FROM parts ORDER BY part_number ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("部品一覧の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::part_from_row).collect()
    }
}
