use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{ServiceCenterId, Technician, UserId};
use crate::domain::port::{RepositoryError, TechnicianRepository};
use async_trait::async_trait;

use sqlx::{MySql, Pool, Row};

/// MySQL整備士リポジトリ
#[derive(Clone)]
pub struct MySqlTechnicianRepository {
    pool: Pool<MySql>,
}

impl MySqlTechnicianRepository {
    /// 新しいMySQL整備士リポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn technician_from_row(row: &sqlx::mysql::MySqlRow) -> Result<Technician, RepositoryError> {
        let id = UserId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("整備士IDの解析に失敗しました: {}", e))
        })?;
        let service_center_id =
            ServiceCenterId::from_string(row.get("service_center_id")).map_err(|e| {
                RepositoryError::FetchFailed(format!(
                    "サービスセンターIDの解析に失敗しました: {}",
                    e
                ))
            })?;

        Ok(Technician::new(
            id,
            service_center_id,
            row.get("full_name"),
            row.get("is_active"),
        ))
    }
}

#[async_trait]
impl TechnicianRepository for MySqlTechnicianRepository {
    async fn save(&self, technician: &Technician) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO technicians (id, service_center_id, full_name, is_active)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                service_center_id = VALUES(service_center_id),
                full_name = VALUES(full_name),
                is_active = VALUES(is_active)
            "#,
        )
        .bind(technician.id().to_string())
        .bind(technician.service_center_id().to_string())
        .bind(technician.full_name())
        .bind(technician.is_active())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("整備士の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Technician>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, service_center_id, full_name, is_active FROM technicians WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("整備士の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(Self::technician_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_active_by_service_center(
        &self,
        service_center_id: ServiceCenterId,
    ) -> Result<Vec<Technician>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, service_center_id, full_name, is_active
            FROM technicians
            WHERE service_center_id = ? AND is_active = TRUE
            ORDER BY full_name ASC
            "#,
        )
        .bind(service_center_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("整備士一覧の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::technician_from_row).collect()
    }
}
