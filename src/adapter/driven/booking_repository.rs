use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    Booking, BookingId, BookingPart, BookingPartId, BookingStatus, BookingStatusLog, CustomerId,
    Money, PartId, ServiceCenterId, StatusLogId, UserId, VehicleId,
};
use crate::domain::port::{BookingRepository, RepositoryError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sqlx::{MySql, Pool, Row};

const BOOKING_COLUMNS: &str = r#"
    id, customer_id, vehicle_id, service_center_id, technician_id,
    approved_by, cancelled_by, service_type, status,
    preferred_start, preferred_end, confirmed_start, confirmed_end,
    customer_note, internal_note, rejection_reason,
    estimated_duration_minutes,
    created_at, updated_at, approved_at, completed_at, cancelled_at
"#;

/// MySQL予約リポジトリ
/// MySQLデータベースを使用して予約・部品明細・ステータス履歴を永続化する
#[derive(Clone)]
pub struct MySqlBookingRepository {
    pool: Pool<MySql>,
}

impl MySqlBookingRepository {
    /// 新しいMySQL予約リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行から予約集約を再構築する
    fn booking_from_row(row: &sqlx::mysql::MySqlRow) -> Result<Booking, RepositoryError> {
        let booking_id = BookingId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("予約IDの解析に失敗しました: {}", e))
        })?;
        let customer_id = CustomerId::from_string(row.get("customer_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("顧客IDの解析に失敗しました: {}", e))
        })?;
        let vehicle_id = VehicleId::from_string(row.get("vehicle_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("車両IDの解析に失敗しました: {}", e))
        })?;
        let service_center_id =
            ServiceCenterId::from_string(row.get("service_center_id")).map_err(|e| {
                RepositoryError::FetchFailed(format!(
                    "サービスセンターIDの解析に失敗しました: {}",
                    e
                ))
            })?;
        let technician_id = Self::optional_user_id(row, "technician_id")?;
        let approved_by = Self::optional_user_id(row, "approved_by")?;
        let cancelled_by = Self::optional_user_id(row, "cancelled_by")?;
        let status = BookingStatus::from_string(row.get("status")).map_err(|e| {
            RepositoryError::FetchFailed(format!("予約ステータスの解析に失敗しました: {}", e))
        })?;

        Ok(Booking::reconstruct(
            booking_id,
            customer_id,
            vehicle_id,
            service_center_id,
            technician_id,
            approved_by,
            cancelled_by,
            row.get("service_type"),
            status,
            row.get("preferred_start"),
            row.get("preferred_end"),
            row.get("confirmed_start"),
            row.get("confirmed_end"),
            row.get("customer_note"),
            row.get("internal_note"),
            row.get("rejection_reason"),
            row.get("estimated_duration_minutes"),
            row.get("created_at"),
            row.get("updated_at"),
            row.get("approved_at"),
            row.get("completed_at"),
            row.get("cancelled_at"),
        ))
    }

    fn optional_user_id(
        row: &sqlx::mysql::MySqlRow,
        column: &str,
    ) -> Result<Option<UserId>, RepositoryError> {
        match row.get::<Option<String>, _>(column) {
            Some(value) => UserId::from_string(&value).map(Some).map_err(|e| {
                RepositoryError::FetchFailed(format!("{}の解析に失敗しました: {}", column, e))
            }),
            None => Ok(None),
        }
    }

    /// 予約のUPSERT文を実行する
    /// 呼び出し側でトランザクションに参加させられるよう実行子を受け取る
    async fn upsert_booking<'e, E>(executor: E, booking: &Booking) -> Result<(), RepositoryError>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, customer_id, vehicle_id, service_center_id, technician_id,
                approved_by, cancelled_by, service_type, status,
                preferred_start, preferred_end, confirmed_start, confirmed_end,
                customer_note, internal_note, rejection_reason,
                estimated_duration_minutes,
                created_at, updated_at, approved_at, completed_at, cancelled_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                technician_id = VALUES(technician_id),
                approved_by = VALUES(approved_by),
                cancelled_by = VALUES(cancelled_by),
                service_type = VALUES(service_type),
                status = VALUES(status),
                preferred_start = VALUES(preferred_start),
                preferred_end = VALUES(preferred_end),
                confirmed_start = VALUES(confirmed_start),
                confirmed_end = VALUES(confirmed_end),
                customer_note = VALUES(customer_note),
                internal_note = VALUES(internal_note),
                rejection_reason = VALUES(rejection_reason),
                estimated_duration_minutes = VALUES(estimated_duration_minutes),
                updated_at = VALUES(updated_at),
                approved_at = VALUES(approved_at),
                completed_at = VALUES(completed_at),
                cancelled_at = VALUES(cancelled_at)
            "#,
        )
        .bind(booking.id().to_string())
        .bind(booking.customer_id().to_string())
        .bind(booking.vehicle_id().to_string())
        .bind(booking.service_center_id().to_string())
        .bind(booking.technician_id().map(|id| id.to_string()))
        .bind(booking.approved_by().map(|id| id.to_string()))
        .bind(booking.cancelled_by().map(|id| id.to_string()))
        .bind(booking.service_type())
        .bind(booking.status().to_string())
        .bind(booking.preferred_start())
        .bind(booking.preferred_end())
        .bind(booking.confirmed_start())
        .bind(booking.confirmed_end())
        .bind(booking.customer_note())
        .bind(booking.internal_note())
        .bind(booking.rejection_reason())
        .bind(booking.estimated_duration_minutes())
        .bind(booking.created_at())
        .bind(booking.updated_at())
        .bind(booking.approved_at())
        .bind(booking.completed_at())
        .bind(booking.cancelled_at())
        .execute(executor)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("予約の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    /// ステータス履歴のINSERT文を実行する
    async fn insert_status_log<'e, E>(
        executor: E,
        log: &BookingStatusLog,
    ) -> Result<(), RepositoryError>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        sqlx::query(
            r#"
            INSERT INTO booking_status_logs (
                id, booking_id, old_status, new_status, changed_by, note, changed_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(log.id().to_string())
        .bind(log.booking_id().to_string())
        .bind(log.old_status().map(|s| s.to_string()))
        .bind(log.new_status().to_string())
        .bind(log.changed_by().map(|id| id.to_string()))
        .bind(log.note())
        .bind(log.changed_at())
        .execute(executor)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("ステータス履歴の保存に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn fetch_bookings(&self, query: &str, binds: Vec<String>) -> Result<Vec<Booking>, RepositoryError> {
        let mut q = sqlx::query(query);
        for bind in binds {
            q = q.bind(bind);
        }
        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("予約一覧の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        rows.iter().map(Self::booking_from_row).collect()
    }
}

#[async_trait]
impl BookingRepository for MySqlBookingRepository {
    async fn save(&self, booking: &Booking) -> Result<(), RepositoryError> {
        Self::upsert_booking(&self.pool, booking).await
    }

    async fn save_with_log(
        &self,
        booking: &Booking,
        log: &BookingStatusLog,
    ) -> Result<(), RepositoryError> {
        // 予約行と履歴行を1コミットで書き、履歴のない状態変更を残さない
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

        Self::upsert_booking(&mut *tx, booking).await?;
        Self::insert_status_log(&mut *tx, log).await?;

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

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let query = format!("SELECT {} FROM bookings WHERE id = ?", BOOKING_COLUMNS);
        let row = sqlx::query(&query)
            .bind(booking_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("予約の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(Self::booking_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<Booking>, RepositoryError> {
        // 作成日時の降順で並べる
        let query = format!(
            "SELECT {} FROM bookings ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );
        self.fetch_bookings(&query, Vec::new()).await
    }

    async fn find_by_status(
        &self,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM bookings WHERE status = ? ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );
        self.fetch_bookings(&query, vec![status.to_string()]).await
    }

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM bookings WHERE customer_id = ? ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );
        self.fetch_bookings(&query, vec![customer_id.to_string()])
            .await
    }

    async fn find_by_technician(
        &self,
        technician_id: UserId,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM bookings WHERE technician_id = ? ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );
        self.fetch_bookings(&query, vec![technician_id.to_string()])
            .await
    }

    async fn find_by_service_center(
        &self,
        service_center_id: ServiceCenterId,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM bookings WHERE service_center_id = ? ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );
        self.fetch_bookings(&query, vec![service_center_id.to_string()])
            .await
    }

    async fn find_scheduled_for_day(
        &self,
        service_center_id: ServiceCenterId,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
        exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, RepositoryError> {
        // 実効開始時刻（確定 or 希望）が対象日に含まれる、
        // 整備士割当済みのアクティブ予約のみを候補として返す
        let query = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE service_center_id = ?
              AND technician_id IS NOT NULL
              AND status IN ('Pending', 'Approved', 'InProgress')
              AND COALESCE(confirmed_start, preferred_start) >= ?
              AND COALESCE(confirmed_start, preferred_start) < ?
              AND (? IS NULL OR id <> ?)
            "#,
            BOOKING_COLUMNS
        );

        let exclude_id = exclude.map(|id| id.to_string());
        let rows = sqlx::query(&query)
            .bind(service_center_id.to_string())
            .bind(day_start)
            .bind(day_end)
            .bind(exclude_id.clone())
            .bind(exclude_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("候補予約の取得に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        rows.iter().map(Self::booking_from_row).collect()
    }

    async fn append_status_log(&self, log: &BookingStatusLog) -> Result<(), RepositoryError> {
        Self::insert_status_log(&self.pool, log).await
    }

    async fn find_status_logs(
        &self,
        booking_id: BookingId,
    ) -> Result<Vec<BookingStatusLog>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, booking_id, old_status, new_status, changed_by, note, changed_at
            FROM booking_status_logs
            WHERE booking_id = ?
            ORDER BY changed_at ASC
            "#,
        )
        .bind(booking_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("ステータス履歴の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        let mut logs = Vec::new();
        for row in rows {
            let id = StatusLogId::from_string(row.get("id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("履歴IDの解析に失敗しました: {}", e))
            })?;
            let booking_id = BookingId::from_string(row.get("booking_id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("予約IDの解析に失敗しました: {}", e))
            })?;
            let old_status = match row.get::<Option<String>, _>("old_status") {
                Some(value) => Some(BookingStatus::from_string(&value).map_err(|e| {
                    RepositoryError::FetchFailed(format!(
                        "旧ステータスの解析に失敗しました: {}",
                        e
                    ))
                })?),
                None => None,
            };
            let new_status = BookingStatus::from_string(row.get("new_status")).map_err(|e| {
                RepositoryError::FetchFailed(format!("新ステータスの解析に失敗しました: {}", e))
            })?;
            let changed_by = Self::optional_user_id(&row, "changed_by")?;

            logs.push(BookingStatusLog::reconstruct(
                id,
                booking_id,
                old_status,
                new_status,
                changed_by,
                row.get("note"),
                row.get("changed_at"),
            ));
        }

        Ok(logs)
    }

    async fn save_booking_part(&self, part: &BookingPart) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO booking_parts (
                id, booking_id, part_id, quantity, cost_amount, cost_currency,
                note, created_by, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(part.id().to_string())
        .bind(part.booking_id().to_string())
        .bind(part.part_id().to_string())
        .bind(part.quantity())
        .bind(part.cost().amount())
        .bind(part.cost().currency())
        .bind(part.note())
        .bind(part.created_by().to_string())
        .bind(part.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("部品使用明細の保存に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_booking_part_by_id(
        &self,
        booking_part_id: BookingPartId,
    ) -> Result<Option<BookingPart>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, booking_id, part_id, quantity, cost_amount, cost_currency,
                   note, created_by, created_at
            FROM booking_parts
            WHERE id = ?
            "#,
        )
        .bind(booking_part_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("部品使用明細の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(Self::booking_part_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_booking_parts(
        &self,
        booking_id: BookingId,
    ) -> Result<Vec<BookingPart>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, booking_id, part_id, quantity, cost_amount, cost_currency,
                   note, created_by, created_at
            FROM booking_parts
            WHERE booking_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(booking_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("部品使用明細の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::booking_part_from_row).collect()
    }

    async fn delete_booking_part(
        &self,
        booking_part_id: BookingPartId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM booking_parts WHERE id = ?")
            .bind(booking_part_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("部品使用明細の削除に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}

impl MySqlBookingRepository {
    /// データベースの行から予約部品明細を再構築する
    fn booking_part_from_row(row: &sqlx::mysql::MySqlRow) -> Result<BookingPart, RepositoryError> {
        let id = BookingPartId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("明細IDの解析に失敗しました: {}", e))
        })?;
        let booking_id = BookingId::from_string(row.get("booking_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("予約IDの解析に失敗しました: {}", e))
        })?;
        let part_id = PartId::from_string(row.get("part_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("部品IDの解析に失敗しました: {}", e))
        })?;
        let cost = Money::new(row.get("cost_amount"), row.get("cost_currency")).map_err(|e| {
            RepositoryError::FetchFailed(format!("費用の構築に失敗しました: {}", e))
        })?;
        let created_by = UserId::from_string(row.get("created_by")).map_err(|e| {
            RepositoryError::FetchFailed(format!("作成者IDの解析に失敗しました: {}", e))
        })?;

        Ok(BookingPart::reconstruct(
            id,
            booking_id,
            part_id,
            row.get("quantity"),
            cost,
            row.get("note"),
            created_by,
            row.get("created_at"),
        ))
    }
}
