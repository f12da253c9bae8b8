use crate::domain::error::DomainError;
use crate::domain::model::{
    BookingId, BookingStatus, CustomerId, ServiceCenterId, UserId, VehicleId,
};
use chrono::{DateTime, Duration, Utc};

/// 承認時の所要時間の下限（分）
const MIN_APPROVED_DURATION_MINUTES: i64 = 15;

/// 所要時間が未指定・不正だった場合のデフォルト（分）
const DEFAULT_DURATION_MINUTES: i64 = 60;

/// 予約集約
/// サービスセンターへの入庫予約のライフサイクルを管理し、ビジネスルールを適用する
#[derive(Debug, Clone)]
pub struct Booking {
    id: BookingId,
    customer_id: CustomerId,
    vehicle_id: VehicleId,
    service_center_id: ServiceCenterId,
    technician_id: Option<UserId>,
    approved_by: Option<UserId>,
    cancelled_by: Option<UserId>,
    service_type: String,
    status: BookingStatus,
    preferred_start: DateTime<Utc>,
    preferred_end: Option<DateTime<Utc>>,
    confirmed_start: Option<DateTime<Utc>>,
    confirmed_end: Option<DateTime<Utc>>,
    customer_note: Option<String>,
    internal_note: Option<String>,
    rejection_reason: Option<String>,
    estimated_duration_minutes: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// 新しい予約を作成
    /// 初期ステータスはPending
    /// 所要時間が0以下の場合は60分に補正し、希望終了時刻が未指定なら
    /// 希望開始時刻 + 所要時間で補完する
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: BookingId,
        customer_id: CustomerId,
        vehicle_id: VehicleId,
        service_center_id: ServiceCenterId,
        service_type: String,
        preferred_start: DateTime<Utc>,
        preferred_end: Option<DateTime<Utc>>,
        estimated_duration_minutes: i64,
        customer_note: Option<String>,
    ) -> Self {
        let duration = if estimated_duration_minutes > 0 {
            estimated_duration_minutes
        } else {
            DEFAULT_DURATION_MINUTES
        };
        let preferred_end =
            preferred_end.unwrap_or(preferred_start + Duration::minutes(duration));
        let now = Utc::now();

        Self {
            id,
            customer_id,
            vehicle_id,
            service_center_id,
            technician_id: None,
            approved_by: None,
            cancelled_by: None,
            service_type,
            status: BookingStatus::Pending,
            preferred_start,
            preferred_end: Some(preferred_end),
            confirmed_start: None,
            confirmed_end: None,
            customer_note,
            internal_note: None,
            rejection_reason: None,
            estimated_duration_minutes: duration,
            created_at: now,
            updated_at: now,
            approved_at: None,
            completed_at: None,
            cancelled_at: None,
        }
    }

    /// データベースから取得したデータで予約を再構築
    /// リポジトリでの使用を想定
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: BookingId,
        customer_id: CustomerId,
        vehicle_id: VehicleId,
        service_center_id: ServiceCenterId,
        technician_id: Option<UserId>,
        approved_by: Option<UserId>,
        cancelled_by: Option<UserId>,
        service_type: String,
        status: BookingStatus,
        preferred_start: DateTime<Utc>,
        preferred_end: Option<DateTime<Utc>>,
        confirmed_start: Option<DateTime<Utc>>,
        confirmed_end: Option<DateTime<Utc>>,
        customer_note: Option<String>,
        internal_note: Option<String>,
        rejection_reason: Option<String>,
        estimated_duration_minutes: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        approved_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
        cancelled_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            customer_id,
            vehicle_id,
            service_center_id,
            technician_id,
            approved_by,
            cancelled_by,
            service_type,
            status,
            preferred_start,
            preferred_end,
            confirmed_start,
            confirmed_end,
            customer_note,
            internal_note,
            rejection_reason,
            estimated_duration_minutes,
            created_at,
            updated_at,
            approved_at,
            completed_at,
            cancelled_at,
        }
    }

    pub fn id(&self) -> BookingId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }

    pub fn service_center_id(&self) -> ServiceCenterId {
        self.service_center_id
    }

    pub fn technician_id(&self) -> Option<UserId> {
        self.technician_id
    }

    pub fn approved_by(&self) -> Option<UserId> {
        self.approved_by
    }

    pub fn cancelled_by(&self) -> Option<UserId> {
        self.cancelled_by
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn preferred_start(&self) -> DateTime<Utc> {
        self.preferred_start
    }

    pub fn preferred_end(&self) -> Option<DateTime<Utc>> {
        self.preferred_end
    }

    pub fn confirmed_start(&self) -> Option<DateTime<Utc>> {
        self.confirmed_start
    }

    pub fn confirmed_end(&self) -> Option<DateTime<Utc>> {
        self.confirmed_end
    }

    pub fn customer_note(&self) -> Option<&str> {
        self.customer_note.as_deref()
    }

    pub fn internal_note(&self) -> Option<&str> {
        self.internal_note.as_deref()
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn estimated_duration_minutes(&self) -> i64 {
        self.estimated_duration_minutes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    /// 競合判定に使用する実効開始時刻
    /// 確定開始時刻があればそれ、なければ希望開始時刻
    pub fn effective_start(&self) -> DateTime<Utc> {
        self.confirmed_start.unwrap_or(self.preferred_start)
    }

    /// 競合判定に使用する実効終了時刻
    /// 確定終了時刻 → 希望終了時刻 → 実効開始時刻 + max(所要時間, 15分) の順で解決
    pub fn effective_end(&self) -> DateTime<Utc> {
        self.confirmed_end.or(self.preferred_end).unwrap_or_else(|| {
            self.effective_start()
                + Duration::minutes(
                    self.estimated_duration_minutes
                        .max(MIN_APPROVED_DURATION_MINUTES),
                )
        })
    }

    /// 予約を承認
    /// 事前条件:
    /// - ステータスがRejected/Cancelledでない
    ///
    /// 確定開始時刻が指定された場合は希望開始時刻も同じ値に揃える。
    /// 実効所要時間は指定値（なければ既存値、既存値が不正なら60分）を
    /// 15分を下限として採用し、希望終了・確定終了を再計算する。
    pub fn approve(
        &mut self,
        approved_by: UserId,
        technician_id: Option<UserId>,
        confirmed_start: Option<DateTime<Utc>>,
        duration_minutes: Option<i64>,
        internal_note: Option<String>,
    ) -> Result<(), DomainError> {
        match self.status {
            BookingStatus::Rejected => {
                return Err(DomainError::InvalidStateTransition(
                    "却下済みの予約は承認できません".to_string(),
                ));
            }
            BookingStatus::Cancelled => {
                return Err(DomainError::InvalidStateTransition(
                    "キャンセル済みの予約は承認できません".to_string(),
                ));
            }
            BookingStatus::Pending
            | BookingStatus::Approved
            | BookingStatus::InProgress
            | BookingStatus::Completed => {}
        }

        let mut duration = duration_minutes.unwrap_or(if self.estimated_duration_minutes > 0 {
            self.estimated_duration_minutes
        } else {
            DEFAULT_DURATION_MINUTES
        });
        if duration < MIN_APPROVED_DURATION_MINUTES {
            duration = MIN_APPROVED_DURATION_MINUTES;
        }
        self.estimated_duration_minutes = duration;

        if let Some(start) = confirmed_start {
            self.confirmed_start = Some(start);
            // 確定開始と希望開始は常に同期させる
            self.preferred_start = start;
        }
        self.preferred_end = Some(self.preferred_start + Duration::minutes(duration));
        if let Some(start) = self.confirmed_start {
            self.confirmed_end = Some(start + Duration::minutes(duration));
        }

        if let Some(technician) = technician_id {
            self.technician_id = Some(technician);
        }
        if let Some(note) = internal_note {
            self.internal_note = Some(note);
        }

        let now = Utc::now();
        self.status = BookingStatus::Approved;
        self.approved_by = Some(approved_by);
        self.approved_at = Some(now);
        self.updated_at = now;

        Ok(())
    }

    /// 予約を却下
    /// 事前条件:
    /// - ステータスがCompleted/Cancelledでない
    pub fn reject(
        &mut self,
        approved_by: UserId,
        reason: Option<String>,
    ) -> Result<(), DomainError> {
        match self.status {
            BookingStatus::Completed => {
                return Err(DomainError::InvalidStateTransition(
                    "作業完了した予約は却下できません".to_string(),
                ));
            }
            BookingStatus::Cancelled => {
                return Err(DomainError::InvalidStateTransition(
                    "キャンセル済みの予約は却下できません".to_string(),
                ));
            }
            BookingStatus::Pending
            | BookingStatus::Approved
            | BookingStatus::InProgress
            | BookingStatus::Rejected => {}
        }

        let now = Utc::now();
        self.status = BookingStatus::Rejected;
        self.rejection_reason = reason;
        self.approved_by = Some(approved_by);
        self.approved_at = Some(now);
        self.updated_at = now;

        Ok(())
    }

    /// 作業を開始
    /// 事前条件:
    /// - ステータスがApproved（整備士の直接開始のフォールバックとしてPendingも許容）
    ///
    /// 整備士が未割当なら呼び出し主体を割り当て、確定開始時刻が未設定なら
    /// 現在時刻で補完する。
    pub fn start(&mut self, technician_id: UserId) -> Result<(), DomainError> {
        match self.status {
            BookingStatus::Approved | BookingStatus::Pending => {}
            BookingStatus::InProgress
            | BookingStatus::Completed
            | BookingStatus::Rejected
            | BookingStatus::Cancelled => {
                return Err(DomainError::InvalidStateTransition(format!(
                    "ステータス{}の予約は作業を開始できません",
                    self.status
                )));
            }
        }

        let now = Utc::now();
        if self.technician_id.is_none() {
            self.technician_id = Some(technician_id);
        }
        let confirmed_start = *self.confirmed_start.get_or_insert(now);
        if self.estimated_duration_minutes <= 0 {
            self.estimated_duration_minutes = DEFAULT_DURATION_MINUTES;
        }
        if self.confirmed_end.is_none() {
            self.confirmed_end =
                Some(confirmed_start + Duration::minutes(self.estimated_duration_minutes));
        }
        self.status = BookingStatus::InProgress;
        self.updated_at = now;

        Ok(())
    }

    /// 作業を完了
    /// 事前条件:
    /// - ステータスがInProgress
    ///
    /// 確定終了時刻は完了時刻で上書きする。
    pub fn complete(
        &mut self,
        technician_id: UserId,
        note: Option<String>,
    ) -> Result<(), DomainError> {
        if self.status != BookingStatus::InProgress {
            return Err(DomainError::InvalidStateTransition(
                "作業を完了できるのはInProgress状態のみです".to_string(),
            ));
        }

        let now = Utc::now();
        self.status = BookingStatus::Completed;
        self.completed_at = Some(now);
        self.confirmed_end = Some(now);
        if self.technician_id.is_none() {
            self.technician_id = Some(technician_id);
        }
        if let Some(note) = note {
            self.internal_note = Some(match self.internal_note.take() {
                Some(existing) => format!("{}\n{}", existing, note),
                None => note,
            });
        }
        self.updated_at = now;

        Ok(())
    }

    /// 予約をキャンセル
    /// 事前条件:
    /// - ステータスがCompletedでない
    pub fn cancel(
        &mut self,
        cancelled_by: UserId,
        reason: Option<String>,
    ) -> Result<(), DomainError> {
        match self.status {
            BookingStatus::Completed => {
                return Err(DomainError::InvalidStateTransition(
                    "作業完了した予約はキャンセルできません".to_string(),
                ));
            }
            BookingStatus::Pending
            | BookingStatus::Approved
            | BookingStatus::InProgress
            | BookingStatus::Rejected
            | BookingStatus::Cancelled => {}
        }

        let now = Utc::now();
        self.status = BookingStatus::Cancelled;
        self.cancelled_by = Some(cancelled_by);
        self.cancelled_at = Some(now);
        if reason.is_some() {
            self.internal_note = reason;
        }
        self.updated_at = now;

        Ok(())
    }

    /// 部品明細の追加・削除が許可されるか検証
    /// 事前条件:
    /// - ステータスがInProgress
    /// - 操作主体が担当整備士本人
    pub fn authorize_part_change(&self, actor: UserId) -> Result<(), DomainError> {
        if self.status != BookingStatus::InProgress {
            return Err(DomainError::InvalidStateTransition(
                "部品を操作できるのはInProgress状態のみです".to_string(),
            ));
        }
        if self.technician_id != Some(actor) {
            return Err(DomainError::NotAssignedTechnician(format!(
                "予約{}の担当整備士ではありません",
                self.id
            )));
        }
        Ok(())
    }

    /// 部品明細の変更に伴い更新日時を進める
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
