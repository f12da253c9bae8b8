use crate::domain::model::{BookingId, BookingStatus, StatusLogId, UserId};
use chrono::{DateTime, Utc};

/// 予約ステータス履歴
/// 状態遷移ごとに必ず1行追記される監査レコード
/// 作成時はold_statusがNoneになる
#[derive(Debug, Clone, PartialEq)]
pub struct BookingStatusLog {
    id: StatusLogId,
    booking_id: BookingId,
    old_status: Option<BookingStatus>,
    new_status: BookingStatus,
    changed_by: Option<UserId>,
    note: Option<String>,
    changed_at: DateTime<Utc>,
}

impl BookingStatusLog {
    /// 新しい履歴行を作成
    pub fn new(
        booking_id: BookingId,
        old_status: Option<BookingStatus>,
        new_status: BookingStatus,
        changed_by: Option<UserId>,
        note: Option<String>,
    ) -> Self {
        Self {
            id: StatusLogId::new(),
            booking_id,
            old_status,
            new_status,
            changed_by,
            note,
            changed_at: Utc::now(),
        }
    }

    /// データベースから取得したデータで履歴行を再構築
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: StatusLogId,
        booking_id: BookingId,
        old_status: Option<BookingStatus>,
        new_status: BookingStatus,
        changed_by: Option<UserId>,
        note: Option<String>,
        changed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            booking_id,
            old_status,
            new_status,
            changed_by,
            note,
            changed_at,
        }
    }

    pub fn id(&self) -> StatusLogId {
        self.id
    }

    pub fn booking_id(&self) -> BookingId {
        self.booking_id
    }

    pub fn old_status(&self) -> Option<BookingStatus> {
        self.old_status
    }

    pub fn new_status(&self) -> BookingStatus {
        self.new_status
    }

    pub fn changed_by(&self) -> Option<UserId> {
        self.changed_by
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_log_has_no_old_status() {
        let log = BookingStatusLog::new(
            BookingId::new(),
            None,
            BookingStatus::Pending,
            None,
            None,
        );
        assert!(log.old_status().is_none());
        assert_eq!(log.new_status(), BookingStatus::Pending);
    }
}
