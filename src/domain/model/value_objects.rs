use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// 予約の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// 新しい一意のBookingIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから BookingId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からBookingIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

/// 予約部品明細の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingPartId(Uuid);

impl BookingPartId {
    /// 新しい一意のBookingPartIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから BookingPartId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からBookingPartIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for BookingPartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for BookingPartId {
    fn default() -> Self {
        Self::new()
    }
}

/// 顧客の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// 新しい一意のCustomerIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから CustomerId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からCustomerIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

/// 車両の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleId(Uuid);

impl VehicleId {
    /// 新しい一意のVehicleIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから VehicleId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からVehicleIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for VehicleId {
    fn default() -> Self {
        Self::new()
    }
}

/// サービスセンターの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceCenterId(Uuid);

impl ServiceCenterId {
    /// 新しい一意のServiceCenterIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから ServiceCenterId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からServiceCenterIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ServiceCenterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for ServiceCenterId {
    fn default() -> Self {
        Self::new()
    }
}

/// ユーザーの一意識別子
/// スタッフ・整備士など、操作主体をすべてこの型で表す
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// 新しい一意のUserIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから UserId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からUserIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// 部品の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartId(Uuid);

impl PartId {
    /// 新しい一意のPartIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから PartId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からPartIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for PartId {
    fn default() -> Self {
        Self::new()
    }
}

/// 保証クレームの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimId(Uuid);

impl ClaimId {
    /// 新しい一意のClaimIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから ClaimId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からClaimIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for ClaimId {
    fn default() -> Self {
        Self::new()
    }
}

/// ステータス履歴行の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusLogId(Uuid);

impl StatusLogId {
    /// 新しい一意のStatusLogIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから StatusLogId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からStatusLogIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for StatusLogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for StatusLogId {
    fn default() -> Self {
        Self::new()
    }
}

/// 在庫移動記録の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementId(Uuid);

impl MovementId {
    /// 新しい一意のMovementIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから MovementId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からMovementIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for MovementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for MovementId {
    fn default() -> Self {
        Self::new()
    }
}

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// 日本円
    #[allow(clippy::upper_case_acronyms)]
    JPY,
}

/// 金額を表す値オブジェクト
/// 部品単価・部品使用明細の費用に使用する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// 金額と通貨から作成
    pub fn new(amount: i64, currency: String) -> Result<Self, DomainError> {
        let currency = match currency.as_str() {
            "JPY" => Currency::JPY,
            _ => {
                return Err(DomainError::InvalidValue(format!(
                    "サポートされていない通貨: {}",
                    currency
                )))
            }
        };
        Ok(Self { amount, currency })
    }

    /// 日本円の金額を作成
    pub fn jpy(amount: i64) -> Self {
        Self {
            amount,
            currency: Currency::JPY,
        }
    }

    /// 金額を取得
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// 通貨を文字列として取得
    pub fn currency(&self) -> String {
        match self.currency {
            Currency::JPY => "JPY".to_string(),
        }
    }

    /// 金額を加算
    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::InvalidValue(
                "通貨が一致しません".to_string(),
            ));
        }
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// 金額を乗算
    pub fn multiply(&self, factor: u32) -> Money {
        Money {
            amount: self.amount * factor as i64,
            currency: self.currency,
        }
    }
}

/// 予約のステータス
/// 閉じた列挙型で表現し、遷移判定は網羅的なmatchで行う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    /// 申請中（作成直後）
    Pending,
    /// 承認済み
    Approved,
    /// 作業中
    InProgress,
    /// 作業完了
    Completed,
    /// 却下済み
    Rejected,
    /// キャンセル済み
    Cancelled,
}

impl BookingStatus {
    /// 整備士のカレンダーを占有するステータスかどうか
    /// 空き状況検索の候補条件に使用する
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Approved | BookingStatus::InProgress
        )
    }

    /// 終端ステータスかどうか
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Rejected | BookingStatus::Cancelled
        )
    }

    /// 文字列からBookingStatusを作成
    /// 未知の文字列は境界で拒否する
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Approved" => Ok(BookingStatus::Approved),
            "InProgress" => Ok(BookingStatus::InProgress),
            "Completed" => Ok(BookingStatus::Completed),
            "Rejected" => Ok(BookingStatus::Rejected),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な予約ステータス: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Approved => "Approved",
            BookingStatus::InProgress => "InProgress",
            BookingStatus::Completed => "Completed",
            BookingStatus::Rejected => "Rejected",
            BookingStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", status_str)
    }
}

/// 在庫移動の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementType {
    /// 入庫
    In,
    /// 出庫
    Out,
    /// 棚卸調整
    Adjustment,
    /// クレーム引当
    Reserved,
    /// 引当解放
    Released,
}

impl MovementType {
    /// 文字列からMovementTypeを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "IN" => Ok(MovementType::In),
            "OUT" => Ok(MovementType::Out),
            "ADJUSTMENT" => Ok(MovementType::Adjustment),
            "RESERVED" => Ok(MovementType::Reserved),
            "RELEASED" => Ok(MovementType::Released),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な在庫移動種別: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_str = match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
            MovementType::Adjustment => "ADJUSTMENT",
            MovementType::Reserved => "RESERVED",
            MovementType::Released => "RELEASED",
        };
        write!(f, "{}", type_str)
    }
}

/// 在庫移動の参照先種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockReferenceType {
    /// 保証クレーム
    Claim,
    /// 予約
    Booking,
    /// 棚卸調整
    Adjustment,
}

impl StockReferenceType {
    /// 文字列からStockReferenceTypeを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "CLAIM" => Ok(StockReferenceType::Claim),
            "BOOKING" => Ok(StockReferenceType::Booking),
            "ADJUSTMENT" => Ok(StockReferenceType::Adjustment),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な参照先種別: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for StockReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_str = match self {
            StockReferenceType::Claim => "CLAIM",
            StockReferenceType::Booking => "BOOKING",
            StockReferenceType::Adjustment => "ADJUSTMENT",
        };
        write!(f, "{}", type_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_id_creation() {
        let id1 = BookingId::new();
        let id2 = BookingId::new();
        assert_ne!(id1, id2, "Each BookingId should be unique");
    }

    #[test]
    fn test_booking_id_string_round_trip() {
        let id = BookingId::new();
        let parsed = BookingId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_money_multiplication() {
        let money = Money::jpy(1200);
        let result = money.multiply(3);
        assert_eq!(result.amount(), 3600);
    }

    #[test]
    fn test_money_addition() {
        let money1 = Money::jpy(1000);
        let money2 = Money::jpy(500);
        let result = money1.add(&money2).unwrap();
        assert_eq!(result.amount(), 1500);
    }

    #[test]
    fn test_booking_status_round_trip() {
        let statuses = [
            BookingStatus::Pending,
            BookingStatus::Approved,
            BookingStatus::InProgress,
            BookingStatus::Completed,
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
        ];
        for status in statuses {
            let parsed = BookingStatus::from_string(&status.to_string()).unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_booking_status_rejects_unknown_string() {
        let result = BookingStatus::from_string("Unknown");
        assert!(result.is_err());
    }

    #[test]
    fn test_booking_status_active_flags() {
        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Approved.is_active());
        assert!(BookingStatus::InProgress.is_active());
        assert!(!BookingStatus::Completed.is_active());
        assert!(!BookingStatus::Rejected.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
    }

    #[test]
    fn test_movement_type_round_trip() {
        let types = [
            MovementType::In,
            MovementType::Out,
            MovementType::Adjustment,
            MovementType::Reserved,
            MovementType::Released,
        ];
        for movement_type in types {
            let parsed = MovementType::from_string(&movement_type.to_string()).unwrap();
            assert_eq!(movement_type, parsed);
        }
    }

    #[test]
    fn test_reference_type_rejects_unknown_string() {
        let result = StockReferenceType::from_string("INVOICE");
        assert!(result.is_err());
    }
}
