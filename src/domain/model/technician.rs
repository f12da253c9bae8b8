use crate::domain::model::{ServiceCenterId, UserId};

/// 整備士
/// 空き状況検索の対象となる参照データ
/// 整備士はユーザーの一種であり、識別子はUserIdを共有する
#[derive(Debug, Clone, PartialEq)]
pub struct Technician {
    id: UserId,
    service_center_id: ServiceCenterId,
    full_name: String,
    is_active: bool,
}

impl Technician {
    /// 新しい整備士を作成
    pub fn new(
        id: UserId,
        service_center_id: ServiceCenterId,
        full_name: String,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            service_center_id,
            full_name,
            is_active,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn service_center_id(&self) -> ServiceCenterId {
        self.service_center_id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}
