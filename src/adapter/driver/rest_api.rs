use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use uuid::Uuid;

use crate::adapter::driven::{MySqlBookingRepository, MySqlPartRepository};
use crate::adapter::driver::request_dto::{
    AddBookingPartRequest, AdjustStockRequest, ApproveBookingRequest, AvailabilityQueryParams,
    BookingsQueryParams, CancelBookingRequest, ClaimPartRequest, CompleteBookingRequest,
    CreateBookingRequest, CreatePartRequest, RejectBookingRequest, RemoveBookingPartParams,
    StartBookingRequest, UpdateMinStockRequest,
};
use crate::adapter::driver::response_dto::{
    BookingDetailResponse, BookingPartResponse, BookingSummaryResponse, InventoryResponse,
    MovementResponse, PartResponse, StatusLogResponse, TechnicianResponse,
};
use crate::application::service::{
    AvailabilityApplicationService, BookingApplicationService, ClaimPartApplicationService,
    InventoryApplicationService,
};
use crate::application::ApplicationError;
use crate::domain::model::{
    BookingId, BookingPartId, ClaimId, CustomerId, Money, MovementType, Part, PartId,
    ServiceCenterId, UserId, VehicleId,
};
use crate::domain::port::PartRepository;

// REST API用のレスポンスDTO
#[derive(Serialize, Deserialize)]
pub struct CreateBookingResponse {
    pub booking_id: Uuid,
}

#[derive(Serialize, Deserialize)]
pub struct AddBookingPartResponse {
    pub booking_part_id: Uuid,
}

#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

// アプリケーションサービスを含む状態
pub type AppState = AppStateInner;

#[derive(Clone)]
pub struct AppStateInner {
    pub booking_service: Arc<BookingApplicationService<MySqlBookingRepository>>,
    pub availability_service: Arc<AvailabilityApplicationService>,
    pub inventory_service: Arc<InventoryApplicationService>,
    pub claim_part_service: Arc<ClaimPartApplicationService>,
    pub part_repository: Arc<MySqlPartRepository>,
}

// REST APIルーターを作成
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/bookings", post(create_booking))
        .route("/bookings", get(get_bookings))
        .route("/bookings/:booking_id", get(get_booking_by_id))
        .route("/bookings/:booking_id/approve", post(approve_booking))
        .route("/bookings/:booking_id/reject", post(reject_booking))
        .route("/bookings/:booking_id/start", post(start_booking))
        .route("/bookings/:booking_id/complete", post(complete_booking))
        .route("/bookings/:booking_id/cancel", post(cancel_booking))
        .route("/bookings/:booking_id/parts", post(add_booking_part))
        .route("/bookings/:booking_id/parts", get(get_booking_parts))
        .route("/bookings/:booking_id/history", get(get_status_history))
        .route(
            "/booking-parts/:booking_part_id",
            delete(remove_booking_part),
        )
        .route("/availability", get(find_available_technicians))
        .route("/inventory", get(get_inventories))
        .route("/inventory/low-stock", get(get_low_stock_inventories))
        .route("/inventory/:part_id", get(get_inventory_by_part_id))
        .route("/inventory/:part_id/adjust", post(adjust_stock))
        .route("/inventory/:part_id/min-stock", put(update_min_stock_level))
        .route("/inventory/:part_id/movements", get(get_movements))
        .route("/claims/:claim_id/parts/reserve", post(reserve_claim_part))
        .route("/claims/:claim_id/parts/release", post(release_claim_part))
        .route("/claims/:claim_id/parts/consume", post(consume_claim_part))
        .route("/parts", post(create_part))
        .route("/parts", get(get_parts))
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "workshop-booking-management",
        "version": "0.1.0"
    }))
}

// 予約作成エンドポイント
async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<CreateBookingResponse>, (StatusCode, Json<ApiError>)> {
    let result = state
        .booking_service
        .create_booking(
            CustomerId::from_uuid(request.customer_id),
            VehicleId::from_uuid(request.vehicle_id),
            ServiceCenterId::from_uuid(request.service_center_id),
            request.service_type,
            request.preferred_start,
            request.preferred_end,
            request.estimated_duration_minutes.unwrap_or(60),
            request.customer_note,
        )
        .await;

    match result {
        Ok(booking_id) => Ok(Json(CreateBookingResponse {
            booking_id: booking_id.as_uuid(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約承認エンドポイント
async fn approve_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<ApproveBookingRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = state
        .booking_service
        .approve_booking(
            BookingId::from_uuid(booking_id),
            UserId::from_uuid(request.approved_by),
            request.technician_id.map(UserId::from_uuid),
            request.confirmed_start,
            request.duration_minutes,
            request.note,
        )
        .await;

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約却下エンドポイント
async fn reject_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<RejectBookingRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = state
        .booking_service
        .reject_booking(
            BookingId::from_uuid(booking_id),
            UserId::from_uuid(request.approved_by),
            request.reason,
        )
        .await;

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 作業開始エンドポイント
async fn start_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<StartBookingRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = state
        .booking_service
        .start_booking(
            BookingId::from_uuid(booking_id),
            UserId::from_uuid(request.technician_id),
        )
        .await;

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 作業完了エンドポイント
async fn complete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<CompleteBookingRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = state
        .booking_service
        .complete_booking(
            BookingId::from_uuid(booking_id),
            UserId::from_uuid(request.technician_id),
            request.note,
        )
        .await;

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約キャンセルエンドポイント
async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = state
        .booking_service
        .cancel_booking(
            BookingId::from_uuid(booking_id),
            UserId::from_uuid(request.cancelled_by),
            request.reason,
        )
        .await;

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 部品使用明細追加エンドポイント
async fn add_booking_part(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<AddBookingPartRequest>,
) -> Result<Json<AddBookingPartResponse>, (StatusCode, Json<ApiError>)> {
    let result = state
        .booking_service
        .add_booking_part(
            BookingId::from_uuid(booking_id),
            PartId::from_uuid(request.part_id),
            request.quantity,
            request.cost.map(Money::jpy),
            request.note,
            UserId::from_uuid(request.actor_id),
        )
        .await;

    match result {
        Ok(booking_part_id) => Ok(Json(AddBookingPartResponse {
            booking_part_id: booking_part_id.as_uuid(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 部品使用明細削除エンドポイント
async fn remove_booking_part(
    State(state): State<AppState>,
    Path(booking_part_id): Path<Uuid>,
    Query(params): Query<RemoveBookingPartParams>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = state
        .booking_service
        .remove_booking_part(
            BookingPartId::from_uuid(booking_part_id),
            UserId::from_uuid(params.actor_id),
        )
        .await;

    match result {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => Err(map_application_error(err)),
    }
}

// 部品使用明細一覧取得エンドポイント
async fn get_booking_parts(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Vec<BookingPartResponse>>, (StatusCode, Json<ApiError>)> {
    match state
        .booking_service
        .get_booking_parts(BookingId::from_uuid(booking_id))
        .await
    {
        Ok(parts) => Ok(Json(
            parts.iter().map(BookingPartResponse::from_booking_part).collect(),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// ステータス履歴取得エンドポイント
async fn get_status_history(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Vec<StatusLogResponse>>, (StatusCode, Json<ApiError>)> {
    match state
        .booking_service
        .get_status_history(BookingId::from_uuid(booking_id))
        .await
    {
        Ok(logs) => Ok(Json(
            logs.iter().map(StatusLogResponse::from_status_log).collect(),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約一覧取得エンドポイント
// フィルタの優先順位: status > customer_id > technician_id > service_center_id
async fn get_bookings(
    State(state): State<AppState>,
    query: Result<Query<BookingsQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<BookingSummaryResponse>>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    let bookings = if let Some(status_str) = params.status {
        match state
            .booking_service
            .get_bookings_by_status_string(status_str)
            .await
        {
            Ok(bookings) => bookings,
            Err(err) => return Err(map_application_error(err)),
        }
    } else if let Some(customer_id) = params.customer_id {
        match state
            .booking_service
            .get_bookings_by_customer(CustomerId::from_uuid(customer_id))
            .await
        {
            Ok(bookings) => bookings,
            Err(err) => return Err(map_application_error(err)),
        }
    } else if let Some(technician_id) = params.technician_id {
        match state
            .booking_service
            .get_bookings_by_technician(UserId::from_uuid(technician_id))
            .await
        {
            Ok(bookings) => bookings,
            Err(err) => return Err(map_application_error(err)),
        }
    } else if let Some(service_center_id) = params.service_center_id {
        match state
            .booking_service
            .get_bookings_by_service_center(ServiceCenterId::from_uuid(service_center_id))
            .await
        {
            Ok(bookings) => bookings,
            Err(err) => return Err(map_application_error(err)),
        }
    } else {
        match state.booking_service.get_all_bookings().await {
            Ok(bookings) => bookings,
            Err(err) => return Err(map_application_error(err)),
        }
    };

    let response: Vec<BookingSummaryResponse> = bookings
        .iter()
        .map(BookingSummaryResponse::from_booking)
        .collect();

    Ok(Json(response))
}

// 予約詳細取得エンドポイント
async fn get_booking_by_id(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingDetailResponse>, (StatusCode, Json<ApiError>)> {
    match state
        .booking_service
        .get_booking_by_id(BookingId::from_uuid(booking_id))
        .await
    {
        Ok(Some(booking)) => Ok(Json(BookingDetailResponse::from_booking(&booking))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "指定された予約が見つかりません".to_string(),
                code: "BOOKING_NOT_FOUND".to_string(),
            }),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 空き状況検索エンドポイント
async fn find_available_technicians(
    State(state): State<AppState>,
    query: Result<Query<AvailabilityQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<TechnicianResponse>>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    let result = state
        .availability_service
        .find_available_technicians(
            ServiceCenterId::from_uuid(params.service_center_id),
            params.start,
            params.duration_minutes,
            params.exclude_booking_id.map(BookingId::from_uuid),
        )
        .await;

    match result {
        Ok(technicians) => Ok(Json(
            technicians
                .iter()
                .map(TechnicianResponse::from_technician)
                .collect(),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 在庫手動調整エンドポイント
async fn adjust_stock(
    State(state): State<AppState>,
    Path(part_id): Path<Uuid>,
    Json(request): Json<AdjustStockRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let movement_type = match MovementType::from_string(&request.movement_type) {
        Ok(movement_type) => movement_type,
        Err(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError {
                    error: format!("無効な移動種別: {}", request.movement_type),
                    code: "INVALID_MOVEMENT_TYPE".to_string(),
                }),
            ))
        }
    };

    let result = state
        .inventory_service
        .adjust_stock(
            PartId::from_uuid(part_id),
            request.delta,
            movement_type,
            request.reason,
            UserId::from_uuid(request.actor_id),
        )
        .await;

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 最低在庫水準更新エンドポイント
async fn update_min_stock_level(
    State(state): State<AppState>,
    Path(part_id): Path<Uuid>,
    Json(request): Json<UpdateMinStockRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = state
        .inventory_service
        .update_min_stock_level(
            PartId::from_uuid(part_id),
            request.min_stock_level,
            UserId::from_uuid(request.actor_id),
        )
        .await;

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 在庫一覧取得エンドポイント
async fn get_inventories(
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryResponse>>, (StatusCode, Json<ApiError>)> {
    match state.inventory_service.get_all_inventories().await {
        Ok(inventories) => Ok(Json(
            inventories
                .iter()
                .map(InventoryResponse::from_inventory)
                .collect(),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 低在庫一覧取得エンドポイント
async fn get_low_stock_inventories(
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryResponse>>, (StatusCode, Json<ApiError>)> {
    match state.inventory_service.get_low_stock_inventories().await {
        Ok(inventories) => Ok(Json(
            inventories
                .iter()
                .map(InventoryResponse::from_inventory)
                .collect(),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 在庫詳細取得エンドポイント
async fn get_inventory_by_part_id(
    State(state): State<AppState>,
    Path(part_id): Path<Uuid>,
) -> Result<Json<InventoryResponse>, (StatusCode, Json<ApiError>)> {
    match state
        .inventory_service
        .get_inventory_by_part_id(PartId::from_uuid(part_id))
        .await
    {
        Ok(Some(inventory)) => Ok(Json(InventoryResponse::from_inventory(&inventory))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "指定された部品の在庫が見つかりません".to_string(),
                code: "INVENTORY_NOT_FOUND".to_string(),
            }),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 在庫移動記録取得エンドポイント
async fn get_movements(
    State(state): State<AppState>,
    Path(part_id): Path<Uuid>,
) -> Result<Json<Vec<MovementResponse>>, (StatusCode, Json<ApiError>)> {
    match state
        .inventory_service
        .get_movements_by_part(PartId::from_uuid(part_id))
        .await
    {
        Ok(movements) => Ok(Json(
            movements.iter().map(MovementResponse::from_movement).collect(),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// クレーム部品引当エンドポイント
async fn reserve_claim_part(
    State(state): State<AppState>,
    Path(claim_id): Path<Uuid>,
    Json(request): Json<ClaimPartRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = state
        .claim_part_service
        .reserve_part(
            PartId::from_uuid(request.part_id),
            request.quantity,
            ClaimId::from_uuid(claim_id),
            UserId::from_uuid(request.actor_id),
        )
        .await;

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// クレーム部品引当解放エンドポイント
async fn release_claim_part(
    State(state): State<AppState>,
    Path(claim_id): Path<Uuid>,
    Json(request): Json<ClaimPartRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = state
        .claim_part_service
        .release_part(
            PartId::from_uuid(request.part_id),
            request.quantity,
            ClaimId::from_uuid(claim_id),
            UserId::from_uuid(request.actor_id),
        )
        .await;

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// クレーム部品消費記録エンドポイント（数量は引当時に減算済み）
async fn consume_claim_part(
    State(state): State<AppState>,
    Path(claim_id): Path<Uuid>,
    Json(request): Json<ClaimPartRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = state
        .claim_part_service
        .consume_reserved_part(
            PartId::from_uuid(request.part_id),
            request.quantity,
            ClaimId::from_uuid(claim_id),
            UserId::from_uuid(request.actor_id),
        )
        .await;

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(map_application_error(err)),
    }
}

// 部品作成エンドポイント（テスト用）
async fn create_part(
    State(state): State<AppState>,
    Json(request): Json<CreatePartRequest>,
) -> Result<Json<PartResponse>, (StatusCode, Json<ApiError>)> {
    let part = Part::new(
        PartId::new(),
        request.part_number,
        request.name,
        Money::jpy(request.unit_price),
    );

    // 部品リポジトリに直接保存（本来はアプリケーションサービス経由が望ましい）
    match state.part_repository.save(&part).await {
        Ok(()) => Ok(Json(PartResponse::from_part(&part))),
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("{}", err),
                code: "REPOSITORY_ERROR".to_string(),
            }),
        )),
    }
}

// 部品一覧取得エンドポイント
async fn get_parts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PartResponse>>, (StatusCode, Json<ApiError>)> {
    match state.part_repository.find_all().await {
        Ok(parts) => Ok(Json(parts.iter().map(PartResponse::from_part).collect())),
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("{}", err),
                code: "REPOSITORY_ERROR".to_string(),
            }),
        )),
    }
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("{}", repo_err),
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
        ApplicationError::EventPublishingFailed(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: msg,
                code: "EVENT_PUBLISHING_FAILED".to_string(),
            }),
        ),
        ApplicationError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: msg,
                code: "NOT_FOUND".to_string(),
            }),
        ),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(
    domain_err: crate::domain::error::DomainError,
) -> (StatusCode, Json<ApiError>) {
    use crate::domain::error::DomainError;

    match domain_err {
        DomainError::InvalidStateTransition(msg) => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: msg,
                code: "INVALID_STATE_TRANSITION".to_string(),
            }),
        ),
        DomainError::InsufficientStock => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "在庫不足です".to_string(),
                code: "INSUFFICIENT_STOCK".to_string(),
            }),
        ),
        DomainError::InvalidQuantity => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効な数量です".to_string(),
                code: "INVALID_QUANTITY".to_string(),
            }),
        ),
        DomainError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "VALIDATION_ERROR".to_string(),
            }),
        ),
        DomainError::NotAssignedTechnician(msg) => (
            StatusCode::FORBIDDEN,
            Json(ApiError {
                error: msg,
                code: "NOT_ASSIGNED_TECHNICIAN".to_string(),
            }),
        ),
        DomainError::InvalidValue(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_VALUE".to_string(),
            }),
        ),
        DomainError::RepositoryError(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: msg,
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
    }
}
