use workshop_booking_management::adapter::driven::{
    InMemoryEventBus, MySqlBookingRepository, MySqlInventoryRepository, MySqlPartRepository,
    MySqlTechnicianRepository,
};
use workshop_booking_management::adapter::driver::rest_api::{create_router, AppStateInner};
use workshop_booking_management::adapter::{DatabaseConfig, DatabaseMigration};
use workshop_booking_management::application::service::{
    AvailabilityApplicationService, BookingApplicationService, ClaimPartApplicationService,
    InventoryApplicationService,
};
use workshop_booking_management::domain::handler::NotificationHandler;
use workshop_booking_management::domain::service::{AvailabilityService, StockLedgerService};

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== 車両サービス予約管理システム REST API ===");
    println!();

    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    // データベース設定を読み込む
    let config = DatabaseConfig::from_env()?;
    println!(
        "データベース設定を読み込みました: {}:{}",
        config.host, config.port
    );

    // 接続プールを作成
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;
    println!("データベース接続プールを作成しました");

    // マイグレーションを実行
    let migration = DatabaseMigration::new(pool.clone());
    migration.run().await?;
    println!("データベースマイグレーションを実行しました");

    // MySQLリポジトリを作成
    let booking_repository = Arc::new(MySqlBookingRepository::new(pool.clone()));
    let inventory_repository = Arc::new(MySqlInventoryRepository::new(pool.clone()));
    let part_repository = Arc::new(MySqlPartRepository::new(pool.clone()));
    let technician_repository = Arc::new(MySqlTechnicianRepository::new(pool.clone()));

    // イベントバスを作成し、通知ハンドラーを登録
    // 通知の組み立てと配送は周辺アプリケーションの責務
    let event_bus = Arc::new(InMemoryEventBus::new());
    event_bus.subscribe(Arc::new(NotificationHandler::new())).await;
    println!("イベントハンドラーを登録しました");

    // ドメインサービスを作成
    let stock_ledger = StockLedgerService::new(inventory_repository.clone());
    let availability = AvailabilityService::new(
        booking_repository.clone(),
        technician_repository.clone(),
    );

    // アプリケーションサービスを作成
    let booking_service = BookingApplicationService::new(
        MySqlBookingRepository::new(pool.clone()),
        part_repository.clone(),
        stock_ledger.clone(),
        event_bus.clone(),
    );
    let availability_service = AvailabilityApplicationService::new(availability);
    let inventory_service =
        InventoryApplicationService::new(inventory_repository.clone(), stock_ledger.clone());
    let claim_part_service = ClaimPartApplicationService::new(stock_ledger);

    // アプリケーション状態を作成
    let app_state = AppStateInner {
        booking_service: Arc::new(booking_service),
        availability_service: Arc::new(availability_service),
        inventory_service: Arc::new(inventory_service),
        claim_part_service: Arc::new(claim_part_service),
        part_repository,
    };

    // REST APIルーターを作成
    let app = create_router()
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // サーバーを起動
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    println!("REST APIサーバーが起動しました: http://localhost:3000");
    println!("ヘルスチェック: GET http://localhost:3000/health");
    println!("API仕様:");
    println!("  POST   /bookings - 予約作成");
    println!("  GET    /bookings - 予約一覧取得");
    println!("  GET    /bookings/:id - 予約詳細取得");
    println!("  POST   /bookings/:id/approve - 予約承認");
    println!("  POST   /bookings/:id/reject - 予約却下");
    println!("  POST   /bookings/:id/start - 作業開始");
    println!("  POST   /bookings/:id/complete - 作業完了");
    println!("  POST   /bookings/:id/cancel - 予約キャンセル");
    println!("  POST   /bookings/:id/parts - 部品使用明細追加");
    println!("  GET    /bookings/:id/parts - 部品使用明細一覧");
    println!("  GET    /bookings/:id/history - ステータス履歴取得");
    println!("  DELETE /booking-parts/:id - 部品使用明細削除");
    println!("  GET    /availability - 整備士の空き状況検索");
    println!("  POST   /inventory/:part_id/adjust - 在庫手動調整");
    println!("  PUT    /inventory/:part_id/min-stock - 最低在庫水準更新");
    println!("  GET    /inventory - 在庫一覧取得");
    println!("  GET    /inventory/low-stock - 低在庫一覧取得");
    println!("  GET    /inventory/:part_id/movements - 在庫移動記録取得");
    println!("  POST   /claims/:id/parts/reserve - クレーム部品引当");
    println!("  POST   /claims/:id/parts/release - クレーム部品引当解放");
    println!("  POST   /claims/:id/parts/consume - クレーム部品消費記録");
    println!("  POST   /parts - 部品作成（テスト用）");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}
