use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use shared::{BalanceRequest, LoginRequest, TransferRequest};
use tracing::info;

use crate::domain::{AccountService, TransferService};

/// Application state containing the AccountService and TransferService
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub transfer_service: TransferService,
}

impl AppState {
    /// Create new application state with the given services
    pub fn new(account_service: AccountService, transfer_service: TransferService) -> Self {
        Self {
            account_service,
            transfer_service,
        }
    }
}

/// Build the application router with the three ledger routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/get_balance", post(get_balance))
        .route("/transfer", post(transfer))
        .with_state(state)
}

/// Axum handler function for POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /login - username: {}", request.username);

    if let Err(e) = request.validate() {
        return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
    }

    match state.account_service.authenticate(&request.username, &request.password).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Error authenticating {}: {:?}", request.username, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error authenticating user").into_response()
        }
    }
}

/// Axum handler function for POST /get_balance
pub async fn get_balance(
    State(state): State<AppState>,
    Json(request): Json<BalanceRequest>,
) -> impl IntoResponse {
    info!("POST /get_balance - username: {}", request.username);

    if let Err(e) = request.validate() {
        return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
    }

    match state.account_service.balance(&request.username).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Error querying balance for {}: {:?}", request.username, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error querying balance").into_response()
        }
    }
}

/// Axum handler function for POST /transfer
pub async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> impl IntoResponse {
    info!(
        "POST /transfer - sender: {}, receiver: {}, amount: {}",
        request.sender, request.receiver, request.amount
    );

    if let Err(e) = request.validate() {
        return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
    }

    match state.transfer_service.transfer(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Error transferring funds: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error transferring funds").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use shared::{messages, BalanceResponse, LoginResponse, TransferResponse};
    use tower::ServiceExt;

    /// Helper to create test handlers with two seeded accounts
    async fn setup_test_state() -> AppState {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let account_service = AccountService::new(db.clone());
        let transfer_service = TransferService::new(db);

        account_service.create_user("alice", "wonderland", 100).await.unwrap();
        account_service.create_user("bob", "builder", 50).await.unwrap();

        AppState::new(account_service, transfer_service)
    }

    async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_login_handler_direct() {
        let state = setup_test_state().await;

        let request = LoginRequest {
            username: "alice".to_string(),
            password: "wonderland".to_string(),
        };

        let response = login(State(state), Json(request)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_route_success() {
        let app = router(setup_test_state().await);

        let (status, body) = post_json(
            app,
            "/login",
            json!({"username": "alice", "password": "wonderland"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response: LoginResponse = serde_json::from_slice(&body).unwrap();
        assert!(response.authenticated);
        assert_eq!(response.message, messages::AUTHENTICATION_SUCCESSFUL);
        assert_eq!(response.balance, Some(100));
    }

    #[tokio::test]
    async fn test_login_route_failures_are_identical() {
        let app = router(setup_test_state().await);

        let (status, wrong_password) = post_json(
            app.clone(),
            "/login",
            json!({"username": "alice", "password": "queen-of-hearts"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, unknown_user) = post_json(
            app,
            "/login",
            json!({"username": "mallory", "password": "queen-of-hearts"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Same bytes for wrong password and unknown username
        assert_eq!(wrong_password, unknown_user);
        let response: LoginResponse = serde_json::from_slice(&wrong_password).unwrap();
        assert!(!response.authenticated);
        assert_eq!(response.message, messages::AUTHENTICATION_FAILED);
    }

    #[tokio::test]
    async fn test_login_route_missing_field_is_client_error() {
        let app = router(setup_test_state().await);

        let (status, _) = post_json(app, "/login", json!({"username": "alice"})).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_login_route_empty_username_is_bad_request() {
        let app = router(setup_test_state().await);

        let (status, _) = post_json(
            app,
            "/login",
            json!({"username": "", "password": "wonderland"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_balance_route() {
        let app = router(setup_test_state().await);

        let (status, body) = post_json(app, "/get_balance", json!({"username": "bob"})).await;

        assert_eq!(status, StatusCode::OK);
        let response: BalanceResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.balance, Some(50));
        assert_eq!(response.message, None);
    }

    #[tokio::test]
    async fn test_get_balance_route_unknown_user() {
        let app = router(setup_test_state().await);

        let (status, body) = post_json(app, "/get_balance", json!({"username": "nobody"})).await;

        // Logical not-found still travels with HTTP 200
        assert_eq!(status, StatusCode::OK);
        let raw: Value = serde_json::from_slice(&body).unwrap();
        assert!(raw["balance"].is_null());
        assert_eq!(raw["message"], messages::USER_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_transfer_route_scenario() {
        let app = router(setup_test_state().await);

        // alice=100, bob=50; moving 30 leaves 70/80
        let (status, body) = post_json(
            app.clone(),
            "/transfer",
            json!({"sender": "alice", "receiver": "bob", "amount": 30}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let response: TransferResponse = serde_json::from_slice(&body).unwrap();
        assert!(response.success);
        assert_eq!(response.message, messages::FUNDS_TRANSFERRED);

        // Overdraw attempt changes nothing
        let (status, body) = post_json(
            app.clone(),
            "/transfer",
            json!({"sender": "alice", "receiver": "bob", "amount": 1000}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let response: TransferResponse = serde_json::from_slice(&body).unwrap();
        assert!(!response.success);
        assert_eq!(response.message, messages::TRANSFER_REJECTED);

        let (_, body) = post_json(app.clone(), "/get_balance", json!({"username": "alice"})).await;
        let alice: BalanceResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(alice.balance, Some(70));

        let (_, body) = post_json(app, "/get_balance", json!({"username": "bob"})).await;
        let bob: BalanceResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(bob.balance, Some(80));
    }

    #[tokio::test]
    async fn test_transfer_route_rejects_invalid_requests() {
        let app = router(setup_test_state().await);

        let (status, _) = post_json(
            app.clone(),
            "/transfer",
            json!({"sender": "alice", "receiver": "bob", "amount": 0}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(
            app.clone(),
            "/transfer",
            json!({"sender": "alice", "receiver": "bob", "amount": -30}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(
            app.clone(),
            "/transfer",
            json!({"sender": "alice", "receiver": "alice", "amount": 10}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Missing amount field never reaches the domain
        let (status, _) = post_json(
            app,
            "/transfer",
            json!({"sender": "alice", "receiver": "bob"}),
        )
        .await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_transfer_route_unknown_receiver() {
        let app = router(setup_test_state().await);

        let (status, body) = post_json(
            app.clone(),
            "/transfer",
            json!({"sender": "alice", "receiver": "nobody", "amount": 30}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let response: TransferResponse = serde_json::from_slice(&body).unwrap();
        assert!(!response.success);

        // Sender balance untouched after the rolled-back debit
        let (_, body) = post_json(app, "/get_balance", json!({"username": "alice"})).await;
        let alice: BalanceResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(alice.balance, Some(100));
    }
}
