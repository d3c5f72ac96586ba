//! REST API module.
//!
//! Every business entity is served by the same generic handlers; adding an
//! entity means adding one `resource::<T>()` line to the router.

mod auth;
mod resources;
mod settings;
mod users;

pub use auth::*;
pub use resources::*;
pub use settings::*;
pub use users::*;

use axum::{
    extract::FromRequest,
    routing::get,
    Router,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::Entity;
use crate::AppState;

/// JSON body extractor whose failures become 400 responses in our envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `{ "success": true }` acknowledgement for deletes and logout.
#[derive(Debug, Serialize)]
pub struct Acknowledgement {
    pub success: bool,
}

impl Acknowledgement {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Collection and item routes for entity `T`.
///
/// `GET/POST /{path}` and `GET/PUT/DELETE /{path}/{id}`.
pub fn resource<T: Entity>() -> Router<AppState> {
    let collection = format!("/{}", T::PATH);
    let item = format!("/{}/{{id}}", T::PATH);

    Router::new()
        .route(&collection, get(list::<T>).post(create::<T>))
        .route(
            &item,
            get(fetch::<T>).put(update::<T>).delete(remove::<T>),
        )
}

/// Fallback for unknown paths, so even these get a JSON envelope.
pub async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        routing::post,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::models::Customer;

    async fn echo_name(ApiJson(customer): ApiJson<Customer>) -> String {
        customer.name
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_api_json_rejection_uses_error_envelope() {
        let app: Router = Router::new().route("/echo", post(echo_name));

        let response = app
            .oneshot(
                Request::post("/echo")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"name\": 42}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid request body");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_fallback_is_json_not_found() {
        let app: Router = Router::new().fallback(route_not_found);

        let response = app
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, serde_json::json!({ "error": "Route not found" }));
    }
}
