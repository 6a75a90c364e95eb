//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; health, branding, and
//! the QR scan target live at the root.

pub mod auth;
pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::app_state::AppState;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "courtside", description = "Sports facility booking and check-in API"),
    paths(
        handlers::system::health_handler,
        handlers::system::site_handler,
        handlers::sports::list_sports,
        handlers::sports::get_sport,
        handlers::sports::create_sport,
        handlers::bookings::reserve,
        handlers::bookings::list_bookings,
        handlers::bookings::get_booking,
        handlers::bookings::add_players,
        handlers::players::get_player,
        handlers::players::toggle_player,
        handlers::players::scan_checkin,
        handlers::account::signup,
        handlers::account::login,
        handlers::account::logout,
        handlers::account::change_password,
    ),
    components(schemas(crate::error::ErrorResponse)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Sports", description = "Bookable sports"),
        (name = "Bookings", description = "Reservations and rosters"),
        (name = "Players", description = "Badges and check-in"),
        (name = "Auth", description = "Accounts and sessions"),
        (name = "System", description = "Health and branding"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("Session token")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "admin_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Admin-Key"))),
            );
        }
    }
}

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
        .merge(handlers::players::scan_routes())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::persistence::MemoryStore;

    const ADMIN_KEY: &str = "test-admin-key";

    fn make_app() -> Router {
        let config = AppConfig {
            admin_api_keys: vec![ADMIN_KEY.to_string()],
            public_base_url: "https://courts.example.com".to_string(),
            ..AppConfig::default()
        };
        let state = AppState::new(Arc::new(MemoryStore::new()), &config);
        build_router().with_state(state)
    }

    struct Call<'a> {
        method: Method,
        uri: &'a str,
        token: Option<&'a str>,
        admin_key: Option<&'a str>,
        body: Option<Value>,
    }

    impl<'a> Call<'a> {
        fn new(method: Method, uri: &'a str) -> Self {
            Self {
                method,
                uri,
                token: None,
                admin_key: None,
                body: None,
            }
        }

        fn token(mut self, token: &'a str) -> Self {
            self.token = Some(token);
            self
        }

        fn admin_key(mut self, key: &'a str) -> Self {
            self.admin_key = Some(key);
            self
        }

        fn json(mut self, body: Value) -> Self {
            self.body = Some(body);
            self
        }

        async fn send(self, app: &Router) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(self.method).uri(self.uri);
            if let Some(token) = self.token {
                builder = builder.header("authorization", format!("Bearer {token}"));
            }
            if let Some(key) = self.admin_key {
                builder = builder.header(auth::ADMIN_KEY_HEADER, key);
            }
            let body = match self.body {
                Some(value) => {
                    builder = builder.header("content-type", "application/json");
                    Body::from(value.to_string())
                }
                None => Body::empty(),
            };
            let Ok(request) = builder.body(body) else {
                panic!("invalid request");
            };
            let Ok(response) = app.clone().oneshot(request).await else {
                panic!("router failed");
            };
            let status = response.status();
            let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
                panic!("unreadable body");
            };
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, value)
        }
    }

    async fn login_as(app: &Router, username: &str) -> String {
        let (status, _) = Call::new(Method::POST, "/api/v1/auth/signup")
            .json(json!({"username": username, "email": "x@example.com", "password": "password1"}))
            .send(app)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = Call::new(Method::POST, "/api/v1/auth/login")
            .json(json!({"username": username, "password": "password1"}))
            .send(app)
            .await;
        assert_eq!(status, StatusCode::OK);
        let Some(token) = body["token"].as_str() else {
            panic!("missing token");
        };
        token.to_string()
    }

    async fn create_sport(app: &Router) -> String {
        let (status, body) = Call::new(Method::POST, "/api/v1/sports")
            .admin_key(ADMIN_KEY)
            .json(json!({
                "name": "Tennis",
                "description": "Clay court",
                "price_per_hour": "100.00",
                "available_from": "06:00:00",
                "available_to": "22:00:00"
            }))
            .send(app)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let Some(id) = body["id"].as_str() else {
            panic!("missing sport id");
        };
        id.to_string()
    }

    #[tokio::test]
    async fn health_and_branding() {
        let app = make_app();
        let (status, body) = Call::new(Method::GET, "/health").send(&app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = Call::new(Method::GET, "/config/site").send(&app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "RedBall Sports Booking");
    }

    #[tokio::test]
    async fn sport_creation_requires_admin_key() {
        let app = make_app();
        let payload = json!({
            "name": "Padel",
            "price_per_hour": "20",
            "available_from": "08:00:00",
            "available_to": "20:00:00"
        });

        let (status, _) = Call::new(Method::POST, "/api/v1/sports")
            .json(payload.clone())
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = Call::new(Method::POST, "/api/v1/sports")
            .admin_key("wrong")
            .json(payload)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], 4030);
    }

    #[tokio::test]
    async fn sport_price_must_fit_cents_and_column_range() {
        let app = make_app();
        for price in ["79228162514264337593543950335", "1000000.00", "100.005"] {
            let (status, _) = Call::new(Method::POST, "/api/v1/sports")
                .admin_key(ADMIN_KEY)
                .json(json!({
                    "name": "Padel",
                    "price_per_hour": price,
                    "available_from": "08:00:00",
                    "available_to": "20:00:00"
                }))
                .send(&app)
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "price {price}");
        }
    }

    #[tokio::test]
    async fn reserving_requires_a_session() {
        let app = make_app();
        let sport_id = create_sport(&app).await;
        let uri = format!("/api/v1/sports/{sport_id}/bookings");
        let (status, _) = Call::new(Method::POST, &uri)
            .json(json!({"date": "2024-06-01", "start_time": "10:00", "end_time": "11:00"}))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn booking_flow_end_to_end() {
        let app = make_app();
        let sport_id = create_sport(&app).await;
        let owner = login_as(&app, "owner").await;
        let rival = login_as(&app, "rival").await;

        let reserve_uri = format!("/api/v1/sports/{sport_id}/bookings");
        let (status, booking) = Call::new(Method::POST, &reserve_uri)
            .token(&owner)
            .json(json!({"date": "2024-06-01", "start_time": "10:00", "end_time": "11:30"}))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(booking["status"], "confirmed");
        assert_eq!(booking["total_price"], "150.00");
        let Some(booking_id) = booking["id"].as_str() else {
            panic!("missing booking id");
        };

        let (status, err) = Call::new(Method::POST, &reserve_uri)
            .token(&rival)
            .json(json!({"date": "2024-06-01", "start_time": "11:00", "end_time": "12:00"}))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["error"]["code"], 2101);

        let players_uri = format!("/api/v1/bookings/{booking_id}/players");
        let entries = json!({"players": [
            {"name": "Alex", "email": "alex@example.com"},
            {"name": "", "email": "blank@example.com"},
        ]});
        let (status, _) = Call::new(Method::POST, &players_uri)
            .token(&rival)
            .json(entries.clone())
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, added) = Call::new(Method::POST, &players_uri)
            .token(&owner)
            .json(entries)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(added["skipped"], 1);
        assert_eq!(added["roster"]["total_players"], 1);
        assert_eq!(added["added"][0]["username"], "Alex");
        let Some(player_id) = added["added"][0]["player"]["id"].as_str() else {
            panic!("missing player id");
        };

        let (status, card) = Call::new(Method::GET, &format!("/api/v1/players/{player_id}"))
            .token(&owner)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            card["token"]["payload"],
            format!("https://courts.example.com/checkin/{player_id}")
        );
        assert_eq!(card["qr"]["media_type"], "image/svg+xml");

        let (status, scanned) = Call::new(Method::GET, &format!("/checkin/{player_id}"))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(scanned["status"], "in");
        assert_eq!(scanned["roster"]["checked_in"], 1);

        let (status, toggled) =
            Call::new(Method::POST, &format!("/api/v1/players/{player_id}/toggle"))
                .token(&owner)
                .send(&app)
                .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggled["status"], "out");

        let (status, list) = Call::new(Method::GET, "/api/v1/bookings")
            .token(&owner)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["pagination"]["total"], 1);
        assert_eq!(list["data"][0]["roster"]["total_players"], 1);
        assert_eq!(list["data"][0]["roster"]["checked_in"], 0);
    }

    #[tokio::test]
    async fn provisioned_player_must_reset_password() {
        let app = make_app();
        let sport_id = create_sport(&app).await;
        let owner = login_as(&app, "host").await;

        let (_, booking) = Call::new(Method::POST, &format!("/api/v1/sports/{sport_id}/bookings"))
            .token(&owner)
            .json(json!({"date": "2024-06-02", "start_time": "09:00", "end_time": "10:00"}))
            .send(&app)
            .await;
        let Some(booking_id) = booking["id"].as_str() else {
            panic!("missing booking id");
        };
        let (_, added) = Call::new(Method::POST, &format!("/api/v1/bookings/{booking_id}/players"))
            .token(&owner)
            .json(json!({"players": [{"name": "Jordan", "email": "j@example.com"}]}))
            .send(&app)
            .await;
        let Some(password) = added["added"][0]["temporary_password"].as_str() else {
            panic!("missing temporary password");
        };

        let (status, session) = Call::new(Method::POST, "/api/v1/auth/login")
            .json(json!({"username": "Jordan", "password": password}))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["must_reset_password"], true);
        assert!(session["user"].get("password_hash").is_none());

        let Some(token) = session["token"].as_str() else {
            panic!("missing token");
        };
        let (status, _) = Call::new(Method::POST, "/api/v1/auth/password")
            .token(token)
            .json(json!({"current_password": password, "new_password": "my own secret"}))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = Call::new(Method::POST, "/api/v1/auth/logout")
            .token(token)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = Call::new(Method::GET, "/api/v1/bookings")
            .token(token)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn scanning_unknown_player_is_not_found() {
        let app = make_app();
        let uri = format!("/checkin/{}", uuid::Uuid::new_v4());
        let (status, body) = Call::new(Method::GET, &uri).send(&app).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 2003);
    }

    #[test]
    fn openapi_lists_scan_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/checkin/{id}"));
        assert!(doc.paths.paths.contains_key("/api/v1/bookings/{id}/players"));
    }
}
