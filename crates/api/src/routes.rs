use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::auth::{AuthLayer, RequiredRole};
use crate::state::AppState;

pub async fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        // Release eligibility lookup, the one endpoint mobile clients poll.
        .route("/version", get(super::version::get_release_for_identifier))
        // Account endpoints
        .route("/auth/register", post(super::auth::register))
        .route("/auth/login", post(super::auth::login))
        // Public catalogue
        .route("/restaurants", get(super::restaurant::get_all))
        .route("/restaurants/{id}", get(super::restaurant::get_by_id))
        .route("/restaurants/{id}/menu", get(super::menu::get_for_restaurant))
        // Driver app surface
        .route("/drivers/available", get(super::driver::get_available))
        .route("/drivers/{id}/location", put(super::driver::update_location))
        // Customer orders
        .route(
            "/orders",
            post(super::order::create)
                .get(super::order::get_own)
                .layer(AuthLayer::new(app_state.clone(), RequiredRole::Any)),
        )
        .route(
            "/orders/{id}",
            get(super::order::get_by_id)
                .layer(AuthLayer::new(app_state.clone(), RequiredRole::Any)),
        )
        // Admin surface
        .nest("/admin", admin_routes(app_state))
        .route("/live", get(super::health::live))
        .route("/ready", get(super::health::ready))
}

fn admin_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        // Releases and their whitelists
        .route("/releases", post(super::release::create).get(super::release::get_all))
        .route(
            "/releases/{id}",
            get(super::release::get_by_id)
                .put(super::release::update)
                .delete(super::release::remove),
        )
        .route(
            "/releases/{id}/whitelist",
            post(super::release::add_to_whitelist).get(super::release::get_whitelist),
        )
        .route(
            "/releases/whitelist/{id}",
            delete(super::release::remove_from_whitelist),
        )
        // Restaurants and menus
        .route("/restaurants", post(super::restaurant::create))
        .route(
            "/restaurants/{id}",
            put(super::restaurant::update).delete(super::restaurant::remove),
        )
        .route("/restaurants/{id}/menu", post(super::menu::create))
        .route("/menu/{id}", put(super::menu::update).delete(super::menu::remove))
        // Drivers
        .route("/drivers", post(super::driver::create))
        .route("/drivers/{id}/availability", put(super::driver::set_availability))
        // Orders
        .route("/orders", get(super::order::get_all))
        .route("/orders/{id}/status", put(super::order::set_status))
        .route("/orders/assign", post(super::order::assign_driver))
        .layer(AuthLayer::new(app_state, RequiredRole::Admin))
}
