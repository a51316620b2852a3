use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{self, organizations, projects, reports, time_sheets, users};
use crate::state::AppState;

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_volunteers).post(users::create_volunteer))
        .route("/search", get(users::search_users))
        .route("/email-exists", get(users::email_exists))
        .route(
            "/:id",
            get(users::get_user)
                .put(users::edit_user)
                .delete(users::delete_user),
        )
        .route("/:id/password", put(users::change_password))
        .route("/:id/portal", get(users::portal))
        .route("/:id/hours", get(users::volunteer_hours))
        .route("/:id/time-sheets", get(users::volunteer_time_sheets))
        .route("/:id/punch-in", post(users::punch_in))
        .route("/:id/punch-out", post(users::punch_out))
}

fn organization_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(organizations::list_organizations).post(organizations::create_organization),
        )
        .route(
            "/:id",
            get(organizations::get_organization)
                .put(organizations::edit_organization)
                .delete(organizations::delete_organization),
        )
}

fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::project_page).post(projects::create_project))
        .route("/active", get(projects::active_projects))
        .route(
            "/:id",
            get(projects::get_project)
                .put(projects::edit_project)
                .delete(projects::delete_project),
        )
        .route("/:id/hours", get(projects::project_hours))
}

fn time_sheet_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(time_sheets::list_time_sheets).post(time_sheets::insert_time_sheet),
        )
        .route(
            "/:id",
            get(time_sheets::get_time_sheet)
                .put(time_sheets::edit_time_sheet)
                .delete(time_sheets::delete_time_sheet),
        )
}

fn time_card_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(time_sheets::time_card_page))
        .route(
            "/:id",
            get(time_sheets::get_time_card).put(time_sheets::edit_time_card),
        )
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/demographics", get(reports::demographics))
        .route("/bad-time-sheets", get(reports::bad_time_sheets))
}

/// Full API without the outer middleware, used directly by tests.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/users", user_routes())
        .nest("/api/organizations", organization_routes())
        .nest("/api/projects", project_routes())
        .nest("/api/time-sheets", time_sheet_routes())
        .nest("/api/time-cards", time_card_routes())
        .nest("/api/reports", report_routes())
        .with_state(state)
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    api_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
}
