//! HTTP API over the recipe site and the nutrition calculator.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Endpoint listing |
//! | `GET`  | `/search/{title}` | Search recipes by title |
//! | `GET`  | `/recipe/{id}` | Recipe details |
//! | `GET`  | `/recipe/{id}/nutrition` | Nutrition estimate (needs a product catalog) |
//!
//! Errors are returned as `{ "error": "<message>" }` with the status declared
//! by the error, 500 when it declares none.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{error, info};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::builder::{load_catalog, open_store};
use crate::config::AppConfig;
use crate::error::RecipeError;
use crate::model::{RecipeDetails, RecipeNutrition, SearchResult};
use crate::nutrition::NutritionCalculator;
use crate::repository::RecipeRepository;
use crate::site::RecipeSite;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub site: RecipeSite,
    pub recipes: Arc<dyn RecipeRepository>,
    /// Absent when no product catalog is configured.
    pub calculator: Option<Arc<NutritionCalculator>>,
}

impl AppState {
    /// Wires the site, store and (when a catalog is configured) calculator
    /// from configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self, RecipeError> {
        let site = RecipeSite::from_config(&config.site)?;
        let store = open_store(config).await?;

        let calculator = match load_catalog(config)? {
            Some(catalog) => Some(Arc::new(
                NutritionCalculator::builder()
                    .products(catalog)
                    .recipes(store.clone())
                    .weights(config.matcher.clone())
                    .concurrency(config.nutrition.concurrency)
                    .build()?,
            )),
            None => None,
        };

        Ok(Self {
            site,
            recipes: store,
            calculator,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/search/{title}", get(handle_search))
        .route("/recipe/{id}", get(handle_recipe))
        .route("/recipe/{id}/nutrition", get(handle_nutrition))
        .layer(cors)
        .with_state(state)
}

/// Binds to `[server].bind` and serves until the process ends.
pub async fn run_server(config: &AppConfig) -> Result<(), RecipeError> {
    let state = AppState::from_config(config).await?;
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Listening on http://{}", config.server.bind);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Error converted into an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        Self {
            status: StatusCode::from_u16(err.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {}", self.message);
        }
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

async fn handle_index() -> Json<Value> {
    Json(json!({
        "message": "Receitas API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "search": { "method": "GET", "path": "/search/{title}", "description": "Search for recipes by title" },
            "recipe": { "method": "GET", "path": "/recipe/{id}", "description": "Get recipe details by ID" },
            "nutrition": { "method": "GET", "path": "/recipe/{id}/nutrition", "description": "Estimated nutrition for a recipe" }
        }
    }))
}

async fn handle_search(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    Ok(Json(state.site.search(&title).await?))
}

async fn handle_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecipeDetails>, ApiError> {
    let recipe = state
        .site
        .get_recipe_cached(&id, state.recipes.as_ref())
        .await?;
    Ok(Json(recipe))
}

async fn handle_nutrition(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecipeNutrition>, ApiError> {
    let calculator = state.calculator.as_ref().ok_or_else(|| ApiError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        message: "nutrition catalog not configured".to_string(),
    })?;

    let recipe = state
        .site
        .get_recipe_cached(&id, state.recipes.as_ref())
        .await?;
    Ok(Json(calculator.get_recipe_nutrition(&recipe, true).await?))
}
