use axum::{
    routing::{get, post, put},
    Router,
};

use crate::backend::{budget_handlers, handlers, km_handlers, kopeg_handlers, realtime, AppState};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/api/sales", sales_routes())
        .nest("/api/budget", budget_routes())
        .nest("/api/kopeg", kopeg_routes())
        .route("/api/km", get(km_handlers::list_metrics).put(km_handlers::update_metrics))
        .route("/ws", get(realtime::ws_handler))
}

fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/revenue-summary", get(handlers::get_revenue_summary))
        .route("/monthly-realization", get(handlers::get_monthly_realization))
        .route("/product-comparison", get(handlers::get_product_comparison))
        .route("/monthly-receivables", get(handlers::get_monthly_receivables))
        .route("/monthly-sales-collection", get(handlers::get_monthly_realization))
        .route("/collection-summary", get(handlers::get_collection_summary))
        .route("/expenses-summary", get(handlers::get_expenses_summary))
        .route("/monthly-expenses-comparison", get(handlers::get_monthly_expenses_comparison))
        .route("/progress-summary", get(handlers::get_progress_summary))
        .route("/yearly-progress", get(handlers::get_yearly_progress))
        .route("/products/{name}", get(handlers::get_product).put(handlers::put_product))
}

fn budget_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/budget-codes",
            post(budget_handlers::create_budget_code).get(budget_handlers::list_budget_codes),
        )
        .route(
            "/budget-codes/{id}",
            put(budget_handlers::update_budget_code).delete(budget_handlers::delete_budget_code),
        )
        .route(
            "/budget-targets",
            post(budget_handlers::create_budget_target).get(budget_handlers::list_budget_targets),
        )
        .route(
            "/budget-targets/{id}",
            put(budget_handlers::update_budget_target).delete(budget_handlers::delete_budget_target),
        )
        .route(
            "/realizations",
            post(budget_handlers::create_realization).get(budget_handlers::list_realizations),
        )
        .route(
            "/realizations/{id}",
            get(budget_handlers::get_realization)
                .put(budget_handlers::update_realization)
                .delete(budget_handlers::delete_realization),
        )
}

fn kopeg_routes() -> Router<AppState> {
    Router::new()
        .route("/debt-summary", get(kopeg_handlers::get_debt_summary))
        .route("/monthly-debt-realization", get(kopeg_handlers::get_monthly_debt_realization))
        .route("/list", get(kopeg_handlers::get_kopeg_list))
        .route("/active-debts", get(kopeg_handlers::get_active_debts))
        .route("/debt", post(kopeg_handlers::add_debt))
        .route("/debt/payment", put(kopeg_handlers::record_payment))
}
