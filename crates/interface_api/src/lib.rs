//! HTTP API Layer
//!
//! This crate provides the REST API for the consulting back office
//! using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each domain
//! - **Middleware**: Authentication, role checks, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses; domain validation
//!   failures map to 422
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{
    billing, chart, health, invoices, ledger, movements, party, reconciliation, reports,
    statements,
};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
}

/// Creates the main API router
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    let state = AppState { pool, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Registrations
    let party_routes = Router::new()
        .route("/clients", post(party::create_client).get(party::list_clients))
        .route(
            "/suppliers",
            post(party::create_supplier).get(party::list_suppliers),
        )
        .route(
            "/consultants",
            post(party::create_consultant).get(party::list_consultants),
        )
        .route("/consultants/:id/rates", post(party::create_rate))
        .route(
            "/bank-accounts",
            post(party::create_bank_account).get(party::list_bank_accounts),
        );

    // Payables and receivables
    let ledger_routes = Router::new()
        .route(
            "/payables",
            post(ledger::create_payable).get(ledger::list_payables),
        )
        .route(
            "/receivables",
            post(ledger::create_receivable).get(ledger::list_receivables),
        )
        .route("/entries/:id", get(ledger::get_entry))
        .route("/entries/:id/settlements", post(ledger::create_settlement))
        .route("/entries/:id/cancel", post(ledger::cancel_entry))
        .route("/entries/:id/reschedule", post(ledger::reschedule_entry));

    // Invoices and the chart of accounts
    let invoice_routes = Router::new()
        .route("/invoices", get(invoices::list_invoices))
        .route("/invoices/:id", get(invoices::get_invoice))
        .route(
            "/invoices/sync-payment-status",
            post(invoices::sync_payment_statuses),
        )
        .route("/chart/import", post(chart::import_chart))
        .route("/chart/:template", get(chart::list_chart_accounts));

    // Statements, movements and reconciliation
    let reconciliation_routes = Router::new()
        .route(
            "/bank-accounts/:id/statements",
            post(statements::import_statement),
        )
        .route(
            "/bank-accounts/:id/statement-entries",
            get(statements::list_statement_entries),
        )
        .route(
            "/bank-accounts/:id/movements",
            post(movements::create_movement).get(movements::list_movements),
        )
        .route(
            "/statement-entries/:id/mirror",
            post(movements::mirror_statement_entry),
        )
        .route(
            "/bank-accounts/:id/reconciliations",
            post(reconciliation::create_reconciliation)
                .get(reconciliation::list_reconciliations),
        )
        .route(
            "/reconciliations/:id",
            delete(reconciliation::reverse_reconciliation),
        );

    // Time records and billing closure
    let billing_routes = Router::new()
        .route(
            "/time-records",
            post(billing::create_time_record).get(billing::list_time_records),
        )
        .route(
            "/time-records/:id/approve",
            post(billing::approve_time_record),
        )
        .route(
            "/time-records/:id/reject",
            post(billing::reject_time_record),
        )
        .route("/billing/closures", post(billing::run_closure));

    // Reports
    let report_routes = Router::new().route("/reports/dre", get(reports::dre));

    // Protected API routes
    let api_routes = Router::new()
        .merge(party_routes)
        .merge(ledger_routes)
        .merge(invoice_routes)
        .merge(reconciliation_routes)
        .merge(billing_routes)
        .merge(report_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
