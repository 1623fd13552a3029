// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{auth_guard, developer_guard, tenant_guard},
};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/signup", post(handlers::auth::sign_up))
        .route("/login", post(handlers::auth::login))
        .route(
            "/logout",
            post(handlers::auth::logout).layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth_guard,
            )),
        );

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Tudo que pertence a uma empresa cliente; o tenant vem da sessão
    let tenant_routes = Router::new()
        .route(
            "/technicians",
            get(handlers::team::list_technicians).post(handlers::team::create_technician),
        )
        .route(
            "/customers",
            get(handlers::crm::list_customers).post(handlers::crm::create_customer),
        )
        .route(
            "/customers/{id}",
            put(handlers::crm::update_customer).delete(handlers::crm::delete_customer),
        )
        .route(
            "/orders",
            get(handlers::operations::list_orders).post(handlers::operations::create_order),
        )
        .route(
            "/orders/{id}",
            put(handlers::operations::update_order).delete(handlers::operations::delete_order),
        )
        .route(
            "/support/messages",
            get(handlers::support::company_thread).post(handlers::support::send_to_support),
        )
        .route("/notifications", get(handlers::notifications::list_notifications))
        .route("/notifications/{id}/read", post(handlers::notifications::mark_read))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    // Painel do desenvolvedor
    let dev_routes = Router::new()
        .route("/billing/summary", get(handlers::dashboard::billing_summary))
        .route(
            "/companies",
            get(handlers::tenancy::list_companies).post(handlers::tenancy::create_company),
        )
        .route("/companies/expiring", get(handlers::tenancy::expiring_companies))
        .route("/companies/{id}", delete(handlers::tenancy::purge_company))
        .route("/companies/{id}/status", put(handlers::tenancy::update_status))
        .route("/companies/{id}/billing", put(handlers::tenancy::adjust_billing))
        .route("/companies/{id}/settings", put(handlers::tenancy::update_settings))
        .route(
            "/companies/{id}/payments",
            get(handlers::tenancy::billing_detail).post(handlers::tenancy::record_payment),
        )
        .route(
            "/companies/{id}/notifications",
            post(handlers::tenancy::notify_company),
        )
        .route(
            "/support/desk",
            post(handlers::support::mount_desk)
                .get(handlers::support::desk_snapshot)
                .delete(handlers::support::close_desk),
        )
        .route(
            "/support/desk/channel/{company_id}",
            post(handlers::support::select_channel),
        )
        .route("/support/desk/messages", post(handlers::support::send_from_desk))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            developer_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/dev", dev_routes)
        .nest("/api", tenant_routes)
        .with_state(app_state)
}
