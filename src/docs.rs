// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::sign_up,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Equipe ---
        handlers::team::list_technicians,
        handlers::team::create_technician,

        // --- CRM ---
        handlers::crm::list_customers,
        handlers::crm::create_customer,
        handlers::crm::update_customer,
        handlers::crm::delete_customer,

        // --- Ordens de serviço ---
        handlers::operations::list_orders,
        handlers::operations::create_order,
        handlers::operations::update_order,
        handlers::operations::delete_order,

        // --- Suporte ---
        handlers::support::company_thread,
        handlers::support::send_to_support,
        handlers::support::mount_desk,
        handlers::support::desk_snapshot,
        handlers::support::select_channel,
        handlers::support::send_from_desk,
        handlers::support::close_desk,

        // --- Avisos ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_read,

        // --- Painel do desenvolvedor ---
        handlers::dashboard::billing_summary,
        handlers::tenancy::list_companies,
        handlers::tenancy::create_company,
        handlers::tenancy::update_status,
        handlers::tenancy::adjust_billing,
        handlers::tenancy::update_settings,
        handlers::tenancy::purge_company,
        handlers::tenancy::expiring_companies,
        handlers::tenancy::billing_detail,
        handlers::tenancy::record_payment,
        handlers::tenancy::notify_company,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::SignUpPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::CreateTechnicianPayload,

            // --- CRM ---
            models::crm::Customer,
            models::crm::CustomerInput,

            // --- Operations ---
            models::operations::OrderStatus,
            models::operations::ServiceOrder,
            models::operations::CreateOrderPayload,
            models::operations::UpdateOrderPayload,

            // --- Suporte ---
            models::support::ChatMessage,
            models::support::SupportChannel,
            models::support::SendMessagePayload,
            models::support::DeskPhase,
            models::support::DeskView,
            handlers::support::DeskSendStatus,
            handlers::support::DeskSendResponse,

            // --- Avisos ---
            models::notifications::Notification,
            models::notifications::NewNotification,

            // --- Tenancy ---
            models::tenancy::PlanTier,
            models::tenancy::BillingCycle,
            models::tenancy::CompanyStatus,
            models::tenancy::CompanySettings,
            models::tenancy::Company,
            models::tenancy::NewCompany,
            models::tenancy::BillingAdjustment,
            models::tenancy::UpdateStatusPayload,

            // --- Cobrança ---
            models::finance::Payment,
            models::finance::NewPayment,
            models::finance::CompanyBillingDetail,
            models::dashboard::BillingSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Cadastro, login e sessão"),
        (name = "Equipe", description = "Técnicos da empresa"),
        (name = "CRM", description = "Clientes da empresa"),
        (name = "Ordens de Serviço", description = "Abertura e acompanhamento de OS"),
        (name = "Suporte", description = "Chat entre empresas e o suporte da plataforma"),
        (name = "Avisos", description = "Notificações enviadas pela plataforma"),
        (name = "Painel do Desenvolvedor", description = "Gestão das empresas clientes e cobrança")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
