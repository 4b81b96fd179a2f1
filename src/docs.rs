// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,

        // --- Call Reports ---
        handlers::call_reports::intake,
        handlers::call_reports::index,
        handlers::call_reports::index_for_company,
        handlers::call_reports::show,
        handlers::call_reports::update,
        handlers::call_reports::destroy,

        // --- Companies ---
        handlers::companies::index,
        handlers::companies::store,
        handlers::companies::show,
        handlers::companies::update,
        handlers::companies::destroy,

        // --- Customers ---
        handlers::customers::index,
        handlers::customers::store,
        handlers::customers::show,
        handlers::customers::update,
        handlers::customers::destroy,

        // --- Service Types ---
        handlers::service_types::index,
        handlers::service_types::store,
        handlers::service_types::show,
        handlers::service_types::update,
        handlers::service_types::destroy,

        // --- Users ---
        handlers::users::index,
        handlers::users::store,
        handlers::users::show,
        handlers::users::update,
        handlers::users::destroy,

        // --- RBAC ---
        handlers::rbac::list_roles,
        handlers::rbac::show_role,
        handlers::rbac::assign_permission,
        handlers::rbac::revoke_permission,
        handlers::rbac::list_permissions,
    ),
    components(
        schemas(
            // --- Paginação ---
            common::pagination::PageLinks,
            common::pagination::PageMeta,

            // --- Auth ---
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MessageResponse,

            // --- Call Reports ---
            models::call_report::CallReportState,
            models::call_report::CallReportResource,
            models::call_report::IntakeProfile,
            models::call_report::IntakePayload,
            models::call_report::IntakeCreated,
            models::call_report::IntakeResponse,

            // --- Companies ---
            models::company::CompanySummary,
            models::company::CompanyResource,
            models::company::CreateCompanyPayload,
            models::company::UpdateCompanyPayload,

            // --- Customers ---
            models::customer::CustomerResource,
            models::customer::CreateCustomerPayload,
            models::customer::UpdateCustomerPayload,

            // --- Service Types ---
            models::service_type::ServiceTypeResource,
            models::service_type::CreateServiceTypePayload,
            models::service_type::UpdateServiceTypePayload,

            // --- Users ---
            models::user::UserResource,
            models::user::CreateUserPayload,
            models::user::UpdateUserPayload,

            // --- RBAC ---
            models::rbac::Role,
            models::rbac::RoleWithCount,
            models::rbac::Permission,
            models::rbac::RoleDetail,
            models::rbac::RolePermissionPayload,
            models::rbac::RolePermissionsResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout e usuário autenticado"),
        (name = "Call Reports", description = "Ingestão e consulta de relatórios de ligação"),
        (name = "Companies", description = "Empresas (somente Super-Admin)"),
        (name = "Customers", description = "Clientes vinculados às empresas"),
        (name = "Service Types", description = "Tipos de serviço por empresa"),
        (name = "Users", description = "Gestão de usuários"),
        (name = "RBAC", description = "Controle de Acesso (Cargos e Permissões)")
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
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        // Segredo estático da automação, também enviado como bearer
        components.add_security_scheme(
            "intake_token",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
