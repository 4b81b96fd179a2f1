pub mod call_report_repo;
pub use call_report_repo::CallReportRepository;
pub mod company_repo;
pub use company_repo::CompanyRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod rbac_repo;
pub use rbac_repo::RbacRepository;
pub mod service_type_repo;
pub use service_type_repo::ServiceTypeRepository;
pub mod user_repo;
pub use user_repo::UserRepository;

use crate::models::auth::Caller;

/// Recorte por empresa aplicado às listagens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyScope {
    /// Sem filtro (Super-Admin sem empresa na rota).
    Unrestricted,
    Only(i64),
    /// Usuário comum sem empresa: não vê nada.
    Nothing,
}

impl CompanyScope {
    /// `route_company` é a empresa nomeada na URL, quando houver. Para quem
    /// não é Super-Admin, a empresa do próprio usuário sempre prevalece.
    pub fn for_caller(caller: &Caller, route_company: Option<i64>) -> Self {
        if caller.is_super_admin() {
            return route_company.map_or(CompanyScope::Unrestricted, CompanyScope::Only);
        }
        match caller.company_id {
            Some(own) => CompanyScope::Only(own),
            None => CompanyScope::Nothing,
        }
    }
}
