// src/services/policy.rs
//
// Avaliador central de autorização. Recebe a fotografia do chamador
// (`Caller`) e devolve uma decisão tipada para cada par (habilidade, alvo).
// Handlers e serviços nunca comparam strings de permissão por conta própria.

use crate::{common::error::AppError, models::auth::Caller};

pub mod perms {
    pub const MANAGE_ROLES: &str = "manage-roles";
    pub const MANAGE_PERMS: &str = "manage-perms";
    pub const MANAGE_USERS: &str = "manage-users";
    pub const SEE_USERS: &str = "see-users";
    pub const MANAGE_SERVICE_TYPES: &str = "manage-service-types";
    pub const MANAGE_COMPANIES: &str = "manage-companies";
    pub const SEE_CALL_REPORTS: &str = "see-call-reports";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    ViewAny,
    View,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// Coleção de empresas (listar / criar).
    Companies,
    Company,

    Customers,
    /// Um cliente e as empresas às quais ele está vinculado.
    Customer { linked_companies: &'a [i64] },

    /// Tipos de serviço de uma empresa da rota.
    ServiceTypes { company_id: i64 },
    ServiceType { company_id: i64 },

    /// `None` = listagem global, `Some` = empresa da rota.
    CallReports { company_id: Option<i64> },
    CallReport { company_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::Forbidden(reason.to_string())),
        }
    }
}

const IMMUTABLE_REPORT: &str = "Relatórios de ligação são imutáveis.";
const SUPER_ADMIN_ONLY: &str = "Apenas Super-Admin pode realizar esta ação.";
const OTHER_COMPANY: &str = "Você não tem acesso aos dados desta empresa.";
const NO_CUSTOMER_ACCESS: &str = "Você não tem acesso a este cliente.";
const NO_COMPANY_BOUND: &str = "Seu usuário não está vinculado a nenhuma empresa.";
const MISSING_PERMISSION: &str = "Você não tem a permissão necessária para esta ação.";
const INTAKE_ONLY: &str = "Relatórios só podem ser criados pela integração.";

pub fn authorize(caller: &Caller, ability: Ability, target: Target<'_>) -> Decision {
    // Regra de imutabilidade vem antes do bypass: nem o Super-Admin altera
    // ou apaga um relatório.
    if matches!(target, Target::CallReport { .. } | Target::CallReports { .. })
        && matches!(ability, Ability::Update | Ability::Delete)
    {
        return Decision::Deny(IMMUTABLE_REPORT);
    }

    if caller.is_super_admin() {
        return Decision::Allow;
    }

    match target {
        Target::Companies | Target::Company => Decision::Deny(SUPER_ADMIN_ONLY),

        Target::Customers => match ability {
            Ability::ViewAny => Decision::Allow,
            Ability::Create if caller.company_id.is_some() => Decision::Allow,
            Ability::Create => Decision::Deny(NO_COMPANY_BOUND),
            _ => Decision::Deny(NO_CUSTOMER_ACCESS),
        },

        Target::Customer { linked_companies } => match caller.company_id {
            Some(own) if linked_companies.contains(&own) => Decision::Allow,
            _ => Decision::Deny(NO_CUSTOMER_ACCESS),
        },

        Target::ServiceTypes { company_id } | Target::ServiceType { company_id } => {
            scoped(caller, perms::MANAGE_SERVICE_TYPES, company_id)
        }

        Target::CallReports { company_id: None } => Decision::Deny(SUPER_ADMIN_ONLY),

        Target::CallReports { company_id: Some(company_id) } | Target::CallReport { company_id } => {
            match ability {
                Ability::Create => Decision::Deny(INTAKE_ONLY),
                _ => scoped(caller, perms::SEE_CALL_REPORTS, company_id),
            }
        }
    }
}

/// Permissão nomeada E mesma empresa.
fn scoped(caller: &Caller, permission: &str, company_id: i64) -> Decision {
    if !caller.has_permission(permission) {
        return Decision::Deny(MISSING_PERMISSION);
    }
    if !caller.belongs_to(company_id) {
        return Decision::Deny(OTHER_COMPANY);
    }
    Decision::Allow
}

/// Checagem simples de permissão (rotas de usuários/cargos/permissões).
pub fn require_permission(caller: &Caller, permission: &str) -> Decision {
    if caller.is_super_admin() || caller.has_permission(permission) {
        Decision::Allow
    } else {
        Decision::Deny(MISSING_PERMISSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ABILITIES: [Ability; 5] = [
        Ability::ViewAny,
        Ability::View,
        Ability::Create,
        Ability::Update,
        Ability::Delete,
    ];

    fn caller(roles: &[&str], permissions: &[&str], company_id: Option<i64>) -> Caller {
        Caller {
            user_id: 10,
            company_id,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn super_admin() -> Caller {
        caller(&["Super-Admin"], &[], None)
    }

    fn admin_of(company_id: i64) -> Caller {
        caller(
            &["Admin"],
            &[perms::SEE_USERS, perms::MANAGE_SERVICE_TYPES, perms::SEE_CALL_REPORTS],
            Some(company_id),
        )
    }

    #[test]
    fn super_admin_bypasses_everything_but_report_mutation() {
        let sa = super_admin();
        let linked: [i64; 0] = [];

        let targets = [
            Target::Companies,
            Target::Company,
            Target::Customers,
            Target::Customer { linked_companies: &linked },
            Target::ServiceTypes { company_id: 3 },
            Target::ServiceType { company_id: 3 },
        ];
        for target in targets {
            for ability in ALL_ABILITIES {
                assert!(authorize(&sa, ability, target).is_allowed(), "{:?} {:?}", ability, target);
            }
        }

        for target in [Target::CallReports { company_id: None }, Target::CallReport { company_id: 3 }] {
            assert!(authorize(&sa, Ability::ViewAny, target).is_allowed());
            assert!(authorize(&sa, Ability::View, target).is_allowed());
            assert!(authorize(&sa, Ability::Create, target).is_allowed());
            assert_eq!(authorize(&sa, Ability::Update, target), Decision::Deny(IMMUTABLE_REPORT));
            assert_eq!(authorize(&sa, Ability::Delete, target), Decision::Deny(IMMUTABLE_REPORT));
        }
    }

    #[test]
    fn report_mutation_is_denied_for_every_role() {
        let callers = [super_admin(), admin_of(1), caller(&["Observer"], &[perms::SEE_USERS], Some(1))];
        for c in &callers {
            for ability in [Ability::Update, Ability::Delete] {
                assert!(!authorize(c, ability, Target::CallReport { company_id: 1 }).is_allowed());
            }
        }
    }

    #[test]
    fn company_scoped_resources_need_permission_and_same_company() {
        let admin = admin_of(1);

        assert!(authorize(&admin, Ability::Create, Target::ServiceTypes { company_id: 1 }).is_allowed());
        assert!(authorize(&admin, Ability::Update, Target::ServiceType { company_id: 1 }).is_allowed());
        assert_eq!(
            authorize(&admin, Ability::View, Target::ServiceType { company_id: 2 }),
            Decision::Deny(OTHER_COMPANY)
        );

        assert!(authorize(&admin, Ability::ViewAny, Target::CallReports { company_id: Some(1) }).is_allowed());
        assert!(authorize(&admin, Ability::View, Target::CallReport { company_id: 1 }).is_allowed());
        assert!(!authorize(&admin, Ability::View, Target::CallReport { company_id: 2 }).is_allowed());

        // mesma empresa, mas sem a permissão
        let observer = caller(&["Observer"], &[perms::SEE_USERS], Some(1));
        assert_eq!(
            authorize(&observer, Ability::ViewAny, Target::ServiceTypes { company_id: 1 }),
            Decision::Deny(MISSING_PERMISSION)
        );
        assert!(!authorize(&observer, Ability::View, Target::CallReport { company_id: 1 }).is_allowed());
    }

    #[test]
    fn user_without_company_never_matches_a_company() {
        let floating = caller(&["Admin"], &[perms::MANAGE_SERVICE_TYPES, perms::SEE_CALL_REPORTS], None);
        assert!(!authorize(&floating, Ability::ViewAny, Target::ServiceTypes { company_id: 1 }).is_allowed());
        assert!(!authorize(&floating, Ability::ViewAny, Target::CallReports { company_id: Some(1) }).is_allowed());
        assert_eq!(authorize(&floating, Ability::Create, Target::Customers), Decision::Deny(NO_COMPANY_BOUND));
    }

    #[test]
    fn global_listings_are_super_admin_only() {
        let admin = admin_of(1);
        assert!(!authorize(&admin, Ability::ViewAny, Target::CallReports { company_id: None }).is_allowed());
        assert!(!authorize(&admin, Ability::ViewAny, Target::Companies).is_allowed());
        assert!(!authorize(&admin, Ability::View, Target::Company).is_allowed());
    }

    #[test]
    fn reports_are_never_created_by_dashboard_users() {
        let admin = admin_of(1);
        assert_eq!(
            authorize(&admin, Ability::Create, Target::CallReports { company_id: Some(1) }),
            Decision::Deny(INTAKE_ONLY)
        );
    }

    #[test]
    fn customer_access_follows_company_links() {
        let admin = admin_of(1);
        assert!(authorize(&admin, Ability::ViewAny, Target::Customers).is_allowed());
        assert!(authorize(&admin, Ability::Create, Target::Customers).is_allowed());
        assert!(authorize(&admin, Ability::Delete, Target::Customer { linked_companies: &[1, 2] }).is_allowed());
        assert_eq!(
            authorize(&admin, Ability::View, Target::Customer { linked_companies: &[2] }),
            Decision::Deny(NO_CUSTOMER_ACCESS)
        );
    }

    #[test]
    fn plain_permission_checks_honour_the_super_admin_bypass() {
        assert!(require_permission(&super_admin(), perms::MANAGE_ROLES).is_allowed());
        assert!(require_permission(&admin_of(1), perms::SEE_USERS).is_allowed());
        assert!(!require_permission(&admin_of(1), perms::MANAGE_USERS).is_allowed());
    }

    #[test]
    fn denial_becomes_forbidden_error() {
        let err = Decision::Deny(OTHER_COMPANY).into_result().unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
