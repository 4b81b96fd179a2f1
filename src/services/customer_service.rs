// src/services/customer_service.rs

use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::{
        customer_repo::{CustomerChanges, NewCustomer},
        CompanyRepository, CompanyScope, CustomerRepository,
    },
    models::{
        auth::Caller,
        customer::{CreateCustomerPayload, Customer, CustomerFilters, CustomerResource, UpdateCustomerPayload},
    },
    services::policy::{authorize, Ability, Target},
};

/// O que a remoção de fato fez.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerRemoval {
    /// Linha apagada (Super-Admin).
    Deleted,
    /// Apenas o vínculo com a empresa de quem chamou foi desfeito.
    Detached,
}

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    company_repo: CompanyRepository,
    pool: PgPool,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository, company_repo: CompanyRepository, pool: PgPool) -> Self {
        Self { repo, company_repo, pool }
    }

    pub async fn list(&self, caller: &Caller, filters: &CustomerFilters) -> Result<Page<CustomerResource>, AppError> {
        authorize(caller, Ability::ViewAny, Target::Customers).into_result()?;

        let scope = CompanyScope::for_caller(caller, None);
        let request = PageRequest::new(filters.page, filters.per_page);
        let page = self.repo.list(scope, filters.search.as_deref(), request).await?;

        Ok(page.map(CustomerResource::from))
    }

    /// Super-Admin escolhe as empresas (`company_ids`); os demais vinculam
    /// o cliente à própria empresa.
    pub async fn create(&self, caller: &Caller, payload: &CreateCustomerPayload) -> Result<CustomerResource, AppError> {
        authorize(caller, Ability::Create, Target::Customers).into_result()?;

        let company_ids: Vec<i64> = if caller.is_super_admin() {
            let ids = payload.company_ids.clone().unwrap_or_default();
            let missing = self.company_repo.missing_ids(&ids).await?;
            if !missing.is_empty() {
                return Err(AppError::field(
                    "company_ids",
                    format!("Empresas inexistentes: {:?}", missing),
                ));
            }
            ids
        } else {
            caller.company_id.into_iter().collect()
        };

        let mut tx = self.pool.begin().await?;

        let customer = self
            .repo
            .create(
                &mut *tx,
                NewCustomer {
                    phone: &payload.phone,
                    name: &payload.name,
                    lastname: payload.lastname.as_deref(),
                    email: payload.email.as_deref(),
                },
            )
            .await?;

        if !company_ids.is_empty() {
            self.repo.attach_many(&mut *tx, customer.id, &company_ids).await?;
        }

        tx.commit().await?;
        tracing::info!(customer_id = customer.id, companies = ?company_ids, "Cliente criado");

        Ok(customer.into())
    }

    pub async fn show(&self, caller: &Caller, id: i64) -> Result<CustomerResource, AppError> {
        let customer = self.load_authorized(caller, Ability::View, id).await?;
        Ok(customer.into())
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: i64,
        payload: &UpdateCustomerPayload,
    ) -> Result<CustomerResource, AppError> {
        payload.validate_nullable_fields()?;
        self.load_authorized(caller, Ability::Update, id).await?;

        let changes = CustomerChanges {
            name: payload.name.as_deref().map(str::trim),
            lastname: payload.lastname.as_ref().map(|v| v.as_deref()),
            phone: payload.phone.as_deref().map(str::trim),
            email: payload.email.as_ref().map(|v| v.as_deref()),
        };

        let customer = self
            .repo
            .update(id, changes)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;

        Ok(customer.into())
    }

    /// Super-Admin apaga o cliente; os demais só desfazem o vínculo com a
    /// própria empresa, preservando o cliente e os vínculos com outras empresas.
    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<CustomerRemoval, AppError> {
        self.load_authorized(caller, Ability::Delete, id).await?;

        if caller.is_super_admin() {
            self.repo.delete(id).await?;
            tracing::info!(customer_id = id, "Cliente removido");
            return Ok(CustomerRemoval::Deleted);
        }

        // load_authorized garante que há empresa e vínculo
        if let Some(company_id) = caller.company_id {
            self.repo.detach(id, company_id).await?;
            tracing::info!(customer_id = id, company_id, "Cliente desvinculado da empresa");
        }
        Ok(CustomerRemoval::Detached)
    }

    async fn load_authorized(&self, caller: &Caller, ability: Ability, id: i64) -> Result<Customer, AppError> {
        let customer = self.repo.find_by_id(id).await?.ok_or(AppError::NotFound("Cliente"))?;

        let linked = if caller.is_super_admin() {
            Vec::new()
        } else {
            self.repo.company_ids(id).await?
        };
        authorize(caller, ability, Target::Customer { linked_companies: &linked }).into_result()?;

        Ok(customer)
    }
}
