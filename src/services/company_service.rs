// src/services/company_service.rs

use std::collections::HashMap;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::{CompanyRepository, ServiceTypeRepository},
    models::{
        auth::Caller,
        company::{CompanyResource, CreateCompanyPayload, UpdateCompanyPayload},
        service_type::ServiceTypeResource,
    },
    services::policy::{authorize, Ability, Target},
};

#[derive(Clone)]
pub struct CompanyService {
    repo: CompanyRepository,
    service_type_repo: ServiceTypeRepository,
}

impl CompanyService {
    pub fn new(repo: CompanyRepository, service_type_repo: ServiceTypeRepository) -> Self {
        Self { repo, service_type_repo }
    }

    /// Listagem paginada, cada empresa com seus tipos de serviço.
    pub async fn list(&self, caller: &Caller, request: PageRequest) -> Result<Page<CompanyResource>, AppError> {
        authorize(caller, Ability::ViewAny, Target::Companies).into_result()?;

        let page = self.repo.list(request).await?;

        let ids: Vec<i64> = page.items.iter().map(|c| c.id).collect();
        let mut by_company: HashMap<i64, Vec<ServiceTypeResource>> = HashMap::new();
        for service_type in self.service_type_repo.list_for_companies(&ids).await? {
            by_company
                .entry(service_type.company_id)
                .or_default()
                .push(service_type.into());
        }

        Ok(page.map(|company| {
            let service_types = by_company.remove(&company.id).unwrap_or_default();
            CompanyResource::from(company).with_service_types(service_types)
        }))
    }

    pub async fn create(&self, caller: &Caller, payload: &CreateCompanyPayload) -> Result<CompanyResource, AppError> {
        authorize(caller, Ability::Create, Target::Companies).into_result()?;

        let company = self.repo.create(payload.name.trim()).await?;
        tracing::info!(company_id = company.id, "Empresa criada");

        Ok(company.into())
    }

    pub async fn show(&self, caller: &Caller, id: i64) -> Result<CompanyResource, AppError> {
        authorize(caller, Ability::View, Target::Company).into_result()?;

        let company = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;

        Ok(company.into())
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: i64,
        payload: &UpdateCompanyPayload,
    ) -> Result<CompanyResource, AppError> {
        authorize(caller, Ability::Update, Target::Company).into_result()?;

        let company = self
            .repo
            .update(id, payload.name.as_deref().map(str::trim))
            .await?
            .ok_or(AppError::NotFound("Empresa"))?;

        Ok(company.into())
    }

    /// Tipos de serviço, clientes vinculados e relatórios vão junto (cascata).
    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<(), AppError> {
        authorize(caller, Ability::Delete, Target::Company).into_result()?;

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Empresa"));
        }
        tracing::info!(company_id = id, "Empresa removida");
        Ok(())
    }
}
