// src/services/service_type_service.rs

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::{CompanyRepository, ServiceTypeRepository},
    models::{
        auth::Caller,
        service_type::{CreateServiceTypePayload, ServiceType, ServiceTypeResource, UpdateServiceTypePayload},
    },
    services::policy::{authorize, Ability, Target},
};

#[derive(Clone)]
pub struct ServiceTypeService {
    repo: ServiceTypeRepository,
    company_repo: CompanyRepository,
}

impl ServiceTypeService {
    pub fn new(repo: ServiceTypeRepository, company_repo: CompanyRepository) -> Self {
        Self { repo, company_repo }
    }

    pub async fn list_for_company(
        &self,
        caller: &Caller,
        company_id: i64,
        request: PageRequest,
    ) -> Result<Page<ServiceTypeResource>, AppError> {
        self.ensure_company(company_id).await?;
        authorize(caller, Ability::ViewAny, Target::ServiceTypes { company_id }).into_result()?;

        let page = self.repo.list_for_company(company_id, request).await?;
        Ok(page.map(ServiceTypeResource::from))
    }

    pub async fn create(
        &self,
        caller: &Caller,
        company_id: i64,
        payload: &CreateServiceTypePayload,
    ) -> Result<ServiceTypeResource, AppError> {
        self.ensure_company(company_id).await?;
        authorize(caller, Ability::Create, Target::ServiceTypes { company_id }).into_result()?;

        let service_type = self.repo.create(company_id, payload.name.trim()).await?;
        tracing::info!(service_type_id = service_type.id, company_id, "Tipo de serviço criado");

        Ok(service_type.into())
    }

    pub async fn show(&self, caller: &Caller, id: i64) -> Result<ServiceTypeResource, AppError> {
        let service_type = self.load_authorized(caller, Ability::View, id).await?;
        Ok(service_type.into())
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: i64,
        payload: &UpdateServiceTypePayload,
    ) -> Result<ServiceTypeResource, AppError> {
        self.load_authorized(caller, Ability::Update, id).await?;

        let service_type = self
            .repo
            .update(id, payload.name.as_deref().map(str::trim))
            .await?
            .ok_or(AppError::NotFound("Tipo de serviço"))?;

        Ok(service_type.into())
    }

    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<(), AppError> {
        self.load_authorized(caller, Ability::Delete, id).await?;
        self.repo.delete(id).await?;
        Ok(())
    }

    async fn ensure_company(&self, company_id: i64) -> Result<(), AppError> {
        if self.company_repo.find_by_id(company_id).await?.is_none() {
            return Err(AppError::NotFound("Empresa"));
        }
        Ok(())
    }

    async fn load_authorized(&self, caller: &Caller, ability: Ability, id: i64) -> Result<ServiceType, AppError> {
        let service_type = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Tipo de serviço"))?;

        authorize(caller, ability, Target::ServiceType { company_id: service_type.company_id }).into_result()?;
        Ok(service_type)
    }
}
