// src/services/call_report_service.rs

use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::{
        call_report_repo::NewCallReport, customer_repo::NewCustomer, CallReportRepository, CompanyRepository,
        CompanyScope, CustomerRepository, ServiceTypeRepository,
    },
    models::{
        auth::Caller,
        call_report::{parse_external_timestamp, CallReportFilters, CallReportResource, IntakeCreated, IntakePayload},
        service_type::ServiceTypeResource,
    },
    services::policy::{authorize, Ability, Target},
};

#[derive(Clone)]
pub struct CallReportService {
    repo: CallReportRepository,
    customer_repo: CustomerRepository,
    company_repo: CompanyRepository,
    service_type_repo: ServiceTypeRepository,
    pool: PgPool,
}

impl CallReportService {
    pub fn new(
        repo: CallReportRepository,
        customer_repo: CustomerRepository,
        company_repo: CompanyRepository,
        service_type_repo: ServiceTypeRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, customer_repo, company_repo, service_type_repo, pool }
    }

    /// Ingestão vinda da automação. Tudo numa transação: cliente, vínculo,
    /// relatório e tipos de serviço entram juntos ou nada entra.
    pub async fn intake(&self, payload: &IntakePayload) -> Result<IntakeCreated, AppError> {
        let called_at = match payload.timestamp.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                parse_external_timestamp(raw).ok_or_else(|| AppError::field("timestamp", "Data/hora inválida."))?,
            ),
        };

        let mut service_type_ids = payload.service_type_ids.clone().unwrap_or_default();
        service_type_ids.sort_unstable();
        service_type_ids.dedup();

        let mut tx = self.pool.begin().await?;

        if !self.company_repo.exists(&mut *tx, payload.company_id).await? {
            return Err(AppError::field("company_id", "A empresa informada não existe."));
        }

        if !service_type_ids.is_empty() {
            let foreign = self
                .service_type_repo
                .foreign_ids(&mut *tx, payload.company_id, &service_type_ids)
                .await?;
            if !foreign.is_empty() {
                return Err(AppError::field(
                    "service_type_ids",
                    format!("Tipos de serviço que não pertencem à empresa: {:?}", foreign),
                ));
            }
        }

        // 1. Cliente global, achado pelo telefone
        let profile = &payload.profile;
        let (customer, created) = self
            .customer_repo
            .find_or_create_by_phone(
                &mut *tx,
                NewCustomer {
                    phone: &profile.phone,
                    name: &profile.name,
                    lastname: profile.lastname.as_deref(),
                    email: profile.email.as_deref(),
                },
            )
            .await?;

        // 2. Vínculo com a empresa (idempotente)
        self.customer_repo.attach(&mut *tx, customer.id, payload.company_id).await?;

        // 3. O relatório, com a data real da ligação quando informada
        let report = self
            .repo
            .create(
                &mut *tx,
                NewCallReport {
                    company_id: payload.company_id,
                    customer_id: customer.id,
                    summary: &payload.text,
                    conversation: &payload.json,
                    metadata: payload.meta.as_ref(),
                    state: payload.state,
                    created_at: called_at,
                },
            )
            .await?;

        // 4. Tipos de serviço
        if !service_type_ids.is_empty() {
            self.repo.attach_service_types(&mut *tx, report.id, &service_type_ids).await?;
        }

        tx.commit().await?;

        tracing::info!(
            call_report_id = report.id,
            company_id = payload.company_id,
            customer_id = customer.id,
            new_customer = created,
            state = %report.state,
            "Relatório de ligação recebido"
        );

        Ok(IntakeCreated { id: report.id })
    }

    /// Listagem global (Super-Admin).
    pub async fn list_all(
        &self,
        caller: &Caller,
        filters: &CallReportFilters,
    ) -> Result<Page<CallReportResource>, AppError> {
        authorize(caller, Ability::ViewAny, Target::CallReports { company_id: None }).into_result()?;

        let scope = CompanyScope::for_caller(caller, None);
        self.list(scope, filters).await
    }

    pub async fn list_for_company(
        &self,
        caller: &Caller,
        company_id: i64,
        filters: &CallReportFilters,
    ) -> Result<Page<CallReportResource>, AppError> {
        if self.company_repo.find_by_id(company_id).await?.is_none() {
            return Err(AppError::NotFound("Empresa"));
        }
        authorize(caller, Ability::ViewAny, Target::CallReports { company_id: Some(company_id) }).into_result()?;

        let scope = CompanyScope::for_caller(caller, Some(company_id));
        self.list(scope, filters).await
    }

    /// Um relatório com cliente, empresa e tipos de serviço.
    pub async fn show(&self, caller: &Caller, id: i64) -> Result<CallReportResource, AppError> {
        let row = self.repo.find_row(id).await?.ok_or(AppError::NotFound("Relatório"))?;
        authorize(caller, Ability::View, Target::CallReport { company_id: row.company_id }).into_result()?;

        let service_types = self
            .service_type_repo
            .list_for_report(row.id)
            .await?
            .into_iter()
            .map(ServiceTypeResource::from)
            .collect();

        Ok(CallReportResource::from(row).with_service_types(service_types))
    }

    /// Relatórios são imutáveis: a rota existe só para responder 403 pelo
    /// avaliador, inclusive para o Super-Admin.
    pub async fn update(&self, caller: &Caller, id: i64) -> Result<(), AppError> {
        self.deny_change(caller, id, Ability::Update).await
    }

    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<(), AppError> {
        self.deny_change(caller, id, Ability::Delete).await
    }

    async fn deny_change(&self, caller: &Caller, id: i64, ability: Ability) -> Result<(), AppError> {
        let row = self.repo.find_row(id).await?.ok_or(AppError::NotFound("Relatório"))?;
        authorize(caller, ability, Target::CallReport { company_id: row.company_id }).into_result()
    }

    async fn list(&self, scope: CompanyScope, filters: &CallReportFilters) -> Result<Page<CallReportResource>, AppError> {
        let request = PageRequest::new(filters.page, filters.per_page);
        let page = self.repo.list(scope, filters, request).await?;
        Ok(page.map(CallReportResource::from))
    }
}
