// src/models/call_report.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::{
    common::pagination::empty_string_as_none,
    models::{
        company::{Company, CompanyResource},
        customer::{Customer, CustomerResource},
        service_type::ServiceTypeResource,
    },
};

// --- ENUMS ---

// Mapeia o CREATE TYPE call_report_state do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "call_report_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CallReportState {
    Confirmed,
    Failed,
    Unfinished,
}

impl CallReportState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallReportState::Confirmed => "confirmed",
            CallReportState::Failed => "failed",
            CallReportState::Unfinished => "unfinished",
        }
    }
}

impl fmt::Display for CallReportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallReportState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(CallReportState::Confirmed),
            "failed" => Ok(CallReportState::Failed),
            "unfinished" => Ok(CallReportState::Unfinished),
            other => Err(format!(
                "estado inválido '{}': use confirmed, failed ou unfinished",
                other
            )),
        }
    }
}

// --- RELATÓRIO ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CallReport {
    pub id: i64,
    pub company_id: i64,
    pub customer_id: i64,
    pub summary: String,
    // Documentos livres: o formato é definido pela automação
    pub conversation: Value,
    pub metadata: Option<Value>,
    pub state: CallReportState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Linha da listagem: relatório + cliente + empresa num único SELECT.
#[derive(Debug, Clone, FromRow)]
pub struct CallReportRow {
    pub id: i64,
    pub company_id: i64,
    pub customer_id: i64,
    pub summary: String,
    pub conversation: Value,
    pub metadata: Option<Value>,
    pub state: CallReportState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub customer_phone: String,
    pub customer_name: String,
    pub customer_lastname: Option<String>,
    pub customer_email: Option<String>,
    pub customer_created_at: DateTime<Utc>,
    pub customer_updated_at: DateTime<Utc>,

    pub company_name: String,
    pub company_created_at: DateTime<Utc>,
    pub company_updated_at: DateTime<Utc>,
}

impl CallReportRow {
    pub fn into_parts(self) -> (CallReport, Customer, Company) {
        let customer = Customer {
            id: self.customer_id,
            phone: self.customer_phone,
            name: self.customer_name,
            lastname: self.customer_lastname,
            email: self.customer_email,
            created_at: self.customer_created_at,
            updated_at: self.customer_updated_at,
        };
        let company = Company {
            id: self.company_id,
            name: self.company_name,
            created_at: self.company_created_at,
            updated_at: self.company_updated_at,
        };
        let report = CallReport {
            id: self.id,
            company_id: self.company_id,
            customer_id: self.customer_id,
            summary: self.summary,
            conversation: self.conversation,
            metadata: self.metadata,
            state: self.state,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        (report, customer, company)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CallReportResource {
    pub id: i64,
    pub summary: String,
    #[schema(value_type = Object)]
    pub conversation: Value,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
    pub state: CallReportState,
    /// Momento da ligação (created_at, possivelmente retroativo).
    pub called_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyResource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerResource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_types: Option<Vec<ServiceTypeResource>>,
}

impl From<CallReport> for CallReportResource {
    fn from(report: CallReport) -> Self {
        Self {
            id: report.id,
            summary: report.summary,
            conversation: report.conversation,
            metadata: report.metadata,
            state: report.state,
            called_at: report.created_at,
            company: None,
            customer: None,
            service_types: None,
        }
    }
}

impl From<CallReportRow> for CallReportResource {
    fn from(row: CallReportRow) -> Self {
        let (report, customer, company) = row.into_parts();
        CallReportResource::from(report)
            .with_customer(customer)
            .with_company(company)
    }
}

impl CallReportResource {
    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customer = Some(customer.into());
        self
    }

    pub fn with_company(mut self, company: Company) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_service_types(mut self, service_types: Vec<ServiceTypeResource>) -> Self {
        self.service_types = Some(service_types);
        self
    }
}

// --- INGESTÃO (payload enviado pela automação) ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct IntakeProfile {
    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(length(min = 1, max = 255, message = "O telefone é obrigatório (máx. 255)."))]
    #[schema(example = "5511999998888")]
    pub phone: String,

    #[serde(deserialize_with = "crate::models::trimmed")]
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório (máx. 255)."))]
    #[schema(example = "Maria")]
    pub name: String,

    #[validate(length(max = 255))]
    pub lastname: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."), length(max = 255))]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct IntakePayload {
    #[validate(range(min = 1, message = "company_id inválido."))]
    pub company_id: i64,

    #[validate(nested)]
    pub profile: IntakeProfile,

    #[validate(length(min = 1, message = "O resumo (text) é obrigatório."))]
    pub text: String,

    /// A conversa completa (objeto ou lista).
    #[validate(custom(function = "validate_document"))]
    #[schema(value_type = Object)]
    pub json: Value,

    #[validate(custom(function = "validate_document"))]
    #[schema(value_type = Option<Object>)]
    pub meta: Option<Value>,

    pub state: CallReportState,

    /// Quando a ligação realmente aconteceu. Aceita RFC 3339,
    /// "YYYY-MM-DD HH:MM:SS" (UTC) ou "YYYY-MM-DD".
    #[validate(custom(function = "validate_timestamp"))]
    #[schema(example = "2025-11-05T14:30:00Z")]
    pub timestamp: Option<String>,

    pub service_type_ids: Option<Vec<i64>>,
}

fn validate_document(value: &Value) -> Result<(), ValidationError> {
    if value.is_object() || value.is_array() {
        return Ok(());
    }
    let mut err = ValidationError::new("document");
    err.message = Some("Deve ser um objeto ou uma lista JSON.".into());
    Err(err)
}

fn validate_timestamp(value: &str) -> Result<(), ValidationError> {
    if parse_external_timestamp(value).is_some() {
        return Ok(());
    }
    let mut err = ValidationError::new("date");
    err.message = Some("Data/hora inválida.".into());
    Err(err)
}

/// Interpreta o timestamp enviado pela automação. Sem fuso explícito, é UTC.
pub fn parse_external_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IntakeCreated {
    pub id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IntakeResponse {
    pub message: String,
    pub data: IntakeCreated,
}

// --- FILTROS DA LISTAGEM ---

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
pub struct CallReportFilters {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub per_page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<CallReportState>)]
    pub state: Option<CallReportState>,
    /// Inclusivo (compara só a data de criação).
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<String>)]
    pub date_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<String>)]
    pub date_to: Option<NaiveDate>,
    /// Busca no resumo e no telefone/nome/e-mail do cliente.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn intake(json_doc: Value, meta: Option<Value>, timestamp: Option<&str>) -> IntakePayload {
        IntakePayload {
            company_id: 1,
            profile: IntakeProfile {
                phone: "5511999998888".into(),
                name: "Maria".into(),
                lastname: None,
                email: Some("maria@x.com".into()),
            },
            text: "Cliente agendou corte".into(),
            json: json_doc,
            meta,
            state: CallReportState::Confirmed,
            timestamp: timestamp.map(str::to_string),
            service_type_ids: None,
        }
    }

    #[test]
    fn timestamps_in_common_formats_are_parsed_as_utc() {
        let expected = Utc.with_ymd_and_hms(2025, 11, 5, 14, 30, 0).unwrap();

        assert_eq!(parse_external_timestamp("2025-11-05T14:30:00Z"), Some(expected));
        assert_eq!(parse_external_timestamp("2025-11-05T11:30:00-03:00"), Some(expected));
        assert_eq!(parse_external_timestamp("2025-11-05 14:30:00"), Some(expected));
        assert_eq!(parse_external_timestamp("2025-11-05T14:30:00.000"), Some(expected));
        assert_eq!(
            parse_external_timestamp("2025-11-05"),
            Some(Utc.with_ymd_and_hms(2025, 11, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_external_timestamp("ontem à tarde"), None);
    }

    #[test]
    fn intake_requires_structured_documents() {
        assert!(intake(json!([{"role": "agent"}]), None, None).validate().is_ok());
        assert!(intake(json!({"turns": []}), Some(json!({"duration": 42})), None).validate().is_ok());
        assert!(intake(json!("texto solto"), None, None).validate().is_err());
        assert!(intake(json!({}), Some(json!(3)), None).validate().is_err());
    }

    #[test]
    fn intake_rejects_unparseable_timestamp() {
        assert!(intake(json!({}), None, Some("2025-11-05 14:30:00")).validate().is_ok());
        assert!(intake(json!({}), None, Some("amanhã")).validate().is_err());
    }

    #[test]
    fn state_parses_only_known_values() {
        assert_eq!("failed".parse::<CallReportState>(), Ok(CallReportState::Failed));
        assert!("cancelled".parse::<CallReportState>().is_err());

        let state: CallReportState = serde_json::from_str("\"unfinished\"").unwrap();
        assert_eq!(state, CallReportState::Unfinished);
    }
}
