pub mod auth;
pub mod call_report;
pub mod company;
pub mod customer;
pub mod rbac;
pub mod service_type;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Distingue campo ausente (`None`) de campo enviado como `null` (`Some(None)`).
/// Usar junto com `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Apara espaços antes da validação, para que "   " caia no `length(min = 1)`.
pub(crate) fn trimmed<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(de).map(|s| s.trim().to_string())
}

/// Como `trimmed`, para campos opcionais. Usar junto com `#[serde(default)]`.
pub(crate) fn trimmed_option<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(|v| v.map(|s| s.trim().to_string()))
}
