// src/common/db_utils.rs

use sqlx::{Postgres, QueryBuilder};

use crate::common::error::AppError;

/// Constraint UNIQUE do banco -> campo e mensagem que o cliente recebe (422).
pub(crate) type UniqueField = (&'static str, &'static str, &'static str);

// ---
// Helper de unicidade: traduz violações de UNIQUE em erros de validação
// ---
/// Se `err` for uma violação de UNIQUE conhecida, devolve o 422 do campo.
/// Qualquer outro erro segue como erro de banco (500).
pub(crate) fn map_unique_violation(err: sqlx::Error, fields: &[UniqueField]) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            if let Some((_, field, message)) = fields.iter().find(|(c, _, _)| *c == constraint) {
                return AppError::field(*field, *message);
            }
        }
    }
    err.into()
}

/// Escapa `%`, `_` e `\` para que o termo seja procurado literalmente no ILIKE.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Empurra `(col1 ILIKE $n OR col2 ILIKE $n ...)` reutilizando o mesmo termo.
pub(crate) fn push_search<'a>(qb: &mut QueryBuilder<'a, Postgres>, columns: &[&str], term: &str) {
    let pattern = like_pattern(term);
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
    }
    qb.push(")");
}
