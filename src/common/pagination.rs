// src/common/pagination.rs

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PER_PAGE: u32 = 15;
pub const MAX_PER_PAGE: u32 = 100;

/// Trata `?campo=` (string vazia) como ausente, igual ao `!empty()` do painel.
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s).map_err(de::Error::custom).map(Some),
    }
}

/// Página solicitada, já normalizada (page >= 1, 1 <= per_page <= MAX_PER_PAGE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// O que os repositórios devolvem: os itens da página e o total geral.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageLinks {
    pub first: Option<String>,
    pub last: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageMeta {
    pub current_page: u32,
    pub from: Option<u64>,
    pub last_page: u32,
    pub path: String,
    pub per_page: u32,
    pub to: Option<u64>,
    pub total: u64,
}

/// Envelope de listagem: `{ data, links, meta }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub links: PageLinks,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    /// Monta o envelope. `path` e `query` vêm da URI original da requisição,
    /// e a query string é repetida nos links (só `page` muda).
    pub fn from_page(page: Page<T>, path: &str, query: Option<&str>) -> Self {
        let per_page = page.request.per_page;
        let current_page = page.request.page;
        let total = page.total.max(0) as u64;

        let last_page = if total == 0 {
            1
        } else {
            total.div_ceil(u64::from(per_page)) as u32
        };

        let count = page.items.len() as u64;
        let (from, to) = if count == 0 {
            (None, None)
        } else {
            let from = u64::from(current_page - 1) * u64::from(per_page) + 1;
            (Some(from), Some(from + count - 1))
        };

        let link = |n: u32| Some(page_url(path, query, n));

        Self {
            links: PageLinks {
                first: link(1),
                last: link(last_page),
                prev: if current_page > 1 { link(current_page - 1) } else { None },
                next: if current_page < last_page { link(current_page + 1) } else { None },
            },
            meta: PageMeta {
                current_page,
                from,
                last_page,
                path: path.to_string(),
                per_page,
                to,
                total,
            },
            data: page.items,
        }
    }
}

pub fn page_url(path: &str, query: Option<&str>, page: u32) -> String {
    let mut pairs: Vec<&str> = query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some("page"))
        .collect();

    let page_pair = format!("page={}", page);
    pairs.push(&page_pair);

    format!("{}?{}", path, pairs.join("&"))
}
