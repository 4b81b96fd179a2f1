// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    services::policy::{perms, require_permission},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn name() -> &'static str;
}

/// 2. O Extractor (Guardião). Roda antes do corpo ser lido, então quem não
/// tem a permissão recebe 403 mesmo com um payload inválido.
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // A. Sessão colocada pelo auth_guard
        let AuthenticatedUser(session) = AuthenticatedUser::from_request_parts(parts, state).await?;

        // B. Super-Admin passa direto; os demais precisam da permissão
        require_permission(&session.caller, T::name()).into_result()?;

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermSeeUsers;
impl PermissionDef for PermSeeUsers {
    fn name() -> &'static str { perms::SEE_USERS }
}

pub struct PermManageUsers;
impl PermissionDef for PermManageUsers {
    fn name() -> &'static str { perms::MANAGE_USERS }
}

pub struct PermManageRoles;
impl PermissionDef for PermManageRoles {
    fn name() -> &'static str { perms::MANAGE_ROLES }
}

pub struct PermManagePerms;
impl PermissionDef for PermManagePerms {
    fn name() -> &'static str { perms::MANAGE_PERMS }
}
