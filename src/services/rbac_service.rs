// src/services/rbac_service.rs

use crate::common::error::AppError;
use crate::db::RbacRepository;
use crate::models::{
    auth::Caller,
    rbac::{RoleDetail, RolePermissionsResponse, RoleWithCount},
};
use crate::services::policy::{perms, require_permission};

#[derive(Clone)]
pub struct RbacService {
    repo: RbacRepository,
}

impl RbacService {
    pub fn new(repo: RbacRepository) -> Self {
        Self { repo }
    }

    pub async fn list_roles(&self, caller: &Caller) -> Result<Vec<RoleWithCount>, AppError> {
        require_permission(caller, perms::MANAGE_ROLES).into_result()?;
        self.repo.list_roles_with_counts().await
    }

    pub async fn show_role(&self, caller: &Caller, role_id: i64) -> Result<RoleDetail, AppError> {
        require_permission(caller, perms::MANAGE_ROLES).into_result()?;

        let role = self.repo.find_role(role_id).await?.ok_or(AppError::NotFound("Cargo"))?;
        let permissions = self.repo.role_permission_names(role.id).await?;

        Ok(RoleDetail { role: role.name, permissions })
    }

    /// Conceder duas vezes não é erro.
    pub async fn assign_permission(
        &self,
        caller: &Caller,
        role_id: i64,
        permission_name: &str,
    ) -> Result<RolePermissionsResponse, AppError> {
        require_permission(caller, perms::MANAGE_ROLES).into_result()?;

        let role = self.repo.find_role(role_id).await?.ok_or(AppError::NotFound("Cargo"))?;
        let permission = self.find_permission(permission_name).await?;

        self.repo.grant_to_role(role.id, permission.id).await?;
        tracing::info!(role = %role.name, permission = %permission.name, "Permissão concedida ao cargo");

        Ok(RolePermissionsResponse {
            message: "Permissão concedida com sucesso.".into(),
            permissions: self.repo.role_permission_names(role.id).await?,
        })
    }

    /// 400 quando o cargo não tem a permissão.
    pub async fn revoke_permission(
        &self,
        caller: &Caller,
        role_id: i64,
        permission_name: &str,
    ) -> Result<RolePermissionsResponse, AppError> {
        require_permission(caller, perms::MANAGE_ROLES).into_result()?;

        let role = self.repo.find_role(role_id).await?.ok_or(AppError::NotFound("Cargo"))?;
        let permission = self.find_permission(permission_name).await?;

        if !self.repo.revoke_from_role(role.id, permission.id).await? {
            return Err(AppError::BadRequest("O cargo não possui esta permissão.".into()));
        }
        tracing::info!(role = %role.name, permission = %permission.name, "Permissão revogada do cargo");

        Ok(RolePermissionsResponse {
            message: "Permissão revogada com sucesso.".into(),
            permissions: self.repo.role_permission_names(role.id).await?,
        })
    }

    pub async fn list_permission_names(&self, caller: &Caller) -> Result<Vec<String>, AppError> {
        require_permission(caller, perms::MANAGE_PERMS).into_result()?;

        let permissions = self.repo.list_permissions().await?;
        Ok(permissions.into_iter().map(|p| p.name).collect())
    }

    async fn find_permission(&self, name: &str) -> Result<crate::models::rbac::Permission, AppError> {
        self.repo
            .find_permission_by_name(name.trim())
            .await?
            .ok_or_else(|| AppError::field("permission_name", "A permissão informada não existe."))
    }
}
