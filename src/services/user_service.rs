// src/services/user_service.rs

use std::collections::HashMap;

use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::{
        user_repo::{NewUser, UserChanges},
        CompanyRepository, RbacRepository, UserRepository,
    },
    models::{
        auth::{Caller, User, SUPER_ADMIN_ROLE},
        rbac::Role,
        user::{CreateUserPayload, UpdateUserPayload, UserDetail, UserResource},
    },
    services::{
        auth::hash_password,
        policy::{perms, require_permission},
    },
};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    rbac_repo: RbacRepository,
    company_repo: CompanyRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(repo: UserRepository, rbac_repo: RbacRepository, company_repo: CompanyRepository, pool: PgPool) -> Self {
        Self { repo, rbac_repo, company_repo, pool }
    }

    pub async fn list(&self, caller: &Caller, request: PageRequest) -> Result<Page<UserResource>, AppError> {
        require_permission(caller, perms::SEE_USERS).into_result()?;

        let page = self.repo.list(request).await?;

        let ids: Vec<i64> = page.items.iter().map(|u| u.id).collect();
        let mut roles: HashMap<i64, Vec<String>> = HashMap::new();
        for (user_id, role) in self.rbac_repo.role_names_for_users(&ids).await? {
            roles.entry(user_id).or_default().push(role);
        }

        Ok(page.map(|user| {
            let user_roles = roles.remove(&user.id).unwrap_or_default();
            UserResource::from(user).with_roles(user_roles)
        }))
    }

    pub async fn show(&self, caller: &Caller, id: i64) -> Result<UserDetail, AppError> {
        require_permission(caller, perms::SEE_USERS).into_result()?;

        let user = self.repo.find_by_id(id).await?.ok_or(AppError::NotFound("Usuário"))?;
        self.detail(user).await
    }

    pub async fn create(&self, caller: &Caller, payload: &CreateUserPayload) -> Result<UserDetail, AppError> {
        require_permission(caller, perms::MANAGE_USERS).into_result()?;

        let role = self.resolve_role(caller, &payload.role).await?;
        if let Some(names) = &payload.permissions {
            self.ensure_permissions_exist(names).await?;
        }
        if let Some(company_id) = payload.company_id {
            self.ensure_company_exists(company_id).await?;
        }

        let password_hash = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;
        let user = self
            .repo
            .create(
                &mut *tx,
                NewUser {
                    name: payload.name.trim(),
                    email: payload.email.trim(),
                    mobile: Some(payload.mobile.trim()),
                    password_hash: &password_hash,
                    company_id: payload.company_id,
                },
            )
            .await?;

        self.rbac_repo.sync_user_roles(&mut *tx, user.id, &[role.id]).await?;
        if let Some(names) = &payload.permissions {
            self.rbac_repo.sync_user_permissions(&mut *tx, user.id, names).await?;
        }
        tx.commit().await?;

        tracing::info!(user_id = user.id, role = %role.name, "Usuário criado");
        self.detail(user).await
    }

    /// `role` substitui todos os cargos; `permissions` substitui as diretas.
    pub async fn update(&self, caller: &Caller, id: i64, payload: &UpdateUserPayload) -> Result<UserDetail, AppError> {
        require_permission(caller, perms::MANAGE_USERS).into_result()?;

        self.load_manageable(caller, id).await?;

        let role = match &payload.role {
            Some(name) => Some(self.resolve_role(caller, name).await?),
            None => None,
        };
        if let Some(names) = &payload.permissions {
            self.ensure_permissions_exist(names).await?;
        }
        if let Some(Some(company_id)) = payload.company_id {
            self.ensure_company_exists(company_id).await?;
        }

        let mut tx = self.pool.begin().await?;
        let user = self
            .repo
            .update(
                &mut *tx,
                id,
                UserChanges {
                    name: payload.name.as_deref().map(str::trim),
                    company_id: payload.company_id,
                },
            )
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;

        if let Some(role) = &role {
            self.rbac_repo.sync_user_roles(&mut *tx, id, &[role.id]).await?;
        }
        if let Some(names) = &payload.permissions {
            self.rbac_repo.sync_user_permissions(&mut *tx, id, names).await?;
        }
        tx.commit().await?;

        self.detail(user).await
    }

    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<(), AppError> {
        require_permission(caller, perms::MANAGE_USERS).into_result()?;

        if caller.user_id == id {
            return Err(AppError::Forbidden("Você não pode remover o próprio usuário.".into()));
        }
        self.load_manageable(caller, id).await?;

        self.repo.delete(id).await?;
        tracing::info!(user_id = id, "Usuário removido");
        Ok(())
    }

    /// Empresa, cargos e permissões diretas do usuário.
    pub async fn detail(&self, user: User) -> Result<UserDetail, AppError> {
        let company = match user.company_id {
            Some(company_id) => self.company_repo.summary(company_id).await?,
            None => None,
        };
        let roles = self.rbac_repo.user_role_names(user.id).await?;
        let permissions = self.rbac_repo.user_direct_permission_names(user.id).await?;

        Ok(UserDetail { user, company, roles, permissions })
    }

    /// Só um Super-Admin mexe em outro Super-Admin.
    async fn load_manageable(&self, caller: &Caller, id: i64) -> Result<User, AppError> {
        let user = self.repo.find_by_id(id).await?.ok_or(AppError::NotFound("Usuário"))?;

        if !caller.is_super_admin() {
            let roles = self.rbac_repo.user_role_names(id).await?;
            if roles.iter().any(|r| r == SUPER_ADMIN_ROLE) {
                return Err(AppError::Forbidden(
                    "Apenas Super-Admin pode alterar um Super-Admin.".into(),
                ));
            }
        }
        Ok(user)
    }

    async fn resolve_role(&self, caller: &Caller, name: &str) -> Result<Role, AppError> {
        let role = self
            .rbac_repo
            .find_role_by_name(name)
            .await?
            .ok_or_else(|| AppError::field("role", "O cargo informado não existe."))?;

        if role.name == SUPER_ADMIN_ROLE && !caller.is_super_admin() {
            return Err(AppError::Forbidden(
                "Apenas Super-Admin pode conceder o cargo Super-Admin.".into(),
            ));
        }
        Ok(role)
    }

    async fn ensure_permissions_exist(&self, names: &[String]) -> Result<(), AppError> {
        let unknown = self.rbac_repo.unknown_permissions(names).await?;
        if unknown.is_empty() {
            return Ok(());
        }
        Err(AppError::field(
            "permissions",
            format!("Permissões inexistentes: {}", unknown.join(", ")),
        ))
    }

    async fn ensure_company_exists(&self, company_id: i64) -> Result<(), AppError> {
        if self.company_repo.find_by_id(company_id).await?.is_none() {
            return Err(AppError::field("company_id", "A empresa informada não existe."));
        }
        Ok(())
    }
}
