// src/db/rbac_repo.rs

use sqlx::{PgConnection, PgPool};

use crate::common::error::AppError;
use crate::models::rbac::{Permission, Role, RoleWithCount};

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CARGOS
    // =========================================================================

    pub async fn list_roles_with_counts(&self) -> Result<Vec<RoleWithCount>, AppError> {
        let roles = sqlx::query_as::<_, RoleWithCount>(
            r#"
            SELECT r.id, r.name, r.created_at, r.updated_at,
                   COUNT(rp.permission_id) AS permissions_count
            FROM roles r
            LEFT JOIN role_permissions rp ON rp.role_id = r.id
            GROUP BY r.id
            ORDER BY r.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    pub async fn find_role(&self, id: i64) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT id, name, created_at, updated_at FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    pub async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT id, name, created_at, updated_at FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    pub async fn role_permission_names(&self, role_id: i64) -> Result<Vec<String>, AppError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT p.name
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// Devolve `false` quando o cargo já tinha a permissão.
    pub async fn grant_to_role(&self, role_id: i64, permission_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Devolve `false` quando o cargo não tinha a permissão.
    pub async fn revoke_from_role(&self, role_id: i64, permission_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2")
            .bind(role_id)
            .bind(permission_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  PERMISSÕES
    // =========================================================================

    pub async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>("SELECT id, name FROM permissions ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(permissions)
    }

    pub async fn find_permission_by_name(&self, name: &str) -> Result<Option<Permission>, AppError> {
        let permission = sqlx::query_as::<_, Permission>("SELECT id, name FROM permissions WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(permission)
    }

    /// Nomes (dentre `names`) que não existem na tabela de permissões.
    pub async fn unknown_permissions(&self, names: &[String]) -> Result<Vec<String>, AppError> {
        let unknown: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT wanted.name
            FROM unnest($1::text[]) AS wanted(name)
            WHERE NOT EXISTS (SELECT 1 FROM permissions p WHERE p.name = wanted.name)
            "#,
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await?;

        Ok(unknown)
    }

    // =========================================================================
    //  VÍNCULOS DO USUÁRIO
    // =========================================================================

    pub async fn user_role_names(&self, user_id: i64) -> Result<Vec<String>, AppError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// Pares (user_id, cargo) para montar listagens sem N+1.
    pub async fn role_names_for_users(&self, user_ids: &[i64]) -> Result<Vec<(i64, String)>, AppError> {
        let pairs = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT ur.user_id, r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = ANY($1)
            ORDER BY ur.user_id, r.name
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(pairs)
    }

    /// Só as permissões atribuídas diretamente ao usuário.
    pub async fn user_direct_permission_names(&self, user_id: i64) -> Result<Vec<String>, AppError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT p.name
            FROM user_permissions up
            JOIN permissions p ON p.id = up.permission_id
            WHERE up.user_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// Permissões efetivas: diretas + herdadas dos cargos.
    pub async fn user_effective_permission_names(&self, user_id: i64) -> Result<Vec<String>, AppError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT p.name
            FROM user_permissions up
            JOIN permissions p ON p.id = up.permission_id
            WHERE up.user_id = $1
            UNION
            SELECT p.name
            FROM user_roles ur
            JOIN role_permissions rp ON rp.role_id = ur.role_id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// Substitui todos os cargos do usuário.
    pub async fn sync_user_roles(&self, conn: &mut PgConnection, user_id: i64, role_ids: &[i64]) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, unnest($2::bigint[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_ids)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Substitui as permissões diretas do usuário (por nome).
    pub async fn sync_user_permissions(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
        names: &[String],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_permissions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO user_permissions (user_id, permission_id)
            SELECT $1, p.id FROM permissions p WHERE p.name = ANY($2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(names)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
