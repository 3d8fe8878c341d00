// src/db/directory_repo.rs
//
// Consultas de leitura sobre as tabelas de diretório (companies e
// projects). O cadastro dessas tabelas pertence a outro serviço; este
// repositório existe só para resolver referências dentro do tenant.

use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::common::error::AppError;

#[derive(Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn company_exists(&self, tenant_id: Uuid, company_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE tenant_id = $1 AND id = $2)",
        )
        .bind(tenant_id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Falha com ProjectNotFound se algum dos ids não resolver dentro do
    /// tenant. Referência cruzada de tenant conta como inexistente, por
    /// isso a resposta nunca distingue os dois casos.
    pub async fn assert_projects_in_tenant(
        &self,
        tenant_id: Uuid,
        project_ids: &[Uuid],
    ) -> Result<(), AppError> {
        if project_ids.is_empty() {
            return Ok(());
        }

        let unique: HashSet<Uuid> = project_ids.iter().copied().collect();
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT id) FROM projects WHERE tenant_id = $1 AND id = ANY($2)",
        )
        .bind(tenant_id)
        .bind(project_ids)
        .fetch_one(&self.pool)
        .await?;

        if found != unique.len() as i64 {
            return Err(AppError::ProjectNotFound);
        }
        Ok(())
    }
}
