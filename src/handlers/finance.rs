// src/handlers/finance.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermFinanceRead, RequirePermission},
        tenancy::TenantContext,
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntriesQuery {
    pub project_id: Option<Uuid>,
}

/// Razão financeiro por projeto: despesas rateadas, frações de pagamento
/// e vendas, já consolidadas por projeto.
#[utoipa::path(
    get,
    path = "/api/finance/project-entries",
    tag = "Finance",
    params(
        ("projectId" = Option<Uuid>, Query, description = "Restringe o razão a um projeto; sem ele, vendas entram no balde sem projeto")
    ),
    responses(
        (status = 200, description = "Lançamentos e resumos por projeto", body = crate::models::finance::ProjectEntriesReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn project_entries(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceRead>,
    Query(query): Query<ProjectEntriesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .reconciliation_service
        .project_entries(tenant.0, query.project_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}
