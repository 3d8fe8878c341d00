// src/config.rs

use crate::{
    common::i18n::I18nStore,
    db::{
        DirectoryRepository, FinanceRepository, PaymentRepository, ProcurementRepository,
        SaleRepository,
    },
    services::{
        AuthService, PaymentService, ProcurementService, ReconciliationService, SaleService,
    },
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub procurement_service: ProcurementService,
    pub payment_service: PaymentService,
    pub sale_service: SaleService,
    pub reconciliation_service: ReconciliationService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let directory_repo = DirectoryRepository::new(db_pool.clone());
        let procurement_repo = ProcurementRepository::new(db_pool.clone());
        let payment_repo = PaymentRepository::new(db_pool.clone());
        let sale_repo = SaleRepository::new(db_pool.clone());
        let finance_repo = FinanceRepository::new(db_pool.clone());

        let auth_service = AuthService::new(jwt_secret);
        let procurement_service = ProcurementService::new(
            procurement_repo.clone(),
            directory_repo.clone(),
            payment_repo.clone(),
            db_pool.clone(),
        );
        let payment_service = PaymentService::new(payment_repo, procurement_repo);
        let sale_service = SaleService::new(sale_repo, directory_repo);
        let reconciliation_service = ReconciliationService::new(finance_repo);

        Ok(Self {
            db_pool,
            i18n_store: I18nStore::new(),
            auth_service,
            procurement_service,
            payment_service,
            sale_service,
            reconciliation_service,
        })
    }
}
