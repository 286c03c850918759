use std::sync::Arc;

use commipay_core::{
    analytics::{AnalyticsService, AnalyticsServiceTrait},
    committees::{CommitteeService, CommitteeServiceTrait},
    installments::{InstallmentService, InstallmentServiceTrait},
    members::{MemberService, MemberServiceTrait},
};
use commipay_storage_sqlite::{
    analytics::AnalyticsRepository, committees::CommitteeRepository, db,
    installments::InstallmentRepository, members::MemberRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    auth::AuthManager,
    config::{Config, LogFormat},
};

pub struct AppState {
    pub committee_service: Arc<dyn CommitteeServiceTrait>,
    pub installment_service: Arc<dyn InstallmentServiceTrait>,
    pub analytics_service: Arc<dyn AnalyticsServiceTrait>,
    pub member_service: Arc<dyn MemberServiceTrait>,
    pub auth: Arc<AuthManager>,
}

pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let member_repository = Arc::new(MemberRepository::new(pool.clone(), writer.clone()));
    let committee_repository = Arc::new(CommitteeRepository::new(pool.clone(), writer.clone()));
    let installment_repository = Arc::new(InstallmentRepository::new(pool.clone(), writer.clone()));
    let analytics_repository = Arc::new(AnalyticsRepository::new(pool.clone()));

    let member_service = Arc::new(MemberService::new(member_repository));
    let committee_service = Arc::new(CommitteeService::new(committee_repository.clone()));
    let installment_service = Arc::new(InstallmentService::new(
        installment_repository,
        committee_repository,
    ));
    let analytics_service = Arc::new(AnalyticsService::new(analytics_repository));

    Ok(Arc::new(AppState {
        committee_service,
        installment_service,
        analytics_service,
        member_service,
        auth: Arc::new(AuthManager::new(&config.jwt_secret)),
    }))
}
