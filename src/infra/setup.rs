use crate::{
    adapters::http::app_state::AppState,
    infra::{
        config::AppConfig, error::InfraError, gateway_client::HttpGatewayClient,
        http_client::try_build_client_with_timeout, postgres_persistence,
        signature::ChecksumSigner,
    },
    ports::payment_gateway::PaymentGatewayPort,
    use_cases::{
        orders::OrderUseCases, payment::PaymentRepoTrait, settlement::SettlementEngine,
        verification::VerificationUseCases, webhook::WebhookUseCases,
    },
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    if config.gateway.sandbox_fallback {
        tracing::warn!(
            environment = ?config.gateway.environment,
            "Gateway sandbox fallback is enabled; failed gateway calls will redirect to success"
        );
    }

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);
    let payment_repo_arc = postgres_arc.clone() as Arc<dyn PaymentRepoTrait>;

    let http_client =
        try_build_client_with_timeout(config.gateway.request_timeout).map_err(InfraError::HttpClient)?;
    let signer = ChecksumSigner::new(config.gateway.salt_key.clone(), config.gateway.salt_index);

    let gateway = Arc::new(HttpGatewayClient::new(
        http_client,
        config.gateway.api_base.clone(),
        config.gateway.merchant_id.clone(),
        signer.clone(),
        config.redirect_url(),
        config.webhook_url(),
        config.gateway.require_signed_status,
    )) as Arc<dyn PaymentGatewayPort>;

    let engine = SettlementEngine::new(payment_repo_arc.clone(), config.provider_share_bps);

    let order_use_cases = OrderUseCases::new(
        payment_repo_arc.clone(),
        gateway.clone(),
        config.redirect_url(),
        config.gateway.sandbox_fallback,
    );
    let verification_use_cases =
        VerificationUseCases::new(payment_repo_arc.clone(), gateway, engine.clone());
    let webhook_use_cases = WebhookUseCases::new(payment_repo_arc, engine, signer);

    Ok(AppState {
        config: Arc::new(config),
        order_use_cases: Arc::new(order_use_cases),
        verification_use_cases: Arc::new(verification_use_cases),
        webhook_use_cases: Arc::new(webhook_use_cases),
    })
}

pub fn init_tracing(log_file: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "manas_payments=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs); skipped when the file can't be created
    let json_layer = log_file
        .filter(|path| !path.is_empty())
        .and_then(|path| File::create(path).ok())
        .map(|file| {
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true)
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
