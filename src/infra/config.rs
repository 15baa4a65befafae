use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

use crate::{
    domain::entities::settlement::{BPS_SCALE, DEFAULT_PROVIDER_SHARE_BPS},
    infra::error::InfraError,
};

pub const SANDBOX_API_BASE: &str = "https://api-preprod.phonepe.com/apis/pg-sandbox";
pub const PRODUCTION_API_BASE: &str = "https://api.phonepe.com/apis/hermes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEnvironment {
    Sandbox,
    Production,
}

impl GatewayEnvironment {
    pub fn default_api_base(&self) -> &'static str {
        match self {
            GatewayEnvironment::Sandbox => SANDBOX_API_BASE,
            GatewayEnvironment::Production => PRODUCTION_API_BASE,
        }
    }
}

impl std::str::FromStr for GatewayEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sandbox" | "uat" | "test" => Ok(GatewayEnvironment::Sandbox),
            "production" | "prod" | "live" => Ok(GatewayEnvironment::Production),
            _ => Err(format!("Invalid gateway environment: {}", s)),
        }
    }
}

pub struct GatewayConfig {
    pub environment: GatewayEnvironment,
    pub api_base: String,
    pub merchant_id: String,
    pub salt_key: SecretString,
    pub salt_index: u32,
    pub request_timeout: Duration,
    /// Sends the browser to a local success redirect when the gateway is down.
    /// Refused in production by `AppConfig::validate`.
    pub sandbox_fallback: bool,
    /// Rejects status responses that carry no `X-VERIFY` header.
    pub require_signed_status: bool,
}

pub struct AppConfig {
    pub jwt_secret: SecretString,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// Public base of this API, used for the gateway callback URL.
    pub api_base_url: Url,
    /// Public base of the web app, used for the browser redirect.
    pub app_base_url: Url,
    pub gateway: GatewayConfig,
    pub provider_share_bps: i64,
    pub log_file: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());

        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));
        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3001)),
        );
        let database_url: String = get_env("DATABASE_URL");
        let api_base_url = parse_url(
            "API_BASE_URL",
            get_env_default("API_BASE_URL", String::from("http://localhost:3001")),
        )?;
        let app_base_url = parse_url(
            "APP_BASE_URL",
            get_env_default("APP_BASE_URL", String::from("http://localhost:3000")),
        )?;

        let environment: GatewayEnvironment =
            get_env_default("GATEWAY_ENV", GatewayEnvironment::Sandbox);
        let api_base: String = get_env_default(
            "GATEWAY_API_BASE",
            environment.default_api_base().to_string(),
        );
        let merchant_id: String = get_env_default("GATEWAY_MERCHANT_ID", "PGTESTPAYUAT".to_string());
        let salt_key = SecretString::new(get_env::<String>("GATEWAY_SALT_KEY").into());
        let salt_index: u32 = get_env_default("GATEWAY_SALT_INDEX", 1);
        let timeout_secs: u64 = get_env_default("GATEWAY_TIMEOUT_SECS", 30);
        // Off unless explicitly enabled for sandbox testing.
        let sandbox_fallback: bool = get_env_default("GATEWAY_SANDBOX_FALLBACK", false);
        let require_signed_status: bool = get_env_default("GATEWAY_REQUIRE_SIGNED_STATUS", false);

        let provider_share_bps: i64 =
            get_env_default("SETTLEMENT_PROVIDER_SHARE_BPS", DEFAULT_PROVIDER_SHARE_BPS);
        let log_file: String = get_env_default("LOG_FILE", "app.log".to_string());

        Ok(Self {
            jwt_secret,
            cors_origin,
            bind_addr,
            database_url,
            api_base_url,
            app_base_url,
            gateway: GatewayConfig {
                environment,
                api_base: api_base.trim_end_matches('/').to_string(),
                merchant_id,
                salt_key,
                salt_index,
                request_timeout: Duration::from_secs(timeout_secs),
                sandbox_fallback,
                require_signed_status,
            },
            provider_share_bps,
            log_file,
        })
    }

    pub fn validate(&self) -> Result<(), InfraError> {
        if self.gateway.sandbox_fallback
            && self.gateway.environment == GatewayEnvironment::Production
        {
            return Err(InfraError::ConfigInvalid(
                "GATEWAY_SANDBOX_FALLBACK cannot be enabled with GATEWAY_ENV=production".into(),
            ));
        }
        if !(0..=BPS_SCALE).contains(&self.provider_share_bps) {
            return Err(InfraError::ConfigInvalid(format!(
                "SETTLEMENT_PROVIDER_SHARE_BPS must be between 0 and {}",
                BPS_SCALE
            )));
        }
        Ok(())
    }

    /// Where the gateway posts payment notifications.
    pub fn webhook_url(&self) -> String {
        format!(
            "{}/api/v1/payment/webhook",
            self.api_base_url.as_str().trim_end_matches('/')
        )
    }

    /// Where the gateway sends the browser after payment.
    pub fn redirect_url(&self) -> String {
        format!(
            "{}/payment/callback",
            self.app_base_url.as_str().trim_end_matches('/')
        )
    }
}

fn parse_url(key: &str, raw: String) -> Result<Url, InfraError> {
    Url::parse(&raw).map_err(|e| InfraError::ConfigInvalid(format!("{key} is not a valid URL: {e}")))
}
