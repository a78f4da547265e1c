use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_sweets::MediaConfig;
use domain_users::RolePolicy;

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub jwt: JwtConfig,
    pub media: MediaConfig,
    pub role_policy: RolePolicy,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let mongodb = MongoConfig::from_env()?.with_app_name(env!("CARGO_PKG_NAME"));
        let jwt = JwtConfig::from_env()?;
        let media = MediaConfig::from_env()?;
        let role_policy = RolePolicy::from_env()?;

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            mongodb,
            jwt,
            media,
            role_policy,
        })
    }
}
