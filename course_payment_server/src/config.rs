use std::{collections::HashMap, env, io::Write, str::FromStr};

use cpg_common::{Secret, UsdAmount};
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use payment_providers::{MercadoPagoConfig, PayPalConfig};
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_CPS_HOST: &str = "127.0.0.1";
const DEFAULT_CPS_PORT: u16 = 4000;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/cpg_store.db";
const DEFAULT_COURSE_PRICE: &str = "19.99";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub environment: RuntimeEnv,
    pub auth: AuthConfig,
    pub paypal: PayPalConfig,
    pub mercado_pago: MercadoPagoConfig,
    pub catalog: CourseCatalog,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CPS_HOST.to_string(),
            port: DEFAULT_CPS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            environment: RuntimeEnv::Development,
            auth: AuthConfig::default(),
            paypal: PayPalConfig::default(),
            mercado_pago: MercadoPagoConfig::default(),
            catalog: CourseCatalog::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RuntimeEnv {
    #[default]
    Development,
    Production,
}

impl RuntimeEnv {
    pub fn from_env() -> Self {
        match env::var("APP_ENV").map(|s| s.to_lowercase()) {
            Ok(s) if s == "production" || s == "prod" => Self::Production,
            _ => Self::Development,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    /// Builds the configuration from the environment. Most values fall back to sensible
    /// development defaults, but a missing token-signing secret in production mode is a hard
    /// startup error rather than something to limp along without.
    pub fn from_env_or_default() -> Result<Self, ServerError> {
        let environment = RuntimeEnv::from_env();
        let host = env::var("HOST").ok().unwrap_or_else(|| DEFAULT_CPS_HOST.into());
        let port = env::var("PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for PORT. {e} Using the default, {DEFAULT_CPS_PORT}, instead.");
                    DEFAULT_CPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CPS_PORT);
        let database_url = env::var("DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = match AuthConfig::try_from_env() {
            Ok(auth) => auth,
            Err(e) if environment == RuntimeEnv::Production => {
                error!("🚨️ Refusing to start in production without a token-signing secret. {e}");
                return Err(e);
            },
            Err(e) => {
                warn!(
                    "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting \
                     to a randomly generated session secret."
                );
                AuthConfig::default()
            },
        };
        let paypal = PayPalConfig::new_from_env_or_default();
        let mercado_pago = MercadoPagoConfig::new_from_env_or_default();
        let catalog = CourseCatalog::from_env_or_default();
        Ok(Self { host, port, database_url, environment, auth, paypal, mercado_pago, catalog })
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The secret used to sign and verify access tokens. Must be operator-supplied in production.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. DO NOT \
             operate on production like this since every token becomes invalid on restart. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        match &mut tmpfile {
            Some((f, p)) => match writeln!(f, "JWT_SECRET={secret}") {
                Ok(()) => warn!(
                    "🚨️🚨️🚨️ The JWT signing secret for this session was written to {}. If this is a production \
                     instance, you are doing it wrong! Set the JWT_SECRET environment variable instead. 🚨️🚨️🚨️",
                    p.to_str().unwrap_or("???")
                ),
                Err(e) => warn!("🪛️ Could not write the JWT signing secret to the temporary file. {e}"),
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT signing secret.");
            },
        }
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("JWT_SECRET is set but empty".to_string()));
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}

//-----------------------------------------------  CourseCatalog  ------------------------------------------------------
/// Server-side course pricing. The client only ever submits a course id; the price charged always
/// comes from here.
#[derive(Clone, Debug)]
pub struct CourseCatalog {
    pub prices: HashMap<String, UsdAmount>,
    /// Price for courses not listed explicitly. `None` means unlisted courses cannot be bought.
    pub default_price: Option<UsdAmount>,
}

impl Default for CourseCatalog {
    fn default() -> Self {
        let default_price = UsdAmount::from_str(DEFAULT_COURSE_PRICE).ok();
        Self { prices: HashMap::new(), default_price }
    }
}

impl CourseCatalog {
    pub fn from_env_or_default() -> Self {
        let prices = env::var("COURSE_CATALOG").map(|s| parse_catalog(&s)).unwrap_or_default();
        let default_price = match env::var("DEFAULT_COURSE_PRICE") {
            Ok(s) if ["none", "false", "0"].contains(&s.to_lowercase().as_str()) => {
                info!("🪛️ DEFAULT_COURSE_PRICE is disabled. Only courses in COURSE_CATALOG can be bought.");
                None
            },
            Ok(s) => match UsdAmount::from_str(&s) {
                Ok(price) => Some(price),
                Err(e) => {
                    warn!("🪛️ Invalid configuration value for DEFAULT_COURSE_PRICE. {e}");
                    UsdAmount::from_str(DEFAULT_COURSE_PRICE).ok()
                },
            },
            Err(_) => UsdAmount::from_str(DEFAULT_COURSE_PRICE).ok(),
        };
        if prices.is_empty() && default_price.is_none() {
            warn!("🚨️ The course catalog is empty and no default price is set. The server will run, but won't be \
                   able to start any checkouts.");
        }
        Self { prices, default_price }
    }

    pub fn price_for(&self, course_id: &str) -> Option<UsdAmount> {
        self.prices.get(course_id).copied().or(self.default_price)
    }
}

fn parse_catalog(s: &str) -> HashMap<String, UsdAmount> {
    s.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| {
            let (course, price) = match entry.split_once('=') {
                Some(pair) => pair,
                None => {
                    warn!("🪛️ Ignoring catalog entry without a price: '{entry}'");
                    return None;
                },
            };
            match UsdAmount::from_str(price.trim()) {
                Ok(price) => Some((course.trim().to_string(), price)),
                Err(e) => {
                    warn!("🪛️ Ignoring invalid price for course '{course}' in COURSE_CATALOG: {e}");
                    None
                },
            }
        })
        .collect()
}
