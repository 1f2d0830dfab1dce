use {
    rocket::Rocket,
    sqlx::{
        ConnectOptions as _,
        postgres::{
            PgConnectOptions,
            PgPoolOptions,
        },
    },
    tokio as _, // runtime for Rocket and `#[wheel::main]`
    crate::prelude::*,
};

mod admin;
mod auth;
mod config;
mod edit;
mod form;
mod http;
mod league;
mod logs;
mod prelude;
mod standings;
mod store;
mod user;

#[allow(unused)] // variants only constructed under conditional compilation
#[derive(Default, Clone, Copy)]
pub(crate) enum Environment {
    #[cfg_attr(any(feature = "production", not(any(feature = "dev", feature = "local", debug_assertions))), default)]
    Production,
    #[cfg_attr(any(feature = "dev", all(debug_assertions, not(feature = "production"), not(feature = "local"))), default)]
    Dev,
    #[cfg_attr(feature = "local", default)]
    Local,
}

impl Environment {
    pub(crate) fn is_dev(&self) -> bool {
        match self {
            Self::Production => false,
            Self::Dev => true,
            Self::Local => true,
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            Self::Production => 24822,
            Self::Dev | Self::Local => 24824,
        }
    }
}

fn parse_port(arg: &str) -> Result<u16, std::num::ParseIntError> {
    match arg {
        "production" => Ok(Environment::Production.default_port()),
        "dev" => Ok(Environment::Dev.default_port()),
        _ => arg.parse(),
    }
}

#[derive(clap::Parser)]
#[clap(version)]
struct Args {
    #[clap(long, value_parser = parse_port)]
    port: Option<u16>,
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)] Base64(#[from] base64::DecodeError),
    #[error(transparent)] Config(#[from] config::Error),
    #[error(transparent)] Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)] Reqwest(#[from] reqwest::Error),
    #[error(transparent)] Rocket(#[from] rocket::Error),
    #[error(transparent)] Sql(#[from] sqlx::Error),
}

#[wheel::main(rocket)]
async fn main(Args { port }: Args) -> Result<(), Error> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    let default_panic_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        log::error!("Thread panic: {info:?}");
        default_panic_hook(info)
    }));
    let config = Config::load().await?;
    let http_client = reqwest::Client::builder()
        .user_agent(concat!("LeagueTable/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .use_rustls_tls()
        .hickory_dns(true)
        .https_only(true)
        .build()?;
    let mut db_options = PgConnectOptions::default()
        .database(if Environment::default().is_dev() { "league_table_dev" } else { "league_table" })
        .application_name("league-table")
        .log_slow_statements(log::LevelFilter::Warn, Duration::from_secs(10));
    if let Some(ref db_config) = config.database {
        if let Some(ref host) = db_config.host {
            db_options = db_options.host(host);
        }
        if let Some(port) = db_config.port {
            db_options = db_options.port(port);
        }
        if let Some(ref username) = db_config.username {
            db_options = db_options.username(username);
        }
        if let Some(ref password) = db_config.password {
            db_options = db_options.password(password);
        }
        if let Some(ref database) = db_config.database {
            db_options = db_options.database(database);
        }
    }
    let db_pool = PgPoolOptions::default()
        .max_connections(16)
        .connect_with(db_options)
        .await?;
    sqlx::migrate!().run(&db_pool).await?;
    User::bootstrap_admins(&db_pool, &config.admins).await?;
    let rocket = http::rocket(
        db_pool,
        http_client,
        config,
        port.unwrap_or_else(|| Environment::default().default_port()),
    ).await?;
    log::info!("listening on port {}", rocket.config().port);
    let Rocket { .. } = rocket.launch().await?;
    Ok(())
}
