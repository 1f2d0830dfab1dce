use {
    std::fmt,
    base64::engine::{
        Engine as _,
        general_purpose::STANDARD as BASE64,
    },
    rocket::{
        Rocket,
        config::SecretKey,
        fs::FileServer,
        response::content::RawText,
    },
    rocket_oauth2::{
        OAuth2,
        OAuthConfig,
    },
    rocket_util::Doctype,
    crate::{
        admin,
        auth,
        edit,
        logs,
        prelude::*,
        standings,
    },
};

#[derive(Responder)]
pub(crate) enum RedirectOrContent {
    Redirect(Redirect),
    Flash(Flash<Redirect>),
    Content(RawHtml<String>),
}

#[derive(Responder)]
pub(crate) enum StatusOrError<E> {
    Status(Status),
    Err(E),
}

/// Logs an error that is about to be turned into an error status.
pub(crate) fn respond_with_error(status: Status, request: &Request<'_>, error: &(impl fmt::Display + fmt::Debug)) -> rocket::response::Result<'static> {
    log::error!("responded with {status} to request to {}", request.uri());
    log::error!("display: {error}");
    log::error!("debug: {error:?}");
    Err(status)
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum PageError {
    #[error(transparent)] Sql(#[from] sqlx::Error),
}

impl<'r> rocket::response::Responder<'r, 'static> for PageError {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        respond_with_error(Status::InternalServerError, request, &self)
    }
}

impl<E: Into<PageError>> From<E> for StatusOrError<PageError> {
    fn from(e: E) -> Self {
        Self::Err(e.into())
    }
}

pub(crate) type PageResult = Result<RawHtml<String>, PageError>;

pub(crate) enum PageKind {
    Standings,
    Teams,
    Edit,
    Logs,
    Users,
    Login,
    Other,
}

pub(crate) struct PageStyle {
    pub(crate) kind: PageKind,
}

impl Default for PageStyle {
    fn default() -> Self {
        Self {
            kind: PageKind::Other,
        }
    }
}

/// Shown in place of a page's content to visitors who are not signed in.
pub(crate) fn sign_in_prompt(action: &str) -> RawHtml<String> {
    html! {
        article {
            p {
                a(href = uri!(auth::login)) : "Sign in";
                : " to ";
                : action;
                : ".";
            }
        }
    }
}

pub(crate) fn page(me: &Option<User>, uri: &Origin<'_>, style: PageStyle, title: &str, content: impl ToHtml) -> RawHtml<String> {
    html! {
        : Doctype;
        html {
            head {
                meta(charset = "utf-8");
                title : title;
                meta(name = "viewport", content = "width=device-width, initial-scale=1, shrink-to-fit=no");
                link(rel = "stylesheet", href = "/static/common.css");
            }
            body {
                nav {
                    a(class? = matches!(style.kind, PageKind::Standings).then_some("selected"), href = uri!(standings::index)) : "Standings";
                    a(class? = matches!(style.kind, PageKind::Teams).then_some("selected"), href = uri!(standings::teams)) : "Teams";
                    @if let Some(me) = me {
                        a(class? = matches!(style.kind, PageKind::Edit).then_some("selected"), href = uri!(edit::get)) : "Edit";
                        a(class? = matches!(style.kind, PageKind::Logs).then_some("selected"), href = uri!(logs::get)) : "Logs";
                        @if me.is_admin() {
                            a(class? = matches!(style.kind, PageKind::Users).then_some("selected"), href = uri!(admin::users)) : "Users";
                        }
                        div(id = "login") {
                            : "Signed in as ";
                            bdi : me.display_name();
                            : " • ";
                            a(href = uri!(auth::logout)) : "Sign out";
                        }
                    } else {
                        div(id = "login") {
                            @if !matches!(style.kind, PageKind::Login) {
                                a(href = uri!(auth::login)) : "Sign in";
                            }
                        }
                    }
                }
                main {
                    : content;
                }
                footer {
                    p {
                        : "League Table ";
                        : env!("CARGO_PKG_VERSION");
                        @if uri.0.path().as_str() != "/" {
                            : " • ";
                            a(href = uri!(standings::index)) : "Back to standings";
                        }
                    }
                }
            }
        }
    }
}

#[rocket::get("/robots.txt")]
async fn robots_txt() -> RawText<&'static str> {
    RawText("User-agent: *\nDisallow: /edit\nDisallow: /logs\nDisallow: /users\n")
}

fn error_page(me: Option<User>, uri: Option<Origin<'_>>, title: &str, content: impl ToHtml) -> RawHtml<String> {
    let uri = uri.unwrap_or_else(|| Origin(uri!(standings::index)));
    page(&me, &uri, PageStyle::default(), &format!("{title} — League Table"), content)
}

#[rocket::catch(401)]
async fn unauthorized(request: &Request<'_>) -> RawHtml<String> {
    let me = request.guard::<User>().await.succeeded();
    let uri = request.guard::<Origin<'_>>().await.succeeded();
    error_page(me, uri, "Unauthorized", html! {
        h1 : "Error 401: Unauthorized";
        : sign_in_prompt("continue");
    })
}

#[rocket::catch(403)]
async fn forbidden(request: &Request<'_>) -> RawHtml<String> {
    let me = request.guard::<User>().await.succeeded();
    let uri = request.guard::<Origin<'_>>().await.succeeded();
    error_page(me, uri, "Forbidden", html! {
        h1 : "Error 403: Forbidden";
        p : "Unauthorised access.";
    })
}

#[rocket::catch(404)]
async fn not_found(request: &Request<'_>) -> RawHtml<String> {
    let me = request.guard::<User>().await.succeeded();
    let uri = request.guard::<Origin<'_>>().await.succeeded();
    error_page(me, uri, "Not Found", html! {
        h1 : "Error 404: Not Found";
    })
}

#[rocket::catch(500)]
async fn internal_server_error(request: &Request<'_>) -> RawHtml<String> {
    let me = request.guard::<User>().await.succeeded();
    let uri = request.guard::<Origin<'_>>().await.succeeded();
    error_page(me, uri, "Internal Server Error", html! {
        h1 : "Error 500: Internal Server Error";
        p : "Sorry, something went wrong. Please try again later.";
    })
}

#[rocket::catch(502)]
async fn bad_gateway(request: &Request<'_>) -> RawHtml<String> {
    let me = request.guard::<User>().await.succeeded();
    let uri = request.guard::<Origin<'_>>().await.succeeded();
    error_page(me, uri, "Bad Gateway", html! {
        h1 : "Error 502: Bad Gateway";
        p : "Sorry, there was a network error. Please try again.";
    })
}

#[rocket::catch(default)]
async fn fallback_catcher(status: Status, request: &Request<'_>) -> RawHtml<String> {
    log::error!("responding with unexpected HTTP status code {} {} to request {request:?}", status.code, status.reason_lossy());
    let me = request.guard::<User>().await.succeeded();
    let uri = request.guard::<Origin<'_>>().await.succeeded();
    error_page(me, uri, status.reason_lossy(), html! {
        h1 {
            : "Error ";
            : status.code;
            : ": ";
            : status.reason_lossy();
        }
        p : "Sorry, something went wrong. Please try again later.";
    })
}

pub(crate) async fn rocket(pool: PgPool, http_client: reqwest::Client, config: Config, port: u16) -> Result<Rocket<rocket::Ignite>, crate::Error> {
    let google_redirect_uri = format!("{}{}", config.base_uri.trim_end_matches('/'), uri!(auth::google_callback));
    Ok(rocket::custom(rocket::Config::figment().merge(rocket::Config {
        secret_key: SecretKey::from(&BASE64.decode(&config.secret_key)?),
        log_level: Some(rocket::config::Level::ERROR),
        ..rocket::Config::default()
    }).merge(("port", port)))
    .mount("/", rocket::routes![
        robots_txt,
        admin::users,
        admin::create_user,
        admin::delete_user,
        auth::login,
        auth::google_login,
        auth::google_callback,
        auth::logout,
        edit::get,
        edit::post,
        edit::delete,
        logs::get,
        logs::delete,
        standings::index,
        standings::teams,
        standings::team,
    ])
    .mount("/static", FileServer::without_index("assets/static"))
    .register("/", rocket::catchers![
        unauthorized,
        forbidden,
        not_found,
        internal_server_error,
        bad_gateway,
        fallback_catcher,
    ])
    .attach(rocket_csrf::Fairing::default())
    .attach(OAuth2::<auth::Google>::custom(rocket_oauth2::HyperRustlsAdapter::default(), OAuthConfig::new(
        rocket_oauth2::StaticProvider::Google,
        config.google_oauth.client_id.clone(),
        config.google_oauth.client_secret.clone(),
        Some(google_redirect_uri),
    )))
    .manage(config)
    .manage(pool)
    .manage(http_client)
    .ignite().await?)
}
