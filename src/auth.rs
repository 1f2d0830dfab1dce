use {
    rocket::http::{
        Cookie,
        CookieJar,
        SameSite,
    },
    rocket_oauth2::{
        OAuth2,
        TokenResponse,
    },
    crate::{
        http::respond_with_error,
        prelude::*,
        standings,
        user::SESSION_COOKIE,
    },
};

pub(crate) struct Google;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] OAuth(#[from] rocket_oauth2::Error),
    #[error(transparent)] Reqwest(#[from] reqwest::Error),
    #[error(transparent)] Sql(#[from] sqlx::Error),
}

impl<'r> rocket::response::Responder<'r, 'static> for Error {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        let status = if let Self::Reqwest(_) = self { Status::BadGateway } else { Status::InternalServerError };
        respond_with_error(status, request, &self)
    }
}

impl From<Error> for StatusOrError<Error> {
    fn from(e: Error) -> Self {
        Self::Err(e)
    }
}

#[derive(Deserialize)]
struct GoogleUserInfo {
    email: String,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
}

#[rocket::get("/login")]
pub(crate) fn login(me: Option<User>, uri: Origin<'_>) -> RawHtml<String> {
    page(&me, &uri, PageStyle { kind: PageKind::Login, ..PageStyle::default() }, "Sign in — League Table", html! {
        @if let Some(ref me) = me {
            p {
                : "You are already signed in as ";
                bdi : me.display_name();
                : ".";
            }
        } else {
            p : "Editing the tournament data requires an account created by an administrator.";
            p {
                a(class = "button", href = uri!(google_login)) : "Sign in with Google";
            }
        }
    })
}

#[rocket::get("/login/google")]
pub(crate) fn google_login(oauth: OAuth2<Google>, cookies: &CookieJar<'_>) -> Result<Redirect, Error> {
    Ok(oauth.get_redirect(cookies, &["openid", "email", "profile"])?)
}

#[rocket::get("/auth/google")]
pub(crate) async fn google_callback(pool: &State<PgPool>, http_client: &State<reqwest::Client>, token: TokenResponse<Google>, cookies: &CookieJar<'_>) -> Result<Redirect, StatusOrError<Error>> {
    let user_info = http_client.get("https://openidconnect.googleapis.com/v1/userinfo")
        .bearer_auth(token.access_token())
        .send().await.map_err(Error::from)?
        .error_for_status().map_err(Error::from)?
        .json::<GoogleUserInfo>().await.map_err(Error::from)?;
    let mut transaction = pool.begin().await.map_err(Error::from)?;
    let user = if user_info.email_verified {
        User::from_email(&mut *transaction, &user_info.email).await.map_err(Error::from)?
    } else {
        None
    };
    let Some(user) = user else {
        log::warn!("refused sign-in for unregistered or unverified email {}", user_info.email);
        return Err(StatusOrError::Status(Status::Forbidden))
    };
    if let Some(name) = user_info.name {
        user.set_name(&mut *transaction, &name).await.map_err(Error::from)?;
    }
    transaction.commit().await.map_err(Error::from)?;
    log::info!("{} signed in", user.email);
    cookies.add_private(Cookie::build((SESSION_COOKIE, user.id.to_string())).same_site(SameSite::Lax));
    Ok(Redirect::to(uri!(standings::index)))
}

#[rocket::get("/logout")]
pub(crate) fn logout(cookies: &CookieJar<'_>) -> Redirect {
    cookies.remove_private(SESSION_COOKIE);
    Redirect::to(uri!(standings::index))
}
