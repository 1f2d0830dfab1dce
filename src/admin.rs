use {
    enum_iterator::all,
    crate::{
        form::accepted,
        prelude::*,
        user::{
            NewUser,
            parse_new_user,
        },
    },
};

const DATABASE_ERROR: &str = "Issues connecting to the database.";

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
    #[error("unauthorized")]
    Unauthorized,
}

impl From<Error> for StatusOrError<Error> {
    fn from(e: Error) -> Self {
        StatusOrError::Err(e)
    }
}

impl<'r> rocket::response::Responder<'r, 'static> for Error {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        match self {
            Self::Unauthorized => Err(Status::Forbidden),
            Self::Sql(_) => crate::http::respond_with_error(Status::InternalServerError, request, &self),
        }
    }
}

fn require_admin(me: Option<User>) -> Result<User, Error> {
    me.filter(User::is_admin).ok_or(Error::Unauthorized)
}

fn users_page(me: User, uri: Origin<'_>, csrf: Option<&CsrfToken>, ctx: Context<'_>, users: Vec<User>, flash: Option<FlashMessage<'_>>) -> RawHtml<String> {
    let mut errors = ctx.errors().collect_vec();
    let content = html! {
        h1 : "Users";
        @if let Some(flash) = flash {
            p(class = flash.kind()) : flash.message();
        }
        table {
            thead {
                tr {
                    th : "Email";
                    th : "Name";
                    th : "Role";
                    th;
                }
            }
            tbody {
                @for user in &users {
                    tr {
                        td : &user.email;
                        td {
                            @if let Some(ref name) = user.name {
                                bdi : name;
                            } else {
                                i : "not signed in yet";
                            }
                        }
                        td : user.role.as_str();
                        td {
                            @if *user != me {
                                @let (_, button) = button_form(uri!(delete_user(user.id)), csrf, Vec::default(), "Delete");
                                : button;
                            }
                        }
                    }
                }
            }
        }
        h2 : "Create user";
        : full_form(uri!(create_user), csrf, html! {
            : form_field("email", &mut errors, html! {
                label(for = "email") : "Email";
                input(type = "email", id = "email", name = "email", value? = ctx.field_value("email"));
            });
            : form_field("role", &mut errors, html! {
                label(for = "role") : "Role";
                select(id = "role", name = "role") {
                    @for role in all::<Role>() {
                        option(value = role.as_str(), selected? = (ctx.field_value("role") == Some(role.as_str())).then_some("selected")) : role.as_str();
                    }
                }
            });
        }, errors, "Create");
    };
    page(&Some(me), &uri, PageStyle { kind: PageKind::Users, ..PageStyle::default() }, "Users — League Table", content)
}

async fn all_users(pool: &PgPool) -> sqlx::Result<Vec<User>> {
    let mut transaction = pool.begin().await?;
    let users = User::all(&mut transaction).await?;
    transaction.commit().await?;
    Ok(users)
}

#[rocket::get("/users")]
pub(crate) async fn users(pool: &State<PgPool>, me: Option<User>, uri: Origin<'_>, csrf: Option<CsrfToken>, flash: Option<FlashMessage<'_>>) -> Result<RawHtml<String>, StatusOrError<Error>> {
    let me = require_admin(me)?;
    let users = all_users(pool).await.map_err(Error::from)?;
    Ok(users_page(me, uri, csrf.as_ref(), Context::default(), users, flash))
}

#[derive(FromForm, CsrfForm)]
pub(crate) struct CreateUserForm {
    #[field(default = String::new())]
    csrf: String,
    #[field(default = String::new())]
    email: String,
    #[field(default = String::new())]
    role: String,
}

/// Returns `false` if a user with this email already exists.
async fn create(pool: &PgPool, new_user: &NewUser) -> sqlx::Result<bool> {
    let mut transaction = pool.begin().await?;
    if User::from_email(&mut *transaction, &new_user.email).await?.is_some() {
        return Ok(false)
    }
    User::create(&mut transaction, new_user).await?;
    transaction.commit().await?;
    Ok(true)
}

#[rocket::post("/users", data = "<form>")]
pub(crate) async fn create_user(pool: &State<PgPool>, me: Option<User>, uri: Origin<'_>, csrf: Option<CsrfToken>, form: Form<Contextual<'_, CreateUserForm>>) -> Result<RedirectOrContent, StatusOrError<Error>> {
    let me = require_admin(me)?;
    let mut form = form.into_inner();
    form.verify(&csrf);
    if let Some(value) = accepted(&form.value, &form.context) {
        match parse_new_user(&value.email, &value.role) {
            Ok(new_user) => match create(pool, &new_user).await {
                Ok(true) => {
                    log::info!("{} created {} user {}", me.email, new_user.role, new_user.email);
                    return Ok(RedirectOrContent::Flash(Flash::success(
                        Redirect::to(uri!(users)),
                        "Successfully created user. User will be displayed on the user list once they log in to this web application.",
                    )))
                }
                Ok(false) => form.context.push_error(form::Error::validation("A user with this email already exists.").with_name("email")),
                Err(e) => {
                    log::error!("failed to create user {}: {e}", new_user.email);
                    form.context.push_error(form::Error::validation(DATABASE_ERROR));
                }
            },
            Err(e) => form.context.push_error(form::Error::validation(e.to_string()).with_name(e.field())),
        }
    }
    let users = all_users(pool).await.map_err(Error::from)?;
    Ok(RedirectOrContent::Content(users_page(me, uri, csrf.as_ref(), form.context, users, None)))
}

#[derive(FromForm, CsrfForm)]
pub(crate) struct DeleteUserForm {
    #[field(default = String::new())]
    csrf: String,
}

async fn delete(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let mut transaction = pool.begin().await?;
    let deleted = User::delete(&mut transaction, id).await?;
    transaction.commit().await?;
    Ok(deleted)
}

#[rocket::post("/users/<id>/delete", data = "<form>")]
pub(crate) async fn delete_user(pool: &State<PgPool>, me: Option<User>, uri: Origin<'_>, csrf: Option<CsrfToken>, id: Uuid, form: Form<Contextual<'_, DeleteUserForm>>) -> Result<RedirectOrContent, StatusOrError<Error>> {
    let me = require_admin(me)?;
    let mut form = form.into_inner();
    form.verify(&csrf);
    if accepted(&form.value, &form.context).is_some() {
        if me.id == id {
            form.context.push_error(form::Error::validation("Cannot delete yourself."));
        } else {
            match delete(pool, id).await {
                Ok(true) => {
                    log::info!("{} deleted user {id}", me.email);
                    return Ok(RedirectOrContent::Flash(Flash::success(Redirect::to(uri!(users)), "Successfully deleted user")))
                }
                Ok(false) => return Err(StatusOrError::Status(Status::NotFound)),
                Err(e) => {
                    log::error!("failed to delete user {id}: {e}");
                    form.context.push_error(form::Error::validation(DATABASE_ERROR));
                }
            }
        }
    }
    let users = all_users(pool).await.map_err(Error::from)?;
    Ok(RedirectOrContent::Content(users_page(me, uri, csrf.as_ref(), form.context, users, None)))
}
