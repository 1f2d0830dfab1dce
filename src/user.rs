use {
    std::{
        fmt,
        str::FromStr,
    },
    enum_iterator::Sequence,
    lazy_regex::regex_is_match,
    rocket::{
        outcome::Outcome,
        request::{
            self,
            FromRequest,
        },
    },
    sqlx::PgExecutor,
    crate::prelude::*,
};

pub(crate) const SESSION_COOKIE: &str = "user_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Sequence, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub(crate) enum Role {
    User,
    Admin,
}

impl Role {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        enum_iterator::all::<Self>().find(|role| role.as_str() == s).ok_or(())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct User {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) name: Option<String>,
    pub(crate) role: Role,
}

impl User {
    pub(crate) async fn from_id(executor: impl PgExecutor<'_>, id: Uuid) -> sqlx::Result<Option<Self>> {
        sqlx::query_as("SELECT id, email, name, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor).await
    }

    pub(crate) async fn from_email(executor: impl PgExecutor<'_>, email: &str) -> sqlx::Result<Option<Self>> {
        sqlx::query_as("SELECT id, email, name, role FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(executor).await
    }

    pub(crate) async fn all(transaction: &mut Transaction<'_, Postgres>) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as("SELECT id, email, name, role FROM users ORDER BY role DESC, email ASC")
            .fetch_all(&mut **transaction).await
    }

    pub(crate) async fn create(transaction: &mut Transaction<'_, Postgres>, new_user: &NewUser) -> sqlx::Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, role) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&new_user.email)
            .bind(new_user.role)
            .execute(&mut **transaction).await?;
        Ok(id)
    }

    /// Deletes the user along with their audit log entries.
    pub(crate) async fn delete(transaction: &mut Transaction<'_, Postgres>, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction).await?;
        Ok(result.rows_affected() > 0)
    }

    pub(crate) async fn set_name(&self, executor: impl PgExecutor<'_>, name: &str) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(self.id)
            .execute(executor).await?;
        Ok(())
    }

    /// Makes sure every email in `emails` belongs to an admin, creating accounts as needed.
    pub(crate) async fn bootstrap_admins(pool: &PgPool, emails: &[String]) -> sqlx::Result<()> {
        let mut transaction = pool.begin().await?;
        for email in emails {
            sqlx::query("INSERT INTO users (id, email, role) VALUES ($1, $2, 'admin') ON CONFLICT (email) DO UPDATE SET role = 'admin'")
                .bind(Uuid::new_v4())
                .bind(email)
                .execute(&mut *transaction).await?;
        }
        transaction.commit().await
    }

    pub(crate) fn display_name(&self) -> &str {
        self.name.as_deref().filter(|name| !name.is_empty()).unwrap_or(&self.email)
    }

    pub(crate) fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

#[derive(Debug, thiserror::Error)]
pub(crate) enum FromRequestError {
    #[error(transparent)] Sql(#[from] sqlx::Error),
    #[error("database pool missing from managed state")]
    MissingPool,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for User {
    type Error = FromRequestError;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(id) = req.cookies().get_private(SESSION_COOKIE).and_then(|cookie| cookie.value().parse::<Uuid>().ok()) else {
            return Outcome::Forward(Status::Unauthorized)
        };
        let pool = match req.guard::<&State<PgPool>>().await {
            Outcome::Success(pool) => pool,
            Outcome::Error((status, ())) => return Outcome::Error((status, FromRequestError::MissingPool)),
            Outcome::Forward(status) => return Outcome::Forward(status),
        };
        match Self::from_id(&**pool, id).await {
            Ok(Some(user)) => Outcome::Success(user),
            // account was deleted while signed in
            Ok(None) => Outcome::Forward(Status::Unauthorized),
            Err(e) => Outcome::Error((Status::InternalServerError, e.into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewUser {
    pub(crate) email: String,
    pub(crate) role: Role,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum NewUserError {
    #[error("Please fill in user's email.")]
    EmptyEmail,
    #[error("Invalid email.")]
    InvalidEmail,
    #[error("Invalid role.")]
    InvalidRole,
}

impl NewUserError {
    pub(crate) fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::InvalidRole => "role",
        }
    }
}

/// Validates the admin's create-user form.
pub(crate) fn parse_new_user(email: &str, role: &str) -> Result<NewUser, NewUserError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(NewUserError::EmptyEmail)
    }
    if !regex_is_match!(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", email) {
        return Err(NewUserError::InvalidEmail)
    }
    let role = role.parse().map_err(|()| NewUserError::InvalidRole)?;
    Ok(NewUser { email: email.to_owned(), role })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_email() {
        assert_eq!(parse_new_user("", "user").unwrap_err().to_string(), "Please fill in user's email.");
        assert_eq!(parse_new_user("   ", "admin"), Err(NewUserError::EmptyEmail));
    }

    #[test]
    fn invalid_email() {
        assert_eq!(parse_new_user("blahblah", "user").unwrap_err().to_string(), "Invalid email.");
        assert_eq!(parse_new_user("blah@gmail", "user"), Err(NewUserError::InvalidEmail));
        assert_eq!(parse_new_user("bl ah@gmail.com", "user"), Err(NewUserError::InvalidEmail));
    }

    #[test]
    fn invalid_role() {
        assert_eq!(parse_new_user("blah@gmail.com", "blah").unwrap_err().to_string(), "Invalid role.");
        assert_eq!(parse_new_user("blah@gmail.com", "Admin"), Err(NewUserError::InvalidRole));
    }

    #[test]
    fn valid_user() {
        assert_eq!(
            parse_new_user(" blah@gmail.com ", "admin"),
            Ok(NewUser { email: format!("blah@gmail.com"), role: Role::Admin }),
        );
    }

    #[test]
    fn role_names_round_trip() {
        for role in enum_iterator::all::<Role>() {
            assert_eq!(role.as_str().parse(), Ok(role));
        }
    }
}
