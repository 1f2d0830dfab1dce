pub(crate) use {
    std::time::Duration,
    chrono::{
        DateTime,
        NaiveDate,
        Utc,
    },
    itertools::Itertools as _,
    rocket::{
        FromForm,
        Request,
        Responder,
        State,
        form::{
            self,
            Context,
            Contextual,
            Form,
        },
        http::Status,
        request::FlashMessage,
        response::{
            Flash,
            Redirect,
            content::RawHtml,
        },
        uri,
    },
    rocket_csrf::CsrfToken,
    rocket_util::{
        CsrfForm,
        Origin,
        ToHtml,
        html,
    },
    serde::Deserialize,
    sqlx::{
        PgPool,
        Postgres,
        Transaction,
    },
    uuid::Uuid,
    crate::{
        Environment,
        config::Config,
        form::{
            button_form,
            form_field,
            full_form,
        },
        http::{
            PageError,
            PageKind,
            PageStyle,
            RedirectOrContent,
            StatusOrError,
            page,
        },
        league::{
            Group,
            Match,
            Team,
        },
        user::{
            Role,
            User,
        },
    },
};
