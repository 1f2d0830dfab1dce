use crate::{
    form::accepted,
    http::sign_in_prompt,
    prelude::*,
    store::Log,
};

fn logs_page(me: Option<User>, uri: Origin<'_>, csrf: Option<&CsrfToken>, ctx: Context<'_>, logs: Vec<Log>, flash: Option<FlashMessage<'_>>) -> RawHtml<String> {
    let content = if let Some(ref me) = me {
        html! {
            h1 : "Logs";
            @if let Some(flash) = flash {
                p(class = flash.kind()) : flash.message();
            }
            @if me.is_admin() {
                @let (errors, button) = button_form(uri!(delete), csrf, ctx.errors().collect(), "Delete all logs");
                : errors;
                : button;
            }
            @if logs.is_empty() {
                p : "No changes have been logged.";
            } else {
                table {
                    thead {
                        tr {
                            th : "Time (UTC)";
                            th : "User";
                            th : "Action";
                            th : "Submitted data";
                        }
                    }
                    tbody {
                        @for log in &logs {
                            tr {
                                td : log.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
                                td {
                                    bdi : log.user_display_name();
                                }
                                td : log.action.display_name();
                                td {
                                    @if let (Some(teams), Some(matches)) = (&log.form_teams, &log.form_matches) {
                                        details {
                                            summary : "Show";
                                            h3 : "Teams";
                                            pre : teams;
                                            h3 : "Matches";
                                            pre : matches;
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    } else {
        sign_in_prompt("view the logs")
    };
    page(&me, &uri, PageStyle { kind: PageKind::Logs, ..PageStyle::default() }, "Logs — League Table", content)
}

#[rocket::get("/logs")]
pub(crate) async fn get(pool: &State<PgPool>, me: Option<User>, uri: Origin<'_>, csrf: Option<CsrfToken>, flash: Option<FlashMessage<'_>>) -> Result<RawHtml<String>, StatusOrError<PageError>> {
    let logs = if me.is_some() {
        let mut transaction = pool.begin().await?;
        let logs = Log::all(&mut transaction).await?;
        transaction.commit().await?;
        logs
    } else {
        Vec::default()
    };
    Ok(logs_page(me, uri, csrf.as_ref(), Context::default(), logs, flash))
}

#[derive(FromForm, CsrfForm)]
pub(crate) struct DeleteForm {
    #[field(default = String::new())]
    csrf: String,
}

async fn delete_all(pool: &PgPool) -> sqlx::Result<u64> {
    let mut transaction = pool.begin().await?;
    let deleted = Log::delete_all(&mut transaction).await?;
    transaction.commit().await?;
    Ok(deleted)
}

#[rocket::post("/logs/delete", data = "<form>")]
pub(crate) async fn delete(pool: &State<PgPool>, me: User, uri: Origin<'_>, csrf: Option<CsrfToken>, form: Form<Contextual<'_, DeleteForm>>) -> Result<RedirectOrContent, StatusOrError<PageError>> {
    if !me.is_admin() {
        log::warn!("{} tried to delete the logs without the admin role", me.email);
        return Err(StatusOrError::Status(Status::Forbidden))
    }
    let mut form = form.into_inner();
    form.verify(&csrf);
    if accepted(&form.value, &form.context).is_some() {
        match delete_all(pool).await {
            Ok(deleted) => {
                log::info!("{} deleted {deleted} log entries", me.email);
                return Ok(RedirectOrContent::Flash(Flash::success(Redirect::to(uri!(get)), "Successfully cleared logs.")))
            }
            Err(e) => {
                log::error!("failed to delete logs for {}: {e}", me.email);
                form.context.push_error(form::Error::validation("Issues connecting to the database."));
            }
        }
    }
    let mut transaction = pool.begin().await?;
    let logs = Log::all(&mut transaction).await?;
    transaction.commit().await?;
    Ok(RedirectOrContent::Content(logs_page(Some(me), uri, csrf.as_ref(), form.context, logs, None)))
}
