use crate::{
    form::accepted,
    http::{
        PageResult,
        sign_in_prompt,
    },
    prelude::*,
    standings,
    store::{
        self,
        LogAction,
        RawForm,
    },
};

const DATABASE_ERROR: &str = "Issues connecting to the database.";

fn flash_message(flash: Option<FlashMessage<'_>>) -> RawHtml<String> {
    html! {
        @if let Some(flash) = flash {
            p(class = flash.kind()) : flash.message();
        }
    }
}

fn edit_form(me: Option<User>, uri: Origin<'_>, csrf: Option<&CsrfToken>, ctx: Context<'_>, stored: Option<RawForm>, flash: Option<FlashMessage<'_>>) -> RawHtml<String> {
    let content = if me.is_some() {
        let mut errors = ctx.errors().collect_vec();
        let (delete_errors, delete_button) = button_form(uri!(delete), csrf, Vec::default(), "Clear all data");
        let stored = stored.unwrap_or_else(|| RawForm { teams: String::default(), matches: String::default() });
        html! {
            : flash_message(flash);
            : full_form(uri!(post), csrf, html! {
                : form_field("teams", &mut errors, html! {
                    label(for = "teams") : "Teams";
                    p(class = "hint") : "One team per line: team name, registration date (MM/DD) and group number, e.g. “teamA 01/04 1”.";
                    textarea(id = "teams", name = "teams", rows = "14") : ctx.field_value("teams").unwrap_or(&stored.teams[..]);
                });
                : form_field("matches", &mut errors, html! {
                    label(for = "matches") : "Matches played";
                    p(class = "hint") : "One match per line: both team names and their goals, e.g. “teamA teamB 2 1”.";
                    textarea(id = "matches", name = "matches", rows = "20") : ctx.field_value("matches").unwrap_or(&stored.matches[..]);
                });
            }, errors, "Save");
            h2 : "Danger zone";
            : delete_errors;
            : delete_button;
        }
    } else {
        sign_in_prompt("edit the tournament data")
    };
    page(&me, &uri, PageStyle { kind: PageKind::Edit, ..PageStyle::default() }, "Edit — League Table", content)
}

#[rocket::get("/edit")]
pub(crate) async fn get(pool: &State<PgPool>, me: Option<User>, uri: Origin<'_>, csrf: Option<CsrfToken>, flash: Option<FlashMessage<'_>>) -> PageResult {
    let stored = if me.is_some() {
        let mut transaction = pool.begin().await?;
        let stored = RawForm::current(&mut transaction).await?;
        transaction.commit().await?;
        stored
    } else {
        None
    };
    Ok(edit_form(me, uri, csrf.as_ref(), Context::default(), stored, flash))
}

#[derive(FromForm, CsrfForm)]
pub(crate) struct EditForm {
    #[field(default = String::new())]
    csrf: String,
    #[field(default = String::new())]
    teams: String,
    #[field(default = String::new())]
    matches: String,
}

async fn save(pool: &PgPool, me: &User, teams: &[Team], matches: &[Match], form: &RawForm) -> sqlx::Result<LogAction> {
    let mut transaction = pool.begin().await?;
    let action = if RawForm::current(&mut transaction).await?.is_some() { LogAction::Update } else { LogAction::Create };
    store::replace_all(&mut transaction, me, action, teams, matches, form).await?;
    transaction.commit().await?;
    Ok(action)
}

#[rocket::post("/edit", data = "<form>")]
pub(crate) async fn post(pool: &State<PgPool>, config: &State<Config>, me: User, uri: Origin<'_>, csrf: Option<CsrfToken>, form: Form<Contextual<'_, EditForm>>) -> RedirectOrContent {
    let mut form = form.into_inner();
    form.verify(&csrf);
    if let Some(value) = accepted(&form.value, &form.context) {
        match config.tournament.submission().validate(&value.teams, &value.matches) {
            Ok((teams, matches)) => {
                let raw = RawForm { teams: value.teams.clone(), matches: value.matches.clone() };
                match save(pool, &me, &teams, &matches, &raw).await {
                    Ok(action) => {
                        log::info!("{}: {} ({} teams, {} matches)", me.email, action.display_name(), teams.len(), matches.len());
                        return RedirectOrContent::Redirect(Redirect::to(uri!(standings::index)))
                    }
                    Err(e) => {
                        log::error!("failed to save tournament data for {}: {e}", me.email);
                        form.context.push_error(form::Error::validation(DATABASE_ERROR));
                    }
                }
            }
            Err(e) => form.context.push_error(form::Error::validation(e.to_string()).with_name(e.field().name())),
        }
    }
    RedirectOrContent::Content(edit_form(Some(me), uri, csrf.as_ref(), form.context, None, None))
}

#[derive(FromForm, CsrfForm)]
pub(crate) struct DeleteForm {
    #[field(default = String::new())]
    csrf: String,
}

async fn clear(pool: &PgPool, me: &User) -> sqlx::Result<()> {
    let mut transaction = pool.begin().await?;
    store::clear(&mut transaction, me).await?;
    transaction.commit().await
}

#[rocket::post("/edit/delete", data = "<form>")]
pub(crate) async fn delete(pool: &State<PgPool>, me: User, uri: Origin<'_>, csrf: Option<CsrfToken>, form: Form<Contextual<'_, DeleteForm>>) -> Result<RedirectOrContent, StatusOrError<PageError>> {
    let mut form = form.into_inner();
    form.verify(&csrf);
    if accepted(&form.value, &form.context).is_some() {
        match clear(pool, &me).await {
            Ok(()) => {
                log::info!("{} cleared the tournament data", me.email);
                return Ok(RedirectOrContent::Flash(Flash::success(Redirect::to(uri!(get)), "Successfully cleared data.")))
            }
            Err(e) => {
                log::error!("failed to clear tournament data for {}: {e}", me.email);
                form.context.push_error(form::Error::validation(DATABASE_ERROR));
            }
        }
    }
    let mut transaction = pool.begin().await?;
    let stored = RawForm::current(&mut transaction).await?;
    transaction.commit().await?;
    Ok(RedirectOrContent::Content(edit_form(Some(me), uri, csrf.as_ref(), form.context, stored, None)))
}
