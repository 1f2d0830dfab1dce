use {
    enum_iterator::all,
    crate::{
        http::PageResult,
        league::{
            self,
            TeamDetails,
        },
        prelude::*,
        store,
    },
};

fn format_goal_difference(goals: i64) -> String {
    if goals > 0 { format!("+{goals}") } else { goals.to_string() }
}

fn standings_table(details: &[TeamDetails], qualifying_places: usize) -> RawHtml<String> {
    html! {
        table(class = "standings") {
            thead {
                tr {
                    th : "#";
                    th : "Team";
                    th(title = "Matches played") : "P";
                    th(title = "Wins") : "W";
                    th(title = "Draws") : "D";
                    th(title = "Losses") : "L";
                    th(title = "Goal difference") : "GD";
                    th(title = "Points") : "Pts";
                    th(title = "Alternate points") : "Alt";
                }
            }
            tbody {
                @for (rank, team) in details.iter().enumerate() {
                    tr(class? = (rank < qualifying_places).then_some("qualified")) {
                        td : rank + 1;
                        td {
                            a(href = uri!(team(&team.name))) : &team.name;
                        }
                        td : team.played();
                        td : team.wins;
                        td : team.draws;
                        td : team.losses;
                        td : format_goal_difference(team.goals);
                        td : team.total_match_points();
                        td : team.total_alternate_match_points();
                    }
                }
            }
        }
    }
}

#[rocket::get("/")]
pub(crate) async fn index(pool: &State<PgPool>, config: &State<Config>, me: Option<User>, uri: Origin<'_>) -> PageResult {
    let mut transaction = pool.begin().await?;
    let teams = store::teams(&mut transaction).await?;
    let matches = store::matches(&mut transaction).await?;
    transaction.commit().await?;
    let table = league::table(&teams, &matches);
    Ok(page(&me, &uri, PageStyle { kind: PageKind::Standings, ..PageStyle::default() }, "Standings — League Table", html! {
        h1 : "Standings";
        @if teams.is_empty() {
            p : "No teams have been registered yet.";
        } else {
            @for group in all::<Group>() {
                h2 {
                    : "Group ";
                    : group.number();
                }
                : standings_table(&league::group_table(&table, group), config.tournament.qualifying_places);
            }
            p(class = "legend") {
                : "The top ";
                : config.tournament.qualifying_places;
                : " teams of each group qualify. Ties are broken by goal difference, then alternate points (win 5, draw 3, loss 1), then earliest registration.";
            }
        }
    }))
}

#[rocket::get("/teams")]
pub(crate) async fn teams(pool: &State<PgPool>, me: Option<User>, uri: Origin<'_>) -> PageResult {
    let mut transaction = pool.begin().await?;
    let teams = store::teams(&mut transaction).await?;
    transaction.commit().await?;
    Ok(page(&me, &uri, PageStyle { kind: PageKind::Teams, ..PageStyle::default() }, "Teams — League Table", html! {
        h1 : "Teams";
        @if teams.is_empty() {
            p : "No teams have been registered yet.";
        } else {
            table {
                thead {
                    tr {
                        th : "Team";
                        th : "Registered";
                        th : "Group";
                    }
                }
                tbody {
                    @for team in &teams {
                        tr {
                            td {
                                a(href = uri!(team(&team.name))) : &team.name;
                            }
                            td : team.regdate.format("%B %-d").to_string();
                            td : team.group.number();
                        }
                    }
                }
            }
        }
    }))
}

#[rocket::get("/teams/<name>")]
pub(crate) async fn team(pool: &State<PgPool>, me: Option<User>, uri: Origin<'_>, name: &str) -> Result<RawHtml<String>, StatusOrError<PageError>> {
    let mut transaction = pool.begin().await?;
    let teams = store::teams(&mut transaction).await?;
    let matches = store::matches(&mut transaction).await?;
    transaction.commit().await?;
    let team = teams.iter().find(|team| team.name == name).ok_or(StatusOrError::Status(Status::NotFound))?;
    let details = TeamDetails::new(team, &matches);
    let played = matches.iter().filter(|m| m.involves(&team.name)).collect_vec();
    Ok(page(&me, &uri, PageStyle { kind: PageKind::Teams, ..PageStyle::default() }, &format!("{} — League Table", team.name), html! {
        h1 : &team.name;
        p {
            : "Group ";
            : team.group.number();
            : ", registered on ";
            : team.regdate.format("%B %-d").to_string();
            : ".";
        }
        table {
            tr {
                th : "Played";
                td : details.played();
            }
            tr {
                th : "Record";
                td {
                    : details.wins;
                    : "W ";
                    : details.draws;
                    : "D ";
                    : details.losses;
                    : "L";
                }
            }
            tr {
                th : "Goal difference";
                td : format_goal_difference(details.goals);
            }
            tr {
                th : "Points";
                td : details.total_match_points();
            }
            tr {
                th : "Alternate points";
                td : details.total_alternate_match_points();
            }
        }
        h2 : "Matches";
        @if played.is_empty() {
            p : "This team has not played any matches yet.";
        } else {
            table {
                thead {
                    tr {
                        th : "Opponent";
                        th : "Score";
                    }
                }
                tbody {
                    @for m in played {
                        @let (opponent, (scored, conceded)) = if m.team_a == team.name {
                            (&m.team_b, (m.goals_a, m.goals_b))
                        } else {
                            (&m.team_a, (m.goals_b, m.goals_a))
                        };
                        tr {
                            td {
                                a(href = uri!(team(opponent))) : opponent;
                            }
                            td : format!("{scored}–{conceded}");
                        }
                    }
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_difference_sign() {
        assert_eq!(format_goal_difference(3), "+3");
        assert_eq!(format_goal_difference(0), "0");
        assert_eq!(format_goal_difference(-2), "-2");
    }
}
