//! Persistence of the tournament data and the audit log.

use {
    std::num::TryFromIntError,
    crate::prelude::*,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "log_action", rename_all = "lowercase")]
pub(crate) enum LogAction {
    Create,
    Update,
    Delete,
}

impl LogAction {
    pub(crate) fn display_name(&self) -> &'static str {
        match self {
            Self::Create => "Created table",
            Self::Update => "Updated table",
            Self::Delete => "Deleted table",
        }
    }
}

/// The text areas of the edit form as last submitted.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct RawForm {
    pub(crate) teams: String,
    pub(crate) matches: String,
}

impl RawForm {
    pub(crate) async fn current(transaction: &mut Transaction<'_, Postgres>) -> sqlx::Result<Option<Self>> {
        sqlx::query_as("SELECT teams, matches FROM forms ORDER BY id DESC LIMIT 1")
            .fetch_optional(&mut **transaction).await
    }
}

fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}

fn column_int<T>(value: T) -> sqlx::Result<i32>
where i32: TryFrom<T, Error = TryFromIntError> {
    i32::try_from(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn team_from_row((name, regdate, groupno): (String, NaiveDate, i16)) -> sqlx::Result<Team> {
    let group = Group::from_number(groupno).ok_or_else(|| decode_error(format!("invalid group number {groupno} for team {name}")))?;
    Ok(Team { name, regdate, group })
}

fn match_from_row((position, team_a, team_b, goals_a, goals_b): (i32, String, String, i32, i32)) -> sqlx::Result<Match> {
    Ok(Match {
        order: usize::try_from(position).map_err(|_| decode_error(format!("negative match position {position}")))?,
        goals_a: u32::try_from(goals_a).map_err(|_| decode_error(format!("negative goals {goals_a} for {team_a} in match {position}")))?,
        goals_b: u32::try_from(goals_b).map_err(|_| decode_error(format!("negative goals {goals_b} for {team_b} in match {position}")))?,
        team_a, team_b,
    })
}

pub(crate) async fn teams(transaction: &mut Transaction<'_, Postgres>) -> sqlx::Result<Vec<Team>> {
    sqlx::query_as::<_, (String, NaiveDate, i16)>("SELECT name, regdate, groupno FROM teams ORDER BY position ASC")
        .fetch_all(&mut **transaction).await?
        .into_iter()
        .map(team_from_row)
        .collect()
}

pub(crate) async fn matches(transaction: &mut Transaction<'_, Postgres>) -> sqlx::Result<Vec<Match>> {
    sqlx::query_as::<_, (i32, String, String, i32, i32)>("SELECT position, namea, nameb, goalsa, goalsb FROM matches ORDER BY position ASC")
        .fetch_all(&mut **transaction).await?
        .into_iter()
        .map(match_from_row)
        .collect()
}

async fn delete_table(transaction: &mut Transaction<'_, Postgres>) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM matches").execute(&mut **transaction).await?;
    sqlx::query("DELETE FROM teams").execute(&mut **transaction).await?;
    sqlx::query("DELETE FROM forms").execute(&mut **transaction).await?;
    Ok(())
}

async fn append_log(transaction: &mut Transaction<'_, Postgres>, user: &User, action: LogAction, form: Option<&RawForm>) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO logs (user_id, action, form_teams, form_matches) VALUES ($1, $2, $3, $4)")
        .bind(user.id)
        .bind(action)
        .bind(form.map(|form| &form.teams))
        .bind(form.map(|form| &form.matches))
        .execute(&mut **transaction).await?;
    Ok(())
}

/// Replaces all teams, matches and the stored form text, and records `action` in the audit log.
///
/// Nothing is visible to other connections until the caller commits the transaction.
pub(crate) async fn replace_all(transaction: &mut Transaction<'_, Postgres>, user: &User, action: LogAction, teams: &[Team], matches: &[Match], form: &RawForm) -> sqlx::Result<()> {
    delete_table(transaction).await?;
    for (position, team) in teams.iter().enumerate() {
        sqlx::query("INSERT INTO teams (name, regdate, groupno, position) VALUES ($1, $2, $3, $4)")
            .bind(&team.name)
            .bind(team.regdate)
            .bind(team.group.number())
            .bind(column_int(position)?)
            .execute(&mut **transaction).await?;
    }
    for m in matches {
        sqlx::query("INSERT INTO matches (position, namea, nameb, goalsa, goalsb) VALUES ($1, $2, $3, $4, $5)")
            .bind(column_int(m.order)?)
            .bind(&m.team_a)
            .bind(&m.team_b)
            .bind(column_int(m.goals_a)?)
            .bind(column_int(m.goals_b)?)
            .execute(&mut **transaction).await?;
    }
    sqlx::query("INSERT INTO forms (teams, matches) VALUES ($1, $2)")
        .bind(&form.teams)
        .bind(&form.matches)
        .execute(&mut **transaction).await?;
    append_log(transaction, user, action, Some(form)).await
}

/// Deletes all teams, matches and the stored form text, and records the deletion in the audit log.
pub(crate) async fn clear(transaction: &mut Transaction<'_, Postgres>, user: &User) -> sqlx::Result<()> {
    delete_table(transaction).await?;
    append_log(transaction, user, LogAction::Delete, None).await
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct Log {
    pub(crate) user_email: String,
    pub(crate) user_name: Option<String>,
    pub(crate) action: LogAction,
    pub(crate) form_teams: Option<String>,
    pub(crate) form_matches: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

impl Log {
    /// All entries, newest first.
    pub(crate) async fn all(transaction: &mut Transaction<'_, Postgres>) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as(r#"
            SELECT users.email AS user_email, users.name AS user_name, action, form_teams, form_matches, created_at
            FROM logs JOIN users ON users.id = logs.user_id
            ORDER BY created_at DESC, logs.id DESC
        "#).fetch_all(&mut **transaction).await
    }

    pub(crate) async fn delete_all(transaction: &mut Transaction<'_, Postgres>) -> sqlx::Result<u64> {
        Ok(sqlx::query("DELETE FROM logs").execute(&mut **transaction).await?.rows_affected())
    }

    pub(crate) fn user_display_name(&self) -> &str {
        self.user_name.as_deref().filter(|name| !name.is_empty()).unwrap_or(&self.user_email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regdate() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()
    }

    #[test]
    fn decodes_team_row() {
        assert_eq!(
            team_from_row((format!("teamA"), regdate(), 2)).unwrap(),
            Team { name: format!("teamA"), regdate: regdate(), group: Group::Two },
        );
    }

    #[test]
    fn rejects_unknown_group_number() {
        assert!(matches!(team_from_row((format!("teamA"), regdate(), 3)), Err(sqlx::Error::Decode(_))));
    }

    #[test]
    fn decodes_match_row() {
        assert_eq!(
            match_from_row((0, format!("teamA"), format!("teamB"), 2, 1)).unwrap(),
            Match { order: 0, team_a: format!("teamA"), team_b: format!("teamB"), goals_a: 2, goals_b: 1 },
        );
    }

    #[test]
    fn rejects_negative_match_columns() {
        assert!(matches!(match_from_row((0, format!("teamA"), format!("teamB"), -1, 0)), Err(sqlx::Error::Decode(_))));
        assert!(matches!(match_from_row((0, format!("teamA"), format!("teamB"), 0, -1)), Err(sqlx::Error::Decode(_))));
        assert!(matches!(match_from_row((-1, format!("teamA"), format!("teamB"), 0, 0)), Err(sqlx::Error::Decode(_))));
    }

    #[test]
    fn column_int_rejects_values_out_of_range() {
        assert_eq!(column_int(7usize).unwrap(), 7);
        assert!(matches!(column_int(u32::MAX), Err(sqlx::Error::Encode(_))));
    }
}
