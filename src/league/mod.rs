//! Parsing, validation and ranking of tournament data.
//!
//! Everything in this module is pure: it takes the text of the edit form and
//! either returns validated teams and matches or the first error, phrased for
//! the person who typed the input.

use {
    std::fmt,
    chrono::NaiveDate,
    enum_iterator::Sequence,
};

pub(crate) mod matches;
pub(crate) mod ranking;
pub(crate) mod teams;

pub(crate) use {
    matches::parse_and_validate_matches,
    ranking::{
        TeamDetails,
        group_table,
        table,
    },
    teams::{
        parse_teams,
        validate_teams,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence)]
pub(crate) enum Group {
    One,
    Two,
}

impl Group {
    pub(crate) fn number(&self) -> i16 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    pub(crate) fn from_number(number: i16) -> Option<Self> {
        match number {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.number().fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Team {
    pub(crate) name: String,
    pub(crate) regdate: NaiveDate,
    pub(crate) group: Group,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Match {
    /// Position in the submitted text, used for display and audit order.
    pub(crate) order: usize,
    pub(crate) team_a: String,
    pub(crate) team_b: String,
    pub(crate) goals_a: u32,
    pub(crate) goals_b: u32,
}

impl Match {
    pub(crate) fn involves(&self, team: &str) -> bool {
        self.team_a == team || self.team_b == team
    }

    /// Goals scored and conceded by `team`, if it played in this match.
    pub(crate) fn score_for(&self, team: &str) -> Option<(u32, u32)> {
        if self.team_a == team {
            Some((self.goals_a, self.goals_b))
        } else if self.team_b == team {
            Some((self.goals_b, self.goals_a))
        } else {
            None
        }
    }
}

/// One unknown team name in a match line, with the closest registered name if there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UnknownTeam {
    pub(crate) name: String,
    pub(crate) suggestion: Option<String>,
}

impl fmt::Display for UnknownTeam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid team name, team {:?} does not exist.", self.name)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " Did you mean {suggestion:?}?")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Teams,
    Matches,
}

impl Field {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Teams => "teams",
            Self::Matches => "matches",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum Error {
    #[error("Please fill in the {}.", empty_input_subject(.0))]
    EmptyInput(Field),
    #[error("For line {line}: Expected \"<team name> <registration date MM/DD> <group number>\".")]
    MalformedTeamLine {
        line: usize,
    },
    #[error("For line {line}: Invalid date {token:?}.")]
    InvalidDate {
        line: usize,
        token: String,
    },
    #[error("For line {line}: Invalid group number {token:?}, expected 1 or 2.")]
    InvalidGroupNumber {
        line: usize,
        token: String,
    },
    #[error("For line {line}: Team {name:?} is already registered.")]
    DuplicateTeam {
        line: usize,
        name: String,
    },
    #[error("Group {group} has {actual} team(s) instead of {expected}.")]
    GroupSizeMismatch {
        group: Group,
        actual: usize,
        expected: usize,
    },
    #[error("For line {line}: Expected \"<first team> <second team> <goals of first team> <goals of second team>\".")]
    MalformedMatchLine {
        line: usize,
    },
    #[error("For line {line}: {}", unknown_teams_message(.unknown))]
    UnknownTeam {
        line: usize,
        unknown: Vec<UnknownTeam>,
    },
    #[error("For line {line}: {}", invalid_goals_message(.first, .second))]
    InvalidGoals {
        line: usize,
        first: Option<String>,
        second: Option<String>,
    },
    #[error("For line {line}: {team} cannot play against itself.")]
    SelfMatch {
        line: usize,
        team: String,
    },
    #[error("For line {line}: {team_a} in group {group_a} cannot play against {team_b} in group {group_b}.")]
    GroupMismatch {
        line: usize,
        team_a: String,
        group_a: Group,
        team_b: String,
        group_b: Group,
    },
    #[error("For line {line}: Each team can only play another team once.")]
    DuplicateMatch {
        line: usize,
    },
    #[error("{team} only played {actual} out of {expected} game(s).")]
    IncompleteSchedule {
        team: String,
        actual: usize,
        expected: usize,
    },
}

impl Error {
    /// The form field whose contents caused this error.
    pub(crate) fn field(&self) -> Field {
        match self {
            Self::EmptyInput(field) => *field,
            Self::MalformedTeamLine { .. }
            | Self::InvalidDate { .. }
            | Self::InvalidGroupNumber { .. }
            | Self::DuplicateTeam { .. }
            | Self::GroupSizeMismatch { .. } => Field::Teams,
            Self::MalformedMatchLine { .. }
            | Self::UnknownTeam { .. }
            | Self::InvalidGoals { .. }
            | Self::SelfMatch { .. }
            | Self::GroupMismatch { .. }
            | Self::DuplicateMatch { .. }
            | Self::IncompleteSchedule { .. } => Field::Matches,
        }
    }
}

fn empty_input_subject(field: &Field) -> &'static str {
    match field {
        Field::Teams => "teams",
        Field::Matches => "matches played",
    }
}

fn unknown_teams_message(unknown: &[UnknownTeam]) -> String {
    unknown.iter().map(UnknownTeam::to_string).collect::<Vec<_>>().join(" ")
}

fn invalid_goals_message(first: &Option<String>, second: &Option<String>) -> String {
    let mut message = String::default();
    if let Some(first) = first {
        message.push_str(&format!("Invalid number of goals {first:?} for the first team."));
    }
    if let Some(second) = second {
        if !message.is_empty() {
            message.push(' ');
        }
        message.push_str(&format!("Invalid number of goals {second:?} for the second team."));
    }
    message
}

/// Lines of a form text area with their 0-based index, skipping blank ones.
fn lines(raw: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    raw.split('\n')
        .enumerate()
        .map(|(idx, line)| (idx, line.split_whitespace().collect::<Vec<_>>()))
        .filter(|(_, tokens)| !tokens.is_empty())
}

/// The rules a submission of the edit form is checked against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Submission {
    pub(crate) group_size: usize,
    /// If set, every team must have played every other team of its group.
    pub(crate) require_complete_schedule: bool,
}

impl Submission {
    /// Runs all three phases in order, stopping at the first error.
    pub(crate) fn validate(&self, teams: &str, matches: &str) -> Result<(Vec<Team>, Vec<Match>), Error> {
        let teams = parse_teams(teams)?;
        validate_teams(&teams, self.group_size)?;
        let expected_matches = self.require_complete_schedule.then(|| self.group_size.saturating_sub(1));
        let matches = parse_and_validate_matches(&teams, matches, expected_matches)?;
        Ok((teams, matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goals_message_lists_both_sides() {
        let error = Error::InvalidGoals { line: 1, first: Some(format!("hello")), second: Some(format!("world")) };
        assert_eq!(error.to_string(), "For line 1: Invalid number of goals \"hello\" for the first team. Invalid number of goals \"world\" for the second team.");
        let error = Error::InvalidGoals { line: 3, first: None, second: Some(format!("-1")) };
        assert_eq!(error.to_string(), "For line 3: Invalid number of goals \"-1\" for the second team.");
    }

    #[test]
    fn empty_input_messages() {
        assert_eq!(Error::EmptyInput(Field::Teams).to_string(), "Please fill in the teams.");
        assert_eq!(Error::EmptyInput(Field::Matches).to_string(), "Please fill in the matches played.");
    }

    #[test]
    fn submission_runs_phases_in_order() {
        let submission = Submission { group_size: 2, require_complete_schedule: true };
        let teams = "teamA 01/04 1\nteamB 02/05 1\nteamC 03/06 2\nteamD 04/07 2";
        let (teams, matches) = submission.validate(teams, "teamA teamB 1 0\nteamC teamD 2 2").expect("valid submission");
        assert_eq!(teams.len(), 4);
        assert_eq!(matches.len(), 2);
        let error = submission.validate("teamA 01/04 1", "").unwrap_err();
        assert_eq!(error.field(), Field::Teams);
        let error = submission.validate("teamA 01/04 1\nteamB 02/05 1\nteamC 03/06 2\nteamD 04/07 2", "teamA teamB 1 0").unwrap_err();
        assert_eq!(error, Error::IncompleteSchedule { team: format!("teamC"), actual: 0, expected: 1 });
    }
}
