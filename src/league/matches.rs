use {
    std::collections::{
        HashMap,
        HashSet,
    },
    strsim::jaro_winkler,
    super::{
        Error,
        Field,
        Match,
        Team,
        UnknownTeam,
        lines,
    },
};

/// The registered name most similar to `name`.
///
/// This is an approximation: Jaro–Winkler similarity on lowercased names,
/// with the earliest registered team winning ties.
fn closest_name<'a>(teams: &'a [Team], name: &str) -> Option<&'a str> {
    let name = name.to_lowercase();
    let mut best = None::<(&str, f64)>;
    for team in teams {
        let score = jaro_winkler(&team.name.to_lowercase(), &name);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((&team.name, score));
        }
    }
    best.map(|(name, _)| name)
}

/// A goal count: a non-negative integer that fits the database column.
fn parse_goals(token: &str) -> Option<u32> {
    token.parse::<i32>().ok().and_then(|goals| u32::try_from(goals).ok())
}

/// Parses the matches text area, one `<teamA> <teamB> <goalsA> <goalsB>` per line,
/// and checks every match against the already validated `teams`.
///
/// If `expected_matches_per_team` is given, every team must have played at least that many matches.
pub(crate) fn parse_and_validate_matches(teams: &[Team], raw: &str, expected_matches_per_team: Option<usize>) -> Result<Vec<Match>, Error> {
    if raw.trim().is_empty() {
        return Err(Error::EmptyInput(Field::Matches))
    }
    let teams_by_name = teams.iter().map(|team| (&*team.name, team)).collect::<HashMap<_, _>>();
    let mut pairings = HashSet::new();
    let mut matches = Vec::<Match>::default();
    for (idx, tokens) in lines(raw) {
        let [name_a, name_b, goals_a, goals_b] = tokens[..] else {
            return Err(Error::MalformedMatchLine { line: idx + 1 })
        };
        let unknown = [name_a, name_b].into_iter()
            .filter(|name| !teams_by_name.contains_key(name))
            .map(|name| UnknownTeam { name: name.to_owned(), suggestion: closest_name(teams, name).map(str::to_owned) })
            .collect::<Vec<_>>();
        if !unknown.is_empty() {
            return Err(Error::UnknownTeam { line: idx + 1, unknown })
        }
        let (team_a, team_b) = (teams_by_name[name_a], teams_by_name[name_b]);
        let (goals_a, goals_b) = match (parse_goals(goals_a), parse_goals(goals_b)) {
            (Some(parsed_a), Some(parsed_b)) => (parsed_a, parsed_b),
            (parsed_a, parsed_b) => return Err(Error::InvalidGoals {
                line: idx + 1,
                first: parsed_a.is_none().then(|| goals_a.to_owned()),
                second: parsed_b.is_none().then(|| goals_b.to_owned()),
            }),
        };
        // the remaining checks report 0-based line numbers
        if team_a.name == team_b.name {
            return Err(Error::SelfMatch { line: idx, team: team_a.name.clone() })
        }
        if team_a.group != team_b.group {
            return Err(Error::GroupMismatch {
                line: idx,
                team_a: team_a.name.clone(),
                group_a: team_a.group,
                team_b: team_b.name.clone(),
                group_b: team_b.group,
            })
        }
        let pairing = if name_a < name_b { (name_a, name_b) } else { (name_b, name_a) };
        if !pairings.insert(pairing) {
            return Err(Error::DuplicateMatch { line: idx })
        }
        matches.push(Match {
            order: matches.len(),
            team_a: team_a.name.clone(),
            team_b: team_b.name.clone(),
            goals_a,
            goals_b,
        });
    }
    if let Some(expected) = expected_matches_per_team {
        for team in teams {
            let actual = matches.iter().filter(|m| m.involves(&team.name)).count();
            if actual < expected {
                return Err(Error::IncompleteSchedule { team: team.name.clone(), actual, expected })
            }
        }
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use {
        chrono::NaiveDate,
        crate::league::Group,
        super::*,
    };

    fn team(name: &str, group: Group) -> Team {
        Team { name: name.to_owned(), regdate: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), group }
    }

    fn teams() -> Vec<Team> {
        vec![team("teamA", Group::One), team("teamB", Group::One), team("teamD", Group::Two), team("teamE", Group::Two)]
    }

    #[test]
    fn parses_matches_in_order() {
        let matches = parse_and_validate_matches(&teams(), "teamA teamB 3 1\r\n\r\nteamE teamD 0 0\n", None).unwrap();
        assert_eq!(matches, vec![
            Match { order: 0, team_a: format!("teamA"), team_b: format!("teamB"), goals_a: 3, goals_b: 1 },
            Match { order: 1, team_a: format!("teamE"), team_b: format!("teamD"), goals_a: 0, goals_b: 0 },
        ]);
    }

    #[test]
    fn blank_input() {
        assert_eq!(parse_and_validate_matches(&[], "", None).unwrap_err().to_string(), "Please fill in the matches played.");
    }

    #[test]
    fn unknown_team_with_suggestion() {
        assert_eq!(
            parse_and_validate_matches(&[team("teamA", Group::One)], "teamA teamE 0 0", None).unwrap_err().to_string(),
            "For line 1: Invalid team name, team \"teamE\" does not exist. Did you mean \"teamA\"?",
        );
    }

    #[test]
    fn suggestion_tie_prefers_first_registered_team() {
        let teams = [team("teamA", Group::One), team("teamB", Group::One)];
        assert_eq!(
            parse_and_validate_matches(&teams, "teamX teamB 1 0", None),
            Err(Error::UnknownTeam { line: 1, unknown: vec![UnknownTeam { name: format!("teamX"), suggestion: Some(format!("teamA")) }] }),
        );
    }

    #[test]
    fn both_teams_unknown() {
        let teams = [team("Lions", Group::One), team("Tigers", Group::One)];
        assert_eq!(
            parse_and_validate_matches(&teams, "Lions Tigers 1 0\nLoins Tigres 0 0", None).unwrap_err().to_string(),
            "For line 2: Invalid team name, team \"Loins\" does not exist. Did you mean \"Lions\"? Invalid team name, team \"Tigres\" does not exist. Did you mean \"Tigers\"?",
        );
    }

    #[test]
    fn unknown_team_without_registered_teams() {
        assert_eq!(
            parse_and_validate_matches(&[], "teamA teamB 0 0", None).unwrap_err().to_string(),
            "For line 1: Invalid team name, team \"teamA\" does not exist. Invalid team name, team \"teamB\" does not exist.",
        );
    }

    #[test]
    fn malformed_goals() {
        assert_eq!(
            parse_and_validate_matches(&teams(), "teamA teamB hello world", None).unwrap_err().to_string(),
            "For line 1: Invalid number of goals \"hello\" for the first team. Invalid number of goals \"world\" for the second team.",
        );
        assert_eq!(
            parse_and_validate_matches(&teams(), "teamA teamB 2 -1", None).unwrap_err().to_string(),
            "For line 1: Invalid number of goals \"-1\" for the second team.",
        );
    }

    #[test]
    fn non_numeric_first_goals() {
        let error = parse_and_validate_matches(&teams(), "teamA teamB x 1", None).unwrap_err();
        assert_eq!(error, Error::InvalidGoals { line: 1, first: Some(format!("x")), second: None });
        assert_eq!(error.to_string(), "For line 1: Invalid number of goals \"x\" for the first team.");
    }

    #[test]
    fn goals_out_of_column_range() {
        assert_eq!(
            parse_and_validate_matches(&teams(), "teamA teamB 3000000000 0", None),
            Err(Error::InvalidGoals { line: 1, first: Some(format!("3000000000")), second: None }),
        );
        let matches = parse_and_validate_matches(&teams(), "teamA teamB 2147483647 0", None).unwrap();
        assert_eq!(matches[0].goals_a, 2147483647);
    }

    #[test]
    fn cross_group_match() {
        assert_eq!(
            parse_and_validate_matches(&teams(), "teamA teamD 0 0", None).unwrap_err().to_string(),
            "For line 0: teamA in group 1 cannot play against teamD in group 2.",
        );
    }

    #[test]
    fn duplicate_pairing_in_either_order() {
        let error = parse_and_validate_matches(&teams(), "teamA teamB 0 0\r\nteamD teamE 0 0\r\nteamB teamA 0 0", None).unwrap_err();
        assert_eq!(error, Error::DuplicateMatch { line: 2 });
        assert!(error.to_string().contains("Each team can only play another team once."));
    }

    #[test]
    fn team_against_itself() {
        assert!(matches!(parse_and_validate_matches(&teams(), "teamA teamA 1 1", None), Err(Error::SelfMatch { .. })));
    }

    #[test]
    fn malformed_line() {
        assert_eq!(parse_and_validate_matches(&teams(), "teamA teamB 1", None), Err(Error::MalformedMatchLine { line: 1 }));
    }

    #[test]
    fn incomplete_schedule() {
        assert_eq!(
            parse_and_validate_matches(&teams(), "teamA teamB 0 0", Some(1)).unwrap_err().to_string(),
            "teamD only played 0 out of 1 game(s).",
        );
        assert!(parse_and_validate_matches(&teams(), "teamA teamB 0 0\nteamD teamE 1 2", Some(1)).is_ok());
    }
}
