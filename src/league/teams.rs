use {
    std::collections::HashSet,
    chrono::{
        Datelike as _,
        Local,
        NaiveDate,
    },
    enum_iterator::all,
    super::{
        Error,
        Field,
        Group,
        Team,
        lines,
    },
};

/// Parses the teams text area, one `<name> <MM/DD> <group>` per line.
///
/// Registration dates are taken to be in the current year.
pub(crate) fn parse_teams(raw: &str) -> Result<Vec<Team>, Error> {
    parse_teams_in_year(raw, Local::now().year())
}

pub(crate) fn parse_teams_in_year(raw: &str, year: i32) -> Result<Vec<Team>, Error> {
    if raw.trim().is_empty() {
        return Err(Error::EmptyInput(Field::Teams))
    }
    let mut names = HashSet::new();
    let mut teams = Vec::default();
    for (idx, tokens) in lines(raw) {
        let line = idx + 1;
        let [name, date, group] = tokens[..] else {
            return Err(Error::MalformedTeamLine { line })
        };
        let regdate = parse_date(date, year).ok_or_else(|| Error::InvalidDate { line, token: date.to_owned() })?;
        let group = group.parse().ok()
            .and_then(Group::from_number)
            .ok_or_else(|| Error::InvalidGroupNumber { line, token: group.to_owned() })?;
        if !names.insert(name) {
            return Err(Error::DuplicateTeam { line, name: name.to_owned() })
        }
        teams.push(Team { name: name.to_owned(), regdate, group });
    }
    Ok(teams)
}

/// Parses `MM/DD`, rejecting anything but one or two digits per segment.
fn parse_date(token: &str, year: i32) -> Option<NaiveDate> {
    let (month, day) = token.split_once('/')?;
    let segment = |s: &str| (1..=2).contains(&s.len()) && s.bytes().all(|c| c.is_ascii_digit());
    if !segment(month) || !segment(day) {
        return None
    }
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

/// Checks that both groups have exactly `group_size` members, group 1 first.
pub(crate) fn validate_teams(teams: &[Team], group_size: usize) -> Result<(), Error> {
    for group in all::<Group>() {
        let actual = teams.iter().filter(|team| team.group == group).count();
        if actual != group_size {
            return Err(Error::GroupSizeMismatch { group, actual, expected: group_size })
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str, group: Group) -> Team {
        Team { name: name.to_owned(), regdate: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), group }
    }

    #[test]
    fn parses_lines_in_order() {
        let teams = parse_teams_in_year("teamA 01/04 1\r\nteamB 12/31 2\n\n  teamC 2/9 1  ", 2024).unwrap();
        assert_eq!(teams, vec![
            Team { name: format!("teamA"), regdate: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(), group: Group::One },
            Team { name: format!("teamB"), regdate: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(), group: Group::Two },
            Team { name: format!("teamC"), regdate: NaiveDate::from_ymd_opt(2024, 2, 9).unwrap(), group: Group::One },
        ]);
    }

    #[test]
    fn blank_input() {
        assert_eq!(parse_teams("").unwrap_err().to_string(), "Please fill in the teams.");
        assert_eq!(parse_teams(" \r\n\t").unwrap_err().to_string(), "Please fill in the teams.");
    }

    #[test]
    fn group_must_be_one_or_two() {
        assert_eq!(
            parse_teams("teamA 01/04 2\r\nteamB 01/04 3").unwrap_err().to_string(),
            "For line 2: Invalid group number \"3\", expected 1 or 2.",
        );
        assert!(matches!(parse_teams("teamA 01/04 one"), Err(Error::InvalidGroupNumber { line: 1, .. })));
    }

    #[test]
    fn malformed_dates() {
        for raw in ["teamA 01/04 1\r\nteamB 01/024 2", "teamA 01/04 1\r\nteamB 00/20 2", "teamA 01/04 1\r\nteamB 0020 2"] {
            let error = parse_teams(raw).unwrap_err();
            assert!(matches!(error, Error::InvalidDate { line: 2, .. }));
            assert!(error.to_string().contains("Invalid date"));
        }
        assert!(parse_teams_in_year("teamA 02/29 1", 2023).is_err());
        assert!(parse_teams_in_year("teamA 02/29 1", 2024).is_ok());
        assert!(parse_teams_in_year("teamA 13/01 1", 2024).is_err());
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(parse_teams("teamA 01/04"), Err(Error::MalformedTeamLine { line: 1 }));
        assert_eq!(parse_teams("teamA 01/04 1\nteam B 01/05 1"), Err(Error::MalformedTeamLine { line: 2 }));
    }

    #[test]
    fn duplicate_names() {
        assert_eq!(
            parse_teams("teamA 01/04 1\nteamA 01/05 2").unwrap_err().to_string(),
            "For line 2: Team \"teamA\" is already registered.",
        );
    }

    #[test]
    fn too_few_teams_in_a_group() {
        let teams = [team("teamA", Group::One), team("teamB", Group::One)];
        assert_eq!(validate_teams(&teams, 2).unwrap_err().to_string(), "Group 2 has 0 team(s) instead of 2.");
        let teams = [team("teamD", Group::Two), team("teamE", Group::Two)];
        assert_eq!(validate_teams(&teams, 2).unwrap_err().to_string(), "Group 1 has 0 team(s) instead of 2.");
    }

    #[test]
    fn too_many_teams_in_a_group() {
        let teams = [team("teamA", Group::One), team("teamB", Group::One), team("teamC", Group::One), team("teamD", Group::Two), team("teamE", Group::Two)];
        assert_eq!(validate_teams(&teams, 2).unwrap_err().to_string(), "Group 1 has 3 team(s) instead of 2.");
        let teams = [team("teamA", Group::One), team("teamB", Group::One), team("teamD", Group::Two), team("teamE", Group::Two), team("teamF", Group::Two)];
        assert_eq!(validate_teams(&teams, 2).unwrap_err().to_string(), "Group 2 has 3 team(s) instead of 2.");
    }

    #[test]
    fn balanced_groups() {
        let teams = [team("teamA", Group::One), team("teamB", Group::Two)];
        assert_eq!(validate_teams(&teams, 1), Ok(()));
    }
}
