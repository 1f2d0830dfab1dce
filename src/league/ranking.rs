use {
    std::cmp::Ordering,
    chrono::NaiveDate,
    super::{
        Group,
        Match,
        Team,
    },
};

/// Points awarded per match outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Points {
    pub(crate) win: i64,
    pub(crate) draw: i64,
    pub(crate) loss: i64,
}

impl Points {
    /// The scheme the table is primarily ranked by.
    pub(crate) const NORMAL: Self = Self { win: 3, draw: 1, loss: 0 };
    /// Breaks ties left after points and goal difference.
    pub(crate) const ALTERNATE: Self = Self { win: 5, draw: 3, loss: 1 };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TeamDetails {
    pub(crate) name: String,
    pub(crate) regdate: NaiveDate,
    pub(crate) group: Group,
    pub(crate) wins: u32,
    pub(crate) draws: u32,
    pub(crate) losses: u32,
    /// Goal difference over all matches.
    pub(crate) goals: i64,
}

impl TeamDetails {
    pub(crate) fn new(team: &Team, matches: &[Match]) -> Self {
        let mut details = Self {
            name: team.name.clone(),
            regdate: team.regdate,
            group: team.group,
            wins: 0,
            draws: 0,
            losses: 0,
            goals: 0,
        };
        for (scored, conceded) in matches.iter().filter_map(|m| m.score_for(&team.name)) {
            match scored.cmp(&conceded) {
                Ordering::Greater => details.wins += 1,
                Ordering::Equal => details.draws += 1,
                Ordering::Less => details.losses += 1,
            }
            details.goals += i64::from(scored) - i64::from(conceded);
        }
        details
    }

    pub(crate) fn played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    pub(crate) fn points(&self, scheme: Points) -> i64 {
        i64::from(self.wins) * scheme.win + i64::from(self.draws) * scheme.draw + i64::from(self.losses) * scheme.loss
    }

    pub(crate) fn total_match_points(&self) -> i64 {
        self.points(Points::NORMAL)
    }

    pub(crate) fn total_alternate_match_points(&self) -> i64 {
        self.points(Points::ALTERNATE)
    }

    /// Ranking order: better teams compare as less.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other.total_match_points().cmp(&self.total_match_points())
            .then_with(|| other.goals.cmp(&self.goals))
            .then_with(|| other.total_alternate_match_points().cmp(&self.total_alternate_match_points()))
            .then_with(|| self.regdate.cmp(&other.regdate))
    }
}

/// Per-team details in registration order.
pub(crate) fn table(teams: &[Team], matches: &[Match]) -> Vec<TeamDetails> {
    teams.iter().map(|team| TeamDetails::new(team, matches)).collect()
}

/// Ranks a table: points, then goal difference, then alternate points, then earliest registration.
///
/// The sort is stable, so teams equal on every key keep their relative order.
pub(crate) fn sort_table(mut table: Vec<TeamDetails>) -> Vec<TeamDetails> {
    table.sort_by(TeamDetails::rank_cmp);
    table
}

pub(crate) fn group_table(table: &[TeamDetails], group: Group) -> Vec<TeamDetails> {
    sort_table(table.iter().filter(|details| details.group == group).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(name: &str) -> TeamDetails {
        TeamDetails {
            name: name.to_owned(),
            regdate: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            group: Group::One,
            wins: 0,
            draws: 0,
            losses: 0,
            goals: 0,
        }
    }

    #[test]
    fn match_points_are_linear() {
        let mut team = details("teamA");
        team.wins = 4;
        assert_eq!(team.total_match_points(), 4 * Points::NORMAL.win);
        assert_eq!(team.total_alternate_match_points(), 4 * Points::ALTERNATE.win);
        team.wins = 7;
        team.draws = 2;
        team.losses = 3;
        assert_eq!(team.total_match_points(), 7 * Points::NORMAL.win + 2 * Points::NORMAL.draw + 3 * Points::NORMAL.loss);
        assert_eq!(team.total_alternate_match_points(), 7 * Points::ALTERNATE.win + 2 * Points::ALTERNATE.draw + 3 * Points::ALTERNATE.loss);
    }

    #[test]
    fn details_from_matches() {
        let team = Team { name: format!("teamA"), regdate: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), group: Group::One };
        let matches = [
            Match { order: 0, team_a: format!("teamA"), team_b: format!("teamB"), goals_a: 3, goals_b: 1 },
            Match { order: 1, team_a: format!("teamC"), team_b: format!("teamA"), goals_a: 2, goals_b: 2 },
            Match { order: 2, team_a: format!("teamD"), team_b: format!("teamA"), goals_a: 4, goals_b: 0 },
            Match { order: 3, team_a: format!("teamB"), team_b: format!("teamC"), goals_a: 9, goals_b: 0 },
        ];
        let details = TeamDetails::new(&team, &matches);
        assert_eq!((details.wins, details.draws, details.losses, details.goals), (1, 1, 1, -2));
        assert_eq!(details.played(), 3);
    }

    #[test]
    fn points_first() {
        let (mut a, mut b) = (details("teamA"), details("teamB"));
        a.wins = 4;
        b.wins = 9;
        a.goals = 10;
        b.goals = 2;
        b.regdate = NaiveDate::from_ymd_opt(2024, 12, 11).unwrap();
        assert_eq!(sort_table(vec![a.clone(), b.clone()]), vec![b, a]);
    }

    #[test]
    fn goal_difference_second() {
        let (mut a, mut b) = (details("teamA"), details("teamB"));
        a.wins = 1;
        b.draws = 3;
        a.goals = 9;
        b.goals = 11;
        b.regdate = NaiveDate::from_ymd_opt(2024, 12, 11).unwrap();
        assert_eq!(sort_table(vec![a.clone(), b.clone()]), vec![b, a]);
    }

    #[test]
    fn alternate_points_third() {
        let (mut a, mut b) = (details("teamA"), details("teamB"));
        a.wins = 1;
        b.draws = 3;
        a.goals = 10;
        b.goals = 10;
        b.regdate = NaiveDate::from_ymd_opt(2024, 12, 11).unwrap();
        assert_eq!(sort_table(vec![a.clone(), b.clone()]), vec![b, a]);
    }

    #[test]
    fn registration_date_last() {
        let (mut a, b) = (details("teamA"), details("teamB"));
        a.regdate = NaiveDate::from_ymd_opt(2024, 12, 11).unwrap();
        assert_eq!(sort_table(vec![a.clone(), b.clone()]), vec![b, a]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let (a, b) = (details("teamA"), details("teamB"));
        assert_eq!(sort_table(vec![a.clone(), b.clone()]), vec![a.clone(), b.clone()]);
        assert_eq!(sort_table(vec![b.clone(), a.clone()]), vec![b, a]);
    }

    #[test]
    fn group_tables_are_ranked_separately() {
        let (mut a, mut b, mut c) = (details("teamA"), details("teamB"), details("teamC"));
        a.wins = 1;
        b.group = Group::Two;
        c.wins = 2;
        let table = vec![a.clone(), b.clone(), c.clone()];
        assert_eq!(group_table(&table, Group::One), vec![c, a]);
        assert_eq!(group_table(&table, Group::Two), vec![b]);
    }
}
