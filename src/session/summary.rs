//! End-of-session reporting
//!
//! Everything here is derived from the round history on demand and never
//! stored, so it cannot drift from the recorded results.

use super::{Session, SessionError};
use crate::types::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Asset shown when the player scored too little to have a best era
pub const STRUGGLED_ASSET_ID: &str = "struggled";

/// Per-era totals
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EraStats {
    pub era: EraId,
    pub rounds: u32,
    pub points: u32,
    pub points_max: u32,
    pub reaction_time_seconds: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// No points, or under a fifth of what was possible
    Struggled,
    BestEra { era: EraId },
}

impl Verdict {
    /// Id of the reward asset for this verdict
    pub fn asset_id(&self) -> &str {
        match self {
            Verdict::Struggled => STRUGGLED_ASSET_ID,
            Verdict::BestEra { era } => era,
        }
    }

    /// Closing line for the end screen
    pub fn phrase(&self) -> String {
        match self {
            Verdict::Struggled => "Ouch... no movies found? Give it another go!".to_string(),
            Verdict::BestEra { era } => match find_era(era) {
                Some(known) => known.tagline.to_string(),
                None => format!("Your best era: {}!", era),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionSummary {
    pub total_score: u32,
    pub total_possible: u32,
    /// Ranked best first
    pub eras: Vec<EraStats>,
    pub best_era: Option<EraId>,
    pub verdict: Verdict,
}

impl SessionSummary {
    pub fn from_history(history: &[RoundResult]) -> Self {
        let mut by_era: BTreeMap<&str, EraStats> = BTreeMap::new();
        for result in history {
            let stats = by_era.entry(result.era.as_str()).or_insert_with(|| EraStats {
                era: result.era.clone(),
                rounds: 0,
                points: 0,
                points_max: 0,
                reaction_time_seconds: 0.0,
            });
            stats.rounds += 1;
            stats.points += result.points_awarded;
            stats.points_max += result.points_max;
            stats.reaction_time_seconds += result.reaction_time_seconds;
        }

        let mut eras: Vec<EraStats> = by_era.into_values().collect();
        // Most points first, faster total reaction time breaks ties
        eras.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| a.reaction_time_seconds.total_cmp(&b.reaction_time_seconds))
                .then_with(|| a.era.cmp(&b.era))
        });

        let total_score: u32 = history.iter().map(|r| r.points_awarded).sum();
        let total_possible: u32 = history.iter().map(|r| r.points_max).sum();
        let best_era = eras.first().map(|stats| stats.era.clone());

        // Under 20% of the possible points counts as struggling
        let struggled = total_score == 0 || u64::from(total_score) * 5 < u64::from(total_possible);
        let verdict = match (&best_era, struggled) {
            (Some(era), false) => Verdict::BestEra { era: era.clone() },
            _ => Verdict::Struggled,
        };

        Self {
            total_score,
            total_possible,
            eras,
            best_era,
            verdict,
        }
    }
}

impl Session {
    /// Summary of a finished session
    pub fn summary(&self) -> Result<SessionSummary, SessionError> {
        if self.phase != Phase::Finished {
            return Err(SessionError::InvalidOperation(
                "Summary is only available once the session is finished".to_string(),
            ));
        }
        Ok(SessionSummary::from_history(&self.history))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{config, movie};
    use super::super::MovieQueue;
    use super::*;

    fn result(round: u32, era: &str, points: u32, reaction: f64) -> RoundResult {
        RoundResult {
            round_number: round,
            correct_title: format!("Movie {}", round),
            guess_text: "guess".to_string(),
            points_awarded: points,
            points_max: 10,
            reaction_time_seconds: reaction,
            difficulty: 5.0,
            era: era.to_string(),
            poster_path: String::new(),
            tier: if points == 10 { Tier::Exact } else { Tier::Wrong },
        }
    }

    #[test]
    fn test_groups_and_ranks_eras() {
        let history = vec![
            result(1, "1990s", 10, 5.0),
            result(2, "2000s", 4, 3.0),
            result(3, "1990s", 0, 12.0),
            result(4, "2010s", 10, 2.5),
            result(5, "2000s", 9, 1.0),
        ];

        let summary = SessionSummary::from_history(&history);

        assert_eq!(summary.total_score, 33);
        assert_eq!(summary.total_possible, 50);
        let order: Vec<&str> = summary.eras.iter().map(|e| e.era.as_str()).collect();
        // 2000s: 13 points; 2010s and 1990s tie on 10, 2010s was faster
        assert_eq!(order, vec!["2000s", "2010s", "1990s"]);
        assert_eq!(summary.eras[0].rounds, 2);
        assert_eq!(summary.eras[0].points_max, 20);
        assert_eq!(summary.eras[2].reaction_time_seconds, 17.0);
        assert_eq!(summary.best_era.as_deref(), Some("2000s"));
        assert_eq!(
            summary.verdict,
            Verdict::BestEra {
                era: "2000s".to_string()
            }
        );
    }

    #[test]
    fn test_reaction_time_breaks_ties() {
        let history = vec![result(1, "1990s", 10, 8.0), result(2, "2020s", 10, 7.5)];
        let summary = SessionSummary::from_history(&history);
        assert_eq!(summary.best_era.as_deref(), Some("2020s"));
    }

    #[test]
    fn test_low_score_struggles() {
        // 7 of 40 is under 20%
        let history = vec![
            result(1, "1990s", 7, 1.0),
            result(2, "2000s", 0, 1.0),
            result(3, "2010s", 0, 1.0),
            result(4, "2020s", 0, 1.0),
        ];
        let summary = SessionSummary::from_history(&history);
        assert_eq!(summary.verdict, Verdict::Struggled);
        assert_eq!(summary.verdict.asset_id(), STRUGGLED_ASSET_ID);
        // The ranking is still reported
        assert_eq!(summary.best_era.as_deref(), Some("1990s"));

        // Exactly 20% is enough
        let history = vec![
            result(1, "1990s", 8, 1.0),
            result(2, "2000s", 0, 1.0),
            result(3, "2000s", 0, 1.0),
            result(4, "2000s", 0, 1.0),
        ];
        let summary = SessionSummary::from_history(&history);
        assert_eq!(summary.verdict.asset_id(), "1990s");
    }

    #[test]
    fn test_zero_score_struggles() {
        let history = vec![result(1, "1990s", 0, 1.0)];
        let summary = SessionSummary::from_history(&history);
        assert_eq!(summary.verdict, Verdict::Struggled);
    }

    #[test]
    fn test_empty_history() {
        let summary = SessionSummary::from_history(&[]);
        assert!(summary.eras.is_empty());
        assert!(summary.best_era.is_none());
        assert_eq!(summary.verdict, Verdict::Struggled);
    }

    #[test]
    fn test_verdict_phrases() {
        let best = Verdict::BestEra {
            era: "1990s".to_string(),
        };
        assert!(best.phrase().contains("1990s"));
        let unknown = Verdict::BestEra {
            era: "1970s".to_string(),
        };
        assert_eq!(unknown.phrase(), "Your best era: 1970s!");
        assert!(Verdict::Struggled.phrase().starts_with("Ouch"));
    }

    #[test]
    fn test_summary_requires_finished_session() {
        let queue = MovieQueue::from_movies(vec![movie("Heat", "1990s", 7000)]);
        let mut session = Session::new(config(1), queue).unwrap();
        assert!(matches!(
            session.summary(),
            Err(SessionError::InvalidOperation(_))
        ));

        session.submit_guess("Heat").unwrap();
        assert!(session.summary().is_err());

        session.advance().unwrap();
        let summary = session.summary().unwrap();
        assert_eq!(summary.total_score, 10);
        assert_eq!(summary.best_era.as_deref(), Some("1990s"));
    }
}
