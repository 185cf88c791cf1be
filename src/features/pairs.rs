//! Balanced pair construction from raw match records
//!
//! Every historical match yields two observations: one from the winner's
//! point of view (label 1) and its exact sign mirror from the loser's point
//! of view (label 0). Training on both halves keeps the classifier from
//! learning a "winner listed first" bias.

use crate::features::registry::Feature;
use crate::RawMatch;
use std::collections::HashMap;

/// One row of the balanced training set, from a single contestant's view
///
/// Differential features are `None` when either operand was missing in the
/// raw record; the cleaner imputes them later, per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    pub surface_hard: f32,
    pub surface_clay: f32,
    pub surface_grass: f32,
    pub best_of: Option<f32>,
    pub rank_diff: Option<f32>,
    pub pts_diff: Option<f32>,
    pub age_diff: Option<f32>,
    pub ace_diff: Option<f32>,
    pub df_diff: Option<f32>,
    pub first_pct_diff: Option<f32>,
    pub bp_pct_diff: Option<f32>,
    pub h2h_diff: Option<f32>,
    /// 1.0 = this contestant won
    pub label: f32,
}

impl Observation {
    /// Value of a registry feature for this observation
    pub fn feature(&self, feature: Feature) -> Option<f32> {
        match feature {
            Feature::SurfaceHard => Some(self.surface_hard),
            Feature::SurfaceClay => Some(self.surface_clay),
            Feature::SurfaceGrass => Some(self.surface_grass),
            Feature::BestOf => self.best_of,
            Feature::RankDiff => self.rank_diff,
            Feature::PtsDiff => self.pts_diff,
            Feature::AgeDiff => self.age_diff,
            Feature::AceDiff => self.ace_diff,
            Feature::DfDiff => self.df_diff,
            Feature::FirstPctDiff => self.first_pct_diff,
            Feature::BpPctDiff => self.bp_pct_diff,
            Feature::H2hDiff => self.h2h_diff,
        }
    }

    /// The opposing contestant's view: every differential negated, label
    /// flipped. Surface flags and best_of describe the match, not a side,
    /// and are shared as-is.
    fn mirror(&self) -> Observation {
        let neg = |v: Option<f32>| v.map(|x| -x);
        Observation {
            surface_hard: self.surface_hard,
            surface_clay: self.surface_clay,
            surface_grass: self.surface_grass,
            best_of: self.best_of,
            rank_diff: neg(self.rank_diff),
            pts_diff: neg(self.pts_diff),
            age_diff: neg(self.age_diff),
            ace_diff: neg(self.ace_diff),
            df_diff: neg(self.df_diff),
            first_pct_diff: neg(self.first_pct_diff),
            bp_pct_diff: neg(self.bp_pct_diff),
            h2h_diff: neg(self.h2h_diff),
            label: 1.0 - self.label,
        }
    }
}

/// Difference of two optional operands; missing if either is missing
fn diff(a: Option<f32>, b: Option<f32>) -> Option<f32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a - b),
        _ => None,
    }
}

/// Success rate `won / attempted`, missing when the denominator is missing
/// or non-positive. Division by zero is impossible by construction.
fn rate(won: Option<f32>, attempted: Option<f32>) -> Option<f32> {
    match (won, attempted) {
        (Some(w), Some(a)) if a > 0.0 => Some(w / a),
        _ => None,
    }
}

/// Surface one-hot flags from an exact, case-sensitive string match
fn surface_flags(surface: Option<&str>) -> (f32, f32, f32) {
    match surface {
        Some("Hard") => (1.0, 0.0, 0.0),
        Some("Clay") => (0.0, 1.0, 0.0),
        Some("Grass") => (0.0, 0.0, 1.0),
        _ => (0.0, 0.0, 0.0),
    }
}

/// Running directed head-to-head tally, keyed by contestant names
#[derive(Debug, Default)]
struct HeadToHead {
    wins: HashMap<(String, String), u32>,
}

impl HeadToHead {
    /// Wins of `a` over `b` minus wins of `b` over `a`, from records seen so
    /// far. Missing when either name is unknown.
    fn diff(&self, a: Option<&str>, b: Option<&str>) -> Option<f32> {
        let (a, b) = match (a, b) {
            (Some(a), Some(b)) => (a, b),
            _ => return None,
        };
        let ab = *self
            .wins
            .get(&(a.to_string(), b.to_string()))
            .unwrap_or(&0);
        let ba = *self
            .wins
            .get(&(b.to_string(), a.to_string()))
            .unwrap_or(&0);
        Some(ab as f32 - ba as f32)
    }

    fn record_win(&mut self, winner: Option<&str>, loser: Option<&str>) {
        if let (Some(w), Some(l)) = (winner, loser) {
            *self.wins.entry((w.to_string(), l.to_string())).or_insert(0) += 1;
        }
    }
}

/// Build the balanced observation sequence from raw match records
///
/// Emits exactly `2 * records.len()` observations, [winner, loser] per
/// record, preserving input order. The head-to-head tally only sees records
/// preceding the current one, so the feature is leakage-free with respect to
/// the input sequence. An empty input yields an empty output.
pub fn build_pairs(records: &[RawMatch]) -> Vec<Observation> {
    let mut observations = Vec::with_capacity(records.len() * 2);
    let mut h2h = HeadToHead::default();

    for m in records {
        let (surface_hard, surface_clay, surface_grass) =
            surface_flags(m.surface.as_deref());

        // Winner-perspective differentials, computed exactly once
        let winner = Observation {
            surface_hard,
            surface_clay,
            surface_grass,
            best_of: m.best_of,
            rank_diff: diff(m.winner_rank, m.loser_rank),
            pts_diff: diff(m.winner_rank_points, m.loser_rank_points),
            age_diff: diff(m.winner_age, m.loser_age),
            ace_diff: diff(m.w_ace, m.l_ace),
            df_diff: diff(m.w_df, m.l_df),
            first_pct_diff: diff(
                rate(m.w_first_won, m.w_first_in),
                rate(m.l_first_won, m.l_first_in),
            ),
            bp_pct_diff: diff(
                rate(m.w_bp_saved, m.w_bp_faced),
                rate(m.l_bp_saved, m.l_bp_faced),
            ),
            h2h_diff: h2h.diff(m.winner_name.as_deref(), m.loser_name.as_deref()),
            label: 1.0,
        };

        // The loser observation is the negation of the winner's, never an
        // independent recomputation that could diverge on missing data.
        let loser = winner.mirror();

        observations.push(winner);
        observations.push(loser);

        h2h.record_win(m.winner_name.as_deref(), m.loser_name.as_deref());
    }

    observations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_match() -> RawMatch {
        RawMatch {
            winner_rank: Some(10.0),
            loser_rank: Some(50.0),
            winner_rank_points: Some(3000.0),
            loser_rank_points: Some(800.0),
            winner_age: Some(24.5),
            loser_age: Some(29.0),
            surface: Some("Clay".to_string()),
            best_of: Some(3.0),
            w_first_in: Some(40.0),
            w_first_won: Some(30.0),
            l_first_in: Some(35.0),
            l_first_won: Some(15.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_pairing_symmetry() {
        let obs = build_pairs(&[base_match()]);
        assert_eq!(obs.len(), 2);

        let (winner, loser) = (&obs[0], &obs[1]);
        assert_eq!(winner.label, 1.0);
        assert_eq!(loser.label, 0.0);

        assert_eq!(winner.rank_diff, Some(-40.0));
        assert_eq!(loser.rank_diff, Some(40.0));
        assert_eq!(winner.pts_diff, Some(2200.0));
        assert_eq!(loser.pts_diff, Some(-2200.0));
        assert_eq!(winner.age_diff, Some(-4.5));
        assert_eq!(loser.age_diff, Some(4.5));

        // Match-level fields are shared, not mirrored
        assert_eq!(winner.surface_clay, loser.surface_clay);
        assert_eq!(winner.best_of, loser.best_of);
    }

    #[test]
    fn test_end_to_end_example() {
        // Worked example: rank 10 vs 50 on clay, 30/40 vs 15/35 first serves
        let obs = build_pairs(&[base_match()]);

        let winner = &obs[0];
        assert_eq!(winner.surface_clay, 1.0);
        assert_eq!(winner.surface_hard, 0.0);
        assert_eq!(winner.surface_grass, 0.0);
        assert_eq!(winner.best_of, Some(3.0));
        assert_eq!(winner.rank_diff, Some(-40.0));
        let first_pct = winner.first_pct_diff.unwrap();
        assert!((first_pct - 0.3214).abs() < 1e-4, "got {}", first_pct);

        let loser = &obs[1];
        assert_eq!(loser.rank_diff, Some(40.0));
        assert!((loser.first_pct_diff.unwrap() + 0.3214).abs() < 1e-4);
        assert_eq!(loser.label, 0.0);
    }

    #[test]
    fn test_missing_propagation() {
        let mut m = base_match();
        m.winner_rank = None;
        let obs = build_pairs(&[m]);

        // Missing operand means missing difference on both sides, not zero
        assert_eq!(obs[0].rank_diff, None);
        assert_eq!(obs[1].rank_diff, None);
        assert!(obs[0].pts_diff.is_some());
    }

    #[test]
    fn test_rate_guard_zero_denominator() {
        let mut m = base_match();
        m.w_first_in = Some(0.0);
        let obs = build_pairs(&[m]);

        assert_eq!(obs[0].first_pct_diff, None);
        assert_eq!(obs[1].first_pct_diff, None);
    }

    #[test]
    fn test_rate_guard_missing_numerator() {
        let mut m = base_match();
        m.w_first_won = None;
        let obs = build_pairs(&[m]);
        assert_eq!(obs[0].first_pct_diff, None);
    }

    #[test]
    fn test_bp_rate() {
        let mut m = base_match();
        m.w_bp_saved = Some(6.0);
        m.w_bp_faced = Some(8.0);
        m.l_bp_saved = Some(2.0);
        m.l_bp_faced = Some(4.0);
        let obs = build_pairs(&[m]);
        assert!((obs[0].bp_pct_diff.unwrap() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_surface_one_hot() {
        for (surface, expected) in [
            (Some("Hard"), (1.0, 0.0, 0.0)),
            (Some("Clay"), (0.0, 1.0, 0.0)),
            (Some("Grass"), (0.0, 0.0, 1.0)),
            (Some("Carpet"), (0.0, 0.0, 0.0)),
            // Case-sensitive: lowercase does not match
            (Some("clay"), (0.0, 0.0, 0.0)),
            (None, (0.0, 0.0, 0.0)),
        ] {
            assert_eq!(surface_flags(surface), expected, "surface {:?}", surface);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(build_pairs(&[]).is_empty());
    }

    #[test]
    fn test_order_and_count() {
        let records = vec![base_match(), base_match(), base_match()];
        let obs = build_pairs(&records);
        assert_eq!(obs.len(), 6);
        for pair in obs.chunks(2) {
            assert_eq!(pair[0].label, 1.0);
            assert_eq!(pair[1].label, 0.0);
        }
    }

    #[test]
    fn test_h2h_running_tally() {
        let mut first = base_match();
        first.winner_name = Some("Alpha".to_string());
        first.loser_name = Some("Beta".to_string());
        let second = first.clone();
        let mut third = base_match();
        third.winner_name = Some("Beta".to_string());
        third.loser_name = Some("Alpha".to_string());

        let obs = build_pairs(&[first, second, third]);

        // No prior meetings before the first record
        assert_eq!(obs[0].h2h_diff, Some(0.0));
        // Alpha leads 1-0 before the second record
        assert_eq!(obs[2].h2h_diff, Some(1.0));
        // Beta trails 0-2 before the third record (Beta's winner view)
        assert_eq!(obs[4].h2h_diff, Some(-2.0));
        // Loser view mirrors it
        assert_eq!(obs[5].h2h_diff, Some(2.0));
    }

    #[test]
    fn test_h2h_missing_names() {
        let obs = build_pairs(&[base_match()]);
        assert_eq!(obs[0].h2h_diff, None);
    }
}
