//! Per-sport feature registry
//!
//! Replaces ad-hoc per-sport branching with a static tagged registry: each
//! sport declares its ordered feature list once, and the pipeline, the batch
//! predictor, and the interactive form all iterate it generically. The
//! declared order is the contract between training and inference.

use crate::Sport;

/// A single input feature the classifier can consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    SurfaceHard,
    SurfaceClay,
    SurfaceGrass,
    BestOf,
    RankDiff,
    PtsDiff,
    AgeDiff,
    AceDiff,
    DfDiff,
    FirstPctDiff,
    BpPctDiff,
    H2hDiff,
}

impl Feature {
    /// Stable column name, persisted in the scaler artifact
    pub fn name(&self) -> &'static str {
        match self {
            Feature::SurfaceHard => "surface_hard",
            Feature::SurfaceClay => "surface_clay",
            Feature::SurfaceGrass => "surface_grass",
            Feature::BestOf => "best_of",
            Feature::RankDiff => "rank_diff",
            Feature::PtsDiff => "pts_diff",
            Feature::AgeDiff => "age_diff",
            Feature::AceDiff => "ace_diff",
            Feature::DfDiff => "df_diff",
            Feature::FirstPctDiff => "1st_pct_diff",
            Feature::BpPctDiff => "bp_pct_diff",
            Feature::H2hDiff => "h2h_diff",
        }
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        match name {
            "surface_hard" => Some(Feature::SurfaceHard),
            "surface_clay" => Some(Feature::SurfaceClay),
            "surface_grass" => Some(Feature::SurfaceGrass),
            "best_of" => Some(Feature::BestOf),
            "rank_diff" => Some(Feature::RankDiff),
            "pts_diff" => Some(Feature::PtsDiff),
            "age_diff" => Some(Feature::AgeDiff),
            "ace_diff" => Some(Feature::AceDiff),
            "df_diff" => Some(Feature::DfDiff),
            "1st_pct_diff" => Some(Feature::FirstPctDiff),
            "bp_pct_diff" => Some(Feature::BpPctDiff),
            "h2h_diff" => Some(Feature::H2hDiff),
            _ => None,
        }
    }

    /// Surface flags are rendered as boolean inputs, everything else numeric
    pub fn is_flag(&self) -> bool {
        matches!(
            self,
            Feature::SurfaceHard | Feature::SurfaceClay | Feature::SurfaceGrass
        )
    }

    /// Default shown by the interactive form when the user enters nothing
    pub fn default_value(&self) -> f32 {
        match self {
            Feature::BestOf => 3.0,
            _ => 0.0,
        }
    }
}

/// Static per-sport configuration: display label and ordered feature list
#[derive(Debug, Clone, Copy)]
pub struct SportSpec {
    pub sport: Sport,
    pub label: &'static str,
    pub features: &'static [Feature],
}

impl SportSpec {
    pub fn input_dim(&self) -> usize {
        self.features.len()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name().to_string()).collect()
    }
}

const TENNIS_FEATURES: &[Feature] = &[
    Feature::SurfaceHard,
    Feature::SurfaceClay,
    Feature::SurfaceGrass,
    Feature::BestOf,
    Feature::RankDiff,
    Feature::PtsDiff,
    Feature::AgeDiff,
    Feature::AceDiff,
    Feature::DfDiff,
    Feature::FirstPctDiff,
    Feature::BpPctDiff,
];

const BASKETBALL_FEATURES: &[Feature] = &[
    Feature::RankDiff,
    Feature::PtsDiff,
    Feature::AgeDiff,
    Feature::H2hDiff,
];

const FOOTBALL_FEATURES: &[Feature] = &[
    Feature::RankDiff,
    Feature::PtsDiff,
    Feature::AgeDiff,
    Feature::H2hDiff,
];

const TENNIS_SPEC: SportSpec = SportSpec {
    sport: Sport::Tennis,
    label: "Tennis (ATP)",
    features: TENNIS_FEATURES,
};

const BASKETBALL_SPEC: SportSpec = SportSpec {
    sport: Sport::Basketball,
    label: "Basketball",
    features: BASKETBALL_FEATURES,
};

const FOOTBALL_SPEC: SportSpec = SportSpec {
    sport: Sport::Football,
    label: "Football",
    features: FOOTBALL_FEATURES,
};

/// Resolve the spec for a sport
pub fn spec_for(sport: Sport) -> &'static SportSpec {
    match sport {
        Sport::Tennis => &TENNIS_SPEC,
        Sport::Basketball => &BASKETBALL_SPEC,
        Sport::Football => &FOOTBALL_SPEC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tennis_feature_order() {
        let spec = spec_for(Sport::Tennis);
        assert_eq!(spec.input_dim(), 11);
        assert_eq!(spec.features[0], Feature::SurfaceHard);
        assert_eq!(spec.features[3], Feature::BestOf);
        assert_eq!(spec.features[10], Feature::BpPctDiff);
    }

    #[test]
    fn test_name_roundtrip() {
        for sport in Sport::all() {
            for feat in spec_for(sport).features {
                assert_eq!(Feature::from_name(feat.name()), Some(*feat));
            }
        }
    }

    #[test]
    fn test_widget_kinds() {
        assert!(Feature::SurfaceClay.is_flag());
        assert!(!Feature::RankDiff.is_flag());
        assert_eq!(Feature::BestOf.default_value(), 3.0);
        assert_eq!(Feature::RankDiff.default_value(), 0.0);
    }
}
