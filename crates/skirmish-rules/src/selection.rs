//! Target selection policy with switch hysteresis.
//!
//! Each policy maps a candidate to a cost (lower is better). A challenger
//! only displaces the incumbent when it is cheaper by more than the policy's
//! switch margin, which keeps two near-equal targets from trading places
//! every re-selection.

use skirmish_core::enums::TargetPolicy;

/// The per-candidate facts the policies look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateInfo {
    /// Distance from the attacker (meters).
    pub distance: f64,
    pub health: f64,
}

/// Minimum advantage a challenger needs over the incumbent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchMargins {
    /// Meters, used by `Closest`.
    pub distance: f64,
    /// Hit points, used by the health policies.
    pub health: f64,
}

pub fn cost(policy: TargetPolicy, candidate: &CandidateInfo) -> f64 {
    match policy {
        TargetPolicy::Closest => candidate.distance,
        TargetPolicy::LowestHealth => candidate.health,
        TargetPolicy::HighestHealth => -candidate.health,
    }
}

pub fn margin(policy: TargetPolicy, margins: &SwitchMargins) -> f64 {
    match policy {
        TargetPolicy::Closest => margins.distance,
        TargetPolicy::LowestHealth | TargetPolicy::HighestHealth => margins.health,
    }
}

/// Index of the cheapest candidate. Ties go to the first one encountered.
pub fn best(candidates: &[CandidateInfo], policy: TargetPolicy) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let c = cost(policy, candidate);
        match best {
            Some((_, best_cost)) if c >= best_cost => {}
            _ => best = Some((idx, c)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Choose a target index, keeping `incumbent` unless a challenger beats it
/// by more than the margin. `incumbent` must index into `candidates`.
pub fn select(
    candidates: &[CandidateInfo],
    policy: TargetPolicy,
    incumbent: Option<usize>,
    margins: &SwitchMargins,
) -> Option<usize> {
    let challenger = best(candidates, policy)?;
    let incumbent = match incumbent {
        Some(idx) if idx < candidates.len() => idx,
        _ => return Some(challenger),
    };
    if challenger == incumbent {
        return Some(incumbent);
    }

    let challenger_cost = cost(policy, &candidates[challenger]);
    let incumbent_cost = cost(policy, &candidates[incumbent]);
    if challenger_cost + margin(policy, margins) < incumbent_cost {
        Some(challenger)
    } else {
        Some(incumbent)
    }
}
