use crate::domain::{Recommendation, UserPreferences};
use std::cmp::Ordering;

pub const LIMITED_TIME_BONUS: f64 = 50.0;
pub const MAX_FEE_PENALTY: f64 = 50.0;
pub const NO_FOREIGN_FEE_BONUS: f64 = 10.0;
pub const PREFERRED_ISSUER_BONUS: f64 = 0.5;
pub const PREFERRED_NETWORK_BONUS: f64 = 0.5;
pub const OVER_FEE_CAP_PENALTY: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RankOutcome {
    pub recommendations: Vec<Recommendation>,
    /// Preferences could not be satisfied by any candidate and were ignored.
    pub preferences_relaxed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    limit: usize,
}

impl Ranker {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    /// Scores, sorts and truncates. Output order is fully determined by the inputs.
    pub fn rank(
        &self,
        mut recommendations: Vec<Recommendation>,
        amount: f64,
        international: bool,
        preferences: Option<&UserPreferences>,
    ) -> RankOutcome {
        for rec in &mut recommendations {
            rec.score = base_score(rec, amount, international);
        }

        let mut preferences_relaxed = false;
        if let Some(prefs) = preferences.filter(|p| !p.is_empty()) {
            if recommendations.iter().any(|r| prefs.admits(r)) {
                for rec in &mut recommendations {
                    rec.score += preference_adjustment(rec, prefs);
                }
            } else if !recommendations.is_empty() {
                tracing::info!(
                    candidates = recommendations.len(),
                    "no card satisfies user preferences; ranking without them"
                );
                preferences_relaxed = true;
            }
        }

        recommendations.sort_by(compare);
        recommendations.truncate(self.limit);

        RankOutcome {
            recommendations,
            preferences_relaxed,
        }
    }
}

pub fn base_score(rec: &Recommendation, amount: f64, international: bool) -> f64 {
    let mut score = rec.reward_percentage * 100.0 + rec.estimated_reward * 2.0;
    if rec.is_limited_time_offer {
        score += LIMITED_TIME_BONUS;
    }
    score -= (rec.effective_annual_fee / amount.max(1.0) * 10.0).min(MAX_FEE_PENALTY);
    if international && !rec.has_foreign_transaction_fee {
        score += NO_FOREIGN_FEE_BONUS;
    }
    score
}

fn preference_adjustment(rec: &Recommendation, prefs: &UserPreferences) -> f64 {
    let mut adjustment = 0.0;
    if prefs.prefers_issuer(&rec.issuer) {
        adjustment += PREFERRED_ISSUER_BONUS;
    }
    if prefs.prefers_network(&rec.network) {
        adjustment += PREFERRED_NETWORK_BONUS;
    }
    if prefs.exceeds_fee_cap(rec.annual_fee) {
        adjustment -= OVER_FEE_CAP_PENALTY;
    }
    adjustment
}

// Score descending, then lower annual fee, then name.
fn compare(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            a.annual_fee
                .partial_cmp(&b.annual_fee)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.card_id.cmp(&b.card_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, rate: f64, amount: f64, annual_fee: f64) -> Recommendation {
        Recommendation {
            card_id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            issuer: "Bank".to_string(),
            network: "Visa".to_string(),
            reward_percentage: rate,
            estimated_reward: amount * rate / 100.0,
            points_earned: None,
            category: "other".to_string(),
            subcategory: None,
            annual_fee,
            effective_annual_fee: annual_fee,
            is_limited_time_offer: false,
            offer_end_date: None,
            reason: String::new(),
            fee_note: None,
            additional_benefits: Vec::new(),
            score: 0.0,
            has_foreign_transaction_fee: true,
        }
    }

    fn names(outcome: &RankOutcome) -> Vec<&str> {
        outcome
            .recommendations
            .iter()
            .map(|r| r.name.as_str())
            .collect()
    }

    #[test]
    fn fee_penalty_is_capped_at_fifty() {
        let r = rec("Fee Card", 1.0, 10.0, 95.0);
        // 100 + 0.1 * 2 - min(95 / 10 * 10, 50)
        assert!((base_score(&r, 10.0, false) - 50.2).abs() < 1e-9);

        let small = rec("Small Fee", 1.0, 1000.0, 95.0);
        // 95 / 1000 * 10 = 0.95
        assert!((base_score(&small, 1000.0, false) - (100.0 + 20.0 - 0.95)).abs() < 1e-9);
    }

    #[test]
    fn limited_time_and_foreign_fee_bonuses() {
        let mut r = rec("Offer", 2.0, 100.0, 0.0);
        let plain = base_score(&r, 100.0, true);
        r.is_limited_time_offer = true;
        r.has_foreign_transaction_fee = false;
        assert!((base_score(&r, 100.0, true) - plain - 60.0).abs() < 1e-9);
        assert!((base_score(&r, 100.0, false) - plain - 50.0).abs() < 1e-9);
    }

    #[test]
    fn higher_rate_ranks_first_and_list_is_truncated() {
        let recs = vec![
            rec("One", 1.0, 100.0, 0.0),
            rec("Five", 5.0, 100.0, 0.0),
            rec("Two", 2.0, 100.0, 0.0),
        ];
        let outcome = Ranker::new(2).rank(recs, 100.0, false, None);
        assert_eq!(names(&outcome), vec!["Five", "Two"]);
        assert!(!outcome.preferences_relaxed);
    }

    #[test]
    fn ties_break_on_fee_then_name() {
        let mut pricey = rec("Alpha", 2.0, 100.0, 95.0);
        // Same base score as the free cards.
        pricey.effective_annual_fee = 0.0;
        let recs = vec![
            pricey,
            rec("Zeta", 2.0, 100.0, 0.0),
            rec("Beta", 2.0, 100.0, 0.0),
        ];
        let ranker = Ranker::new(5);
        let first = ranker.rank(recs.clone(), 100.0, false, None);
        assert_eq!(names(&first), vec!["Beta", "Zeta", "Alpha"]);

        let mut reversed = recs;
        reversed.reverse();
        assert_eq!(ranker.rank(reversed, 100.0, false, None), first);
    }

    #[test]
    fn preferences_nudge_scores() {
        let mut chase = rec("Chase Card", 2.0, 100.0, 0.0);
        chase.issuer = "Chase".to_string();
        let citi = rec("Citi Card", 2.0, 100.0, 0.0);
        let prefs = UserPreferences {
            preferred_issuers: vec!["chase".to_string()],
            ..UserPreferences::default()
        };

        let outcome = Ranker::new(5).rank(vec![citi, chase], 100.0, false, Some(&prefs));
        assert_eq!(names(&outcome), vec!["Chase Card", "Citi Card"]);
        assert!(!outcome.preferences_relaxed);
        let diff = outcome.recommendations[0].score - outcome.recommendations[1].score;
        assert!((diff - 0.5).abs() < 1e-9);
    }

    #[test]
    fn fee_cap_penalizes_without_excluding() {
        let free = rec("Free", 1.0, 100.0, 0.0);
        // Outscores "Free" by 0.7 before the fee cap penalty.
        let fee = rec("Fee", 1.1, 100.0, 95.0);
        let prefs = UserPreferences {
            max_annual_fee: Some(0.0),
            ..UserPreferences::default()
        };
        let ranker = Ranker::new(5);
        let plain = ranker.rank(vec![fee.clone(), free.clone()], 100.0, false, None);
        assert_eq!(plain.recommendations[0].name, "Fee");

        let outcome = ranker.rank(vec![fee, free], 100.0, false, Some(&prefs));
        assert_eq!(outcome.recommendations.len(), 2);
        assert_eq!(outcome.recommendations[0].name, "Free");
    }

    #[test]
    fn unsatisfiable_preferences_fall_back_to_unfiltered_ranking() {
        let recs = vec![
            rec("Gold", 4.0, 100.0, 250.0),
            rec("Sapphire", 3.0, 100.0, 95.0),
        ];
        let prefs = UserPreferences {
            max_annual_fee: Some(0.0),
            ..UserPreferences::default()
        };
        let ranker = Ranker::new(5);

        let relaxed = ranker.rank(recs.clone(), 100.0, false, Some(&prefs));
        let unfiltered = ranker.rank(recs, 100.0, false, None);
        assert!(relaxed.preferences_relaxed);
        assert!(!relaxed.recommendations.is_empty());
        assert_eq!(relaxed.recommendations, unfiltered.recommendations);
    }
}
