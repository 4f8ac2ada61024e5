use super::money::format_rate;
use super::reward::{LimitedTimeOffer, RewardRule, FALLBACK_CATEGORY};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardType {
    #[default]
    Cash,
    Points,
    Miles,
}

impl RewardType {
    pub fn is_points_based(self) -> bool {
        matches!(self, Self::Points | Self::Miles)
    }

    /// `"5% back"`, `"3x points"`, `"2x miles"`.
    pub fn describe_rate(self, rate: f64) -> String {
        let rate = format_rate(rate);
        match self {
            Self::Cash => format!("{rate}% back"),
            Self::Points => format!("{rate}x points"),
            Self::Miles => format!("{rate}x miles"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenefitKind {
    Travel,
    Dining,
    Shopping,
    Insurance,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benefit {
    pub name: String,
    pub kind: BenefitKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub issuer: String,
    pub network: String,
    pub annual_fee: f64,
    pub annual_credits: f64,
    /// Value of one point or mile in cents; 0 for pure cash back.
    pub points_value_cents: f64,
    pub reward_type: RewardType,
    pub has_foreign_transaction_fee: bool,
    pub rewards: Vec<RewardRule>,
    pub limited_time_offers: Vec<LimitedTimeOffer>,
    pub benefits: Vec<Benefit>,
}

impl Card {
    pub fn effective_annual_fee(&self) -> f64 {
        (self.annual_fee - self.annual_credits).max(0.0)
    }

    /// Best `"other"` rule. Validated catalogs guarantee one exists.
    pub fn fallback_rule(&self) -> Option<&RewardRule> {
        self.rewards
            .iter()
            .filter(|r| r.category == FALLBACK_CATEGORY)
            .fold(None, |best: Option<&RewardRule>, r| match best {
                Some(b) if b.reward_rate >= r.reward_rate => Some(b),
                _ => Some(r),
            })
    }

    /// Case-insensitive match on card name or id.
    pub fn is_named(&self, name: &str) -> bool {
        let name = name.trim();
        !name.is_empty() && (self.name.eq_ignore_ascii_case(name) || self.id.eq_ignore_ascii_case(name))
    }
}
