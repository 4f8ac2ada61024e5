use crate::error::RecommendError;
use crate::merchant::Confidence;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-request soft filters. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub preferred_issuers: Vec<String>,
    #[serde(default)]
    pub preferred_networks: Vec<String>,
    #[serde(default)]
    pub max_annual_fee: Option<f64>,
}

impl UserPreferences {
    pub fn is_empty(&self) -> bool {
        self.preferred_issuers.is_empty()
            && self.preferred_networks.is_empty()
            && self.max_annual_fee.is_none()
    }

    pub fn prefers_issuer(&self, issuer: &str) -> bool {
        self.preferred_issuers
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(issuer.trim()))
    }

    pub fn prefers_network(&self, network: &str) -> bool {
        self.preferred_networks
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(network.trim()))
    }

    pub fn exceeds_fee_cap(&self, annual_fee: f64) -> bool {
        self.max_annual_fee.is_some_and(|max| annual_fee > max)
    }

    /// Strict reading of the preferences, used only to decide whether they can be honored at all.
    pub fn admits(&self, rec: &Recommendation) -> bool {
        (self.preferred_issuers.is_empty() || self.prefers_issuer(&rec.issuer))
            && (self.preferred_networks.is_empty() || self.prefers_network(&rec.network))
            && !self.exceeds_fee_cap(rec.annual_fee)
    }

    fn validate(&self) -> Result<(), RecommendError> {
        if let Some(max) = self.max_annual_fee {
            if !max.is_finite() || max < 0.0 {
                return Err(RecommendError::invalid(
                    "user_preferences.max_annual_fee",
                    format!("must be a non-negative number (got {max})"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    pub merchant: String,
    pub amount: f64,
    pub user_preferences: Option<UserPreferences>,
}

impl RecommendationRequest {
    pub fn validate(&self) -> Result<(), RecommendError> {
        if self.merchant.trim().is_empty() {
            return Err(RecommendError::invalid("merchant", "must be non-empty"));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(RecommendError::invalid(
                "amount",
                format!("must be a non-negative number (got {})", self.amount),
            ));
        }
        if let Some(prefs) = &self.user_preferences {
            prefs.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub card_id: String,
    pub name: String,
    pub issuer: String,
    pub network: String,
    pub reward_percentage: f64,
    pub estimated_reward: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_earned: Option<f64>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub annual_fee: f64,
    pub effective_annual_fee: f64,
    pub is_limited_time_offer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_end_date: Option<NaiveDate>,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_note: Option<String>,
    pub additional_benefits: Vec<String>,
    pub score: f64,
    #[serde(skip)]
    pub has_foreign_transaction_fee: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResponse {
    pub merchant: String,
    pub category: String,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub confidence: Confidence,
    pub purchase_amount: f64,
    pub eval_date: NaiveDate,
    /// Set when the catalog could not produce any candidate and the built-in set was used.
    pub is_fallback: bool,
    pub preferences_relaxed: bool,
    pub recommendations: Vec<Recommendation>,
}
