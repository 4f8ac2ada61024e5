//! Request pipeline: identify the merchant, resolve every card, score, rank.

use crate::catalog::contract::slugify;
use crate::catalog::Catalog;
use crate::domain::contract::RawRecommendationRequest;
use crate::domain::money::{format_rate, round_cents};
use crate::domain::{Card, Recommendation, RecommendationRequest, RecommendationResponse};
use crate::error::RecommendError;
use crate::merchant::{self, MerchantClassification};
use crate::ranker::Ranker;
use crate::resolver::{ResolvedReward, RewardResolver};
use crate::scoring;
use chrono::NaiveDate;

// (name, issuer, network, rate, has_foreign_transaction_fee)
const FALLBACK_CARDS: &[(&str, &str, &str, f64, bool)] = &[
    ("Citi Double Cash", "Citi", "Mastercard", 2.0, true),
    ("Chase Freedom Unlimited", "Chase", "Visa", 1.5, true),
    ("Capital One Quicksilver", "Capital One", "Mastercard", 1.5, false),
    ("Discover it Miles", "Discover", "Discover", 1.5, false),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub limit: usize,
    pub default_average_transaction: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            default_average_transaction: 50.0,
        }
    }
}

pub struct Recommender<'a> {
    catalog: &'a Catalog,
    config: EngineConfig,
}

impl<'a> Recommender<'a> {
    pub fn new(catalog: &'a Catalog, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    pub fn identify(&self, reference: &str) -> MerchantClassification {
        merchant::identify(
            reference,
            self.catalog,
            self.config.default_average_transaction,
        )
    }

    pub fn recommend_raw(
        &self,
        raw: RawRecommendationRequest,
        eval_date: NaiveDate,
    ) -> Result<RecommendationResponse, RecommendError> {
        let request = raw.validate_and_into_request()?;
        self.recommend(&request, eval_date)
    }

    pub fn recommend(
        &self,
        request: &RecommendationRequest,
        eval_date: NaiveDate,
    ) -> Result<RecommendationResponse, RecommendError> {
        request.validate()?;

        let merchant = self.identify(&request.merchant);
        let resolver = RewardResolver::new(self.catalog, &merchant, eval_date);

        let mut candidates = Vec::with_capacity(self.catalog.cards().len());
        for card in self.catalog.cards() {
            match resolver.resolve(card) {
                Ok(resolved) => {
                    candidates.push(build_recommendation(card, resolved, &merchant, request.amount))
                }
                Err(err) => {
                    tracing::warn!(card_id = %card.id, error = %err, "skipping card that failed evaluation");
                }
            }
        }

        let is_fallback = candidates.is_empty();
        if is_fallback {
            tracing::warn!(
                merchant = %merchant.name,
                catalog_cards = self.catalog.cards().len(),
                "no catalog card could be evaluated; using fallback suggestions"
            );
            candidates = fallback_recommendations(&merchant, request.amount);
        }

        let outcome = Ranker::new(self.config.limit).rank(
            candidates,
            request.amount,
            merchant.is_international,
            request.user_preferences.as_ref(),
        );

        tracing::debug!(
            merchant = %merchant.name,
            category = %merchant.category(),
            confidence = ?merchant.confidence,
            %eval_date,
            returned = outcome.recommendations.len(),
            "ranked recommendations"
        );

        Ok(RecommendationResponse {
            merchant: merchant.name.clone(),
            category: merchant.category().to_string(),
            categories: merchant.categories.clone(),
            subcategory: merchant.subcategory.clone(),
            confidence: merchant.confidence,
            purchase_amount: request.amount,
            eval_date,
            is_fallback,
            preferences_relaxed: outcome.preferences_relaxed,
            recommendations: outcome.recommendations,
        })
    }
}

fn build_recommendation(
    card: &Card,
    resolved: ResolvedReward,
    merchant: &MerchantClassification,
    amount: f64,
) -> Recommendation {
    let estimate = scoring::score(card, resolved.rate, amount).capped(resolved.max_reward);
    let is_limited_time_offer = resolved.is_limited_time();

    Recommendation {
        card_id: card.id.clone(),
        name: card.name.clone(),
        issuer: card.issuer.clone(),
        network: card.network.clone(),
        reward_percentage: resolved.rate,
        estimated_reward: estimate.estimated_reward,
        points_earned: estimate.points_earned,
        category: resolved.category,
        subcategory: resolved.subcategory,
        annual_fee: card.annual_fee,
        effective_annual_fee: card.effective_annual_fee(),
        is_limited_time_offer,
        offer_end_date: resolved.offer_end_date,
        reason: resolved.reason,
        fee_note: estimate.fee_note,
        additional_benefits: scoring::relevant_benefits(card, &merchant.categories, amount),
        score: 0.0,
        has_foreign_transaction_fee: card.has_foreign_transaction_fee,
    }
}

/// Flat-rate cash back cards offered when the catalog cannot produce a single candidate.
pub fn fallback_recommendations(
    merchant: &MerchantClassification,
    amount: f64,
) -> Vec<Recommendation> {
    FALLBACK_CARDS
        .iter()
        .map(|&(name, issuer, network, rate, foreign_fee)| Recommendation {
            card_id: slugify(name),
            name: name.to_string(),
            issuer: issuer.to_string(),
            network: network.to_string(),
            reward_percentage: rate,
            estimated_reward: round_cents(amount * rate / 100.0),
            points_earned: None,
            category: merchant.category().to_string(),
            subcategory: None,
            annual_fee: 0.0,
            effective_annual_fee: 0.0,
            is_limited_time_offer: false,
            offer_end_date: None,
            reason: format!(
                "Fallback suggestion: {}% back on all purchases",
                format_rate(rate)
            ),
            fee_note: None,
            additional_benefits: Vec::new(),
            score: 0.0,
            has_foreign_transaction_fee: foreign_fee,
        })
        .collect()
}
