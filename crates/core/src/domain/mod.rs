pub mod card;
pub mod contract;
pub mod money;
pub mod recommendation;
pub mod retailer;
pub mod reward;

pub use card::{Benefit, BenefitKind, Card, RewardType};
pub use recommendation::{
    Recommendation, RecommendationRequest, RecommendationResponse, UserPreferences,
};
pub use retailer::{Retailer, RetailerDomain};
pub use reward::{
    LimitedTimeOffer, OfferTarget, RewardRule, RewardSchedule, FALLBACK_CATEGORY,
    ROTATING_CATEGORY,
};
