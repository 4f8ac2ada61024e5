use crate::domain::recommendation::{RecommendationRequest, UserPreferences};
use crate::error::RecommendError;
use serde::Deserialize;
use serde_json::Value;

/// Request exactly as received over the wire, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecommendationRequest {
    pub merchant: Option<String>,
    pub amount: Option<Value>,
    pub user_preferences: Option<UserPreferences>,
}

impl RawRecommendationRequest {
    /// Rejects missing or non-numeric amounts instead of guessing a default.
    pub fn validate_and_into_request(self) -> Result<RecommendationRequest, RecommendError> {
        let merchant = self
            .merchant
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| RecommendError::invalid("merchant", "must be non-empty"))?;

        let amount = match self.amount {
            None | Some(Value::Null) => {
                return Err(RecommendError::invalid("amount", "is required"));
            }
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| RecommendError::invalid("amount", format!("{n} is not representable")))?,
            Some(other) => {
                return Err(RecommendError::invalid(
                    "amount",
                    format!("must be a number (got {other})"),
                ));
            }
        };

        let request = RecommendationRequest {
            merchant,
            amount,
            user_preferences: self.user_preferences.filter(|p| !p.is_empty()),
        };
        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> Result<RecommendationRequest, RecommendError> {
        serde_json::from_value::<RawRecommendationRequest>(v)
            .unwrap()
            .validate_and_into_request()
    }

    #[test]
    fn accepts_valid_request() {
        let req = parse(json!({
            "merchant": "  amazon.com/gp/cart ",
            "amount": 100,
            "user_preferences": {"preferred_issuers": ["Chase"]}
        }))
        .unwrap();
        assert_eq!(req.merchant, "amazon.com/gp/cart");
        assert_eq!(req.amount, 100.0);
        assert_eq!(
            req.user_preferences.unwrap().preferred_issuers,
            vec!["Chase".to_string()]
        );
    }

    #[test]
    fn refuses_to_guess_amount() {
        let err = parse(json!({"merchant": "amazon.com"})).unwrap_err();
        assert_eq!(err.field(), Some("amount"));
        let err = parse(json!({"merchant": "amazon.com", "amount": null})).unwrap_err();
        assert_eq!(err.field(), Some("amount"));
        let err = parse(json!({"merchant": "amazon.com", "amount": "12.50"})).unwrap_err();
        assert_eq!(err.field(), Some("amount"));
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn rejects_empty_merchant_and_negative_amount() {
        assert_eq!(
            parse(json!({"merchant": "", "amount": 5})).unwrap_err().field(),
            Some("merchant")
        );
        assert_eq!(
            parse(json!({"amount": 5})).unwrap_err().field(),
            Some("merchant")
        );
        assert_eq!(
            parse(json!({"merchant": "x", "amount": -3})).unwrap_err().field(),
            Some("amount")
        );
    }

    #[test]
    fn rejects_negative_fee_cap_and_drops_empty_preferences() {
        let err = parse(json!({
            "merchant": "x",
            "amount": 5,
            "user_preferences": {"max_annual_fee": -1}
        }))
        .unwrap_err();
        assert_eq!(err.field(), Some("user_preferences.max_annual_fee"));

        let req = parse(json!({"merchant": "x", "amount": 5, "user_preferences": {}})).unwrap();
        assert!(req.user_preferences.is_none());
    }
}
