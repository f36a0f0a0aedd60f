//! Value score and recommendation.
//!
//! Grounded on `ml_processor.py`'s `calculate_value_score`: a base rating
//! score adjusted by sentiment, feature richness and price, then blended
//! towards a neutral 7.0 in proportion to how few reviews back the sample.

/// Inputs to the value-score formula, already normalized by the caller
/// (price stripped of currency symbols, rating on a 0..5 scale).
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs {
    /// Star rating on a 0..5 scale.
    pub rating: f64,
    /// Average review sentiment on a 1..5 scale (3 is neutral).
    pub sentiment: f64,
    /// Count of listed product features.
    pub feature_count: u32,
    /// Listed price, in the same currency/unit as `reference_price`.
    pub price: f64,
    /// Reference price to compare against (category average); 0 disables
    /// the price modifier for the "no price data" case.
    pub reference_price: f64,
    /// Count of reviews backing the sentiment sample.
    pub review_count: u32,
}

/// A value score in `[0.0, 10.0]` with its recommendation tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueScore {
    pub score: f64,
    pub recommendation: &'static str,
}

const NEUTRAL_SCORE: f64 = 7.0;
const CONFIDENCE_REVIEW_CEILING: f64 = 100.0;

/// Computes the bounded value score and its recommendation tag.
///
/// `raw = base + sentiment_modifier + feature_modifier + price_modifier`,
/// blended towards [`NEUTRAL_SCORE`] by `1 - confidence` where confidence is
/// `review_count / 100` capped at 1, then clamped to `[0, 10]` and rounded
/// to one decimal.
pub fn calculate(inputs: ScoreInputs) -> ValueScore {
    let base = if inputs.rating > 0.0 {
        (inputs.rating / 5.0) * 10.0
    } else {
        5.0
    };

    let sentiment_modifier = inputs.sentiment - 3.0;
    let feature_modifier = (inputs.feature_count as f64 / 4.0).min(1.5);

    let price_modifier = if inputs.price > 0.0 && inputs.reference_price > 0.0 {
        let price_ratio = inputs.price / inputs.reference_price;
        1.0 - price_ratio.min(2.0)
    } else {
        0.0
    };

    let raw = base + sentiment_modifier + feature_modifier + price_modifier;

    let confidence = (inputs.review_count as f64 / CONFIDENCE_REVIEW_CEILING).min(1.0);
    let blended = raw * confidence + NEUTRAL_SCORE * (1.0 - confidence);

    let clamped = blended.clamp(0.0, 10.0);
    let score = (clamped * 10.0).round() / 10.0;

    ValueScore {
        score,
        recommendation: recommendation_for(score),
    }
}

fn recommendation_for(score: f64) -> &'static str {
    if score >= 8.0 {
        "excellent"
    } else if score >= 6.0 {
        "good"
    } else if score >= 4.0 {
        "average"
    } else {
        "not recommended"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_rating_and_sentiment_with_full_confidence_scores_ten() {
        let inputs = ScoreInputs {
            rating: 5.0,
            sentiment: 5.0,
            feature_count: 4,
            price: 0.0,
            reference_price: 0.0,
            review_count: 200,
        };
        let result = calculate(inputs);
        assert_eq!(result.score, 10.0);
        assert_eq!(result.recommendation, "excellent");
    }

    #[test]
    fn zero_confidence_blends_fully_to_neutral() {
        let inputs = ScoreInputs {
            rating: 1.0,
            sentiment: 1.0,
            feature_count: 0,
            price: 0.0,
            reference_price: 0.0,
            review_count: 0,
        };
        let result = calculate(inputs);
        assert_eq!(result.score, NEUTRAL_SCORE);
        assert_eq!(result.recommendation, "good");
    }

    #[test]
    fn overpriced_item_pulls_score_down() {
        let cheap = ScoreInputs {
            rating: 4.0,
            sentiment: 4.0,
            feature_count: 2,
            price: 50.0,
            reference_price: 100.0,
            review_count: 100,
        };
        let expensive = ScoreInputs {
            price: 300.0,
            ..cheap
        };
        assert!(calculate(expensive).score < calculate(cheap).score);
    }

    #[test]
    fn score_never_leaves_the_zero_to_ten_range() {
        let extreme = ScoreInputs {
            rating: 5.0,
            sentiment: 1.0,
            feature_count: 0,
            price: 1000.0,
            reference_price: 1.0,
            review_count: 1000,
        };
        let result = calculate(extreme);
        assert!((0.0..=10.0).contains(&result.score));
    }

    #[test]
    fn recommendation_thresholds() {
        assert_eq!(recommendation_for(8.0), "excellent");
        assert_eq!(recommendation_for(7.9), "good");
        assert_eq!(recommendation_for(6.0), "good");
        assert_eq!(recommendation_for(5.9), "average");
        assert_eq!(recommendation_for(4.0), "average");
        assert_eq!(recommendation_for(3.9), "not recommended");
    }
}
