//! Recommendation buckets
//!
//! Pure ranking over the validated product opportunities. No model calls.

use crate::models::{DemandLevel, ProductCategory, ProductOpportunity, Recommendations};

const BUCKET_SIZE: usize = 2;

/// Rank opportunities by confidence and split them into buckets.
///
/// - `top_products`: best two overall
/// - `quick_wins`: best two digital products
/// - `long_term_bets`: best two services or products without low demand
///
/// Ties keep their input order. Buckets may share items.
pub fn generate_recommendations(opportunities: &[ProductOpportunity]) -> Recommendations {
    let mut ranked: Vec<&ProductOpportunity> = opportunities.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let top_products = take_bucket(&ranked, |_| true);
    let quick_wins = take_bucket(&ranked, |o| o.category == ProductCategory::Digital);
    let long_term_bets = take_bucket(&ranked, |o| {
        o.category == ProductCategory::Service || o.estimated_demand != DemandLevel::Low
    });

    Recommendations {
        top_products,
        quick_wins,
        long_term_bets,
    }
}

fn take_bucket<F>(ranked: &[&ProductOpportunity], keep: F) -> Vec<ProductOpportunity>
where
    F: Fn(&ProductOpportunity) -> bool,
{
    ranked
        .iter()
        .copied()
        .filter(|o| keep(*o))
        .take(BUCKET_SIZE)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceRange;

    fn opportunity(
        id: &str,
        category: ProductCategory,
        demand: DemandLevel,
        confidence: f64,
    ) -> ProductOpportunity {
        ProductOpportunity {
            id: id.to_string(),
            name: id.to_string(),
            category,
            description: String::new(),
            target_audience: String::new(),
            estimated_demand: demand,
            confidence,
            reasoning: String::new(),
            similar_products: vec![],
            price_range: PriceRange {
                min: 0.0,
                max: 100.0,
                currency: "USD".to_string(),
            },
            validation_suggestions: vec![],
        }
    }

    fn ids(bucket: &[ProductOpportunity]) -> Vec<&str> {
        bucket.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_empty_input_gives_empty_buckets() {
        let recommendations = generate_recommendations(&[]);
        assert_eq!(recommendations, Recommendations::default());
    }

    #[test]
    fn test_buckets_follow_filters_and_order() {
        use DemandLevel::*;
        use ProductCategory::*;

        let opportunities = vec![
            opportunity("ebook", Digital, Low, 0.70),
            opportunity("bands", Physical, Low, 0.95),
            opportunity("coaching", Service, Low, 0.60),
            opportunity("app", Digital, High, 0.85),
            opportunity("course", Digital, Medium, 0.90),
            opportunity("bottle", Physical, High, 0.50),
        ];

        let recommendations = generate_recommendations(&opportunities);

        assert_eq!(ids(&recommendations.top_products), vec!["bands", "course"]);
        assert_eq!(ids(&recommendations.quick_wins), vec!["course", "app"]);
        assert_eq!(ids(&recommendations.long_term_bets), vec!["course", "app"]);

        for bucket in [
            &recommendations.top_products,
            &recommendations.quick_wins,
            &recommendations.long_term_bets,
        ] {
            assert!(bucket.windows(2).all(|w| w[0].confidence >= w[1].confidence));
        }
        assert!(recommendations
            .long_term_bets
            .iter()
            .all(|o| o.category == Service || o.estimated_demand != Low));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let opportunities = vec![
            opportunity("first", ProductCategory::Service, DemandLevel::Low, 0.8),
            opportunity("second", ProductCategory::Service, DemandLevel::Low, 0.8),
            opportunity("third", ProductCategory::Service, DemandLevel::Low, 0.8),
        ];

        let recommendations = generate_recommendations(&opportunities);
        assert_eq!(ids(&recommendations.top_products), vec!["first", "second"]);
        assert!(recommendations.quick_wins.is_empty());
        assert_eq!(ids(&recommendations.long_term_bets), vec!["first", "second"]);
    }

    #[test]
    fn test_short_lists_give_short_buckets() {
        let opportunities = vec![opportunity(
            "guide",
            ProductCategory::Digital,
            DemandLevel::Low,
            0.4,
        )];

        let recommendations = generate_recommendations(&opportunities);
        assert_eq!(recommendations.top_products.len(), 1);
        assert_eq!(recommendations.quick_wins.len(), 1);
        assert!(recommendations.long_term_bets.is_empty());
    }
}
