use crate::catalog_client::{Dimensions, Item};
use crate::error::PipelineError;

/// Volumetric weight in kilograms of an item measured in centimetres.
///
/// `conversion_factor` is expressed in kg per cubic metre, hence the
/// division by 1,000,000 cm³.
pub fn cubic_weight(dimensions: &Dimensions, conversion_factor: f64) -> f64 {
    (dimensions.height * dimensions.width * dimensions.length * conversion_factor) / 1_000_000.0
}

/// Arithmetic mean of `values`.
///
/// - If `values` is empty, returns `None`.
/// - Otherwise returns the unrounded mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        let sum: f64 = values.iter().sum();
        Some(sum / values.len() as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRecord {
    pub cubic_weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AverageResult {
    Average(f64),
    Empty,
}

/// Accumulates cubic weights of matching items across catalog pages.
#[derive(Debug, Default)]
pub struct Aggregator {
    records: Vec<MetricRecord>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a cubic weight for every item in `items` whose category equals
    /// `target_category` exactly. Returns how many records were added.
    ///
    /// A matching item with missing, negative or non-numeric dimensions, or
    /// whose cubic weight is not finite, fails the whole batch; nothing from
    /// `items` is recorded in that case.
    pub fn accept(
        &mut self,
        items: &[Item],
        target_category: &str,
        conversion_factor: f64,
    ) -> Result<usize, PipelineError> {
        let batch = items
            .iter()
            .filter(|item| item.category == target_category)
            .map(|item| {
                let weight = cubic_weight(&item.dimensions()?, conversion_factor);
                if !weight.is_finite() {
                    return Err(PipelineError::MalformedData(format!(
                        "{} cubic weight overflows: {:?}",
                        item.category, item.size
                    )));
                }
                Ok(MetricRecord {
                    cubic_weight: weight,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let added = batch.len();
        self.records.extend(batch);
        Ok(added)
    }

    pub fn finalize(&self) -> AverageResult {
        let weights: Vec<f64> = self.records.iter().map(|r| r.cubic_weight).collect();
        match mean(&weights) {
            Some(average) => AverageResult::Average(average),
            None => AverageResult::Empty,
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DELTA: f64 = 1e-9; // For floating point comparisons
    const AIR_CONDITIONERS: &str = "Air Conditioners";

    fn item(category: &str, height: &str, width: &str, length: &str) -> Item {
        serde_json::from_value(json!({
            "category": category,
            "size": { "height": height, "width": width, "length": length }
        }))
        .unwrap()
    }

    /// An item whose cubic weight is exactly `kg` with a factor of 250.
    fn item_weighing(kg: f64) -> Item {
        // 100 * 40 * h * 250 / 1e6 == h
        item(AIR_CONDITIONERS, &kg.to_string(), "100", "40")
    }

    #[test]
    fn test_cubic_weight_reference_values() {
        let dims = Dimensions {
            height: 89.0,
            width: 49.6,
            length: 38.7,
        };
        let expected = 89.0 * 49.6 * 38.7 * 250.0 / 1_000_000.0;
        assert!((cubic_weight(&dims, 250.0) - expected).abs() < DELTA);
        assert_eq!(cubic_weight(&dims, 250.0), cubic_weight(&dims, 250.0));
    }

    #[test]
    fn test_cubic_weight_zero_dimension() {
        let dims = Dimensions {
            height: 0.0,
            width: 10.0,
            length: 10.0,
        };
        assert_eq!(cubic_weight(&dims, 250.0), 0.0);
    }

    #[test]
    fn test_mean_multiple_values() {
        let aggregated = mean(&[10.0, 20.0, 30.0]).unwrap();
        assert!((aggregated - 20.0).abs() < DELTA);
    }

    #[test]
    fn test_mean_single_value() {
        let aggregated = mean(&[123.45]).unwrap();
        assert!((aggregated - 123.45).abs() < DELTA);
    }

    #[test]
    fn test_mean_empty_input() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_finalize_without_accept_is_empty() {
        let aggregator = Aggregator::new();
        assert_eq!(aggregator.finalize(), AverageResult::Empty);
    }

    #[test]
    fn test_finalize_averages_accepted_weights() {
        let mut aggregator = Aggregator::new();
        let items = [item_weighing(2.0), item_weighing(4.0), item_weighing(6.0)];
        let added = aggregator.accept(&items, AIR_CONDITIONERS, 250.0).unwrap();
        assert_eq!(added, 3);

        match aggregator.finalize() {
            AverageResult::Average(value) => assert!((value - 4.0).abs() < DELTA),
            AverageResult::Empty => panic!("expected an average"),
        }
    }

    #[test]
    fn test_accept_across_batches() {
        let mut aggregator = Aggregator::new();
        aggregator.accept(&[item_weighing(1.0)], AIR_CONDITIONERS, 250.0).unwrap();
        aggregator.accept(&[], AIR_CONDITIONERS, 250.0).unwrap();
        aggregator.accept(&[item_weighing(3.0)], AIR_CONDITIONERS, 250.0).unwrap();
        assert_eq!(aggregator.len(), 2);

        let AverageResult::Average(value) = aggregator.finalize() else {
            panic!("expected an average");
        };
        assert!((value - 2.0).abs() < DELTA);
    }

    #[test]
    fn test_category_match_is_case_sensitive() {
        let mut aggregator = Aggregator::new();
        let items = [
            item("air conditioners", "10", "10", "10"),
            item("Air Conditioners ", "10", "10", "10"), // Trailing space
        ];
        let added = aggregator.accept(&items, AIR_CONDITIONERS, 250.0).unwrap();
        assert_eq!(added, 0);
        assert_eq!(aggregator.finalize(), AverageResult::Empty);
    }

    #[test]
    fn test_other_categories_skip_size_parsing() {
        let mut aggregator = Aggregator::new();
        let items: Vec<Item> = serde_json::from_value(json!([
            { "category": "Batteries" },
            { "category": "Cables", "size": { "height": "n/a" } },
            {
                "category": AIR_CONDITIONERS,
                "size": { "height": "10", "width": "10", "length": "10" }
            }
        ]))
        .unwrap();
        assert_eq!(aggregator.accept(&items, AIR_CONDITIONERS, 250.0).unwrap(), 1);
    }

    #[test]
    fn test_malformed_matching_item_rejects_batch() {
        let mut aggregator = Aggregator::new();
        // First item is fine, second has a non-numeric height
        let items = [item_weighing(2.0), item(AIR_CONDITIONERS, "abc", "1", "1")];
        let result = aggregator.accept(&items, AIR_CONDITIONERS, 250.0);
        assert!(matches!(result, Err(PipelineError::MalformedData(_))));
        assert!(aggregator.is_empty());
    }

    #[test]
    fn test_overflowing_cubic_weight_rejects_batch() {
        let mut aggregator = Aggregator::new();
        // Each dimension is finite, their product is not
        let items = [item(AIR_CONDITIONERS, "1e200", "1e200", "1e200")];
        let result = aggregator.accept(&items, AIR_CONDITIONERS, 250.0);
        assert!(matches!(result, Err(PipelineError::MalformedData(_))));
        assert_eq!(aggregator.finalize(), AverageResult::Empty);
    }

    #[test]
    fn test_clear_then_finalize_is_empty() {
        let mut aggregator = Aggregator::new();
        aggregator.accept(&[item_weighing(5.0)], AIR_CONDITIONERS, 250.0).unwrap();
        aggregator.clear();
        assert_eq!(aggregator.finalize(), AverageResult::Empty);

        // Clearing an already empty aggregator is a no-op.
        aggregator.clear();
        aggregator.clear();
        assert!(aggregator.is_empty());
        assert_eq!(aggregator.finalize(), AverageResult::Empty);
    }
}
