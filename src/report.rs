use crate::aggregator::AverageResult;

/// What the user sees at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Formatted average, e.g. `41.61kg`.
    Result(String),
    /// A short notification instead of a result.
    Notice(String),
}

pub fn format_weight(kilograms: f64) -> String {
    format!("{:.2}kg", kilograms)
}

pub fn outcome(result: &AverageResult, product_name: &str) -> Outcome {
    match result {
        AverageResult::Average(value) => Outcome::Result(format_weight(*value)),
        AverageResult::Empty => Outcome::Notice(format!("Sorry, No {} available", product_name)),
    }
}
