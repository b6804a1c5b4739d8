use serde::{Deserialize, Serialize};

/// Estimated trip costs in USD. Absent values were not estimated for this trip type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostDetails {
    pub flight_cost: Option<f64>,
    pub fuel_cost: Option<f64>,
    pub accommodation_cost: Option<f64>,
    pub other_costs: Option<f64>,
}

impl CostDetails {
    /// Labelled cost lines for the values that are present
    #[must_use]
    pub fn lines(&self) -> Vec<(&'static str, f64)> {
        [
            ("Flight", self.flight_cost),
            ("Fuel", self.fuel_cost),
            ("Accommodation", self.accommodation_cost),
            ("Other", self.other_costs),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }

    /// Sum of all present costs
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines().iter().map(|(_, value)| value).sum()
    }

    /// What is left of `budget` after the estimated costs; negative when over budget
    #[must_use]
    pub fn budget_remaining(&self, budget: f64) -> f64 {
        budget - self.total()
    }
}
