pub mod optimization;
pub mod recommendations;

pub use optimization::{optimization_scenarios, OptimizationScenario, ScenarioInputs};
pub use recommendations::{
    investment_recommendations, purchasing_power_advice, InvestmentSignals, PurchasingPowerSignals,
    Recommendation, RecommendationKind,
};
