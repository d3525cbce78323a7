pub mod add_insight;
pub mod search_insights;
pub mod stats;
