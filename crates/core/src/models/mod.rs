pub mod analytics;
pub mod category;
pub mod expense;
pub mod period;
pub mod settings;
