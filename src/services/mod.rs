pub mod generator;
pub mod prompts;
pub mod providers;
pub mod recommendations;

pub use generator::{GenerationMode, RecommendationGenerator};
pub use providers::{CompletionProvider, ImageResolver};
pub use recommendations::RecommendationService;
