pub mod advisor;
pub mod config;
pub mod error;
pub mod telemetry;

pub use advisor::{
    recommendation_router, AdvisorConfig, AdvisorEngine, QuestionnaireAnswers, Recommendation,
    RecommendationService,
};
pub use error::AppError;
