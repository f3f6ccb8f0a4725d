use serde::Deserialize;

use super::extract::Validate;
use crate::prompts::GENERAL_ANALYSIS;

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
    #[serde(default)]
    pub context: Option<String>,
}

impl Validate for QuestionRequest {
    fn validate(&self) -> Result<(), String> {
        if self.question.is_empty() {
            return Err("question must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub url: String,
    pub content: String,
}

impl Validate for SummaryRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub url: String,
    pub content: String,
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
}

fn default_analysis_type() -> String {
    GENERAL_ANALYSIS.to_string()
}

impl Validate for AnalysisRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
