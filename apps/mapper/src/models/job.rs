use serde::Deserialize;

use crate::models::null_as_default;
use crate::models::skills::SkillCategories;

/// Structured job posting. Only `requirements` feeds the mapper; `jobDetails`
/// and the rest are read by the letter composer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub requirements: JobRequirements,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequirements {
    #[serde(default, deserialize_with = "null_as_default")]
    pub work_experience: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: SkillCategories,
}
