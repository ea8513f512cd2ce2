use serde::Deserialize;

use crate::models::null_as_default;
use crate::models::skills::SkillCategories;

/// Structured applicant profile produced by the transformation step.
/// Fields the mapper does not read (contact details, education, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: SkillCategories,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkExperience {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Project {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}
