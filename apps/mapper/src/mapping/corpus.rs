//! Corpus Builder: flattens personal data and job requirements into the two
//! ordered text lists that get embedded.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::job::JobData;
use crate::models::personal::PersonalData;

/// One embeddable snippet of the applicant's background.
///
/// Items are addressed by their position in `Corpus::experiences`. Two items may
/// carry identical `text` from different sources and still stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceItem {
    pub source: String,
    pub text: String,
}

impl ExperienceItem {
    fn new(source: String, text: &str) -> Self {
        Self {
            source,
            text: text.to_string(),
        }
    }
}

/// Which side of the mapping had nothing to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyCorpus {
    Experience,
    Requirements,
}

impl fmt::Display for EmptyCorpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyCorpus::Experience => {
                f.write_str("No personal experiences or skills found to map from.")
            }
            EmptyCorpus::Requirements => f.write_str("No job requirements found to map to."),
        }
    }
}

/// Both corpora for one mapping run. Neither list is empty.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub experiences: Vec<ExperienceItem>,
    pub requirements: Vec<String>,
}

impl Corpus {
    pub fn build(personal: &PersonalData, job: &JobData) -> Result<Self, EmptyCorpus> {
        let experiences = build_experience_corpus(personal);
        if experiences.is_empty() {
            return Err(EmptyCorpus::Experience);
        }
        let requirements = build_requirement_corpus(job);
        if requirements.is_empty() {
            return Err(EmptyCorpus::Requirements);
        }
        Ok(Self {
            experiences,
            requirements,
        })
    }

    pub fn experience_texts(&self) -> Vec<String> {
        self.experiences.iter().map(|e| e.text.clone()).collect()
    }
}

/// Responsibilities, then project descriptions, then one item per skill.
/// Blank snippets are skipped: embedding backends reject empty input.
pub fn build_experience_corpus(personal: &PersonalData) -> Vec<ExperienceItem> {
    let mut items = Vec::new();

    for job in &personal.work_experience {
        let source = source_label("Work Experience", &job.title);
        for responsibility in &job.responsibilities {
            if responsibility.trim().is_empty() {
                debug!("Skipping blank responsibility under '{source}'");
                continue;
            }
            items.push(ExperienceItem::new(source.clone(), responsibility));
        }
    }

    for project in &personal.projects {
        let source = source_label("Project", &project.name);
        if project.description.trim().is_empty() {
            debug!("Skipping '{source}': blank description");
            continue;
        }
        items.push(ExperienceItem::new(source, &project.description));
    }

    for (category, skills) in personal.skills.iter() {
        let source = source_label("Skill", category);
        for skill in skills {
            if skill.trim().is_empty() {
                debug!("Skipping blank skill under '{source}'");
                continue;
            }
            items.push(ExperienceItem::new(source.clone(), skill));
        }
    }

    items
}

/// `"<kind>: <name>"`, or just `"<kind>"` when the name is blank.
fn source_label(kind: &str, name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        kind.to_string()
    } else {
        format!("{kind}: {name}")
    }
}

/// Work-experience requirements, then education, then skills flattened across
/// categories. A requirement repeated anywhere keeps only its first position,
/// since the output document is keyed by requirement text.
pub fn build_requirement_corpus(job: &JobData) -> Vec<String> {
    let reqs = &job.requirements;
    let skill_reqs = reqs.skills.iter().flat_map(|(_, skills)| skills.iter());

    let mut seen = HashSet::new();
    let mut skipped = 0usize;
    let corpus: Vec<String> = reqs
        .work_experience
        .iter()
        .chain(reqs.education.iter())
        .chain(skill_reqs)
        .filter(|r| {
            let blank = r.trim().is_empty();
            skipped += usize::from(blank);
            !blank
        })
        .filter(|r| seen.insert(*r))
        .cloned()
        .collect();

    if skipped > 0 {
        debug!("Skipped {skipped} blank job requirement(s)");
    }
    corpus
}
