use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// `{category: [skill]}` kept in document order.
///
/// Corpus order follows the order categories appear in the source JSON, so this
/// deserializes from a JSON object into a list instead of a hash map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillCategories(pub Vec<(String, Vec<String>)>);

impl SkillCategories {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(category, skills)| (category.as_str(), skills.as_slice()))
    }
}

impl<'de> Deserialize<'de> for SkillCategories {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = SkillCategories;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping skill categories to lists of skills")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(SkillCategories::default())
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut categories = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((category, skills)) =
                    map.next_entry::<String, Option<Vec<String>>>()?
                {
                    categories.push((category, skills.unwrap_or_default()));
                }
                Ok(SkillCategories(categories))
            }
        }

        deserializer.deserialize_any(CategoriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_document_order() {
        let json = r#"{"Zeta": ["z"], "Alpha": ["a1", "a2"], "Mid": []}"#;
        let skills: SkillCategories = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = skills.iter().map(|(c, _)| c).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(skills.0[1].1, vec!["a1", "a2"]);
    }

    #[test]
    fn test_null_is_empty() {
        let skills: SkillCategories = serde_json::from_str("null").unwrap();
        assert!(skills.0.is_empty());
    }

    #[test]
    fn test_null_category_is_empty_list() {
        let skills: SkillCategories = serde_json::from_str(r#"{"Tools": null}"#).unwrap();
        assert_eq!(skills.0, vec![("Tools".to_string(), vec![])]);
    }

    #[test]
    fn test_rejects_list() {
        let result: Result<SkillCategories, _> = serde_json::from_str(r#"["Rust"]"#);
        assert!(result.is_err());
    }
}
