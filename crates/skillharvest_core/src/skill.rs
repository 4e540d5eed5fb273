use std::fmt;

/// Category assigned to an extracted skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillCategory {
    ProgrammingLanguage,
    Technology,
}

impl SkillCategory {
    /// The category text persisted alongside a skill.
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::ProgrammingLanguage => "Programming Language",
            SkillCategory::Technology => "Technology",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extracted, not-yet-persisted skill candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillFact {
    pub name: String,
    pub category: SkillCategory,
    pub description: String,
}

impl SkillFact {
    /// Fact for a job's declared speciality. The persisted name is the
    /// uppercased speciality; the description keeps the original casing.
    pub fn speciality(raw: &str) -> Self {
        Self {
            name: raw.to_uppercase(),
            category: SkillCategory::ProgrammingLanguage,
            description: format!("Programming language or technology: {raw}"),
        }
    }

    /// Fact for a technology token found in a job description.
    pub fn technology(token: &str) -> Self {
        Self {
            name: token.to_string(),
            category: SkillCategory::Technology,
            description: format!("Technology or skill mentioned in job description: {token}"),
        }
    }

    /// Case-normalized name used for in-job dedup and store uniqueness.
    pub fn normalized_name(&self) -> String {
        self.name.to_lowercase()
    }
}

/// A persisted skill row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillEntity {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
}
