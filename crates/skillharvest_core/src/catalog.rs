use regex::{Regex, RegexBuilder};

/// Label words that introduce a skill list in a job description.
pub const LABEL_MARKERS: &[&str] = &[
    // Source-locale labels.
    "стек",
    "технологии",
    "требования",
    "навыки",
    "опыт работы с",
    "знание",
    // English equivalents.
    "stack",
    "technologies",
    "requirements",
    "skills",
    "experience with",
    "knowledge of",
];

/// Disjunctions of well-known technology names, matched anywhere in the
/// plain text of a description.
pub const TECH_PATTERNS: &[&str] = &[
    r"(?:C#|\.NET|ASP\.NET|JavaScript|TypeScript|Python|Java|Kotlin|Swift|Go|Rust|PHP|Ruby|SQL|NoSQL)",
    r"(?:React|Angular|Vue|Node\.js|Express|Django|Flask|Spring|Hibernate|Laravel|Rails)",
    r"(?:PostgreSQL|MySQL|Oracle|MongoDB|Cassandra|Redis|Elasticsearch|DynamoDB)",
    r"(?:Docker|Kubernetes|AWS|Azure|GCP|Terraform|Ansible|Jenkins|GitLab CI|GitHub Actions)",
    r"(?:REST|GraphQL|gRPC|WebSocket|Kafka|RabbitMQ|NATS|ZeroMQ)",
    r"(?:HTML|CSS|SASS|LESS|Bootstrap|Tailwind|Material UI|Ant Design)",
    r"(?:TDD|BDD|CI/CD|Agile|Scrum|Kanban|DevOps|SRE)",
];

/// Tokens never emitted as skills: articles, conjunctions, unit words.
pub const STOPWORDS: &[&str] = &["и", "или", "the", "a", "an", "от", "до", "лет", "года"];

/// Compiled pattern tables driving skill extraction.
///
/// The catalog is plain data (marker words, technology disjunctions,
/// stopwords) compiled once; the extractor takes a catalog so the tables can
/// be extended or substituted without touching the pipeline.
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    label: Regex,
    splitter: Regex,
    tech: Vec<Regex>,
    stopwords: Vec<String>,
}

impl SkillCatalog {
    /// The built-in marker/pattern/stopword tables, compiled.
    pub fn builtin() -> Self {
        Self::compile(LABEL_MARKERS, TECH_PATTERNS, STOPWORDS)
            .expect("builtin catalog patterns compile")
    }

    /// Compiles a custom catalog.
    ///
    /// Marker words are matched literally (case-insensitive); technology
    /// patterns are regular expressions in their own right.
    pub fn compile(
        markers: &[&str],
        tech_patterns: &[&str],
        stopwords: &[&str],
    ) -> Result<Self, regex::Error> {
        let alternation = markers
            .iter()
            .map(|marker| regex::escape(marker))
            .collect::<Vec<_>>()
            .join("|");
        // A label introduces a list that runs until the next period.
        let label = RegexBuilder::new(&format!(r"(?:{alternation})[:\s]+([^.]+)"))
            .case_insensitive(true)
            .build()?;
        let splitter = Regex::new(r"[,;\s]+")?;
        let tech = tech_patterns
            .iter()
            .map(|pattern| RegexBuilder::new(pattern).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;
        let stopwords = stopwords.iter().map(|word| word.to_lowercase()).collect();
        Ok(Self {
            label,
            splitter,
            tech,
            stopwords,
        })
    }

    /// Skill lists captured after any label marker, in text order.
    pub fn label_captures<'t>(&'t self, text: &'t str) -> impl Iterator<Item = &'t str> {
        self.label
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
    }

    /// Splits one captured skill list into raw tokens.
    pub fn split_list<'t>(&'t self, list: &'t str) -> impl Iterator<Item = &'t str> {
        self.splitter.split(list)
    }

    /// Technology-name matches, in table order then text order.
    pub fn tech_matches<'t>(&'t self, text: &'t str) -> impl Iterator<Item = &'t str> {
        self.tech
            .iter()
            .flat_map(move |pattern| pattern.find_iter(text).map(|m| m.as_str()))
    }

    /// Whether a token is filtered out of the label pass.
    pub fn is_stopword(&self, token: &str) -> bool {
        let lowered = token.to_lowercase();
        self.stopwords.iter().any(|word| *word == lowered)
    }
}
