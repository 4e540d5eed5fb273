use pretty_assertions::assert_eq;
use skillharvest_core::{JobRecord, SkillCatalog, TextSkillExtractor};

#[test]
fn builtin_tables_compile() {
    let catalog = SkillCatalog::builtin();

    let lists: Vec<&str> = catalog.label_captures("Технологии: Rust, Tokio").collect();
    // Greedy `[:\s]+` consumes the separator, so the capture starts at the list.
    assert_eq!(lists, vec!["Rust, Tokio"]);

    assert!(catalog.is_stopword("И"));
    assert!(catalog.is_stopword("the"));
    assert!(!catalog.is_stopword("Rust"));
}

#[test]
fn tech_matches_follow_table_order() {
    let catalog = SkillCatalog::builtin();

    let found: Vec<&str> = catalog.tech_matches("Redis рядом с React").collect();
    // Frameworks precede databases in the table.
    assert_eq!(found, vec!["React", "Redis"]);
}

#[test]
fn custom_catalog_drives_extraction() {
    let catalog = SkillCatalog::compile(&["uses"], &[r"(?:Zig)"], &["and"]).expect("compile");
    let extractor = TextSkillExtractor::with_catalog(catalog);
    let job = JobRecord {
        description: Some("Uses: Zig and Odin".to_string()),
        active: true,
        ..JobRecord::default()
    };

    let names: Vec<String> = extractor
        .extract(&job)
        .into_iter()
        .map(|fact| fact.name)
        .collect();
    assert_eq!(names, vec!["Zig".to_string(), "Odin".to_string()]);
}

#[test]
fn invalid_pattern_is_an_error() {
    assert!(SkillCatalog::compile(&["x"], &[r"(?:unclosed"], &[]).is_err());
}
