use crate::utils::syntax::LanguageRegistry;

pub fn list_languages() {
    for line in language_lines(&LanguageRegistry::builtin()) {
        println!("{line}");
    }
}

/// `Name: ext, ext` per grammar. Any listed extension works as a fence tag.
pub fn language_lines(registry: &LanguageRegistry) -> Vec<String> {
    registry
        .languages()
        .into_iter()
        .map(|(name, extensions)| {
            if extensions.is_empty() {
                name
            } else {
                format!("{name}: {}", extensions.join(", "))
            }
        })
        .collect()
}
