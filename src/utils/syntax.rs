use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, OnceLock, PoisonError};
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

#[derive(Debug)]
pub enum HighlightError {
    /// No grammar is registered for the language label.
    UnknownLanguage(String),
    /// The grammar failed while tokenizing.
    Syntect(syntect::Error),
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::UnknownLanguage(lang) => write!(f, "no grammar for language `{lang}`"),
            HighlightError::Syntect(err) => write!(f, "highlighting failed: {err}"),
        }
    }
}

impl std::error::Error for HighlightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HighlightError::Syntect(err) => Some(err),
            HighlightError::UnknownLanguage(_) => None,
        }
    }
}

/// Turns a code block's text into highlighted HTML.
///
/// The returned fragment must contain only inline markup whose text content
/// equals `code`.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, lang: &str) -> Result<String, HighlightError>;
}

fn normalize_lang_hint(s: &str) -> String {
    let t = s.trim().to_ascii_lowercase();
    match t.as_str() {
        "py" | "python" => "python".into(),
        "bash" | "sh" | "zsh" | "shell" => "bash".into(),
        "js" | "javascript" | "jsx" | "mjs" => "javascript".into(),
        "json" => "json".into(),
        "yaml" | "yml" => "yaml".into(),
        "rust" | "rs" => "rust".into(),
        "go" | "golang" => "go".into(),
        "c" | "h" => "c".into(),
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "c++" => "cpp".into(),
        "java" => "java".into(),
        "html" | "htm" => "html".into(),
        "css" => "css".into(),
        "sql" => "sql".into(),
        other => other.into(),
    }
}

/// Language tags the highlighter has a grammar for.
#[derive(Clone, Copy, Debug)]
pub struct LanguageRegistry {
    syntaxes: &'static SyntaxSet,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LanguageRegistry {
    pub fn builtin() -> Self {
        Self {
            syntaxes: syntax_set(),
        }
    }

    pub(crate) fn resolve(&self, tag: &str) -> Option<&'static SyntaxReference> {
        let tag = tag.trim();
        if tag.is_empty() || tag.eq_ignore_ascii_case("text") {
            return None;
        }
        let norm = normalize_lang_hint(tag);
        self.syntaxes
            .find_syntax_by_token(&norm)
            .or_else(|| self.syntaxes.find_syntax_by_token(tag))
            .filter(|s| s.name != "Plain Text")
    }

    pub fn recognizes(&self, tag: &str) -> bool {
        self.resolve(tag).is_some()
    }

    /// `(name, extensions)` for every grammar, sorted by name.
    pub fn languages(&self) -> Vec<(String, Vec<String>)> {
        let mut out: Vec<(String, Vec<String>)> = self
            .syntaxes
            .syntaxes()
            .iter()
            .filter(|s| s.name != "Plain Text")
            .map(|s| (s.name.clone(), s.file_extensions.clone()))
            .collect();
        out.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));
        out
    }
}

fn hash_code(lang: &str, code: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    lang.hash(&mut hasher);
    code.hash(&mut hasher);
    hasher.finish()
}

// Bounded FIFO of highlighted blocks keyed by (lang, hash).
struct SimpleCache {
    map: HashMap<(String, u64), String>,
    order: VecDeque<(String, u64)>,
    cap: usize,
}

impl SimpleCache {
    fn new(cap: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            cap,
        }
    }

    fn get(&self, k: &(String, u64)) -> Option<String> {
        self.map.get(k).cloned()
    }

    fn put(&mut self, k: (String, u64), v: String) {
        if self.cap == 0 {
            return;
        }
        if !self.map.contains_key(&k) {
            self.order.push_back(k.clone());
        }
        self.map.insert(k, v);
        while self.map.len() > self.cap {
            if let Some(old) = self.order.pop_front() {
                self.map.remove(&old);
            } else {
                break;
            }
        }
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Class-based highlighter backed by syntect's default grammars.
///
/// Output spans carry `hl-` prefixed scope classes; pair it with
/// [`stylesheet`] for colors.
pub struct SyntectHighlighter {
    registry: LanguageRegistry,
    cache: Mutex<SimpleCache>,
}

impl SyntectHighlighter {
    pub fn new(cache_size: usize) -> Self {
        Self {
            registry: LanguageRegistry::builtin(),
            cache: Mutex::new(SimpleCache::new(cache_size)),
        }
    }

    pub fn registry(&self) -> LanguageRegistry {
        self.registry
    }

    #[cfg(test)]
    fn cached_entries(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, lang: &str) -> Result<String, HighlightError> {
        let syntax = self
            .registry
            .resolve(lang)
            .ok_or_else(|| HighlightError::UnknownLanguage(lang.to_string()))?;

        let key = (syntax.name.clone(), hash_code(&syntax.name, code));
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(hit);
        }

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, self.registry.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(HighlightError::Syntect)?;
        }
        let html = generator.finalize();

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, html.clone());
        Ok(html)
    }
}

pub(crate) fn pick_syntect_theme_name(dark: bool) -> &'static str {
    if dark {
        "base16-ocean.dark"
    } else {
        "InspiredGitHub"
    }
}

/// CSS rules for the `hl-` classes emitted by [`SyntectHighlighter`].
pub fn stylesheet(dark: bool) -> Option<String> {
    let ts = theme_set();
    let fallback_names = ["base16-ocean.light", "Solarized (light)", "base16-ocean.dark"];
    let theme = ts.themes.get(pick_syntect_theme_name(dark)).or_else(|| {
        fallback_names
            .iter()
            .find_map(|name| ts.themes.get(*name))
    })?;
    css_for_theme_with_class_style(theme, CLASS_STYLE).ok()
}
