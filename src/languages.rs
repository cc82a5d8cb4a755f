use indexmap::IndexMap;
use std::sync::LazyLock;

/// Markdown fence tag -> Jira `{code:language=…}` identifier.
static LANGUAGES: LazyLock<IndexMap<&'static str, &'static str>> = LazyLock::new(|| {
    IndexMap::from([
        ("shell", "bash"),
        ("actionscript3", "actionscript3"),
        ("bash", "bash"),
        ("csharp", "csharp"),
        ("coldfusion", "coldfusion"),
        ("cpp", "cpp"),
        ("css", "css"),
        ("delphi", "delphi"),
        ("diff", "diff"),
        ("erlang", "erlang"),
        ("groovy", "groovy"),
        ("java", "java"),
        ("javafx", "javafx"),
        ("js", "javascript"),
        ("javascript", "javascript"),
        ("ts", "javascript"),
        ("typescript", "javascript"),
        ("perl", "perl"),
        ("php", "php"),
        ("none", "none"),
        ("powershell", "powershell"),
        ("python", "python"),
        ("ruby", "ruby"),
        ("scala", "scala"),
        ("sql", "sql"),
        ("vb", "vb"),
        ("html/xml", "html/xml"),
    ])
});

/// Resolve a fence tag. Unknown or absent tags give `""` so Jira picks its
/// default lexer.
pub fn jira_language(tag: Option<&str>) -> &'static str {
    tag.and_then(|t| LANGUAGES.get(t).copied()).unwrap_or("")
}

/// All known tags in declaration order.
pub fn languages() -> impl Iterator<Item = (&'static str, &'static str)> {
    LANGUAGES.iter().map(|(k, v)| (*k, *v))
}

pub fn is_known(tag: &str) -> bool {
    LANGUAGES.contains_key(tag)
}
