use tldextract::{TldExtractor, TldOption};

/// Looks up public suffixes against the Public Suffix List.
pub struct SuffixExtractor {
    extractor: TldExtractor,
}

impl SuffixExtractor {
    pub fn new() -> Self {
        Self {
            extractor: TldExtractor::new(TldOption::default()),
        }
    }

    /// The public suffix of `name` (e.g. `gouv.fr` for `social.gouv.fr`), if known.
    pub fn suffix_of(&self, name: &str) -> Option<String> {
        // tldextract expects a URL, not a bare host
        let url = format!("http://{}/", name.trim_end_matches('.'));
        self.extractor
            .extract(&url)
            .ok()
            .and_then(|result| result.suffix)
            .filter(|suffix| !suffix.is_empty())
    }

    pub fn parents(&self, name: &str) -> Vec<String> {
        let suffix = self.suffix_of(name);
        parent_chain(name, suffix.as_deref())
    }
}

impl Default for SuffixExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parent domains of `name`, nearest first.
///
/// Labels are stripped from the left one at a time. The walk stops after the
/// candidate equal to `public_suffix` has been emitted; without a known
/// suffix every parent down to the last label is returned. Names with one
/// label or fewer have no parents.
pub fn parent_chain(name: &str, public_suffix: Option<&str>) -> Vec<String> {
    let name = name.trim().trim_end_matches('.');
    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() <= 1 {
        return Vec::new();
    }

    let mut parents = Vec::new();
    for i in 1..labels.len() {
        let candidate = labels[i..].join(".");
        let reached_suffix = public_suffix.is_some_and(|s| s.eq_ignore_ascii_case(&candidate));
        parents.push(candidate);
        if reached_suffix {
            break;
        }
    }

    parents
}
