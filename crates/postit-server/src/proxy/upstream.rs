use reqwest::Url;

/// The single origin all proxied traffic is sent to.
#[derive(Debug, Clone)]
pub struct Upstream {
    origin: Url,
}

impl Upstream {
    pub fn new(origin: Url) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Target URL for a request whose path, minus the proxy prefix, is
    /// `rest`. The origin's own path and query are kept.
    ///
    /// Returns `None` when `rest` contains a `.` or `..` segment, raw or
    /// percent-encoded. URL normalization would resolve those against the
    /// origin path instead of forwarding them.
    pub fn url_for(&self, rest: &str, query: Option<&str>) -> Option<Url> {
        if rest.split(['/', '\\']).any(is_dot_segment) {
            return None;
        }

        let mut url = self.origin.clone();
        let path = single_joining_slash(self.origin.path(), rest);
        url.set_path(&path);

        let base = self.origin.query().filter(|q| !q.is_empty());
        let merged = match (base, query.filter(|q| !q.is_empty())) {
            (Some(base), Some(extra)) => Some(format!("{base}&{extra}")),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => None,
        };
        url.set_query(merged.as_deref());
        Some(url)
    }
}

fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

/// Join two path pieces with exactly one `/` between them.
fn single_joining_slash(base: &str, rest: &str) -> String {
    match (base.ends_with('/'), rest.starts_with('/')) {
        (true, true) => format!("{base}{}", &rest[1..]),
        (false, false) => format!("{base}/{rest}"),
        _ => format!("{base}{rest}"),
    }
}
