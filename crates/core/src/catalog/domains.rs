use crate::domain::Retailer;
use crate::merchant::reference::split_pattern;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct DomainEntry {
    retailer: usize,
    /// Normalized `host` or `host/path`, used for in-path matching.
    pattern: String,
    path: Option<String>,
    primary: bool,
    order: usize,
}

impl DomainEntry {
    // Lower sorts first: path-qualified, then primary, then catalog order.
    fn rank(&self) -> (bool, bool, usize) {
        (self.path.is_none(), !self.primary, self.order)
    }
}

/// Precomputed host -> retailer map. Longest label-boundary suffix wins, so an alternate
/// domain can never shadow a more specific primary one.
#[derive(Debug, Clone, Default)]
pub struct DomainIndex {
    by_host: HashMap<String, Vec<DomainEntry>>,
    entries: Vec<DomainEntry>,
}

impl DomainIndex {
    pub fn build(retailers: &[Retailer]) -> Self {
        let mut index = Self::default();
        let mut order = 0usize;

        for (retailer_idx, retailer) in retailers.iter().enumerate() {
            let patterns = std::iter::once((retailer.primary_domain_pattern.as_str(), true)).chain(
                retailer
                    .alternate_domains
                    .iter()
                    .map(|d| (d.domain_pattern.as_str(), false)),
            );

            for (raw, primary) in patterns {
                let Some((host, path)) = split_pattern(raw) else {
                    tracing::warn!(retailer = %retailer.name, pattern = raw, "ignoring unusable domain pattern");
                    continue;
                };

                let pattern = match &path {
                    Some(p) => format!("{host}/{p}"),
                    None => host.clone(),
                };
                let entry = DomainEntry {
                    retailer: retailer_idx,
                    pattern,
                    path,
                    primary,
                    order,
                };
                order += 1;

                index.by_host.entry(host).or_default().push(entry.clone());
                index.entries.push(entry);
            }
        }

        index
    }

    /// Index of the retailer owning `host` (already normalized) and `path` (lowercased).
    pub fn lookup(&self, host: &str, path: &str) -> Option<usize> {
        for suffix in label_suffixes(host) {
            let Some(entries) = self.by_host.get(suffix) else {
                continue;
            };
            let best = entries
                .iter()
                .filter(|e| e.path.as_deref().map_or(true, |p| path.contains(p)))
                .min_by_key(|e| e.rank());
            if let Some(entry) = best {
                return Some(entry.retailer);
            }
        }

        // Merchant hosted inside a marketplace path, e.g. `mall.example/stores/wholefoodsmarket.com`.
        if path.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .filter(|e| path.contains(e.pattern.as_str()))
            .min_by_key(|e| (std::cmp::Reverse(e.pattern.len()), e.rank()))
            .map(|e| e.retailer)
    }
}

/// `"a.b.example.com"` -> `["a.b.example.com", "b.example.com", "example.com", "com"]`.
fn label_suffixes(host: &str) -> impl Iterator<Item = &str> {
    std::iter::once(host).chain(
        host.char_indices()
            .filter(|(_, c)| *c == '.')
            .map(move |(i, _)| &host[i + 1..]),
    )
}
