use url::Url;

/// A named RSS/Atom endpoint configured for ingestion. The registry is an
/// immutable list passed explicitly into the orchestrator; nothing in the
/// pipeline mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Build a source whose display name is derived from the URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: source_name(&url),
            url,
        }
    }
}

const DEFAULT_FEED_URLS: &[&str] = &[
    "https://www.yogonet.com/international/europe/rss.xml",
    "https://www.yogonet.com/international/united-states/rss.xml",
    "https://www.yogonet.com/international/latin-america/rss.xml",
    "https://www.yogonet.com/international/asia/rss.xml",
    "https://www.yogonet.com/international/online-gaming/rss.xml",
    "https://europeangaming.eu/portal/feed/",
    "https://igamingbusiness.com/company-news/feed/",
    "https://cdcgamingreports.com/feed/",
    "https://casinobeats.com/feed/",
    "https://sbcnews.co.uk/feed/",
    "https://slotbeats.com/feed/",
];

/// The built-in iGaming news registry.
pub fn default_sources() -> Vec<FeedSource> {
    DEFAULT_FEED_URLS
        .iter()
        .map(|url| FeedSource::from_url(*url))
        .collect()
}

/// Derive a readable source name from a feed URL. Known publications get
/// their proper names; anything else falls back to the capitalized first
/// label of the domain.
pub fn source_name(feed_url: &str) -> String {
    if feed_url.contains("yogonet.com") {
        if feed_url.contains("europe") {
            return "Yogonet Europe".to_string();
        } else if feed_url.contains("united-states") {
            return "Yogonet US".to_string();
        } else if feed_url.contains("latin-america") {
            return "Yogonet Latin America".to_string();
        } else if feed_url.contains("asia") {
            return "Yogonet Asia".to_string();
        } else if feed_url.contains("online-gaming") {
            return "Yogonet Online Gaming".to_string();
        }
        return "Yogonet".to_string();
    } else if feed_url.contains("europeangaming.eu") {
        return "European Gaming".to_string();
    } else if feed_url.contains("igamingbusiness.com") {
        return "iGaming Business".to_string();
    } else if feed_url.contains("cdcgamingreports.com") {
        return "CDC Gaming Reports".to_string();
    } else if feed_url.contains("casinobeats.com") {
        return "Casino Beats".to_string();
    } else if feed_url.contains("sbcnews.co.uk") {
        return "SBC News".to_string();
    } else if feed_url.contains("slotbeats.com") {
        return "Slot Beats".to_string();
    }

    match Url::parse(feed_url) {
        Ok(parsed) => {
            let domain = parsed
                .domain()
                .map(|d| d.trim_start_matches("www.").to_string())
                .unwrap_or_default();
            match domain.split('.').next() {
                Some(label) if !label.is_empty() => capitalize(label),
                _ => feed_url.to_string(),
            }
        }
        Err(_) => feed_url.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_publications_get_proper_names() {
        assert_eq!(
            source_name("https://www.yogonet.com/international/europe/rss.xml"),
            "Yogonet Europe"
        );
        assert_eq!(
            source_name("https://igamingbusiness.com/company-news/feed/"),
            "iGaming Business"
        );
        assert_eq!(source_name("https://sbcnews.co.uk/feed/"), "SBC News");
    }

    #[test]
    fn unknown_domain_falls_back_to_capitalized_label() {
        assert_eq!(source_name("https://www.example.com/feed.xml"), "Example");
        assert_eq!(source_name("https://newsroom.io/rss"), "Newsroom");
    }

    #[test]
    fn unparseable_url_is_returned_verbatim() {
        assert_eq!(source_name("not a url"), "not a url");
    }

    #[test]
    fn default_registry_has_one_entry_per_url() {
        let sources = default_sources();
        assert_eq!(sources.len(), DEFAULT_FEED_URLS.len());
        assert!(sources.iter().all(|s| !s.name.is_empty()));
    }
}
