use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;

/// Topic buckets mirroring the digest's grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Regulatory,
    Mergers,
    Product,
    Market,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub topic: Topic,
    pub breaking: bool,
}

fn pattern(cell: &'static OnceCell<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).unwrap())
}

/// Classify a piece of article text (typically title + summary). Pure
/// function over the text, independent of storage. Topic precedence when
/// several match: regulatory, then M&A, then product, then market.
pub fn classify(text: &str) -> Classification {
    static RE_BREAKING: OnceCell<Regex> = OnceCell::new();
    static RE_REGULATORY: OnceCell<Regex> = OnceCell::new();
    static RE_MERGERS: OnceCell<Regex> = OnceCell::new();
    static RE_PRODUCT: OnceCell<Regex> = OnceCell::new();
    static RE_MARKET: OnceCell<Regex> = OnceCell::new();

    let breaking = pattern(
        &RE_BREAKING,
        r"(?i)\b(breaking|just in|urgent|developing)\b",
    )
    .is_match(text);

    let topic = if pattern(
        &RE_REGULATORY,
        r"(?i)\b(regulat\w*|licen[cs]\w*|complian\w*|fine[sd]?|penalt\w*|ban(?:ned|s)?|commission|authorit\w*|watchdog)\b",
    )
    .is_match(text)
    {
        Topic::Regulatory
    } else if pattern(
        &RE_MERGERS,
        r"(?i)\b(merger\w*|acqui\w*|takeover\w*|buyout\w*)\b",
    )
    .is_match(text)
    {
        Topic::Mergers
    } else if pattern(
        &RE_PRODUCT,
        r"(?i)\b(launch\w*|releas\w*|unveil\w*|debut\w*|rollout\w*|new (?:game|slot|platform|app))\b",
    )
    .is_match(text)
    {
        Topic::Product
    } else if pattern(
        &RE_MARKET,
        r"(?i)\b(revenue\w*|earnings|results|profit\w*|shares?|stocks?|market\w*|quarter\w*|growth)\b",
    )
    .is_match(text)
    {
        Topic::Market
    } else {
        Topic::Other
    };

    Classification { topic, breaking }
}
