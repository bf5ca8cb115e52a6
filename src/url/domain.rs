use url::Url;

/// Site key of a URL: the lowercase host without a leading `www.`
///
/// Used to group pages per site in statistics, storage rows and feature CSV
/// rows. The port is ignored. Returns `None` for URLs without a host.
///
/// ```
/// use recipe_ripple::url::extract_domain;
/// use url::Url;
///
/// let url = Url::parse("https://WWW.SeriousEats.com/pie").unwrap();
/// assert_eq!(extract_domain(&url).as_deref(), Some("seriouseats.com"));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match host.strip_prefix("www.") {
        Some(bare) if !bare.is_empty() => Some(bare.to_string()),
        _ => Some(host),
    }
}
