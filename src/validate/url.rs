use url::Url;

/// Whether `candidate` is a usable announce or web seed URL.
///
/// The URL needs an explicit `scheme://` prefix and a non-empty host. A
/// port, if given, must be numeric; the parser rejects anything else.
pub fn is_valid_url(candidate: &str) -> bool {
    let Some((scheme, rest)) = candidate.split_once("://") else {
        return false;
    };
    if scheme.is_empty() || rest.is_empty() {
        return false;
    }
    match Url::parse(candidate) {
        Ok(url) => url.host_str().is_some_and(|host| !host.is_empty()),
        Err(_) => false,
    }
}
