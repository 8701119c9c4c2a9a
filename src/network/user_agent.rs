//! Browser-like request headers

use rand::seq::SliceRandom;
use rand::Rng;

const CHROME_VERSIONS: &[&str] = &["128.0.0.0", "129.0.0.0", "130.0.0.0", "131.0.0.0"];
const FIREFOX_VERSIONS: &[&str] = &["130.0", "131.0", "132.0", "133.0"];
const PLATFORMS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "X11; Linux x86_64",
];

/// Pick a realistic desktop user agent.
///
/// Chosen once per `HttpClient`; rotating on every request looks less like a
/// browser than keeping one.
pub fn generate_user_agent() -> String {
    let mut rng = rand::thread_rng();
    let platform = PLATFORMS.choose(&mut rng).copied().unwrap_or(PLATFORMS[0]);

    if rng.gen_bool(0.7) {
        let chrome = CHROME_VERSIONS
            .choose(&mut rng)
            .copied()
            .unwrap_or(CHROME_VERSIONS[0]);
        format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
            platform, chrome
        )
    } else {
        let firefox = FIREFOX_VERSIONS
            .choose(&mut rng)
            .copied()
            .unwrap_or(FIREFOX_VERSIONS[0]);
        format!(
            "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
            platform, firefox, firefox
        )
    }
}

/// Accept header for HTML pages
pub fn accept_html() -> &'static str {
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
}

/// Accept-Language header for a `country-lang` region code
pub fn accept_language(region: &str) -> String {
    match region.split_once('-') {
        Some((country, lang)) if !country.is_empty() && !lang.is_empty() => format!(
            "{}-{},{};q=0.9,en;q=0.8",
            lang.to_ascii_lowercase(),
            country.to_ascii_uppercase(),
            lang.to_ascii_lowercase()
        ),
        _ => "en-US,en;q=0.9".to_string(),
    }
}
