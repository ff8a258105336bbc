//! Minimal User-Agent classification.

use serde::{Deserialize, Serialize};

/// Browser and operating system extracted from a User-Agent string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Browser name, e.g. `Firefox`.
    pub browser: Option<String>,
    /// Browser version as reported.
    pub browser_version: Option<String>,
    /// Operating system name, e.g. `Windows`.
    pub os: Option<String>,
    /// Operating system version.
    pub os_version: Option<String>,
}

impl DeviceInfo {
    /// Classify a raw User-Agent header value.
    pub fn parse(user_agent: &str) -> Self {
        let (browser, browser_version) = detect_browser(user_agent).unzip();
        let (os, os_version) = match detect_os(user_agent) {
            Some((name, version)) => (Some(name), version),
            None => (None, None),
        };
        Self {
            browser,
            browser_version: browser_version.flatten(),
            os,
            os_version,
        }
    }

    /// Whether anything was recognized.
    pub fn is_known(&self) -> bool {
        self.browser.is_some() || self.os.is_some()
    }

    /// Render as `"{browser} {version} on {os} {version}"`.
    pub fn label(&self) -> String {
        let browser = join(self.browser.as_deref().unwrap_or("Unknown Browser"), &self.browser_version);
        let os = join(self.os.as_deref().unwrap_or("Unknown OS"), &self.os_version);
        format!("{browser} on {os}")
    }
}

/// Derive a device label, or `None` when nothing in the string is recognized.
pub fn describe_user_agent(user_agent: &str) -> Option<String> {
    let info = DeviceInfo::parse(user_agent);
    info.is_known().then(|| info.label())
}

fn join(name: &str, version: &Option<String>) -> String {
    match version {
        Some(v) if !v.is_empty() => format!("{name} {v}"),
        _ => name.to_string(),
    }
}

/// Version token following `marker`, up to the next space, `;` or `)`.
fn token_after(ua: &str, marker: &str) -> Option<String> {
    let start = ua.find(marker)? + marker.len();
    let version: String = ua[start..]
        .chars()
        .take_while(|c| !matches!(c, ' ' | ';' | ')'))
        .collect();
    (!version.is_empty()).then_some(version)
}

// Order matters: most Chromium derivatives also advertise Chrome and Safari.
const BROWSERS: &[(&str, &str)] = &[
    ("Edg/", "Edge"),
    ("EdgiOS/", "Edge"),
    ("OPR/", "Opera"),
    ("SamsungBrowser/", "Samsung Internet"),
    ("Firefox/", "Firefox"),
    ("FxiOS/", "Firefox"),
    ("CriOS/", "Chrome"),
    ("Chrome/", "Chrome"),
];

fn detect_browser(ua: &str) -> Option<(String, Option<String>)> {
    for (marker, name) in BROWSERS {
        if ua.contains(marker) {
            return Some((name.to_string(), token_after(ua, marker)));
        }
    }
    if ua.contains("Safari/") {
        let name = if ua.contains("Mobile/") {
            "Mobile Safari"
        } else {
            "Safari"
        };
        return Some((name.to_string(), token_after(ua, "Version/")));
    }
    None
}

fn detect_os(ua: &str) -> Option<(String, Option<String>)> {
    if let Some(nt) = token_after(ua, "Windows NT ") {
        let version = match nt.as_str() {
            "10.0" => "10",
            "6.3" => "8.1",
            "6.2" => "8",
            "6.1" => "7",
            other => other,
        };
        return Some(("Windows".to_string(), Some(version.to_string())));
    }
    if ua.contains("Windows") {
        return Some(("Windows".to_string(), None));
    }
    for marker in ["iPhone OS ", "CPU OS "] {
        if let Some(v) = token_after(ua, marker) {
            return Some(("iOS".to_string(), Some(v.replace('_', "."))));
        }
    }
    if let Some(v) = token_after(ua, "Android ") {
        return Some(("Android".to_string(), Some(v)));
    }
    if ua.contains("Android") {
        return Some(("Android".to_string(), None));
    }
    if let Some(v) = token_after(ua, "Mac OS X ") {
        return Some(("macOS".to_string(), Some(v.replace('_', "."))));
    }
    if ua.contains("Macintosh") {
        return Some(("macOS".to_string(), None));
    }
    if ua.contains("CrOS") {
        return Some(("Chrome OS".to_string(), None));
    }
    if ua.contains("Linux") {
        return Some(("Linux".to_string(), None));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1";
    const EDGE_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.2592.87";

    #[test]
    fn test_common_desktop_browsers() {
        assert_eq!(
            describe_user_agent(CHROME_WINDOWS).unwrap(),
            "Chrome 126.0.0.0 on Windows 10"
        );
        assert_eq!(
            describe_user_agent(FIREFOX_LINUX).unwrap(),
            "Firefox 128.0 on Linux"
        );
        assert_eq!(
            describe_user_agent(EDGE_MAC).unwrap(),
            "Edge 126.0.2592.87 on macOS 10.15.7"
        );
    }

    #[test]
    fn test_mobile_safari() {
        assert_eq!(
            describe_user_agent(SAFARI_IPHONE).unwrap(),
            "Mobile Safari 17.5 on iOS 17.5"
        );
    }

    #[test]
    fn test_unrecognized_yields_none() {
        assert_eq!(describe_user_agent(""), None);
        assert_eq!(describe_user_agent("curl/8.5.0"), None);
    }

    #[test]
    fn test_partial_match_fills_unknowns() {
        let info = DeviceInfo::parse("SomeBot/1.0 (Linux)");
        assert!(info.is_known());
        assert_eq!(info.label(), "Unknown Browser on Linux");
    }
}
