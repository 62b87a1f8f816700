//! Supported site locales and the locale redirect rule.
//!
//! The registry is a fixed table: English (default), Arabic (right-to-left),
//! Spanish and French. [`resolve_redirect`] decides, per request, whether an
//! unprefixed path must be redirected to its locale-prefixed form.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// A supported site locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ar,
    Es,
    Fr,
}

/// Writing direction of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

/// Static metadata for one locale.
#[derive(Debug, Clone, Serialize)]
pub struct LocaleInfo {
    pub locale: Locale,
    /// ISO 639-1 code (e.g. `"ar"`).
    pub code: &'static str,
    /// English name (e.g. `"Arabic"`).
    pub name: &'static str,
    /// Name in the language itself (e.g. `"العربية"`).
    pub native_name: &'static str,
    pub dir: TextDirection,
    pub is_default: bool,
}

static LOCALES: [LocaleInfo; 4] = [
    LocaleInfo {
        locale: Locale::En,
        code: "en",
        name: "English",
        native_name: "English",
        dir: TextDirection::Ltr,
        is_default: true,
    },
    LocaleInfo {
        locale: Locale::Ar,
        code: "ar",
        name: "Arabic",
        native_name: "العربية",
        dir: TextDirection::Rtl,
        is_default: false,
    },
    LocaleInfo {
        locale: Locale::Es,
        code: "es",
        name: "Spanish",
        native_name: "Español",
        dir: TextDirection::Ltr,
        is_default: false,
    },
    LocaleInfo {
        locale: Locale::Fr,
        code: "fr",
        name: "French",
        native_name: "Français",
        dir: TextDirection::Ltr,
        is_default: false,
    },
];

impl Locale {
    /// Locale used when neither cookie nor `Accept-Language` resolves.
    pub const DEFAULT: Locale = Locale::En;

    /// All supported locales in registry order.
    pub fn all() -> &'static [LocaleInfo] {
        &LOCALES
    }

    /// Parse a language tag such as `"ar"`, `"AR"` or `"ar-EG"`.
    ///
    /// Only the primary subtag is considered.
    pub fn from_code(code: &str) -> Result<Locale, CoreError> {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        LOCALES
            .iter()
            .find(|info| info.code == primary)
            .map(|info| info.locale)
            .ok_or_else(|| CoreError::Validation(format!("Unsupported locale: '{code}'")))
    }

    /// Registry entry for this locale.
    pub fn info(self) -> &'static LocaleInfo {
        // The registry holds exactly one entry per variant.
        match self {
            Locale::En => &LOCALES[0],
            Locale::Ar => &LOCALES[1],
            Locale::Es => &LOCALES[2],
            Locale::Fr => &LOCALES[3],
        }
    }

    pub fn code(self) -> &'static str {
        self.info().code
    }

    pub fn dir(self) -> TextDirection {
        self.info().dir
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_code(s)
    }
}

// ---------------------------------------------------------------------------
// Accept-Language negotiation
// ---------------------------------------------------------------------------

/// Pick the best supported locale from an `Accept-Language` header value.
///
/// Ranges are ordered by quality (`q`), ties keep header order. Ranges with
/// `q=0` are excluded and `*` resolves to [`Locale::DEFAULT`].
pub fn negotiate(accept_language: &str) -> Option<Locale> {
    let mut ranges: Vec<(f32, &str)> = accept_language
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let mut quality = 1.0_f32;
            for param in pieces {
                let param = param.trim();
                if let Some(value) = param.strip_prefix("q=").or_else(|| param.strip_prefix("Q=")) {
                    quality = value.trim().parse().unwrap_or(0.0);
                }
            }
            (quality > 0.0).then_some((quality, tag))
        })
        .collect();

    // Stable sort keeps header order for equal weights.
    ranges.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    ranges.into_iter().find_map(|(_, tag)| {
        if tag == "*" {
            Some(Locale::DEFAULT)
        } else {
            Locale::from_code(tag).ok()
        }
    })
}

// ---------------------------------------------------------------------------
// Redirect rule
// ---------------------------------------------------------------------------

/// Path prefixes that are never locale-redirected.
const BYPASS_PREFIXES: &[&str] = &["/api/", "/_next/", "/static/"];

/// Exact paths that are never locale-redirected.
const BYPASS_PATHS: &[&str] = &["/api", "/health"];

/// Outcome of evaluating the locale rule for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Not a page route (API, health, static asset); leave untouched.
    Bypass,
    /// Already locale-prefixed; serve as-is under `locale`.
    Pass { locale: Locale },
    /// Redirect to `location`, the `locale`-prefixed form of the request.
    Redirect { locale: Locale, location: String },
}

/// Return the locale named by the first path segment, if any.
///
/// The match is exact: `/en/...` is prefixed, `/EN/...` and `/english` are not.
pub fn locale_prefix(path: &str) -> Option<Locale> {
    let first = path.trim_start_matches('/').split('/').next()?;
    LOCALES
        .iter()
        .find(|info| info.code == first)
        .map(|info| info.locale)
}

fn is_bypassed(path: &str) -> bool {
    if BYPASS_PATHS.contains(&path) || BYPASS_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return true;
    }
    // File assets (favicon.ico, robots.txt, sitemap.xml, ...).
    path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}

/// Evaluate the locale redirect rule.
///
/// * `path` - request path, starting with `/`.
/// * `query` - raw query string without the leading `?`.
/// * `cookie_locale` - value of the locale cookie, if present.
/// * `accept_language` - raw `Accept-Language` header, if present.
///
/// For unprefixed page paths the target locale is the cookie (when it names
/// a supported locale), then `Accept-Language`, then [`Locale::DEFAULT`].
pub fn resolve_redirect(
    path: &str,
    query: Option<&str>,
    cookie_locale: Option<&str>,
    accept_language: Option<&str>,
) -> RedirectDecision {
    if is_bypassed(path) {
        return RedirectDecision::Bypass;
    }

    if let Some(locale) = locale_prefix(path) {
        return RedirectDecision::Pass { locale };
    }

    let locale = cookie_locale
        .and_then(|c| Locale::from_code(c).ok())
        .or_else(|| accept_language.and_then(negotiate))
        .unwrap_or(Locale::DEFAULT);

    let mut location = if path.is_empty() || path == "/" {
        format!("/{}", locale.code())
    } else if path.starts_with('/') {
        format!("/{}{path}", locale.code())
    } else {
        format!("/{}/{path}", locale.code())
    };

    if let Some(q) = query.filter(|q| !q.is_empty()) {
        location.push('?');
        location.push_str(q);
    }

    RedirectDecision::Redirect { locale, location }
}
