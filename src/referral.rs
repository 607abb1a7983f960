//! Referral capture — typed extraction of attribution from the entry URL.
//!
//! The hosting layer hands the core a `Referral` record once at session
//! start; the core never inspects a request itself.

use url::Url;

use crate::session::Referral;

/// Anything that can produce the session's attribution record.
pub trait ReferralSource {
    fn referral(&self) -> Referral;
}

/// Extraction from an entry URL's query string. Reads the four fixed
/// parameter names; absent values stay empty, first occurrence wins.
#[derive(Debug, Clone)]
pub struct UrlReferral {
    url: Url,
}

impl UrlReferral {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(entry: &str) -> Result<Self, url::ParseError> {
        Ok(Self { url: Url::parse(entry)? })
    }
}

impl ReferralSource for UrlReferral {
    fn referral(&self) -> Referral {
        let mut referral = Referral::default();
        for (key, value) in self.url.query_pairs() {
            let slot = match key.as_ref() {
                "ref" => &mut referral.ref_code,
                "utm_source" => &mut referral.utm_source,
                "utm_medium" => &mut referral.utm_medium,
                "utm_campaign" => &mut referral.utm_campaign,
                _ => continue,
            };
            if slot.is_empty() {
                *slot = value.into_owned();
            }
        }
        referral
    }
}

/// No attribution available (direct launch, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReferral;

impl ReferralSource for NoReferral {
    fn referral(&self) -> Referral {
        Referral::default()
    }
}
