//! Release version identifiers: `v<major>[.<minor>[.<patch>]][-<channel><ordinal>]`.
//!
//! Parsing never fails outright. A malformed identifier still produces a
//! [`Version`] that keeps its original text for diagnostics but refuses to be
//! compared.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("version '{original}' could not be parsed")]
    Unparsed { original: String },
}

/// Prerelease channel. Declaration order is release order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Alpha,
    Beta,
    Rc,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Alpha, Channel::Beta, Channel::Rc];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Rc => "rc",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prerelease marker such as `rc12`. Ordered by channel, then ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Prerelease {
    pub channel: Channel,
    pub ordinal: u64,
}

impl Prerelease {
    #[must_use]
    pub fn new(channel: Channel, ordinal: u64) -> Self {
        Self { channel, ordinal }
    }

    fn parse(tail: &str) -> Option<Self> {
        let (channel, ordinal) = Channel::ALL
            .into_iter()
            .find_map(|channel| tail.strip_prefix(channel.as_str()).map(|rest| (channel, rest)))?;
        Some(Self::new(channel, parse_number(ordinal)?))
    }
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.channel, self.ordinal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedVersion {
    numbers: [u64; 3],
    prerelease: Option<Prerelease>,
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.numbers
            .cmp(&other.numbers)
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(ours), Some(theirs)) => ours.cmp(theirs),
            })
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    original: String,
    parsed: Option<ParsedVersion>,
}

impl Version {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            original: text.to_owned(),
            parsed: parse_identifier(text),
        }
    }

    /// The input text, verbatim.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.parsed.is_some()
    }

    /// `(major, minor, patch)`, or `None` when the identifier was rejected.
    #[must_use]
    pub fn numbers(&self) -> Option<[u64; 3]> {
        self.parsed.as_ref().map(|parsed| parsed.numbers)
    }

    #[must_use]
    pub fn prerelease(&self) -> Option<Prerelease> {
        self.parsed.as_ref().and_then(|parsed| parsed.prerelease)
    }

    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        self.prerelease().is_some()
    }

    /// Total order over parsed versions.
    ///
    /// # Errors
    /// Returns [`VersionError::Unparsed`] naming the first operand that was
    /// rejected by the parser.
    pub fn compare(&self, other: &Version) -> Result<Ordering, VersionError> {
        match (&self.parsed, &other.parsed) {
            (Some(ours), Some(theirs)) => Ok(ours.cmp(theirs)),
            (None, _) => Err(self.unparsed()),
            (_, None) => Err(other.unparsed()),
        }
    }

    /// `true` only when both sides parse and `self` orders strictly after
    /// `other`.
    #[must_use]
    pub fn is_newer_than(&self, other: &Version) -> bool {
        matches!(self.compare(other), Ok(Ordering::Greater))
    }

    fn unparsed(&self) -> VersionError {
        VersionError::Unparsed {
            original: self.original.clone(),
        }
    }
}

impl FromStr for Version {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

fn parse_identifier(text: &str) -> Option<ParsedVersion> {
    let rest = text.strip_prefix('v')?;
    let (core, tail) = match rest.split_once('-') {
        Some((core, tail)) => (core, Some(tail)),
        None => (rest, None),
    };

    let numbers = parse_core(core)?;
    let prerelease = match tail {
        Some(tail) => Some(Prerelease::parse(tail)?),
        None => None,
    };

    Some(ParsedVersion {
        numbers,
        prerelease,
    })
}

fn parse_core(core: &str) -> Option<[u64; 3]> {
    let mut numbers = [0; 3];
    let mut fields = core.split('.');

    for slot in &mut numbers {
        match fields.next() {
            Some(field) => *slot = parse_number(field)?,
            None => break,
        }
    }

    if fields.next().is_some() {
        return None;
    }
    Some(numbers)
}

fn parse_number(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_parses(text: &str, numbers: [u64; 3], prerelease: Option<Prerelease>) {
        let version = Version::parse(text);
        assert!(version.is_parsed(), "{text} should parse");
        assert_eq!(version.numbers(), Some(numbers), "numbers of {text}");
        assert_eq!(version.prerelease(), prerelease, "prerelease of {text}");
    }

    fn assert_rejected(text: &str) {
        let version = Version::parse(text);
        assert!(!version.is_parsed(), "{text} should be rejected");
        assert_eq!(version.original(), text);
        assert_eq!(version.numbers(), None);
        assert_eq!(version.prerelease(), None);
    }

    fn cmp(a: &str, b: &str) -> Ordering {
        Version::parse(a)
            .compare(&Version::parse(b))
            .unwrap_or_else(|e| panic!("{a} vs {b}: {e}"))
    }

    #[test]
    fn parses_full_and_partial_cores() {
        assert_parses("v42.8.167", [42, 8, 167], None);
        assert_parses("v9999", [9999, 0, 0], None);
        assert_parses("v12345.1-rc123", [12345, 1, 0], Some(Prerelease::new(Channel::Rc, 123)));
    }

    #[test]
    fn parses_every_channel() {
        assert_parses("v1.2.3-alpha1", [1, 2, 3], Some(Prerelease::new(Channel::Alpha, 1)));
        assert_parses("v1.2.3-beta0", [1, 2, 3], Some(Prerelease::new(Channel::Beta, 0)));
        assert_parses("v1.2.3-rc123", [1, 2, 3], Some(Prerelease::new(Channel::Rc, 123)));
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for text in [
            "v0.0.0.1",
            "v0.0.1-rel0",
            "1.2.3",
            "",
            "v",
            "v1.",
            "v.1",
            "v1..2",
            "v1.2.3-",
            "v1.2.3-rc",
            "v1.2.3-rc1x",
            "v1.2.3-rc-1",
            "v1.2.3-RC1",
            "v+1.2.3",
            "v1.-2.3",
            " v1.2.3",
            "v1.2.3 ",
            "v99999999999999999999999",
            "V1.2.3",
        ] {
            assert_rejected(text);
        }
    }

    #[test]
    fn original_is_preserved_verbatim() {
        for text in ["v1.2.3", "v1-beta2", "garbage", "v0.0.0.1", "dev"] {
            assert_eq!(Version::parse(text).original(), text);
            assert_eq!(Version::parse(text).to_string(), text);
        }
    }

    #[test]
    fn from_str_matches_parse() {
        let parsed: Version = "v3.1-alpha7".parse().expect("parsing is infallible");
        assert_eq!(parsed, Version::parse("v3.1-alpha7"));
    }

    #[test]
    fn release_outranks_prerelease_of_same_core() {
        assert_eq!(cmp("v0.0.1", "v0.0.1-rc1"), Ordering::Greater);
        assert_eq!(cmp("v1.2.3-rc1", "v1.2.3-rc2"), Ordering::Less);
        assert_eq!(cmp("v1.2.3-rc2", "v1.2.3"), Ordering::Less);
    }

    #[test]
    fn core_dominates_channel() {
        assert_eq!(cmp("v0.0.1-rc4", "v0.0.0-beta19"), Ordering::Greater);
        assert_eq!(cmp("v0.0.1-alpha24", "v0.0.0-beta19"), Ordering::Greater);
        assert_eq!(cmp("v0.0.1", "v0.0.2-rc1"), Ordering::Less);
        assert_eq!(cmp("v0.0.1", "v0.0.0-rc1"), Ordering::Greater);
    }

    #[test]
    fn channel_then_ordinal_break_ties() {
        assert_eq!(cmp("v0.0.1-alpha24", "v0.0.1-beta1"), Ordering::Less);
        assert_eq!(cmp("v0.0.1-beta9", "v0.0.1-rc0"), Ordering::Less);
        assert_eq!(cmp("v0.0.1-rc0", "v0.0.1-rc1"), Ordering::Less);
        assert_eq!(cmp("v0.0.1-rc12", "v0.0.1-rc2"), Ordering::Greater);
    }

    #[test]
    fn zero_filled_cores_compare_equal() {
        assert_eq!(cmp("v1", "v1.0.0"), Ordering::Equal);
        assert_eq!(cmp("v1.2", "v1.2.0"), Ordering::Equal);
        assert_eq!(cmp("v0.0.1", "v0.0.1"), Ordering::Equal);
    }

    #[test]
    fn ordering_is_antisymmetric_and_reflexive() {
        let fixtures = [
            "v0.0.0-alpha0",
            "v0.0.0-beta19",
            "v0.0.1-alpha24",
            "v0.0.1-beta1",
            "v0.0.1-rc0",
            "v0.0.1-rc1",
            "v0.0.1",
            "v0.1.1",
            "v1",
            "v1.0.1-rc3",
            "v1.0.1",
            "v42.8.167",
        ];

        for a in fixtures {
            assert_eq!(cmp(a, a), Ordering::Equal, "{a} vs itself");
            for b in fixtures {
                assert_eq!(cmp(a, b), cmp(b, a).reverse(), "{a} vs {b}");
            }
        }

        for pair in fixtures.windows(2) {
            assert_eq!(cmp(pair[0], pair[1]), Ordering::Less, "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn comparing_unparsed_versions_is_an_error() {
        let good = Version::parse("v1.0.0");
        let bad = Version::parse("v1.0.0-nightly");

        assert_eq!(
            good.compare(&bad),
            Err(VersionError::Unparsed {
                original: "v1.0.0-nightly".to_string()
            })
        );
        assert_eq!(
            bad.compare(&good),
            Err(VersionError::Unparsed {
                original: "v1.0.0-nightly".to_string()
            })
        );
        assert!(bad.compare(&bad).is_err());
    }

    #[test]
    fn is_newer_than_requires_strictly_greater_parsed_versions() {
        let local = Version::parse("v1.0.0");

        assert!(Version::parse("v1.1.0").is_newer_than(&local));
        assert!(!Version::parse("v1.0.0").is_newer_than(&local));
        assert!(!Version::parse("v0.9.0").is_newer_than(&local));
        assert!(!Version::parse("v9.0.0").is_newer_than(&Version::parse("dev")));
        assert!(!Version::parse("latest").is_newer_than(&local));
    }

    #[test]
    fn prerelease_display_round_trips_channel_and_ordinal() {
        let version = Version::parse("v2.0.0-beta3");
        assert!(version.is_prerelease());
        assert_eq!(
            version.prerelease().map(|pre| pre.to_string()).as_deref(),
            Some("beta3")
        );
        assert!(!Version::parse("v2.0.0").is_prerelease());
    }
}
