use std::{collections::BTreeSet, str::FromStr, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

static EXCHANGE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("exchange code pattern is valid"));

const ALL: &str = "all";

/// Which exchanges must skip the cache for this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverrideSelector {
    /// Use the cache wherever there is a cached snapshot.
    #[default]
    UseCache,
    /// Refresh every exchange.
    All,
    /// Refresh the exchanges whose short code or name is listed.
    Only(BTreeSet<String>),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorParseError {
    #[error("Empty exchange code at position {position}")]
    EmptyCode { position: usize },
    #[error("Invalid exchange code '{code}': only letters, digits, '_', '.' and '-' are allowed")]
    InvalidCode { code: String },
}

impl OverrideSelector {
    /// Parses the override argument.
    ///
    /// The rule is strict: `all` must be lowercase, codes are comma-separated,
    /// case-sensitive and may not carry surrounding whitespace.
    pub fn parse(input: Option<&str>) -> Result<Self, SelectorParseError> {
        match input {
            None | Some("") => Ok(Self::UseCache),
            Some(ALL) => Ok(Self::All),
            Some(list) => list
                .split(',')
                .enumerate()
                .map(|(position, code)| {
                    if code.is_empty() {
                        Err(SelectorParseError::EmptyCode { position })
                    } else if !EXCHANGE_CODE.is_match(code) {
                        Err(SelectorParseError::InvalidCode {
                            code: code.to_string(),
                        })
                    } else {
                        Ok(code.to_string())
                    }
                })
                .collect::<Result<BTreeSet<_>, _>>()
                .map(Self::Only),
        }
    }

    /// Whether the exchange identified by `short_code` or `name` must be refreshed.
    pub fn forces(&self, short_code: &str, name: &str) -> bool {
        match self {
            Self::UseCache => false,
            Self::All => true,
            Self::Only(codes) => codes.contains(short_code) || codes.contains(name),
        }
    }

    /// Codes listed explicitly. Empty for `UseCache` and `All`.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        let codes = match self {
            Self::Only(codes) => Some(codes),
            _ => None,
        };
        codes.into_iter().flatten().map(String::as_str)
    }
}

impl FromStr for OverrideSelector {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(Some(s))
    }
}
