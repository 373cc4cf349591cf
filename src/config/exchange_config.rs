use strum::{Display, EnumIter};

/// Exchange modules this build knows how to query.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExchangeKind {
    Binance,
    Poloniex,
    /// Balances written down in the configuration itself (cold wallets, offline accounts).
    Static,
}

impl ExchangeKind {
    pub fn default_name(&self) -> &'static str {
        match self {
            ExchangeKind::Binance => "Binance",
            ExchangeKind::Poloniex => "Poloniex",
            ExchangeKind::Static => "Manual",
        }
    }

    pub fn needs_credentials(&self) -> bool {
        !matches!(self, ExchangeKind::Static)
    }
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct StaticBalance {
    pub symbol: String,
    pub amount: f64,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ExchangeEntry {
    pub short_code: String,
    #[serde(default)]
    pub name: Option<String>,
    pub kind: ExchangeKind,
    #[serde(default)]
    pub api_key: Option<Box<str>>,
    #[serde(default)]
    pub secret_key: Option<Box<str>>,
    /// Only read for [`ExchangeKind::Static`].
    #[serde(default)]
    pub balances: Vec<StaticBalance>,
}

impl ExchangeEntry {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.kind.default_name())
    }

    pub fn credentials(&self) -> Option<ExchangeCredentials> {
        match (&self.api_key, &self.secret_key) {
            (Some(api_key), Some(secret_key)) if !api_key.is_empty() && !secret_key.is_empty() => {
                Some(ExchangeCredentials {
                    api_key: api_key.clone(),
                    secret_key: secret_key.clone(),
                })
            }
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct ExchangeCredentials {
    pub api_key: Box<str>,
    pub secret_key: Box<str>,
}

impl std::fmt::Debug for ExchangeCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeCredentials")
            .field("api_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// One entry of the symbol correction table, e.g. `STR` -> `XLM`.
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SymbolCorrection {
    pub from: String,
    pub to: String,
}
