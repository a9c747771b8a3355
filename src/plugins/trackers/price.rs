use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::Settings;
use crate::utils::error::Result;

/// Outcome of scanning a page for a price.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceMatch {
    Found(f64),
    /// No line matched the site pattern.
    NoMatch,
    /// A line matched but capture group 1 was missing or not a finite number.
    Unparsable { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Increased,
    Decreased,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub old: f64,
    pub new: f64,
    pub change_type: ChangeType,
}

impl PriceChange {
    pub fn changed(&self) -> bool {
        self.change_type != ChangeType::Unchanged
    }
}

/// Renders amounts the way an en_US locale does: `$1,234.56`, `-$3.00`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    symbol: String,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::new("$")
    }
}

impl CurrencyFormat {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
        }
    }

    /// Uses `currency.symbol` from the settings file when present.
    pub fn from_settings(settings: &Settings) -> Self {
        settings
            .get_str("currency.symbol")
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Rounds the exact binary value of `amount` to cents, ties to even, the
    /// way printf's `%.2f` does: 2.675 renders as `$2.67`.
    pub fn format(&self, amount: f64) -> String {
        let digits = match Decimal::from_f64_retain(amount) {
            Some(value) => {
                let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
                rounded.rescale(2);
                rounded.to_string()
            }
            // Outside Decimal's range
            None => format!("{:.2}", amount),
        };

        let (sign, unsigned) = match digits.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", digits.as_str()),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
        let sign = if unsigned.chars().all(|c| c == '0' || c == '.') { "" } else { sign };

        format!("{}{}{}.{}", sign, self.symbol, group_thousands(whole), fraction)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Extracts and compares prices for one site.
///
/// The site pattern is applied to each line of the page in turn; the first
/// matching line wins and its capture group 1 is parsed as the price.
#[derive(Debug, Clone)]
pub struct PriceTracker {
    pattern: Regex,
}

impl PriceTracker {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    pub fn from_pattern(pattern: &str) -> Result<Self> {
        Ok(Self::new(Regex::new(pattern)?))
    }

    pub fn find_price(&self, body: &str) -> PriceMatch {
        for line in body.lines() {
            if let Some(captures) = self.pattern.captures(line) {
                return match captures.get(1) {
                    Some(group) => parse_price(group.as_str()),
                    None => PriceMatch::Unparsable {
                        text: captures[0].to_string(),
                    },
                };
            }
        }
        PriceMatch::NoMatch
    }

    /// `None` when there is no previous price to compare against.
    /// Equality is exact: any numeric difference counts as a change.
    pub fn compare(&self, old: Option<f64>, new: f64) -> Option<PriceChange> {
        let old = old?;
        let change_type = if new > old {
            ChangeType::Increased
        } else if new < old {
            ChangeType::Decreased
        } else {
            ChangeType::Unchanged
        };

        Some(PriceChange { old, new, change_type })
    }
}

fn parse_price(text: &str) -> PriceMatch {
    match text.trim().parse::<f64>() {
        Ok(price) if price.is_finite() => PriceMatch::Found(price),
        _ => PriceMatch::Unparsable {
            text: text.to_string(),
        },
    }
}
