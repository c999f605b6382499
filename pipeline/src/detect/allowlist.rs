//! Source-address allowlist.
//!
//! Entries are either CIDR ranges (`203.0.113.0/24`, `2001:db8::/32`) or
//! literal string prefixes (`203.0.113.`). A source is trusted when any entry
//! covers it. The detector only sees the [`SourcePredicate`] trait, so other
//! policies can be plugged in.

use std::net::IpAddr;
use thiserror::Error;

pub trait SourcePredicate: Send + Sync {
    /// `true` when remediation must be suppressed for `source`.
    fn is_trusted(&self, source: &str) -> bool;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllowlistError {
    #[error("empty allowlist entry")]
    Empty,

    #[error("invalid CIDR range '{0}'")]
    InvalidCidr(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Cidr { network: IpAddr, prefix_len: u8 },
    Prefix(String),
}

impl Entry {
    fn parse(raw: &str) -> Result<Self, AllowlistError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AllowlistError::Empty);
        }
        let Some((addr, len)) = raw.split_once('/') else {
            return Ok(Entry::Prefix(raw.to_owned()));
        };

        let invalid = || AllowlistError::InvalidCidr(raw.to_owned());
        let network: IpAddr = addr.parse().map_err(|_| invalid())?;
        let prefix_len: u8 = len.parse().map_err(|_| invalid())?;
        let max = if network.is_ipv4() { 32 } else { 128 };
        if prefix_len > max {
            return Err(invalid());
        }
        Ok(Entry::Cidr { network, prefix_len })
    }

    fn covers(&self, source: &str, parsed: Option<IpAddr>) -> bool {
        match self {
            Entry::Prefix(prefix) => source.starts_with(prefix.as_str()),
            Entry::Cidr { network, prefix_len } => match (network, parsed) {
                (IpAddr::V4(net), Some(IpAddr::V4(ip))) => {
                    let mask = u32::MAX.checked_shl(32 - u32::from(*prefix_len)).unwrap_or(0);
                    u32::from(*net) & mask == u32::from(ip) & mask
                }
                (IpAddr::V6(net), Some(IpAddr::V6(ip))) => {
                    let mask = u128::MAX.checked_shl(128 - u32::from(*prefix_len)).unwrap_or(0);
                    u128::from(*net) & mask == u128::from(ip) & mask
                }
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    entries: Vec<Entry>,
}

impl Allowlist {
    pub fn parse<I, S>(entries: I) -> Result<Self, AllowlistError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|e| Entry::parse(e.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SourcePredicate for Allowlist {
    fn is_trusted(&self, source: &str) -> bool {
        let parsed = source.trim().parse::<IpAddr>().ok();
        self.entries.iter().any(|e| e.covers(source, parsed))
    }
}
