//! Known Hedera Testnet Tokens
//!
//! Verified entity ids for the tokens this strategy trades most often,
//! so operators can configure pairs by symbol. Anything not listed here
//! falls back to a mirror-node token search.
//!
//! Author: AI-Generated
//! Created: 2026-08-06

/// A token with a verified testnet entity id.
#[derive(Debug, Clone, Copy)]
pub struct KnownToken {
    /// Entity id (`0.0.x`).
    pub id: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
}

/// Verified testnet tokens (HTS tokens only; native HBAR is not
/// swappable through the router and must be wrapped).
pub const TESTNET_TOKENS: &[KnownToken] = &[
    KnownToken {
        id: "0.0.429274",
        symbol: "USDC",
        name: "USD Coin (Testnet)",
        decimals: 6,
    },
    KnownToken {
        id: "0.0.731861",
        symbol: "WHBAR",
        name: "Wrapped HBAR",
        decimals: 8,
    },
    KnownToken {
        id: "0.0.1456986",
        symbol: "SAUCE",
        name: "SaucerSwap Token",
        decimals: 6,
    },
    KnownToken {
        id: "0.0.456858",
        symbol: "USDC[hts]",
        name: "USDC (HTS Testnet)",
        decimals: 6,
    },
];

pub const SAUCERSWAP_ROUTER_TESTNET: &str = "0.0.19264";

pub fn by_symbol(symbol: &str) -> Option<&'static KnownToken> {
    TESTNET_TOKENS
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
}

pub fn by_id(id: &str) -> Option<&'static KnownToken> {
    TESTNET_TOKENS.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_symbol_case_insensitive() {
        assert_eq!(by_symbol("usdc").unwrap().id, "0.0.429274");
        assert_eq!(by_symbol("WHBAR").unwrap().decimals, 8);
        assert!(by_symbol("DOGE").is_none());
    }

    #[test]
    fn test_by_id() {
        assert_eq!(by_id("0.0.1456986").unwrap().symbol, "SAUCE");
        assert!(by_id("0.0.1").is_none());
    }
}
