use crate::enums::Network;
use crate::token::TokenMetadata;

/// Fungible-asset address of APT.
pub const APT_ADDRESS: &str = "0x000000000000000000000000000000000000000000000000000000000000000a";
/// Coin type of APT, used for coin-store balance lookups.
pub const APT_COIN_TYPE: &str = "0x1::aptos_coin::AptosCoin";
pub const USDC_ADDRESS: &str = "0xbae207659db88bea0cbead6da0ed00aac12edcdda169e591cd41c94180b46f3b";
pub const USDT_ADDRESS: &str = "0x357b0b74bc833e95a115ad22604854d6b0fca151cecd94111770e5d6ffc9dc2b";

/// Tokens offered in the token picker for a network.
pub fn popular_tokens(network: Network) -> Vec<TokenMetadata> {
    match network {
        Network::Mainnet => vec![
            TokenMetadata::new(APT_ADDRESS, "APT", 8, "Aptos Token"),
            TokenMetadata::new(USDC_ADDRESS, "USDC", 6, "USD Coin"),
            TokenMetadata::new(USDT_ADDRESS, "USDT", 6, "Tether USD"),
        ],
        // Devnet shares the testnet list.
        Network::Testnet | Network::Devnet => vec![
            TokenMetadata::new(APT_ADDRESS, "APT", 8, "Aptos Token"),
            TokenMetadata::new(USDC_ADDRESS, "USDC", 6, "Test USD Coin"),
            TokenMetadata::new(USDT_ADDRESS, "USDT", 6, "Test Tether USD"),
        ],
    }
}

/// Whether `address` designates native APT, in either short or long form.
pub fn is_apt(address: &str) -> bool {
    let lower = address.to_lowercase();
    lower == "apt" || lower == APT_COIN_TYPE.to_lowercase() || strip_leading_zeros(&lower) == "0xa"
}

/// Maps user input (`apt`, `0xa` or a full address) to the address used for
/// balance lookups. APT resolves to its coin type.
pub fn resolve_token_address(input: &str) -> String {
    if is_apt(input) {
        APT_COIN_TYPE.to_string()
    } else {
        input.to_string()
    }
}

/// Resolves a symbol from the popular list to its address.
pub fn address_for_symbol(network: Network, symbol: &str) -> Option<String> {
    popular_tokens(network)
        .into_iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
        .map(|t| t.address)
}

pub fn find_token_by_address(network: Network, address: &str) -> Option<TokenMetadata> {
    let wanted = strip_leading_zeros(&address.to_lowercase());
    popular_tokens(network)
        .into_iter()
        .find(|t| strip_leading_zeros(&t.address.to_lowercase()) == wanted)
}

/// Last `::` segment of a Move type tag, e.g. `AptosCoin`.
pub fn extract_symbol(type_tag: &str) -> &str {
    type_tag.rsplit("::").next().unwrap_or(type_tag)
}

fn strip_leading_zeros(address: &str) -> String {
    match address.strip_prefix("0x") {
        Some(hex) => {
            let trimmed = hex.trim_start_matches('0');
            format!("0x{}", if trimmed.is_empty() { "0" } else { trimmed })
        }
        None => address.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_apt() {
        assert_eq!(resolve_token_address("APT"), APT_COIN_TYPE);
        assert_eq!(resolve_token_address("0xa"), APT_COIN_TYPE);
        assert_eq!(resolve_token_address(APT_ADDRESS), APT_COIN_TYPE);
        assert_eq!(resolve_token_address(USDC_ADDRESS), USDC_ADDRESS);
    }

    #[test]
    fn test_lookup() {
        let usdt = find_token_by_address(Network::Mainnet, USDT_ADDRESS).unwrap();
        assert_eq!(usdt.symbol, "USDT");
        assert_eq!(usdt.decimals, 6);
        assert_eq!(find_token_by_address(Network::Testnet, "0xa").unwrap().symbol, "APT");
        assert_eq!(
            find_token_by_address(Network::Devnet, USDC_ADDRESS).unwrap().name,
            "Test USD Coin"
        );
        assert!(find_token_by_address(Network::Mainnet, "0xdead").is_none());
        assert_eq!(
            address_for_symbol(Network::Mainnet, "usdc").as_deref(),
            Some(USDC_ADDRESS)
        );
    }

    #[test]
    fn test_extract_symbol() {
        assert_eq!(extract_symbol("0x1::aptos_coin::AptosCoin"), "AptosCoin");
        assert_eq!(extract_symbol("plain"), "plain");
    }
}
