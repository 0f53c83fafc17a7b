use anyhow::{Context, Result, bail};

use crate::logic::PolicyKind;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse decimal or `0x`-prefixed hexadecimal seeds.
pub fn parse_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    tokens
        .iter()
        .map(|token| {
            let parsed = match token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
            {
                Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
                None => token.replace('_', "").parse::<u64>(),
            };
            parsed.with_context(|| format!("invalid seed {token:?}"))
        })
        .collect()
}

/// Parse policy names; `all` expands to every built-in policy.
///
/// Each policy runs once, in order of first mention.
pub fn parse_policies(tokens: &[String]) -> Result<Vec<PolicyKind>> {
    let mut policies = Vec::new();
    for token in tokens {
        let named = if token.eq_ignore_ascii_case("all") {
            PolicyKind::ALL.to_vec()
        } else if let Ok(policy) = token.parse::<PolicyKind>() {
            vec![policy]
        } else {
            bail!("unknown policy {token:?} (expected random, sweeper, oracle or all)");
        };
        for policy in named {
            if !policies.contains(&policy) {
                policies.push(policy);
            }
        }
    }
    Ok(policies)
}
