//! Value canonicalization shared by the diff engine and the sanitizer.
//!
//! Every function here is pure, stateless, and idempotent: applying it twice
//! yields the same result as applying it once. The diff engine runs
//! [`normalize_leaf`] over both sides of a comparison when its `normalize`
//! option is set; the sanitizer uses the targeted helpers to key the Mapper
//! so that textual variants of the same value (`192.168.1.1` vs
//! `192.168.001.001`) share one redacted replacement.
use std::net::Ipv6Addr;
use std::str::FromStr as _;

/// Trims leading/trailing whitespace and collapses internal runs to a single
/// space.
pub fn normalize_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the canonical text form of an IPv4 address, or `None` if `value`
/// is not one.
///
/// Accepts leading zeros in octets (`192.168.001.001`), which the appliance
/// occasionally emits but `std::net` refuses to parse.
pub fn canonical_ipv4(value: &str) -> Option<String> {
    let mut octets = [0u8; 4];
    let mut parts = value.split('.');
    for slot in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse::<u16>().ok().filter(|n| *n <= 255)? as u8;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(format!(
        "{}.{}.{}.{}",
        octets[0], octets[1], octets[2], octets[3]
    ))
}

/// Returns the canonical (compressed, lowercase) text form of an IPv6
/// address, or `None` if `value` is not one.
pub fn canonical_ipv6(value: &str) -> Option<String> {
    Ipv6Addr::from_str(value).ok().map(|addr| addr.to_string())
}

/// Returns the canonical text form of an IP address of either family.
pub fn canonical_ip(value: &str) -> Option<String> {
    canonical_ipv4(value).or_else(|| canonical_ipv6(value))
}

/// Collapses a degenerate port range to a single port: `80-80` → `80`.
///
/// Real ranges (`80-443`) and plain ports pass through with surrounding
/// whitespace removed. Anything that is not port-shaped is returned trimmed
/// but otherwise untouched.
pub fn normalize_port_range(value: &str) -> String {
    let trimmed = value.trim();
    let Some((lo, hi)) = trimmed.split_once('-') else {
        return trimmed.to_owned();
    };
    let lo = lo.trim();
    let hi = hi.trim();
    let both_ports = is_port(lo) && is_port(hi);
    if both_ports && lo == hi {
        lo.to_owned()
    } else if both_ports {
        format!("{lo}-{hi}")
    } else {
        trimmed.to_owned()
    }
}

fn is_port(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 5
        && value.bytes().all(|b| b.is_ascii_digit())
        && value.parse::<u32>().is_ok_and(|n| n <= 65_535)
}

/// Unifies boolean spellings: `1|yes|true|on` → `true`, `0|no|false|off` and
/// the empty string → `false`. Unrecognised values pass through unchanged.
pub fn normalize_bool(value: &str) -> String {
    let lowered = value.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "1" | "yes" | "true" | "on" => "true".to_owned(),
        "" | "0" | "no" | "false" | "off" => "false".to_owned(),
        _ => value.trim().to_owned(),
    }
}

/// Returns `true` for the truthy boolean spellings the appliance uses.
///
/// Used by the document binder for presence-style flags where an element
/// containing `1`, `yes`, `true`, or `on` (or an empty marker element)
/// means enabled.
pub fn parse_flag(value: Option<&str>) -> bool {
    match value {
        None => false,
        // An empty marker element (`<disabled/>`) is a set flag.
        Some("") => true,
        Some(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "1" | "yes" | "true" | "on"
        ),
    }
}

/// Lowercases and trims a host or domain name.
pub fn normalize_hostname(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// Returns the canonical lowercase colon-separated form of a MAC address,
/// or `None` if `value` is not MAC-shaped.
///
/// Accepts `:`/`-`/`.` separators and the bare 12-hex-digit form.
pub fn canonical_mac(value: &str) -> Option<String> {
    let hex: String = value
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect();
    if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let lowered = hex.to_ascii_lowercase();
    let bytes: Vec<&str> = (0..6).map(|i| &lowered[i * 2..i * 2 + 2]).collect();
    Some(bytes.join(":"))
}

/// Canonical MAC when parseable, otherwise the lowercased trimmed input.
pub fn normalize_mac(value: &str) -> String {
    canonical_mac(value).unwrap_or_else(|| value.trim().to_ascii_lowercase())
}

/// General-purpose leaf normalization used by the diff engine.
///
/// Applies, in order: whitespace collapse, then the first shape-specific
/// canonical form that matches (IP address, MAC address, port range,
/// boolean spelling). Values that match no shape are returned
/// whitespace-collapsed only — free text is never case-folded here.
pub fn normalize_leaf(value: &str) -> String {
    let collapsed = normalize_whitespace(value);
    if let Some(ip) = canonical_ip(&collapsed) {
        return ip;
    }
    if let Some(mac) = canonical_mac(&collapsed) {
        return mac;
    }
    let as_range = normalize_port_range(&collapsed);
    if as_range != collapsed {
        return as_range;
    }
    match collapsed.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => "true".to_owned(),
        "0" | "no" | "false" | "off" => "false".to_owned(),
        _ => collapsed,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn whitespace_is_trimmed_and_collapsed() {
        assert_eq!(normalize_whitespace("  a   b\t c  "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace("plain"), "plain");
    }

    #[test]
    fn ipv4_leading_zeros_are_canonicalized() {
        assert_eq!(
            canonical_ipv4("192.168.001.001").as_deref(),
            Some("192.168.1.1")
        );
        assert_eq!(canonical_ipv4("10.0.0.1").as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn ipv4_rejects_out_of_range_and_garbage() {
        assert_eq!(canonical_ipv4("256.1.1.1"), None);
        assert_eq!(canonical_ipv4("1.2.3"), None);
        assert_eq!(canonical_ipv4("1.2.3.4.5"), None);
        assert_eq!(canonical_ipv4("a.b.c.d"), None);
        assert_eq!(canonical_ipv4(""), None);
        assert_eq!(canonical_ipv4("1.2.3.0004"), None);
    }

    #[test]
    fn ipv6_is_compressed_and_lowercased() {
        assert_eq!(
            canonical_ipv6("2001:0DB8:0000:0000:0000:0000:0000:0001").as_deref(),
            Some("2001:db8::1")
        );
        assert_eq!(canonical_ipv6("::1").as_deref(), Some("::1"));
        assert_eq!(canonical_ipv6("not-an-address"), None);
    }

    #[test]
    fn degenerate_port_range_collapses() {
        assert_eq!(normalize_port_range("80-80"), "80");
        assert_eq!(normalize_port_range(" 443 - 443 "), "443");
    }

    #[test]
    fn real_port_range_is_preserved() {
        assert_eq!(normalize_port_range("80-443"), "80-443");
        assert_eq!(normalize_port_range("8080"), "8080");
    }

    #[test]
    fn non_port_range_passes_through() {
        assert_eq!(normalize_port_range("http-alt"), "http-alt");
        assert_eq!(normalize_port_range("99999-99999"), "99999-99999");
    }

    #[test]
    fn boolean_spellings_unify() {
        for truthy in ["1", "yes", "true", "on", "YES", "On"] {
            assert_eq!(normalize_bool(truthy), "true", "input: {truthy}");
        }
        for falsy in ["0", "no", "false", "off", ""] {
            assert_eq!(normalize_bool(falsy), "false", "input: {falsy}");
        }
        assert_eq!(normalize_bool("maybe"), "maybe");
    }

    #[test]
    fn parse_flag_treats_empty_marker_as_set() {
        assert!(parse_flag(Some("")));
        assert!(parse_flag(Some("1")));
        assert!(parse_flag(Some("yes")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn hostname_is_lowercased() {
        assert_eq!(normalize_hostname(" Fw01.Example.COM "), "fw01.example.com");
    }

    #[test]
    fn mac_separator_variants_canonicalize_identically() {
        let expected = Some("00:1b:44:11:3a:b7".to_owned());
        assert_eq!(canonical_mac("00:1B:44:11:3A:B7"), expected);
        assert_eq!(canonical_mac("00-1b-44-11-3a-b7"), expected);
        assert_eq!(canonical_mac("001b.4411.3ab7"), expected);
        assert_eq!(canonical_mac("001B44113AB7"), expected);
    }

    #[test]
    fn mac_rejects_wrong_length_and_non_hex() {
        assert_eq!(canonical_mac("00:1b:44:11:3a"), None);
        assert_eq!(canonical_mac("zz:zz:zz:zz:zz:zz"), None);
        assert_eq!(canonical_mac("hello"), None);
    }

    #[test]
    fn normalize_leaf_picks_the_matching_shape() {
        assert_eq!(normalize_leaf(" 192.168.001.010 "), "192.168.1.10");
        assert_eq!(normalize_leaf("00-1B-44-11-3A-B7"), "00:1b:44:11:3a:b7");
        assert_eq!(normalize_leaf("80-80"), "80");
        assert_eq!(normalize_leaf("Yes"), "true");
        assert_eq!(normalize_leaf("Allow  DNS out"), "Allow DNS out");
    }

    #[test]
    fn normalize_leaf_does_not_case_fold_free_text() {
        assert_eq!(normalize_leaf("Guest WLAN"), "Guest WLAN");
    }

    proptest! {
        /// Every normalizer is idempotent: f(f(x)) == f(x).
        #[test]
        fn normalize_leaf_is_idempotent(s in ".{0,40}") {
            let once = normalize_leaf(&s);
            prop_assert_eq!(normalize_leaf(&once), once);
        }

        #[test]
        fn normalize_whitespace_is_idempotent(s in ".{0,40}") {
            let once = normalize_whitespace(&s);
            prop_assert_eq!(normalize_whitespace(&once), once);
        }

        #[test]
        fn normalize_mac_is_idempotent(s in ".{0,20}") {
            let once = normalize_mac(&s);
            prop_assert_eq!(normalize_mac(&once), once);
        }

        #[test]
        fn canonical_ipv4_output_is_a_fixed_point(a in 0u8..=255, b in 0u8..=255, c in 0u8..=255, d in 0u8..=255) {
            let addr = format!("{a}.{b}.{c}.{d}");
            let canon = canonical_ipv4(&addr).expect("valid address");
            prop_assert_eq!(canonical_ipv4(&canon), Some(canon.clone()));
        }
    }
}
