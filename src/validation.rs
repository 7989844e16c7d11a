use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::influencer::ChannelPlatform;

// Date comparisons operate on calendar days. Callers pass `today` explicitly
// so the window checks stay deterministic under test.

pub fn is_future_date(target: NaiveDate, today: NaiveDate) -> bool {
    target > today
}

pub fn is_after_date(target: NaiveDate, reference: NaiveDate) -> bool {
    target > reference
}

pub fn days_remaining(end: NaiveDate, today: NaiveDate) -> i64 {
    (end - today).num_days()
}

pub fn is_deadline_soon(end: NaiveDate, today: NaiveDate) -> bool {
    let remaining = days_remaining(end, today);
    (0..=3).contains(&remaining)
}

/// Strips everything but digits from a business registration number.
pub fn parse_business_number(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn format_business_number(value: &str) -> String {
    let digits = parse_business_number(value);

    if digits.len() <= 3 {
        return digits;
    }
    if digits.len() <= 5 {
        return format!("{}-{}", &digits[..3], &digits[3..]);
    }

    let end = digits.len().min(10);
    format!("{}-{}-{}", &digits[..3], &digits[3..5], &digits[5..end])
}

/// Ten digits with the national registry checksum: the first nine digits are
/// weighted by [1,3,7,1,3,7,1,3,5], the ninth additionally contributes
/// floor(d9*5/10), and (10 - sum % 10) % 10 must equal the tenth digit.
pub fn is_valid_business_number(value: &str) -> bool {
    let digits = parse_business_number(value);

    if digits.len() != 10 {
        return false;
    }

    let digits: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    let weights = [1, 3, 7, 1, 3, 7, 1, 3, 5];

    let mut sum: u32 = digits[..9].iter().zip(weights.iter()).map(|(d, w)| d * w).sum();
    sum += digits[8] * 5 / 10;

    let check_digit = (10 - sum % 10) % 10;

    check_digit == digits[9]
}

pub fn parse_phone_number(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Mobile numbers only: 01X followed by eight digits.
pub fn is_valid_phone_number(value: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"^01[0-9][0-9]{4}[0-9]{4}$").unwrap());

    pattern.is_match(&parse_phone_number(value))
}

pub fn format_phone_number(value: &str) -> String {
    let digits = parse_phone_number(value);

    match digits.len() {
        10 => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        11 => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
        _ => digits,
    }
}

/// Lowercases, trims, drops a trailing slash, and forces an https scheme.
/// Channel urls are normalized before validation and before any uniqueness
/// comparison so cosmetic variants collide.
pub fn normalize_channel_url(url: &str) -> String {
    let mut normalized = url.trim().to_lowercase();

    if normalized.ends_with('/') {
        normalized.pop();
    }

    if let Some(rest) = normalized.strip_prefix("http://") {
        normalized = format!("https://{}", rest);
    } else if !normalized.starts_with("https://") {
        normalized = format!("https://{}", normalized);
    }

    normalized
}

fn channel_url_patterns() -> &'static [(ChannelPlatform, Vec<Regex>)] {
    static PATTERNS: OnceLock<Vec<(ChannelPlatform, Vec<Regex>)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |patterns: &[&str]| {
            patterns
                .iter()
                .map(|p| Regex::new(p).unwrap())
                .collect::<Vec<_>>()
        };
        vec![
            (
                ChannelPlatform::Naver,
                compile(&[
                    r"^https://blog\.naver\.com/[a-z0-9_-]+$",
                    r"^https://blog\.naver\.com/[a-z0-9_-]+/\d+$",
                ]),
            ),
            (
                ChannelPlatform::Youtube,
                compile(&[
                    r"^https://(www\.)?youtube\.com/@[a-z0-9_-]+$",
                    r"^https://(www\.)?youtube\.com/channel/[a-z0-9_-]+$",
                    r"^https://(www\.)?youtube\.com/c/[a-z0-9_-]+$",
                    r"^https://(www\.)?youtube\.com/user/[a-z0-9_-]+$",
                ]),
            ),
            (
                ChannelPlatform::Instagram,
                compile(&[r"^https://(www\.)?instagram\.com/[a-z0-9_.]+$"]),
            ),
            (
                ChannelPlatform::Threads,
                compile(&[r"^https://(www\.)?threads\.net/@[a-z0-9_.]+$"]),
            ),
        ]
    })
}

pub fn is_valid_channel_url(platform: ChannelPlatform, url: &str) -> bool {
    let normalized = normalize_channel_url(url);

    channel_url_patterns()
        .iter()
        .find(|(p, _)| *p == platform)
        .map(|(_, patterns)| patterns.iter().any(|pattern| pattern.is_match(&normalized)))
        .unwrap_or(false)
}

/// Pulls the channel handle out of a normalized url, keeping the `@` prefix
/// where the platform uses one.
pub fn extract_channel_name(platform: ChannelPlatform, url: &str) -> Option<String> {
    fn capture(pattern: &str, haystack: &str) -> Option<String> {
        Regex::new(pattern)
            .ok()?
            .captures(haystack)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    let normalized = normalize_channel_url(url);

    match platform {
        ChannelPlatform::Naver => capture(r"blog\.naver\.com/([a-z0-9_-]+)", &normalized),
        ChannelPlatform::Youtube => {
            if let Some(name) = capture(r"youtube\.com/@([a-z0-9_-]+)", &normalized) {
                return Some(format!("@{}", name));
            }
            capture(r"youtube\.com/channel/([a-z0-9_-]+)", &normalized)
                .or_else(|| capture(r"youtube\.com/c/([a-z0-9_-]+)", &normalized))
                .or_else(|| capture(r"youtube\.com/user/([a-z0-9_-]+)", &normalized))
        }
        ChannelPlatform::Instagram => capture(r"instagram\.com/([a-z0-9_.]+)", &normalized),
        ChannelPlatform::Threads => {
            capture(r"threads\.net/@([a-z0-9_.]+)", &normalized).map(|name| format!("@{}", name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn future_and_after_are_strict_day_comparisons() {
        let today = date(2025, 6, 15);

        assert!(is_future_date(date(2025, 6, 16), today));
        assert!(!is_future_date(today, today));
        assert!(!is_future_date(date(2025, 6, 14), today));

        assert!(is_after_date(date(2025, 7, 1), date(2025, 6, 30)));
        assert!(!is_after_date(date(2025, 6, 30), date(2025, 6, 30)));
    }

    #[test]
    fn deadline_soon_covers_today_through_three_days_out() {
        let today = date(2025, 6, 15);

        assert!(is_deadline_soon(date(2025, 6, 15), today));
        assert!(is_deadline_soon(date(2025, 6, 18), today));
        assert!(!is_deadline_soon(date(2025, 6, 19), today));
        assert!(!is_deadline_soon(date(2025, 6, 14), today));
    }

    #[test]
    fn days_remaining_can_go_negative() {
        assert_eq!(days_remaining(date(2025, 6, 20), date(2025, 6, 15)), 5);
        assert_eq!(days_remaining(date(2025, 6, 10), date(2025, 6, 15)), -5);
    }

    #[test]
    fn business_number_checksum_accepts_known_valid_numbers() {
        assert!(is_valid_business_number("1234567891"));
        assert!(is_valid_business_number("2208162517"));
        assert!(is_valid_business_number("1018142490"));
        assert!(is_valid_business_number("123-45-67891"));
    }

    #[test]
    fn business_number_checksum_rejects_mutations() {
        assert!(!is_valid_business_number("1234567890"));
        assert!(!is_valid_business_number("2208162518"));
        assert!(!is_valid_business_number("1018142491"));
        // wrong length
        assert!(!is_valid_business_number("123456789"));
        assert!(!is_valid_business_number("12345678910"));
        assert!(!is_valid_business_number(""));
    }

    #[test]
    fn business_number_formatting() {
        assert_eq!(format_business_number("1234567891"), "123-45-67891");
        assert_eq!(format_business_number("123"), "123");
        assert_eq!(format_business_number("12345"), "123-45");
    }

    #[test]
    fn phone_numbers_require_eleven_digit_mobile_shape() {
        assert!(is_valid_phone_number("01012345678"));
        assert!(is_valid_phone_number("010-1234-5678"));
        assert!(!is_valid_phone_number("0101234567"));
        assert!(!is_valid_phone_number("02-1234-5678"));
        assert!(!is_valid_phone_number(""));

        assert_eq!(format_phone_number("01012345678"), "010-1234-5678");
        assert_eq!(format_phone_number("0101234567"), "010-123-4567");
    }

    #[test]
    fn channel_urls_are_normalized_before_matching() {
        assert_eq!(
            normalize_channel_url("HTTP://Blog.Naver.com/TastyFood/"),
            "https://blog.naver.com/tastyfood"
        );
        assert_eq!(
            normalize_channel_url("instagram.com/some_user"),
            "https://instagram.com/some_user"
        );
    }

    #[test]
    fn platform_url_shapes() {
        assert!(is_valid_channel_url(
            ChannelPlatform::Naver,
            "https://blog.naver.com/tastyfood"
        ));
        assert!(is_valid_channel_url(
            ChannelPlatform::Youtube,
            "https://www.youtube.com/@somecreator"
        ));
        assert!(is_valid_channel_url(
            ChannelPlatform::Youtube,
            "https://youtube.com/channel/ucabcdef123"
        ));
        assert!(is_valid_channel_url(
            ChannelPlatform::Instagram,
            "https://instagram.com/some.user"
        ));
        assert!(is_valid_channel_url(
            ChannelPlatform::Threads,
            "https://www.threads.net/@some.user"
        ));

        assert!(!is_valid_channel_url(
            ChannelPlatform::Naver,
            "https://example.com/tastyfood"
        ));
        assert!(!is_valid_channel_url(
            ChannelPlatform::Instagram,
            "https://instagram.com/some.user/posts/3"
        ));
        assert!(!is_valid_channel_url(
            ChannelPlatform::Threads,
            "https://threads.net/some.user"
        ));
    }

    #[test]
    fn channel_names_come_from_the_url() {
        assert_eq!(
            extract_channel_name(ChannelPlatform::Naver, "https://blog.naver.com/tastyfood"),
            Some("tastyfood".to_string())
        );
        assert_eq!(
            extract_channel_name(ChannelPlatform::Youtube, "https://youtube.com/@somecreator"),
            Some("@somecreator".to_string())
        );
        assert_eq!(
            extract_channel_name(ChannelPlatform::Youtube, "https://youtube.com/user/oldname"),
            Some("oldname".to_string())
        );
        assert_eq!(
            extract_channel_name(ChannelPlatform::Threads, "https://threads.net/@some.user"),
            Some("@some.user".to_string())
        );
        assert_eq!(
            extract_channel_name(ChannelPlatform::Naver, "https://example.com/nope"),
            None
        );
    }
}
