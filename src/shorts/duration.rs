//! Duration-based short-form classification.
//!
//! YouTube reports durations as ISO-8601 codes (`PT45S`, `PT1M3S`, `PT2H`).
//! The platform exposes no Shorts flag through the Data API, so a video is
//! treated as short-form when its duration has no minutes component or the
//! minutes component is below one. This is a heuristic: an hour-long video
//! encoded as `PT1H` also passes.

/// Parsed components of an ISO-8601 duration code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationParts {
    pub days: Option<u64>,
    pub hours: Option<u64>,
    pub minutes: Option<u64>,
    pub seconds: Option<u64>,
}

/// Returns true if the duration code classifies as a short-form video.
///
/// Malformed codes classify as not short-form.
pub fn is_short_form(duration_code: &str) -> bool {
    match parse_duration(duration_code) {
        Some(parts) => parts.minutes.map_or(true, |minutes| minutes < 1),
        None => false,
    }
}

/// Parse an ISO-8601 duration such as `P1DT2H3M4S`.
///
/// Fractional seconds are accepted and truncated. An `M` in the date part
/// (before `T`) is months and is ignored.
pub fn parse_duration(code: &str) -> Option<DurationParts> {
    let rest = code.trim().strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return None;
            }
            (date, Some(time))
        }
        None => (rest, None),
    };

    let mut parts = DurationParts::default();

    for (value, designator) in components(date_part)? {
        match designator {
            'Y' | 'M' | 'W' => {
                whole(value)?;
            }
            'D' => parts.days = Some(whole(value)?),
            _ => return None,
        }
    }

    if let Some(time_part) = time_part {
        for (value, designator) in components(time_part)? {
            match designator {
                'H' => parts.hours = Some(whole(value)?),
                'M' => parts.minutes = Some(whole(value)?),
                'S' => parts.seconds = Some(seconds(value)?),
                _ => return None,
            }
        }
    }

    Some(parts)
}

/// Split `1H20M` into `[("1", 'H'), ("20", 'M')]`.
fn components(section: &str) -> Option<Vec<(&str, char)>> {
    let mut out = Vec::new();
    let mut start = 0;

    for (idx, ch) in section.char_indices() {
        if ch.is_ascii_digit() || ch == '.' || ch == ',' {
            continue;
        }
        let value = &section[start..idx];
        if value.is_empty() {
            return None;
        }
        out.push((value, ch));
        start = idx + ch.len_utf8();
    }

    // trailing digits without a designator
    if start != section.len() {
        return None;
    }

    Some(out)
}

fn whole(value: &str) -> Option<u64> {
    value.parse().ok()
}

fn seconds(value: &str) -> Option<u64> {
    let integral = value.split(['.', ',']).next()?;
    if integral.is_empty() {
        return Some(0);
    }
    integral.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_only_is_short() {
        assert!(is_short_form("PT45S"));
        assert!(is_short_form("PT59S"));
        assert!(is_short_form("PT0S"));
    }

    #[test]
    fn test_zero_minutes_is_short() {
        assert!(is_short_form("PT0M58S"));
    }

    #[test]
    fn test_minutes_component_is_not_short() {
        assert!(!is_short_form("PT1M"));
        assert!(!is_short_form("PT1M3S"));
        assert!(!is_short_form("PT12M40S"));
        assert!(!is_short_form("PT1H2M3S"));
    }

    #[test]
    fn test_no_minutes_component_passes_heuristic() {
        // known limitation of the duration heuristic
        assert!(is_short_form("PT1H"));
        assert!(is_short_form("P0D"));
    }

    #[test]
    fn test_malformed_codes_are_not_short() {
        assert!(!is_short_form(""));
        assert!(!is_short_form("P"));
        assert!(!is_short_form("PT"));
        assert!(!is_short_form("45S"));
        assert!(!is_short_form("PT45"));
        assert!(!is_short_form("PTxM"));
        assert!(!is_short_form("PT5X"));
        assert!(!is_short_form("not a duration"));
    }

    #[test]
    fn test_parse_duration_components() {
        let parts = parse_duration("P1DT2H3M4.5S").unwrap();
        assert_eq!(parts.days, Some(1));
        assert_eq!(parts.hours, Some(2));
        assert_eq!(parts.minutes, Some(3));
        assert_eq!(parts.seconds, Some(4));
    }

    #[test]
    fn test_month_designator_is_not_minutes() {
        let parts = parse_duration("P1M").unwrap();
        assert_eq!(parts.minutes, None);
    }
}
