use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};

/// Whether a format carries a time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShape {
    DateTime,
    DateOnly,
}

/// One entry in an ordered list of formats to attempt
#[derive(Debug, Clone, Copy)]
pub struct DateFormat {
    pub pattern: &'static str,
    pub shape: DateShape,
}

const fn date_time(pattern: &'static str) -> DateFormat {
    DateFormat {
        pattern,
        shape: DateShape::DateTime,
    }
}

const fn date_only(pattern: &'static str) -> DateFormat {
    DateFormat {
        pattern,
        shape: DateShape::DateOnly,
    }
}

/// `Occurred On` in the incident export
pub const INCIDENT_FORMATS: &[DateFormat] = &[
    date_only("%Y-%m-%d"),
    date_time("%d/%m/%Y %H:%M:%S"),
    date_time("%d/%m/%Y %H:%M"),
    date_only("%d/%m/%Y"),
    date_time("%Y-%m-%d %H:%M:%S"),
    date_time("%d/%m/%y %H:%M:%S"),
    date_time("%d/%m/%y %H:%M"),
    date_only("%d/%m/%y"),
];

/// `occurred_on` in the events export, with a time of day
pub const EVENT_DATE_TIME_FORMATS: &[DateFormat] =
    &[date_time("%d/%m/%y %H:%M"), date_time("%d/%m/%y %H:%M:%S")];

/// `occurred_on` in the events export, date only
pub const EVENT_DATE_FORMATS: &[DateFormat] = &[date_only("%d/%m/%y")];

/// `occurred_at` in the authoritative feed, after RFC 3339
pub const FEED_FORMATS: &[DateFormat] = &[
    date_time("%Y-%m-%dT%H:%M:%S"),
    date_time("%Y-%m-%d %H:%M:%S"),
];

/// Outcome of trying a format list against one raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Parsed {
        value: NaiveDateTime,
        shape: DateShape,
    },
    Unrecognized,
}

impl ParsedDate {
    pub fn value(self) -> Option<NaiveDateTime> {
        match self {
            ParsedDate::Parsed { value, .. } => Some(value),
            ParsedDate::Unrecognized => None,
        }
    }
}

/// Try each format in order; the first that parses the whole value wins.
pub fn parse_with(raw: &str, formats: &[DateFormat]) -> ParsedDate {
    let raw = raw.trim();
    for format in formats {
        let parsed = match format.shape {
            DateShape::DateTime => NaiveDateTime::parse_from_str(raw, format.pattern).ok(),
            DateShape::DateOnly => NaiveDate::parse_from_str(raw, format.pattern)
                .ok()
                .map(at_midnight),
        };
        // `%Y` also accepts one to three digit years
        let parsed = parsed.filter(|value| !format.pattern.contains("%Y") || value.year() >= 1000);
        if let Some(value) = parsed {
            return ParsedDate::Parsed {
                value,
                shape: format.shape,
            };
        }
    }
    ParsedDate::Unrecognized
}

/// Events carry either shape; the presence of a time component picks the list.
pub fn parse_event_date(raw: &str) -> ParsedDate {
    if raw.contains(':') {
        parse_with(raw, EVENT_DATE_TIME_FORMATS)
    } else {
        parse_with(raw, EVENT_DATE_FORMATS)
    }
}

/// Incident dates keep only the calendar day until the feed supplies a time.
pub fn parse_incident_date(raw: &str) -> Option<NaiveDateTime> {
    parse_with(raw, INCIDENT_FORMATS)
        .value()
        .map(|value| at_midnight(value.date()))
}

pub fn parse_feed_timestamp(raw: &str) -> ParsedDate {
    if let Ok(value) = DateTime::parse_from_rfc3339(raw.trim()) {
        return ParsedDate::Parsed {
            value: value.naive_local(),
            shape: DateShape::DateTime,
        };
    }
    parse_with(raw, FEED_FORMATS)
}

pub fn at_midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hm(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn incident_dates_drop_the_time_of_day() {
        assert_eq!(parse_incident_date("2012-03-09"), Some(ymd_hm(2012, 3, 9, 0, 0)));
        assert_eq!(
            parse_incident_date("09/03/2012 14:25"),
            Some(ymd_hm(2012, 3, 9, 0, 0))
        );
        assert_eq!(parse_incident_date("not a date"), None);
    }

    #[test]
    fn incident_dates_with_two_digit_years() {
        assert_eq!(parse_incident_date("09/03/12"), Some(ymd_hm(2012, 3, 9, 0, 0)));
        assert_eq!(
            parse_incident_date("09/03/12 14:25"),
            Some(ymd_hm(2012, 3, 9, 0, 0))
        );
        assert_eq!(parse_incident_date("09/03/2012"), Some(ymd_hm(2012, 3, 9, 0, 0)));
    }

    #[test]
    fn short_years_are_not_four_digit_years() {
        assert_eq!(
            parse_with("12-03-09", INCIDENT_FORMATS),
            ParsedDate::Unrecognized
        );
        assert_eq!(
            parse_with("2012-03-09", INCIDENT_FORMATS).value(),
            Some(ymd_hm(2012, 3, 9, 0, 0))
        );
    }

    #[test]
    fn event_dates_pick_shape_from_time_component() {
        assert_eq!(
            parse_event_date("05/01/09 13:45"),
            ParsedDate::Parsed {
                value: ymd_hm(2009, 1, 5, 13, 45),
                shape: DateShape::DateTime,
            }
        );
        assert_eq!(
            parse_event_date("05/01/09"),
            ParsedDate::Parsed {
                value: ymd_hm(2009, 1, 5, 0, 0),
                shape: DateShape::DateOnly,
            }
        );
    }

    #[test]
    fn event_dates_do_not_guess() {
        assert_eq!(parse_event_date("2009-01-05"), ParsedDate::Unrecognized);
        assert_eq!(parse_event_date("05/01/09 late"), ParsedDate::Unrecognized);
        assert_eq!(parse_event_date("05/01/09 25:00"), ParsedDate::Unrecognized);
    }

    #[test]
    fn feed_timestamps_accept_rfc3339_and_plain_forms() {
        assert_eq!(
            parse_feed_timestamp("2013-10-08T14:30:00+10:00").value(),
            Some(ymd_hm(2013, 10, 8, 14, 30))
        );
        assert_eq!(
            parse_feed_timestamp("2013-10-08 14:30:00").value(),
            Some(ymd_hm(2013, 10, 8, 14, 30))
        );
        assert_eq!(parse_feed_timestamp("08/10/2013"), ParsedDate::Unrecognized);
    }
}
