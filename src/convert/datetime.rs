//! Exact date/time routine.
//!
//! Formats use the custom date/time pattern notation (`yyyyMMdd`,
//! `dd.MM.yyyy HH:mm:ss`, ...). A pattern is compiled once into tokens when
//! its field is resolved. Numeric tokens consume an exact number of ASCII
//! digits and literals match one character each, so a value either fits the
//! pattern position by position or is rejected. Components missing from the
//! pattern take their lowest value: month and day `1`, time of day midnight.

use std::iter;

use chrono::{
    NaiveDateTime,
    format::{Fixed, Item, ParseResult, Parsed, parse_and_remainder},
};

use crate::{resolve::ResolvedConverter, value::Value};

use super::ConvertError;

/// Last year a two-digit year maps to. Later two-digit values fall in the
/// previous century.
const TWO_DIGIT_YEAR_MAX: i64 = 2029;

pub fn parse(value: &str, c: &ResolvedConverter) -> Result<Option<Value>, ConvertError> {
    let pattern = c.pattern.as_ref().ok_or(ConvertError::MissingPattern)?;
    Ok(Some(Value::DateTime(pattern.parse(value)?)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
    Year,
    ShortYear,
    Month,
    Day,
    Hour,
    Hour12,
    Minute,
    Second,
    Fraction,
}

impl Component {
    fn set(self, parsed: &mut Parsed, n: i64, width: usize) -> ParseResult<()> {
        match self {
            Self::Year => parsed.set_year(n),
            Self::ShortYear => {
                let century = if n > TWO_DIGIT_YEAR_MAX % 100 {
                    TWO_DIGIT_YEAR_MAX / 100 * 100 - 100
                } else {
                    TWO_DIGIT_YEAR_MAX / 100 * 100
                };
                parsed.set_year(century + n)
            }
            Self::Month => parsed.set_month(n),
            Self::Day => parsed.set_day(n),
            Self::Hour => parsed.set_hour(n),
            Self::Hour12 => parsed.set_hour12(n),
            Self::Minute => parsed.set_minute(n),
            Self::Second => parsed.set_second(n),
            Self::Fraction => parsed.set_nanosecond(n * 10i64.pow(9 - width as u32)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Between `min` and `max` ASCII digits.
    Number {
        component: Component,
        min: usize,
        max: usize,
    },
    /// A month or weekday name, or the AM/PM designator.
    Name(Fixed),
    Literal(char),
}

/// A compiled date/time pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    tokens: Vec<Token>,
    has_month: bool,
    has_day: bool,
    has_hour: bool,
    has_twelve_hour: bool,
    has_meridiem: bool,
    has_minute: bool,
    has_second: bool,
}

impl DatePattern {
    /// Compile a custom date/time pattern.
    ///
    /// Returns a reason on tokens without an exact equivalent, and on patterns
    /// lacking a year.
    pub fn compile(format: &str) -> Result<Self, String> {
        let mut has_year = false;
        let mut pattern = Self {
            tokens: Vec::new(),
            has_month: false,
            has_day: false,
            has_hour: false,
            has_twelve_hour: false,
            has_meridiem: false,
            has_minute: false,
            has_second: false,
        };

        let chars: Vec<char> = format.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let run = chars[i..].iter().take_while(|&&x| x == c).count();

            // One-letter numeric tokens take one or two digits, longer ones
            // exactly their own length.
            let digits = |component| Token::Number {
                component,
                min: run,
                max: run.max(2),
            };

            let token = match (c, run) {
                ('y', 1..=2) => {
                    has_year = true;
                    digits(Component::ShortYear)
                }
                ('y', 3..=5) => {
                    has_year = true;
                    digits(Component::Year)
                }
                ('M', 1..=2) => {
                    pattern.has_month = true;
                    digits(Component::Month)
                }
                ('M', 3) => {
                    pattern.has_month = true;
                    Token::Name(Fixed::ShortMonthName)
                }
                ('M', 4) => {
                    pattern.has_month = true;
                    Token::Name(Fixed::LongMonthName)
                }
                ('d', 1..=2) => {
                    pattern.has_day = true;
                    digits(Component::Day)
                }
                // Checked against the date, but never sets it.
                ('d', 3) => Token::Name(Fixed::ShortWeekdayName),
                ('d', 4) => Token::Name(Fixed::LongWeekdayName),
                ('H', 1..=2) => {
                    pattern.has_hour = true;
                    digits(Component::Hour)
                }
                ('h', 1..=2) => {
                    pattern.has_hour = true;
                    pattern.has_twelve_hour = true;
                    digits(Component::Hour12)
                }
                ('m', 1..=2) => {
                    pattern.has_minute = true;
                    digits(Component::Minute)
                }
                ('s', 1..=2) => {
                    pattern.has_second = true;
                    digits(Component::Second)
                }
                ('f', 1..=9) => Token::Number {
                    component: Component::Fraction,
                    min: run,
                    max: run,
                },
                ('t', 2) => {
                    pattern.has_meridiem = true;
                    Token::Name(Fixed::UpperAmPm)
                }
                ('y' | 'M' | 'd' | 'H' | 'h' | 'm' | 's' | 'f' | 't', _) => {
                    return Err(format!("unsupported token `{}`", c.to_string().repeat(run)));
                }
                ('F' | 'g' | 'K' | 'z', _) => {
                    return Err(format!("unsupported token `{c}`"));
                }
                ('\'' | '"', _) => {
                    let close = chars[i + 1..]
                        .iter()
                        .position(|&x| x == c)
                        .ok_or_else(|| format!("unterminated quote at {i}"))?;
                    pattern
                        .tokens
                        .extend(chars[i + 1..i + 1 + close].iter().map(|&x| Token::Literal(x)));
                    i += close + 2;
                    continue;
                }
                ('\\', _) => {
                    let &next = chars
                        .get(i + 1)
                        .ok_or_else(|| "trailing escape".to_string())?;
                    pattern.tokens.push(Token::Literal(next));
                    i += 2;
                    continue;
                }
                // Marks the following letter as a single-letter token.
                ('%', _) => {
                    i += 1;
                    continue;
                }
                _ => {
                    pattern.tokens.push(Token::Literal(c));
                    i += 1;
                    continue;
                }
            };

            pattern.tokens.push(token);
            i += run;
        }

        if !has_year {
            Err("pattern has no year".to_string())?
        }

        Ok(pattern)
    }

    /// Parse a value that must match the whole pattern.
    pub fn parse(&self, value: &str) -> Result<NaiveDateTime, ConvertError> {
        let mut parsed = Parsed::new();
        let mut rest = value;

        for token in &self.tokens {
            rest = match token {
                Token::Number {
                    component,
                    min,
                    max,
                } => {
                    let width = rest
                        .bytes()
                        .take(*max)
                        .take_while(u8::is_ascii_digit)
                        .count();
                    if width < *min {
                        Err(ConvertError::Pattern)?
                    }
                    let (digits, tail) = rest.split_at(width);
                    component.set(&mut parsed, digits.parse()?, width)?;
                    tail
                }
                Token::Name(name) => {
                    parse_and_remainder(&mut parsed, rest, iter::once(Item::Fixed(name.clone())))?
                }
                Token::Literal(c) => rest.strip_prefix(*c).ok_or(ConvertError::Pattern)?,
            };
        }

        if !rest.is_empty() {
            Err(ConvertError::Pattern)?
        }

        if !self.has_month {
            parsed.set_month(1)?;
        }
        if !self.has_day {
            parsed.set_day(1)?;
        }
        if !self.has_hour {
            parsed.set_hour(0)?;
        } else if self.has_twelve_hour && !self.has_meridiem {
            parsed.set_ampm(false)?;
        }
        if !self.has_minute {
            parsed.set_minute(0)?;
        }
        if !self.has_second {
            parsed.set_second(0)?;
        }

        let date = parsed.to_naive_date()?;
        let time = parsed.to_naive_time()?;

        Ok(NaiveDateTime::new(date, time))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{catalog::SemanticType, resolve::test_converter};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn compact_date() {
        let pattern = DatePattern::compile("yyyyMMdd").unwrap();
        assert_eq!(pattern.parse("20230115").unwrap(), at(2023, 1, 15, 0, 0, 0));
        assert!(pattern.parse("2023-01-15").is_err());
        assert!(matches!(pattern.parse("20231315"), Err(ConvertError::DateTime(_))));
        assert!(matches!(pattern.parse("202301150"), Err(ConvertError::Pattern)));
    }

    #[test]
    fn numeric_tokens_take_their_exact_width() {
        let pattern = DatePattern::compile("yyyyMMdd").unwrap();
        assert!(matches!(pattern.parse("2023115"), Err(ConvertError::Pattern)));
        assert!(matches!(pattern.parse("2023 1 5"), Err(ConvertError::Pattern)));
        assert!(matches!(pattern.parse(" 20230115"), Err(ConvertError::Pattern)));
        assert!(matches!(pattern.parse("202301+5"), Err(ConvertError::Pattern)));
    }

    #[test]
    fn single_letter_tokens_take_one_or_two_digits() {
        let pattern = DatePattern::compile("d.M.yyyy").unwrap();
        assert_eq!(pattern.parse("5.1.2023").unwrap(), at(2023, 1, 5, 0, 0, 0));
        assert_eq!(pattern.parse("15.11.2023").unwrap(), at(2023, 11, 15, 0, 0, 0));
        assert!(pattern.parse("115.1.2023").is_err());
    }

    #[test]
    fn literal_space_matches_one_space() {
        let pattern = DatePattern::compile("yyyyMMdd HHmm").unwrap();
        assert_eq!(pattern.parse("20230115 0730").unwrap(), at(2023, 1, 15, 7, 30, 0));
        assert!(matches!(pattern.parse("202301150730"), Err(ConvertError::Pattern)));
        assert!(matches!(pattern.parse("20230115  0730"), Err(ConvertError::Pattern)));
    }

    #[test]
    fn two_digit_year_window() {
        let pattern = DatePattern::compile("yyMMdd").unwrap();
        assert_eq!(pattern.parse("000101").unwrap(), at(2000, 1, 1, 0, 0, 0));
        assert_eq!(pattern.parse("291231").unwrap(), at(2029, 12, 31, 0, 0, 0));
        assert_eq!(pattern.parse("300101").unwrap(), at(1930, 1, 1, 0, 0, 0));
        assert_eq!(pattern.parse("450101").unwrap(), at(1945, 1, 1, 0, 0, 0));
        assert_eq!(pattern.parse("991231").unwrap(), at(1999, 12, 31, 0, 0, 0));
    }

    #[test]
    fn date_and_time_with_separators() {
        let pattern = DatePattern::compile("dd.MM.yyyy HH:mm:ss").unwrap();
        assert_eq!(
            pattern.parse("03.11.2021 17:45:09").unwrap(),
            at(2021, 11, 3, 17, 45, 9)
        );
    }

    #[test]
    fn fractional_seconds() {
        let pattern = DatePattern::compile("yyyyMMddHHmmssfff").unwrap();
        let parsed = pattern.parse("20230115073005250").unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2023, 1, 15)
                .unwrap()
                .and_hms_milli_opt(7, 30, 5, 250)
                .unwrap()
        );
        assert!(pattern.parse("2023011507300525").is_err());
    }

    #[test]
    fn month_names() {
        let pattern = DatePattern::compile("dd MMM yyyy").unwrap();
        assert_eq!(pattern.parse("05 Mar 2024").unwrap(), at(2024, 3, 5, 0, 0, 0));
        assert!(pattern.parse("05  Mar 2024").is_err());
    }

    #[test]
    fn quoted_literal_and_escape() {
        let pattern = DatePattern::compile("yyyy'T'HHmm\\Z").unwrap();
        assert_eq!(pattern.parse("1999T2359Z").unwrap(), at(1999, 1, 1, 23, 59, 0));

        let pattern = DatePattern::compile("yyyy-MM-ddTHH").unwrap();
        assert_eq!(pattern.parse("2020-02-29T06").unwrap(), at(2020, 2, 29, 6, 0, 0));
    }

    #[test]
    fn twelve_hour_clock() {
        let pattern = DatePattern::compile("yyyyMMdd hh:mm tt").unwrap();
        assert_eq!(
            pattern.parse("20230115 07:30 PM").unwrap(),
            at(2023, 1, 15, 19, 30, 0)
        );

        let pattern = DatePattern::compile("yyyyMMddhhmm").unwrap();
        assert_eq!(pattern.parse("202301150730").unwrap(), at(2023, 1, 15, 7, 30, 0));
    }

    #[test]
    fn missing_day_defaults_to_first() {
        let pattern = DatePattern::compile("yyyyMM").unwrap();
        assert_eq!(pattern.parse("202306").unwrap(), at(2023, 6, 1, 0, 0, 0));
    }

    #[test]
    fn rejects_unsupported_patterns() {
        assert!(DatePattern::compile("MMdd").is_err());
        assert!(DatePattern::compile("yyyyMMdd zzz").is_err());
        assert!(DatePattern::compile("yyyy'MM").is_err());
        assert!(DatePattern::compile("yyyyMMdd ffffffffff").is_err());
    }

    #[test]
    fn converter_without_pattern_is_an_error() {
        let mut c = test_converter(SemanticType::DateTime, "yyyyMMdd");
        c.pattern = None;
        assert!(matches!(parse("20230115", &c), Err(ConvertError::MissingPattern)));
    }
}
