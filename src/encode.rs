//! Parameter encoding for query strings and path segments.
//!
//! Query values implement [`QueryValue`], which turns a typed argument into
//! its textual wire form, or `None` when the argument is absent and the key
//! must be left out of the query string entirely. Path parameters go through
//! [`encode_path_segment`] so a value like `my/project` still addresses a
//! single resource.
//!
//! Everything here is pure: encoding the same value twice gives the same
//! output.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::{LookerError, Result};

/// Characters left as-is in a path segment: the URI-component unreserved
/// set. Everything else, `/ ? # %` included, is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Non-alphanumeric characters [`PATH_SEGMENT`] leaves unescaped.
const UNRESERVED_MARKS: &[u8] = b"-_.!~*'()";

/// Percent-escape a value for interpolation into a single path segment.
///
/// A value made only of unreserved characters and well-formed `%XX` escapes
/// is taken as already encoded and returned unchanged. Anything else is
/// escaped in full, `%` included, so the result never spans more than one
/// segment.
///
/// Values that would be read as dot segments (`.`, `..`, or their escaped
/// forms) and empty values cannot address a single resource and fail with
/// [`LookerError::Encoding`].
///
/// ```
/// use looker_rs::encode::encode_path_segment;
///
/// # fn main() -> looker_rs::Result<()> {
/// assert_eq!(encode_path_segment("marketing/web")?, "marketing%2Fweb");
/// assert_eq!(encode_path_segment("marketing%2Fweb")?, "marketing%2Fweb");
/// assert_eq!(encode_path_segment("a%20b/c")?, "a%2520b%2Fc");
/// assert_eq!(encode_path_segment(42)?, "42");
/// assert!(encode_path_segment("..").is_err());
/// # Ok(())
/// # }
/// ```
pub fn encode_path_segment(value: impl fmt::Display) -> Result<String> {
    let raw = value.to_string();
    let segment = if is_encoded_segment(&raw) {
        raw
    } else {
        utf8_percent_encode(&raw, PATH_SEGMENT).to_string()
    };

    let decoded = percent_decode_str(&segment).decode_utf8_lossy();
    if decoded.is_empty() || decoded == "." || decoded == ".." {
        return Err(LookerError::Encoding(format!(
            "path parameter {segment:?} does not name a single resource"
        )));
    }
    Ok(segment)
}

/// Whether every byte is unreserved or part of a `%XX` escape.
fn is_encoded_segment(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let valid = bytes.len() > i + 2
                    && bytes[i + 1].is_ascii_hexdigit()
                    && bytes[i + 2].is_ascii_hexdigit();
                if !valid {
                    return false;
                }
                i += 3;
            }
            b if b.is_ascii_alphanumeric() || UNRESERVED_MARKS.contains(&b) => i += 1,
            _ => return false,
        }
    }
    true
}

// ---------------------------------------------------------------------------
// QueryValue
// ---------------------------------------------------------------------------

/// A value that can be placed in a query string.
///
/// `Ok(None)` means "absent": the key is dropped from the request instead of
/// being sent empty.
pub trait QueryValue {
    /// Encode this value, or return `None` to omit the key.
    fn encode_query(&self) -> Result<Option<String>>;
}

impl<T: QueryValue + ?Sized> QueryValue for &T {
    fn encode_query(&self) -> Result<Option<String>> {
        (**self).encode_query()
    }
}

impl<T: QueryValue> QueryValue for Option<T> {
    fn encode_query(&self) -> Result<Option<String>> {
        match self {
            Some(v) => v.encode_query(),
            None => Ok(None),
        }
    }
}

impl QueryValue for str {
    fn encode_query(&self) -> Result<Option<String>> {
        Ok(Some(self.to_owned()))
    }
}

impl QueryValue for String {
    fn encode_query(&self) -> Result<Option<String>> {
        Ok(Some(self.clone()))
    }
}

impl QueryValue for Cow<'_, str> {
    fn encode_query(&self) -> Result<Option<String>> {
        Ok(Some(self.to_string()))
    }
}

impl QueryValue for bool {
    fn encode_query(&self) -> Result<Option<String>> {
        Ok(Some(self.to_string()))
    }
}

macro_rules! integer_query_value {
    ($($t:ty),*) => {
        $(
            impl QueryValue for $t {
                fn encode_query(&self) -> Result<Option<String>> {
                    Ok(Some(self.to_string()))
                }
            }
        )*
    };
}

integer_query_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_query_value {
    ($($t:ty),*) => {
        $(
            impl QueryValue for $t {
                fn encode_query(&self) -> Result<Option<String>> {
                    if self.is_finite() {
                        Ok(Some(self.to_string()))
                    } else {
                        Err(LookerError::Encoding(format!("non-finite number {self} cannot be sent")))
                    }
                }
            }
        )*
    };
}

float_query_value!(f32, f64);

impl QueryValue for DateTime<Utc> {
    /// ISO-8601 with millisecond precision, e.g. `2024-03-01T12:00:00.000Z`.
    fn encode_query(&self) -> Result<Option<String>> {
        Ok(Some(self.to_rfc3339_opts(SecondsFormat::Millis, true)))
    }
}

impl QueryValue for NaiveDate {
    fn encode_query(&self) -> Result<Option<String>> {
        Ok(Some(self.format("%Y-%m-%d").to_string()))
    }
}

// ---------------------------------------------------------------------------
// DelimArray
// ---------------------------------------------------------------------------

/// A list of scalars sent as a single delimited query value, e.g.
/// `ids=1,2,3`.
///
/// Distinct from a JSON array in a request body. An empty list still
/// encodes (to an empty string); only an absent list is omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimArray<T> {
    items: Vec<T>,
    delimiter: char,
}

impl<T> DelimArray<T> {
    /// Comma-delimited array.
    pub fn new(items: impl Into<Vec<T>>) -> Self {
        Self {
            items: items.into(),
            delimiter: ',',
        }
    }

    /// Use a delimiter other than `,`.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The wrapped values.
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for DelimArray<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for DelimArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T: QueryValue> QueryValue for DelimArray<T> {
    fn encode_query(&self) -> Result<Option<String>> {
        let mut out = String::new();
        let mut first = true;
        for item in &self.items {
            // Absent elements have no textual form inside a delimited list.
            let Some(text) = item.encode_query()? else {
                continue;
            };
            if !first {
                out.push(self.delimiter);
            }
            out.push_str(&text);
            first = false;
        }
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn path_segment_escapes_reserved_delimiters() {
        assert_eq!(encode_path_segment("a/b").unwrap(), "a%2Fb");
        assert_eq!(encode_path_segment("what?").unwrap(), "what%3F");
        assert_eq!(encode_path_segment("#1").unwrap(), "%231");
        assert_eq!(encode_path_segment("dev workspace").unwrap(), "dev%20workspace");
        assert_eq!(encode_path_segment("Ünïcode").unwrap(), "%C3%9Cn%C3%AFcode");
    }

    #[test]
    fn path_segment_keeps_unreserved() {
        assert_eq!(encode_path_segment("thelook_ecommerce-1.0").unwrap(), "thelook_ecommerce-1.0");
        assert_eq!(encode_path_segment("it's(ok)*~!").unwrap(), "it's(ok)*~!");
        assert_eq!(encode_path_segment("...").unwrap(), "...");
    }

    #[test]
    fn path_segment_does_not_double_encode() {
        assert_eq!(encode_path_segment("a%2Fb").unwrap(), "a%2Fb");
        assert_eq!(encode_path_segment("%C3%9Cn").unwrap(), "%C3%9Cn");
        // A lone percent sign is not an escape sequence and is encoded.
        assert_eq!(encode_path_segment("50%").unwrap(), "50%25");
        assert_eq!(encode_path_segment("%zz").unwrap(), "%25zz");
    }

    #[test]
    fn partially_encoded_values_are_escaped_in_full() {
        assert_eq!(encode_path_segment("a%20b/c").unwrap(), "a%2520b%2Fc");
        assert_eq!(
            encode_path_segment("%41/../../login").unwrap(),
            "%2541%2F..%2F..%2Flogin"
        );
        assert_eq!(encode_path_segment("x%3Fy?z").unwrap(), "x%253Fy%3Fz");
    }

    #[test]
    fn dot_and_empty_segments_are_rejected() {
        for value in ["", ".", "..", "%2E", "%2e", ".%2E", "%2E%2E"] {
            assert!(
                matches!(encode_path_segment(value), Err(LookerError::Encoding(_))),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn path_segment_is_idempotent() {
        let once = encode_path_segment("x/y z").unwrap();
        assert_eq!(once, encode_path_segment("x/y z").unwrap());
        assert_eq!(encode_path_segment(&once).unwrap(), once);
    }

    #[test]
    fn scalars() {
        assert_eq!("id,email".encode_query().unwrap().as_deref(), Some("id,email"));
        assert_eq!(10_i64.encode_query().unwrap().as_deref(), Some("10"));
        assert_eq!(true.encode_query().unwrap().as_deref(), Some("true"));
        assert_eq!(1.5_f64.encode_query().unwrap().as_deref(), Some("1.5"));
    }

    #[test]
    fn absent_values_are_omitted() {
        let none: Option<i64> = None;
        assert_eq!(none.encode_query().unwrap(), None);
        let none: Option<DelimArray<i64>> = None;
        assert_eq!(none.encode_query().unwrap(), None);
    }

    #[test]
    fn non_finite_floats_fail() {
        assert!(matches!(f64::NAN.encode_query(), Err(LookerError::Encoding(_))));
        assert!(matches!(f32::INFINITY.encode_query(), Err(LookerError::Encoding(_))));
    }

    #[test]
    fn dates() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap();
        assert_eq!(at.encode_query().unwrap().as_deref(), Some("2024-03-01T12:00:05.000Z"));
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(day.encode_query().unwrap().as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn delimited_arrays() {
        let ids = DelimArray::new(vec![1, 2, 3]);
        assert_eq!(ids.encode_query().unwrap().as_deref(), Some("1,2,3"));

        let tabs = DelimArray::new(vec!["a", "b"]).with_delimiter('\t');
        assert_eq!(tabs.encode_query().unwrap().as_deref(), Some("a\tb"));

        let empty: DelimArray<i64> = DelimArray::new(Vec::new());
        assert_eq!(empty.encode_query().unwrap().as_deref(), Some(""));

        let sparse = DelimArray::new(vec![Some(1), None, Some(3)]);
        assert_eq!(sparse.encode_query().unwrap().as_deref(), Some("1,3"));
    }

    #[test]
    fn delimited_array_propagates_encoding_errors() {
        let bad = DelimArray::new(vec![1.0, f64::NAN]);
        assert!(matches!(bad.encode_query(), Err(LookerError::Encoding(_))));
    }
}
