//! Spelling of literal values in each target.

use std::fmt::Write;

use crate::Target;

/// A quoted string literal.
pub(crate) fn string(target: Target, value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if target.is_c() && !c.is_ascii() => {
                let mut buf = [0; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(out, "\\{byte:03o}");
                }
            }
            c if c.is_ascii_control() => match target {
                Target::C89 | Target::C99 | Target::Java => {
                    let _ = write!(out, "\\{:03o}", c as u32);
                }
                Target::CSharp | Target::JavaScript => {
                    let _ = write!(out, "\\u{:04x}", c as u32);
                }
            },
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A floating literal; `single` selects `float` over `double`.
pub(crate) fn float(target: Target, value: f64, single: bool) -> String {
    if !value.is_finite() {
        return non_finite(target, value, single);
    }
    let mut text = if single {
        format!("{:?}", value as f32)
    } else {
        format!("{value:?}")
    };
    if !text.contains(['.', 'e']) {
        text.push_str(".0");
    }
    if single && target != Target::JavaScript {
        text.push('f');
    }
    text
}

fn non_finite(target: Target, value: f64, single: bool) -> String {
    let (c, managed) = if value.is_nan() {
        ("(0.0 / 0.0)", "NaN")
    } else if value > 0.0 {
        ("(1.0 / 0.0)", "PositiveInfinity")
    } else {
        ("(-1.0 / 0.0)", "NegativeInfinity")
    };
    match target {
        Target::C89 | Target::C99 => c.to_string(),
        Target::CSharp => format!("{}.{managed}", if single { "float" } else { "double" }),
        Target::Java => {
            let constant = match managed {
                "NaN" => "NaN",
                "PositiveInfinity" => "POSITIVE_INFINITY",
                _ => "NEGATIVE_INFINITY",
            };
            format!("{}.{constant}", if single { "Float" } else { "Double" })
        }
        Target::JavaScript => match managed {
            "NaN" => "NaN".to_string(),
            "PositiveInfinity" => "Infinity".to_string(),
            _ => "-Infinity".to_string(),
        },
    }
}

/// An `int` literal.
pub(crate) fn int(target: Target, value: i64) -> String {
    if target.is_c() && value == i32::MIN as i64 {
        return "(-2147483647 - 1)".to_string();
    }
    value.to_string()
}

/// A `long` literal.
pub(crate) fn long(target: Target, value: i64) -> String {
    let suffix = match target {
        Target::C99 => "LL",
        Target::JavaScript => "",
        Target::C89 | Target::CSharp | Target::Java => "L",
    };
    if target.is_c() && value == i64::MIN {
        return format!("(-9223372036854775807{suffix} - 1)");
    }
    format!("{value}{suffix}")
}

/// Bytes of a resource, `per_line` to a line.
pub(crate) fn byte_rows(target: Target, bytes: &[u8], per_line: usize) -> Vec<String> {
    bytes
        .chunks(per_line.max(1))
        .map(|chunk| {
            chunk
                .iter()
                .map(|&b| match target {
                    Target::Java => (b as i8).to_string(),
                    _ => format!("0x{b:02x}"),
                })
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_escape_per_target() {
        assert_eq!(string(Target::C99, "a\"b\n"), r#""a\"b\n""#);
        assert_eq!(string(Target::C89, "é"), r#""\303\251""#);
        assert_eq!(string(Target::Java, "é\u{1}"), r#""é\001""#);
        assert_eq!(string(Target::CSharp, "\u{1}"), r#""\u0001""#);
    }

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(float(Target::C99, 2.0, false), "2.0");
        assert_eq!(float(Target::Java, 1.5, true), "1.5f");
        assert_eq!(float(Target::JavaScript, 1.5, true), "1.5");
        assert_eq!(float(Target::CSharp, 1e300, false), "1e300");
    }

    #[test]
    fn integer_extremes() {
        assert_eq!(int(Target::C89, i32::MIN as i64), "(-2147483647 - 1)");
        assert_eq!(int(Target::Java, i32::MIN as i64), "-2147483648");
        assert_eq!(long(Target::C99, 5), "5LL");
        assert_eq!(long(Target::CSharp, -5), "-5L");
        assert_eq!(long(Target::JavaScript, 5), "5");
    }

    #[test]
    fn java_bytes_are_signed() {
        assert_eq!(byte_rows(Target::Java, &[1, 255], 8), vec!["1, -1"]);
        assert_eq!(byte_rows(Target::C99, &[1, 255, 3], 2), vec!["0x01, 0xff", "0x03"]);
    }
}
