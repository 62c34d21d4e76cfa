//! `key = value;` property lines.
//!
//! Values are written either as a bare decimal, a decimal cell `<12>`, or a
//! hexadecimal cell `<0x0c>`, optionally prefixed with `/bits/ 64`. A rewrite
//! keeps whatever form the source used, including hex zero padding.

use crate::error::PropertyError;

/// How a numeric value was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberForm {
    /// `<0x..>` with at least `width` hex digits.
    Hex { width: usize },
    /// `<123>`
    DecimalCell,
    /// `123`
    Bare,
}

/// A property line holding a single number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyLine {
    pub key: String,
    pub value: u64,
    pub form: NumberForm,
    /// Cell width from a `/bits/ N` prefix.
    pub bits: Option<u32>,
}

impl PropertyLine {
    /// Parse a trimmed or untrimmed line.
    pub fn parse(line: &str) -> Result<Self, PropertyError> {
        let not_numeric = || PropertyError::NotNumeric {
            text: line.trim().to_string(),
        };

        let statement = line.trim().strip_suffix(';').ok_or_else(not_numeric)?;
        let (key, value) = statement.split_once('=').ok_or_else(not_numeric)?;
        let key = key.trim();
        let mut value = value.trim();
        if key.is_empty() {
            return Err(not_numeric());
        }

        let mut bits = None;
        if let Some(rest) = value.strip_prefix("/bits/") {
            let rest = rest.trim_start();
            let width_end = rest
                .find(|c: char| !c.is_ascii_digit())
                .ok_or_else(not_numeric)?;
            bits = Some(rest[..width_end].parse().map_err(|_| not_numeric())?);
            value = rest[width_end..].trim_start();
        }

        let (value, form) = match value.strip_prefix('<').and_then(|v| v.strip_suffix('>')) {
            Some(cell) => {
                let cell = cell.trim();
                if cell.contains(char::is_whitespace) {
                    return Err(not_numeric());
                }
                let form = match hex_digits(cell) {
                    Some(digits) => NumberForm::Hex {
                        width: digits.len(),
                    },
                    None => NumberForm::DecimalCell,
                };
                (parse_number(cell).map_err(|_| not_numeric())?, form)
            }
            None if bits.is_none() => {
                let number = value.parse::<u64>().map_err(|_| not_numeric())?;
                (number, NumberForm::Bare)
            }
            None => return Err(not_numeric()),
        };

        Ok(Self {
            key: key.to_string(),
            value,
            form,
            bits,
        })
    }

    /// Render the line without indentation.
    pub fn to_line(&self) -> String {
        let number = match self.form {
            NumberForm::Hex { width } => format!("<0x{:0width$x}>", self.value),
            NumberForm::DecimalCell => format!("<{}>", self.value),
            NumberForm::Bare => self.value.to_string(),
        };
        match self.bits {
            Some(bits) => format!("{} = /bits/ {bits} {number};", self.key),
            None => format!("{} = {number};", self.key),
        }
    }

    /// Same key and form, new value.
    #[must_use]
    pub fn with_value(&self, value: u64) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal number.
pub fn parse_number(text: &str) -> Result<u64, PropertyError> {
    let text = text.trim();
    let parsed = match hex_digits(text) {
        Some(digits) => u64::from_str_radix(digits, 16),
        None => text.parse::<u64>(),
    };
    parsed.map_err(|_| PropertyError::InvalidNumber {
        text: text.to_string(),
    })
}

/// Parse every cell of a `<a b ...>` value, ignoring a `/bits/ N` prefix.
pub fn parse_cells(value: &str) -> Result<Vec<u64>, PropertyError> {
    let mut value = value.trim().trim_end_matches(';').trim();
    if let Some(rest) = value.strip_prefix("/bits/") {
        value = rest
            .trim_start()
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .trim_start();
    }
    let inner = value
        .strip_prefix('<')
        .and_then(|v| v.strip_suffix('>'))
        .unwrap_or(value);
    inner.split_whitespace().map(parse_number).collect()
}

/// Key of a property statement, or `None` for braces and blank lines.
pub fn property_key(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.contains('{') || line.contains('}') {
        return None;
    }
    let key = match line.split_once('=') {
        Some((key, _)) => key,
        None => line.trim_end_matches(';'),
    };
    Some(key.trim())
}

/// Value of the first numeric line carrying `key`.
pub fn find_value(lines: &[String], key: &str) -> Option<u64> {
    lines
        .iter()
        .filter(|line| property_key(line) == Some(key))
        .find_map(|line| PropertyLine::parse(line).ok())
        .map(|property| property.value)
}

/// Rewrite the value of the first line carrying `key`, keeping its form.
pub fn replace_value(lines: &mut [String], key: &str, value: u64) -> Result<(), PropertyError> {
    let line = lines
        .iter_mut()
        .find(|line| property_key(line) == Some(key))
        .ok_or_else(|| PropertyError::KeyNotFound {
            key: key.to_string(),
        })?;
    let property = PropertyLine::parse(line)?;
    *line = property.with_value(value).to_line();
    Ok(())
}

/// Add `delta` to the value of `key` and return the new value.
pub fn offset_value(lines: &mut [String], key: &str, delta: i64) -> Result<u64, PropertyError> {
    let current = find_value(lines, key).ok_or_else(|| PropertyError::KeyNotFound {
        key: key.to_string(),
    })?;
    let updated = current
        .checked_add_signed(delta)
        .ok_or_else(|| PropertyError::Underflow {
            key: key.to_string(),
        })?;
    replace_value(lines, key, updated)?;
    Ok(updated)
}

fn hex_digits(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}
