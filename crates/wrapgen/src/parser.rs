//! Parser for directive signature payloads such as `Add(a int, b int) (int)`.

use crate::error::ParseError;
use crate::types::{ERROR_TYPE, FunctionDescriptor, Param, Returns};

/// Parse a trimmed signature payload into a [`FunctionDescriptor`].
///
/// Accepted forms:
/// - `Name(a int, b string)`
/// - `Name(a int) (ret ugo.Object)` / `Name(a int) (int)`
/// - `Name(a int) (err error)`
/// - `Name(a int) (v int, err error)`
pub fn parse_signature(payload: &str) -> Result<FunctionDescriptor, ParseError> {
    let source = payload.trim();

    let open = source.find('(').ok_or(ParseError::MissingParen)?;
    let name = source[..open].trim();
    if name.is_empty() {
        return Err(ParseError::MissingName);
    }
    if !name.chars().all(|c| c == '_' || c.is_alphanumeric()) {
        return Err(ParseError::InvalidName(name.to_string()));
    }

    let (params_text, rest) = split_group(&source[open..])?;
    let rest = rest.trim();

    let returns_text = if rest.is_empty() {
        None
    } else if rest.starts_with('(') {
        let (text, trailing) = split_group(rest)?;
        let trailing = trailing.trim();
        if !trailing.is_empty() {
            return Err(ParseError::TrailingGarbage(trailing.to_string()));
        }
        Some(text)
    } else {
        return Err(ParseError::TrailingGarbage(rest.to_string()));
    };

    let params = parse_fields(params_text, false)?;
    let returns = match returns_text {
        Some(text) => classify_returns(parse_fields(text, true)?)?,
        None => Returns::None,
    };

    Ok(FunctionDescriptor {
        name: name.to_string(),
        params,
        returns,
        source: source.to_string(),
    })
}

/// Split `(body)rest` into `body` and `rest`. The input must start with `(`.
fn split_group(s: &str) -> Result<(&str, &str), ParseError> {
    let inner = s.strip_prefix('(').ok_or(ParseError::UnbalancedParen)?;
    let close = inner.find(')').ok_or(ParseError::UnbalancedParen)?;
    let body = &inner[..close];
    if body.contains('(') {
        return Err(ParseError::UnbalancedParen);
    }
    Ok((body, &inner[close + 1..]))
}

/// Split a comma-separated field list. Return entries may omit the name.
fn parse_fields(text: &str, allow_unnamed: bool) -> Result<Vec<Param>, ParseError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    text.split(',')
        .enumerate()
        .map(|(position, field)| {
            let field = field.trim();
            let tokens: Vec<&str> = field.split_whitespace().collect();
            let (name, type_name) = match tokens.as_slice() {
                [name, ty] => (*name, *ty),
                [ty] if allow_unnamed => ("", *ty),
                _ => return Err(ParseError::FieldFormat(field.to_string())),
            };
            if type_name.contains("...") {
                return Err(ParseError::Variadic(field.to_string()));
            }
            Ok(Param::new(name, type_name, position))
        })
        .collect()
}

fn classify_returns(mut entries: Vec<Param>) -> Result<Returns, ParseError> {
    match entries.len() {
        0 => Ok(Returns::None),
        1 => {
            let entry = entries.remove(0);
            if entry.type_name == ERROR_TYPE {
                Ok(Returns::Error(entry))
            } else {
                Ok(Returns::Value(entry))
            }
        }
        2 => {
            let error = entries.remove(1);
            let value = entries.remove(0);
            if error.type_name != ERROR_TYPE {
                return Err(ParseError::NonErrorSecondReturn);
            }
            Ok(Returns::ValueError(value, error))
        }
        _ => Err(ParseError::TooManyReturns),
    }
}
