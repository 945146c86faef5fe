//! Minimal reader for a Go file's package clause.
//!
//! Only the leading comments, whitespace and the `package <ident>` clause
//! need to be well formed; the rest of the file is never looked at.

/// Read the package name from Go source text.
pub fn package_name(source: &str) -> Result<String, String> {
    let mut rest = source.strip_prefix('\u{feff}').unwrap_or(source);

    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.find('\n').map_or("", |i| &after[i + 1..]);
        } else if let Some(after) = rest.strip_prefix("/*") {
            let end = after
                .find("*/")
                .ok_or_else(|| "unterminated block comment".to_string())?;
            rest = &after[end + 2..];
        } else {
            break;
        }
    }

    let after_keyword = rest
        .strip_prefix("package")
        .filter(|after| after.starts_with(|c: char| c.is_whitespace() || c == '/'))
        .ok_or_else(|| "expected package clause".to_string())?;

    let ident = skip_inline_space(after_keyword);
    let end = ident
        .find(|c: char| !(c == '_' || c.is_alphanumeric()))
        .unwrap_or(ident.len());
    let name = &ident[..end];

    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err("expected package name after `package`".to_string());
    }
    Ok(name.to_string())
}

/// Skip spaces and block comments between `package` and its name.
fn skip_inline_space(mut s: &str) -> &str {
    loop {
        let trimmed = s.trim_start_matches([' ', '\t']);
        match trimmed.strip_prefix("/*").and_then(|after| after.find("*/").map(|i| &after[i + 2..])) {
            Some(after) => s = after,
            None => return trimmed,
        }
    }
}
