/// Expands `%NAME%`, `$NAME` and `${NAME}` references.
///
/// Unknown names are left verbatim, `%%` and `$$` collapse to a single
/// character, and an unterminated reference copies the remainder as-is.
pub fn expand_env_vars<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if !input.contains(['%', '$']) {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(ch) = rest.chars().next() {
        match ch {
            '%' => {
                let after = &rest[1..];
                if let Some(tail) = after.strip_prefix('%') {
                    out.push('%');
                    rest = tail;
                    continue;
                }
                let Some(end) = after.find('%') else {
                    out.push_str(rest);
                    break;
                };
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            '$' => {
                let after = &rest[1..];
                if let Some(tail) = after.strip_prefix('$') {
                    out.push('$');
                    rest = tail;
                } else if let Some(braced) = after.strip_prefix('{') {
                    let Some(end) = braced.find('}') else {
                        out.push_str(rest);
                        break;
                    };
                    let name = &braced[..end];
                    match lookup(name) {
                        Some(value) => out.push_str(&value),
                        None => {
                            out.push_str("${");
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &braced[end + 1..];
                } else {
                    let end = after
                        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
                        .unwrap_or(after.len());
                    let name = &after[..end];
                    if name.is_empty() {
                        out.push('$');
                    } else if let Some(value) = lookup(name) {
                        out.push_str(&value);
                    } else {
                        out.push('$');
                        out.push_str(name);
                    }
                    rest = &after[end..];
                }
            }
            other => {
                out.push(other);
                rest = &rest[other.len_utf8()..];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::expand_env_vars;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "OneDrive" => Some(r"C:\Users\kim\OneDrive".to_string()),
            "USERPROFILE" => Some(r"C:\Users\kim".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_percent_references() {
        assert_eq!(
            expand_env_vars(r"%OneDrive%\reports\q1.xlsx", lookup),
            r"C:\Users\kim\OneDrive\reports\q1.xlsx"
        );
    }

    #[test]
    fn expands_dollar_and_braced_references() {
        assert_eq!(
            expand_env_vars(r"$USERPROFILE\a", lookup),
            r"C:\Users\kim\a"
        );
        assert_eq!(
            expand_env_vars(r"${USERPROFILE}\b", lookup),
            r"C:\Users\kim\b"
        );
    }

    #[test]
    fn unknown_and_unterminated_references_stay_verbatim() {
        assert_eq!(expand_env_vars(r"%NOPE%\x", lookup), r"%NOPE%\x");
        assert_eq!(expand_env_vars(r"C:\100% done", lookup), r"C:\100% done");
        assert_eq!(expand_env_vars("${NOPE}/y", lookup), "${NOPE}/y");
        assert_eq!(expand_env_vars("cost $", lookup), "cost $");
    }

    #[test]
    fn doubled_markers_collapse() {
        assert_eq!(expand_env_vars("50%% and $$", lookup), "50% and $");
    }

    #[test]
    fn non_ascii_text_passes_through() {
        assert_eq!(
            expand_env_vars(r"%OneDrive%\資料\ホーム", lookup),
            r"C:\Users\kim\OneDrive\資料\ホーム"
        );
    }
}
