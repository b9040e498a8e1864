//! Route path template → regular expression.
//!
//! # Design Decisions
//! - A placeholder is `:name` right after `/`, `<` or the start of the path,
//!   with `name` made of `[a-zA-Z_]`
//! - Plain placeholders end at `/`, `>` or end of path; `<:name>` must be closed
//!   and its brackets are dropped
//! - Placeholders with a default become optional, and so does the slash before them
//! - Everything else is copied verbatim, so raw regex groups pass through
//! - No anchors are added here; the route picks full or prefix anchoring

use crate::stash::Stash;

/// Compile a path template into an unanchored regex source.
pub fn compile(path: &str, defaults: &Stash) -> String {
    let bytes = path.as_bytes();
    let mut out = String::with_capacity(path.len() + 16);
    let mut gap_start = 0;
    let mut found = false;
    let mut i = 0;

    while i < bytes.len() {
        let opener = if i == 0 { None } else { Some(bytes[i - 1]) };
        let at_placeholder = bytes[i] == b':' && matches!(opener, None | Some(b'/') | Some(b'<'));
        if !at_placeholder {
            i += 1;
            continue;
        }

        let name_start = i + 1;
        let name_end = name_start
            + bytes[name_start..]
                .iter()
                .take_while(|b| b.is_ascii_alphabetic() || **b == b'_')
                .count();
        if name_end == name_start {
            i += 1;
            continue;
        }

        let delimited = opener == Some(b'<');
        let next = bytes.get(name_end).copied();
        let terminated = if delimited {
            next == Some(b'>')
        } else {
            matches!(next, None | Some(b'/') | Some(b'>'))
        };
        if !terminated {
            i = name_end;
            continue;
        }

        let name = &path[name_start..name_end];
        let optional = defaults.contains_key(name);
        let opener_start = if opener.is_some() { i - 1 } else { i };

        out.push_str(&path[gap_start..opener_start]);
        if opener == Some(b'/') {
            out.push_str(if optional { "/?" } else { "/" });
        }
        let quantifier = if optional { '*' } else { '+' };
        out.push_str(&format!("(?P<{}>[^/.]{})", name, quantifier));

        found = true;
        gap_start = if delimited { name_end + 1 } else { name_end };
        i = gap_start;
    }

    if !found {
        return path.to_string();
    }
    out.push_str(&path[gap_start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(path: &str) -> String {
        compile(path, &Stash::new())
    }

    #[test]
    fn test_no_placeholders_is_verbatim() {
        assert_eq!(plain("/foo/bar"), "/foo/bar");
        assert_eq!(plain(r"/user/(?P<id>\d+)"), r"/user/(?P<id>\d+)");
        assert_eq!(plain("/a:b"), "/a:b");
    }

    #[test]
    fn test_required_placeholder() {
        assert_eq!(plain("/foo/:name"), "/foo/(?P<name>[^/.]+)");
        assert_eq!(plain(":name"), "(?P<name>[^/.]+)");
    }

    #[test]
    fn test_optional_placeholder() {
        let defaults = Stash::from([("foo", "bar")]);
        assert_eq!(compile("/foo/:foo", &defaults), "/foo/?(?P<foo>[^/.]*)");
    }

    #[test]
    fn test_delimited_placeholder() {
        assert_eq!(plain("/hello_<:name>"), "/hello_(?P<name>[^/.]+)");
        assert_eq!(plain("/<:name>.html"), "/(?P<name>[^/.]+).html");
    }

    #[test]
    fn test_keeps_tail_and_consecutive_placeholders() {
        assert_eq!(
            plain("/:controller/:action/edit"),
            "/(?P<controller>[^/.]+)/(?P<action>[^/.]+)/edit"
        );
    }

    #[test]
    fn test_unclosed_delimiter_is_literal() {
        assert_eq!(plain("/<:name"), "/<:name");
    }
}
