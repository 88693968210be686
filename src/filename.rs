//! File-safe names for symbol ids.
//!
//! Symbol ids come from library paths and may hold characters that are not
//! valid in file names. `_` is the escape character:
//!
//! | Char | Escape |   | Char | Escape |
//! |------|--------|---|------|--------|
//! | `_`  | `__`   |   | `"`  | `_q`   |
//! | `*`  | `_s`   |   | `<`  | `_l`   |
//! | `/`  | `_f`   |   | `>`  | `_r`   |
//! | `\`  | `_b`   |   | `\|` | `_p`   |
//! | `~`  | `_t`   |   | `?`  | `_m`   |
//! | `:`  | `_c`   |   |      |        |
//!
//! Decoding is the exact inverse and rejects malformed input.

use std::path::Path;

/// Error type for decoding file-safe names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilenameError {
    /// The name ends in a lone `_`.
    #[error("Dangling escape at end of {0:?}")]
    DanglingEscape(String),

    /// `_` followed by a character with no meaning.
    #[error("Unknown escape _{code} in {name:?}")]
    UnknownEscape {
        /// Full name.
        name: String,
        /// Character after the `_`.
        code: char,
    },
}

fn escape_code(c: char) -> Option<char> {
    Some(match c {
        '_' => '_',
        '*' => 's',
        '/' => 'f',
        '\\' => 'b',
        '~' => 't',
        ':' => 'c',
        '"' => 'q',
        '<' => 'l',
        '>' => 'r',
        '|' => 'p',
        '?' => 'm',
        _ => return None,
    })
}

fn unescape_code(code: char) -> Option<char> {
    Some(match code {
        '_' => '_',
        's' => '*',
        'f' => '/',
        'b' => '\\',
        't' => '~',
        'c' => ':',
        'q' => '"',
        'l' => '<',
        'r' => '>',
        'p' => '|',
        'm' => '?',
        _ => return None,
    })
}

/// Escape a symbol id into a file-safe name.
pub fn to_valid_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match escape_code(c) {
            Some(code) => {
                out.push('_');
                out.push(code);
            }
            None => out.push(c),
        }
    }
    out
}

/// Recover the symbol id from a file-safe name.
pub fn from_valid_filename(filename: &str) -> Result<String, FilenameError> {
    let mut out = String::with_capacity(filename.len());
    let mut chars = filename.chars();
    while let Some(c) = chars.next() {
        if c != '_' {
            out.push(c);
            continue;
        }
        let code = chars
            .next()
            .ok_or_else(|| FilenameError::DanglingEscape(filename.to_string()))?;
        let decoded = unescape_code(code).ok_or_else(|| FilenameError::UnknownEscape {
            name: filename.to_string(),
            code,
        })?;
        out.push(decoded);
    }
    Ok(out)
}

/// Insert a zero-padded frame number before the extension:
/// `dir/walk.png` + 3 → `dir/walk0003.png`.
pub fn frame_filename(path: &str, frame_number: u32) -> String {
    let file_start = path.rfind(|c: char| c == '/' || c == '\\').map_or(0, |i| i + 1);
    match path[file_start..].rfind('.') {
        Some(dot) => {
            let dot = file_start + dot;
            format!("{}{:04}{}", &path[..dot], frame_number, &path[dot..])
        }
        None => format!("{}{:04}", path, frame_number),
    }
}

/// Path of the sample image for a symbol:
/// `{folder}/f-{source}_s-{escaped id}.sym_f.png`.
pub fn symbol_sample_path(folder: &Path, source_name: &str, symbol_id: &str) -> String {
    let file = format!(
        "f-{}_s-{}.sym_f.png",
        source_name,
        to_valid_filename(symbol_id)
    );
    folder.join(file).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_table() {
        assert_eq!(to_valid_filename("a_b"), "a__b");
        assert_eq!(to_valid_filename("chars/walk*"), "chars_fwalk_s");
        assert_eq!(to_valid_filename(r#"x\y~z:"<>|?"#), "x_by_tz_c_q_l_r_p_m");
        assert_eq!(to_valid_filename("plain"), "plain");
    }

    #[test]
    fn test_decode_inverts_encode() {
        for name in ["a_b", "_s", "__", "chars/walk*", r#"x\y~z:"<>|?"#, "ünï/cödé"] {
            assert_eq!(from_valid_filename(&to_valid_filename(name)).unwrap(), name);
        }
    }

    #[test]
    fn test_escaped_underscore_is_not_reparsed() {
        // "__s" is "_" then "s", never "_" then "*".
        assert_eq!(from_valid_filename("__s").unwrap(), "_s");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(
            from_valid_filename("walk_"),
            Err(FilenameError::DanglingEscape("walk_".to_string()))
        );
        assert!(matches!(
            from_valid_filename("walk_z"),
            Err(FilenameError::UnknownEscape { code: 'z', .. })
        ));
    }

    #[test]
    fn test_frame_filename() {
        assert_eq!(frame_filename("out/walk.sym_f.png", 3), "out/walk.sym_f0003.png");
        assert_eq!(frame_filename("out.d/walk", 12), "out.d/walk0012");
        assert_eq!(frame_filename("a.png", 12345), "a12345.png");
    }

    #[test]
    fn test_sample_path() {
        let path = symbol_sample_path(Path::new("samples"), "hero", "chars/Walk");
        assert_eq!(path, format!("samples{}f-hero_s-chars_fWalk.sym_f.png", std::path::MAIN_SEPARATOR));
    }
}
