//! Splits a raw `UninstallString` into the executable and its argument tail.
//!
//! Uninstall strings are free-form and not reliably quoted, so the only
//! dependable boundary is the `.exe` suffix of the executable itself. The
//! rules below are tried in order and the first one that matches decides the
//! split point:
//!
//! 1. `.exe ` - unquoted executable followed by arguments.
//! 2. `.exe" ` - quoted executable followed by arguments.
//! 3. the string ends with `.exe`.
//! 4. the string ends with `.exe"`.
//!
//! Each rule uses the first occurrence of its pattern, so an argument that
//! itself contains `.exe ` can pull the split point forward.

use crate::error::UninstallError;
use std::fmt;

pub const EXE_MARKER: &str = ".exe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Executable exactly as written, quotes included.
    pub executable: String,
    /// Everything after the separating character; empty when there is none.
    pub args: String,
}

impl ParsedCommand {
    pub fn has_args(&self) -> bool {
        !self.args.is_empty()
    }

    /// The executable with one pair of surrounding double quotes removed.
    pub fn program(&self) -> &str {
        let exe = self.executable.as_str();
        match exe.strip_prefix('"').and_then(|e| e.strip_suffix('"')) {
            Some(inner) => inner,
            None => exe,
        }
    }
}

impl fmt::Display for ParsedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>  <{}>", self.executable, self.args)
    }
}

fn split_point(raw: &str) -> Option<usize> {
    let unquoted_with_args = format!("{EXE_MARKER} ");
    let quoted = format!("{EXE_MARKER}\"");
    let quoted_with_args = format!("{EXE_MARKER}\" ");

    if let Some(i) = raw.find(&unquoted_with_args) {
        Some(i + EXE_MARKER.len())
    } else if let Some(i) = raw.find(&quoted_with_args) {
        Some(i + EXE_MARKER.len() + 1)
    } else if raw.ends_with(EXE_MARKER) {
        raw.find(EXE_MARKER).map(|i| i + EXE_MARKER.len())
    } else if raw.ends_with(&quoted) {
        raw.find(&quoted).map(|i| i + quoted.len())
    } else {
        None
    }
}

/// Apply the split rules to `raw`. `None` means no rule matched.
pub fn split(raw: &str) -> Option<ParsedCommand> {
    let at = split_point(raw)?;
    if at >= raw.len() {
        return Some(ParsedCommand {
            executable: raw.to_string(),
            args: String::new(),
        });
    }

    let (executable, rest) = raw.split_at(at);
    // Drop exactly one separator character.
    let mut tail = rest.chars();
    tail.next();
    Some(ParsedCommand {
        executable: executable.to_string(),
        args: tail.as_str().to_string(),
    })
}

pub fn parse(raw: &str) -> Result<ParsedCommand, UninstallError> {
    split(raw).ok_or_else(|| UninstallError::UnparseableCommand {
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(raw: &str) -> (String, String) {
        let parsed = split(raw).expect("should split");
        (parsed.executable, parsed.args)
    }

    #[test]
    fn unquoted_with_args() {
        assert_eq!(
            parts(r"C:\Program Files\Foo\uninst.exe /S /norestart"),
            (r"C:\Program Files\Foo\uninst.exe".into(), "/S /norestart".into())
        );
    }

    #[test]
    fn quoted_with_args() {
        assert_eq!(
            parts(r#""C:\Program Files\App\unins000.exe" /SILENT"#),
            (r#""C:\Program Files\App\unins000.exe""#.into(), "/SILENT".into())
        );
    }

    #[test]
    fn quoted_with_stray_trailing_quote() {
        let (exe, args) = parts(r#""C:\Program Files\App\unins000.exe" /SILENT""#);
        assert_eq!(exe, r#""C:\Program Files\App\unins000.exe""#);
        assert_eq!(exe.chars().count(), 35);
        assert_eq!(args, r#"/SILENT""#);
    }

    #[test]
    fn bare_executable() {
        assert_eq!(
            parts(r"C:\Windows\uninstall.exe"),
            (r"C:\Windows\uninstall.exe".into(), String::new())
        );
    }

    #[test]
    fn quoted_bare_executable() {
        let raw = r#""C:\Program Files\Foo\uninstall.exe""#;
        assert_eq!(parts(raw), (raw.into(), String::new()));
    }

    #[test]
    fn unquoted_rule_wins_over_quoted_rule() {
        // Both `.exe ` and `.exe" ` occur; the unquoted rule is tried first
        // even though it splits inside the argument list.
        assert_eq!(
            parts(r#""C:\a b\x.exe" --helper C:\y.exe --flag"#),
            (
                r#""C:\a b\x.exe" --helper C:\y.exe"#.into(),
                "--flag".into()
            )
        );
    }

    #[test]
    fn first_occurrence_is_used_for_trailing_marker() {
        assert_eq!(
            parts(r"C:\tools\a.exe\b.exe"),
            (r"C:\tools\a.exe".into(), "b.exe".into())
        );
    }

    #[test]
    fn non_ascii_separator_is_skipped_whole() {
        assert_eq!(
            parts("C:\\a.exe\u{e9}b.exe"),
            ("C:\\a.exe".into(), "b.exe".into())
        );
    }

    #[test]
    fn marker_is_case_sensitive() {
        assert!(split(r"C:\WINDOWS\UNINST.EXE /S").is_none());
    }

    #[test]
    fn unparseable_inputs() {
        for raw in [
            "",
            "MsiExec.exe/X{12345678-1234-1234-1234-123456789012}",
            r"C:\app\uninstall.bat",
            r"C:\app\uninstall.exe.config",
            "rundll32 shell32,Control_RunDLL",
        ] {
            assert!(split(raw).is_none(), "{raw:?}");
            assert!(matches!(
                parse(raw),
                Err(UninstallError::UnparseableCommand { raw: r }) if r == raw
            ));
        }
    }

    #[test]
    fn split_drops_exactly_one_character() {
        for raw in [
            r"C:\x\u.exe /a /b",
            r#""C:\x y\u.exe" /a"#,
            r#""C:\x y\u.exe"  double"#,
            r"C:\x\u.exe ",
        ] {
            let parsed = split(raw).unwrap();
            assert!(!parsed.executable.is_empty());
            let rebuilt = format!("{}{}", parsed.executable, parsed.args);
            assert_eq!(rebuilt.len() + 1, raw.len(), "{raw:?}");
            assert!(raw.starts_with(&parsed.executable));
            assert!(raw.ends_with(&parsed.args));
        }
    }

    #[test]
    fn program_strips_surrounding_quotes() {
        let parsed = split(r#""C:\Program Files\App\unins000.exe" /S"#).unwrap();
        assert_eq!(parsed.program(), r"C:\Program Files\App\unins000.exe");
        let parsed = split(r"C:\App\unins000.exe /S").unwrap();
        assert_eq!(parsed.program(), r"C:\App\unins000.exe");
        assert!(parsed.has_args());
    }

    #[test]
    fn display_matches_diagnostic_format() {
        let parsed = split(r"C:\App\u.exe /S").unwrap();
        assert_eq!(parsed.to_string(), r"<C:\App\u.exe>  </S>");
    }
}
