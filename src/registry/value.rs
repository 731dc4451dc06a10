//! Turns raw registry value data into text.
//!
//! Every value type is rendered, not just strings: `REG_EXPAND_SZ` has its
//! `%VAR%` references expanded, numbers become signed decimals and anything
//! else is shown as lowercase hex.

/// Registry value types, independent of the platform bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    ExpandString,
    MultiString,
    Dword,
    DwordBigEndian,
    Qword,
    /// `REG_BINARY`, `REG_NONE` and the resource types.
    Other,
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

fn utf16_string(bytes: &[u8]) -> String {
    let units = utf16_units(bytes);
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..end])
}

/// Render `bytes` of type `kind` as text. `expand` resolves environment
/// references in `REG_EXPAND_SZ` data.
pub fn decode(kind: ValueKind, bytes: &[u8], expand: impl Fn(&str) -> String) -> String {
    match kind {
        ValueKind::String => utf16_string(bytes),
        ValueKind::ExpandString => expand(&utf16_string(bytes)),
        ValueKind::MultiString => String::from_utf16_lossy(&utf16_units(bytes))
            .split('\0')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        ValueKind::Dword => match <[u8; 4]>::try_from(bytes) {
            Ok(raw) => i32::from_le_bytes(raw).to_string(),
            Err(_) => hex::encode(bytes),
        },
        ValueKind::DwordBigEndian => match <[u8; 4]>::try_from(bytes) {
            Ok(raw) => i32::from_be_bytes(raw).to_string(),
            Err(_) => hex::encode(bytes),
        },
        ValueKind::Qword => match <[u8; 8]>::try_from(bytes) {
            Ok(raw) => i64::from_le_bytes(raw).to_string(),
            Err(_) => hex::encode(bytes),
        },
        ValueKind::Other => hex::encode(bytes),
    }
}

/// Expand `%VAR%` references with the process environment.
#[cfg(target_os = "windows")]
pub fn expand_environment(raw: &str) -> String {
    use windows::core::PCWSTR;
    use windows::Win32::System::Environment::ExpandEnvironmentStringsW;

    let src: Vec<u16> = raw.encode_utf16().chain(std::iter::once(0)).collect();
    unsafe {
        let needed = ExpandEnvironmentStringsW(PCWSTR(src.as_ptr()), None);
        if needed == 0 {
            return raw.to_string();
        }
        let mut buf = vec![0u16; needed as usize];
        let written = ExpandEnvironmentStringsW(PCWSTR(src.as_ptr()), Some(&mut buf));
        if written == 0 || written as usize > buf.len() {
            return raw.to_string();
        }
        // `written` counts the terminating NUL.
        String::from_utf16_lossy(&buf[..written as usize - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(s: &str) -> Vec<u8> {
        s.encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(|u| u.to_le_bytes())
            .collect()
    }

    fn no_expand(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn plain_string_drops_terminator() {
        assert_eq!(
            decode(ValueKind::String, &wide(r"C:\App\u.exe /S"), no_expand),
            r"C:\App\u.exe /S"
        );
    }

    #[test]
    fn expand_string_goes_through_expander() {
        let expand = |s: &str| s.replace("%SystemRoot%", r"C:\Windows");
        assert_eq!(
            decode(
                ValueKind::ExpandString,
                &wide(r"%SystemRoot%\System32\foo.exe /x"),
                expand
            ),
            r"C:\Windows\System32\foo.exe /x"
        );
        // Plain strings are never expanded.
        assert_eq!(
            decode(ValueKind::String, &wide(r"%SystemRoot%\foo.exe"), expand),
            r"%SystemRoot%\foo.exe"
        );
    }

    #[test]
    fn numbers_render_as_signed_decimal() {
        assert_eq!(decode(ValueKind::Dword, &42u32.to_le_bytes(), no_expand), "42");
        assert_eq!(
            decode(ValueKind::Dword, &u32::MAX.to_le_bytes(), no_expand),
            "-1"
        );
        assert_eq!(
            decode(ValueKind::DwordBigEndian, &7u32.to_be_bytes(), no_expand),
            "7"
        );
        assert_eq!(
            decode(ValueKind::Qword, &(1u64 << 40).to_le_bytes(), no_expand),
            (1i64 << 40).to_string()
        );
    }

    #[test]
    fn multi_string_joins_entries() {
        let mut bytes = wide("one");
        bytes.extend(wide("two"));
        bytes.extend([0, 0]);
        assert_eq!(decode(ValueKind::MultiString, &bytes, no_expand), "one two");
    }

    #[test]
    fn binary_and_malformed_numbers_render_as_hex() {
        assert_eq!(decode(ValueKind::Other, &[0xde, 0xad], no_expand), "dead");
        assert_eq!(decode(ValueKind::Dword, &[1, 2], no_expand), "0102");
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn expands_process_environment() {
        std::env::set_var("UNINSTALL_BY_NAME_TEST_DIR", r"C:\Tools");
        assert_eq!(
            expand_environment(r"%UNINSTALL_BY_NAME_TEST_DIR%\u.exe"),
            r"C:\Tools\u.exe"
        );
        assert_eq!(expand_environment("no vars"), "no vars");
    }
}
