use crate::error::UninstallError;
use std::io;
use thiserror::Error;

pub mod value;

/// Hive every [`RegistryRoot`] path is relative to.
pub const HIVE_NAME: &str = "HKEY_LOCAL_MACHINE";

/// A location in the registry whose immediate children are installed
/// programs. Lower `priority` is scanned first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryRoot {
    pub priority: u8,
    pub path: &'static str,
}

/// 32-bit registrations on a 64-bit host first, then native ones.
pub const REGISTRY_ROOTS: [RegistryRoot; 2] = [
    RegistryRoot {
        priority: 0,
        path: r"SOFTWARE\Wow6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
    },
    RegistryRoot {
        priority: 1,
        path: r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
    },
];

/// The two values read from each installed-program key. Missing values are
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryEntry {
    pub display_name: String,
    pub uninstall_string: String,
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("could not open key: {0}")]
    Open(#[source] io::Error),
    #[error("could not enumerate subkeys: {0}")]
    Enumerate(#[source] io::Error),
}

/// Read-only view of a software inventory.
pub trait Inventory {
    /// Names of the immediate children of `root`, in inventory order.
    fn subkeys(&self, root: &str) -> Result<Vec<String>, InventoryError>;

    /// Read `DisplayName` and `UninstallString` of `root\child`.
    fn entry(&self, root: &str, child: &str) -> io::Result<InventoryEntry>;
}

impl<T: Inventory + ?Sized> Inventory for &T {
    fn subkeys(&self, root: &str) -> Result<Vec<String>, InventoryError> {
        (**self).subkeys(root)
    }

    fn entry(&self, root: &str, child: &str) -> io::Result<InventoryEntry> {
        (**self).entry(root, child)
    }
}

/// Finds the uninstall command of the first program whose display name
/// contains the query.
pub struct Resolver<I> {
    roots: Vec<RegistryRoot>,
    inventory: I,
}

impl<I: Inventory> Resolver<I> {
    pub fn new(roots: &[RegistryRoot], inventory: I) -> Self {
        let mut roots = roots.to_vec();
        roots.sort_by_key(|r| r.priority);
        Self { roots, inventory }
    }

    pub fn with_default_roots(inventory: I) -> Self {
        Self::new(&REGISTRY_ROOTS, inventory)
    }

    pub fn roots(&self) -> &[RegistryRoot] {
        &self.roots
    }

    /// Scan every root in priority order and return the `UninstallString`
    /// of the first entry whose `DisplayName` contains `query`
    /// (case-sensitive). An empty string means nothing matched.
    pub fn resolve(&self, query: &str) -> Result<String, UninstallError> {
        for root in &self.roots {
            if let Some(found) = self.resolve_in_root(root, query)? {
                return Ok(found);
            }
        }
        tracing::debug!(query, "no display name matched");
        Ok(String::new())
    }

    fn resolve_in_root(
        &self,
        root: &RegistryRoot,
        query: &str,
    ) -> Result<Option<String>, UninstallError> {
        tracing::debug!(root = root.path, "scanning uninstall root");
        let children = self.inventory.subkeys(root.path).map_err(|e| match e {
            InventoryError::Open(source) => UninstallError::OpenKey {
                path: root.path.to_string(),
                source,
            },
            InventoryError::Enumerate(source) => UninstallError::EnumerateSubkeys {
                path: root.path.to_string(),
                source,
            },
        })?;

        for child in &children {
            let entry = self.inventory.entry(root.path, child).map_err(|source| {
                UninstallError::GetUninstallKey {
                    path: format!(r"{HIVE_NAME}\{}\{child}", root.path),
                    source,
                }
            })?;
            if entry.display_name.contains(query) {
                tracing::info!(
                    key = %child,
                    display_name = %entry.display_name,
                    "matched installed program"
                );
                return Ok(Some(entry.uninstall_string));
            }
        }
        Ok(None)
    }
}

#[cfg(target_os = "windows")]
mod hklm {
    use super::value::{self, ValueKind};
    use super::{Inventory, InventoryEntry, InventoryError};
    use std::io;
    use winreg::enums::{RegType, HKEY_LOCAL_MACHINE, KEY_READ};
    use winreg::RegKey;

    /// [`Inventory`] backed by `HKEY_LOCAL_MACHINE`, opened read-only.
    pub struct WindowsRegistry {
        hklm: RegKey,
    }

    impl WindowsRegistry {
        pub fn new() -> Self {
            Self {
                hklm: RegKey::predef(HKEY_LOCAL_MACHINE),
            }
        }
    }

    impl Default for WindowsRegistry {
        fn default() -> Self {
            Self::new()
        }
    }

    fn kind_of(vtype: &RegType) -> ValueKind {
        match vtype {
            RegType::REG_SZ => ValueKind::String,
            RegType::REG_EXPAND_SZ => ValueKind::ExpandString,
            RegType::REG_MULTI_SZ => ValueKind::MultiString,
            RegType::REG_DWORD => ValueKind::Dword,
            RegType::REG_DWORD_BIG_ENDIAN => ValueKind::DwordBigEndian,
            RegType::REG_QWORD => ValueKind::Qword,
            _ => ValueKind::Other,
        }
    }

    /// Any value type is accepted; a missing value reads as "".
    fn read_string(key: &RegKey, name: &str) -> io::Result<String> {
        match key.get_raw_value(name) {
            Ok(raw) => Ok(value::decode(
                kind_of(&raw.vtype),
                &raw.bytes,
                value::expand_environment,
            )),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    impl Inventory for WindowsRegistry {
        fn subkeys(&self, root: &str) -> Result<Vec<String>, InventoryError> {
            let key = self
                .hklm
                .open_subkey_with_flags(root, KEY_READ)
                .map_err(InventoryError::Open)?;
            key.enum_keys()
                .collect::<io::Result<Vec<_>>>()
                .map_err(InventoryError::Enumerate)
        }

        fn entry(&self, root: &str, child: &str) -> io::Result<InventoryEntry> {
            let key = self
                .hklm
                .open_subkey_with_flags(format!(r"{root}\{child}"), KEY_READ)?;
            Ok(InventoryEntry {
                display_name: read_string(&key, "DisplayName")?,
                uninstall_string: read_string(&key, "UninstallString")?,
            })
        }
    }
}

#[cfg(not(target_os = "windows"))]
mod hklm {
    use super::{Inventory, InventoryEntry, InventoryError};
    use std::io;

    /// Stand-in used on hosts without a registry: every root fails to open.
    #[derive(Default)]
    pub struct WindowsRegistry;

    impl WindowsRegistry {
        pub fn new() -> Self {
            Self
        }
    }

    fn unsupported() -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            "the Windows registry is not available on this host",
        )
    }

    impl Inventory for WindowsRegistry {
        fn subkeys(&self, _root: &str) -> Result<Vec<String>, InventoryError> {
            Err(InventoryError::Open(unsupported()))
        }

        fn entry(&self, _root: &str, _child: &str) -> io::Result<InventoryEntry> {
            Err(unsupported())
        }
    }
}

pub use hklm::WindowsRegistry;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compatibility_root_is_scanned_first() {
        assert!(REGISTRY_ROOTS[0].path.contains("Wow6432Node"));
        assert!(!REGISTRY_ROOTS[1].path.contains("Wow6432Node"));
        assert!(REGISTRY_ROOTS[0].priority < REGISTRY_ROOTS[1].priority);
    }

    #[test]
    fn new_orders_roots_by_priority() {
        let reversed = [REGISTRY_ROOTS[1], REGISTRY_ROOTS[0]];
        let resolver = Resolver::new(&reversed, WindowsRegistry::new());
        assert_eq!(resolver.roots(), &REGISTRY_ROOTS[..]);
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn missing_registry_is_an_open_key_failure() {
        let resolver = Resolver::with_default_roots(WindowsRegistry::new());
        let err = resolver.resolve("anything").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_codes::OPEN_KEY_FAIL);
        assert!(err.to_string().contains("Wow6432Node"));
    }
}
