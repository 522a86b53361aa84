pub mod cipher;
pub mod profile;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use zeroize::Zeroizing;

use crate::error::{AppError, Result};
use profile::UserProfile;

pub const PAYLOAD_FILE: &str = "profile.enc";
pub const KEY_FILE: &str = "profile.key";
pub const PLAINTEXT_FILE: &str = "profile.json";

/// How the vault keeps the profile on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultMode {
    Encrypted,
    /// No cipher compiled in. Callers should warn the user.
    Plaintext,
}

impl VaultMode {
    pub fn available() -> Self {
        if cipher::available() {
            VaultMode::Encrypted
        } else {
            VaultMode::Plaintext
        }
    }
}

/// Stores a single [`UserProfile`] in a user-scoped directory.
///
/// The key is generated on the first `store` and reused afterwards; it is
/// never regenerated, so losing `profile.key` makes the profile unreadable.
pub struct Vault {
    dir: PathBuf,
    mode: VaultMode,
}

impl Vault {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::with_mode(dir, VaultMode::available())
    }

    /// Open with an explicit mode. Asking for `Encrypted` on a build without a
    /// cipher still yields `Plaintext`.
    pub fn with_mode(dir: impl Into<PathBuf>, mode: VaultMode) -> Self {
        let mode = match mode {
            VaultMode::Encrypted if !cipher::available() => VaultMode::Plaintext,
            m => m,
        };
        Self {
            dir: dir.into(),
            mode,
        }
    }

    pub fn mode(&self) -> VaultMode {
        self.mode
    }

    pub fn payload_path(&self) -> PathBuf {
        self.dir.join(PAYLOAD_FILE)
    }

    pub fn key_path(&self) -> PathBuf {
        self.dir.join(KEY_FILE)
    }

    pub fn plaintext_path(&self) -> PathBuf {
        self.dir.join(PLAINTEXT_FILE)
    }

    pub fn has_profile(&self) -> bool {
        self.payload_path().exists() || self.plaintext_path().exists()
    }

    /// Replace the stored profile. Returns the mode actually used so the
    /// caller can surface plaintext storage to the user.
    pub fn store(&self, profile: &UserProfile) -> Result<VaultMode> {
        profile.validate()?;
        std::fs::create_dir_all(&self.dir).map_err(|e| AppError::from_write(&self.dir, e))?;
        let json = Zeroizing::new(serde_json::to_vec(profile)?);

        match self.mode {
            VaultMode::Encrypted => {
                let key = self.load_or_create_key()?;
                let sealed = cipher::encrypt(&key, &json)?;
                write_private(&self.payload_path(), &sealed)?;

                let stale = self.plaintext_path();
                if stale.exists() {
                    std::fs::remove_file(&stale)?;
                    tracing::info!("Removed plaintext profile {}", stale.display());
                }
                tracing::debug!("Encrypted profile saved to {}", self.payload_path().display());
            }
            VaultMode::Plaintext => {
                tracing::warn!("No cipher available; saving profile unencrypted");
                write_private(&self.plaintext_path(), &json)?;

                // `load` reads the encrypted payload first; an old one would
                // shadow the profile just written.
                let stale = self.payload_path();
                if stale.exists() {
                    std::fs::remove_file(&stale)?;
                    tracing::info!("Removed encrypted profile {}", stale.display());
                }
            }
        }
        Ok(self.mode)
    }

    pub fn load(&self) -> Result<UserProfile> {
        let payload = self.payload_path();
        let plaintext = self.plaintext_path();

        if payload.exists() {
            let key_path = self.key_path();
            if !key_path.exists() {
                return Err(AppError::KeyMissing {
                    payload,
                    key: key_path,
                });
            }
            if self.mode == VaultMode::Plaintext {
                return Err(AppError::Crypto(format!(
                    "{} is encrypted but this build has no cipher",
                    payload.display()
                )));
            }
            let key = read_key(&key_path)?;
            let sealed = std::fs::read(&payload)?;
            let json = cipher::decrypt(&key, &sealed)?;
            return Ok(serde_json::from_slice(&json)?);
        }

        if plaintext.exists() {
            if self.mode == VaultMode::Encrypted {
                tracing::warn!(
                    "Loading unencrypted profile {}; store it again to encrypt it",
                    plaintext.display()
                );
            }
            let json = Zeroizing::new(std::fs::read(&plaintext)?);
            return Ok(serde_json::from_slice(&json)?);
        }

        Err(AppError::NotFound(payload))
    }

    /// Reuse the existing key, or create one when nothing is stored yet. A
    /// payload without its key is `KeyMissing`, never a fresh key.
    fn load_or_create_key(&self) -> Result<cipher::Key> {
        let path = self.key_path();
        if path.exists() {
            return read_key(&path);
        }
        let payload = self.payload_path();
        if payload.exists() {
            return Err(AppError::KeyMissing { payload, key: path });
        }
        let key = cipher::generate_key();
        let encoded = Zeroizing::new(STANDARD.encode(key.as_slice()));
        write_private(&path, encoded.as_bytes())?;
        tracing::info!("Generated new profile key at {}", path.display());
        Ok(key)
    }
}

fn read_key(path: &Path) -> Result<cipher::Key> {
    let encoded = Zeroizing::new(std::fs::read_to_string(path)?);
    let bytes = Zeroizing::new(
        STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::Crypto(format!("{} is not a valid key: {e}", path.display())))?,
    );
    if bytes.len() != cipher::KEY_LEN {
        return Err(AppError::Crypto(format!(
            "{} holds a {}-byte key, expected {}",
            path.display(),
            bytes.len(),
            cipher::KEY_LEN
        )));
    }
    let mut key = Zeroizing::new([0u8; cipher::KEY_LEN]);
    key.copy_from_slice(&bytes);
    Ok(key)
}

/// Write via a temp file and rename, readable by the owner only on Unix.
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let result = options
        .open(&tmp)
        .and_then(|mut f| f.write_all(contents).and_then(|_| f.sync_all()));
    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(AppError::from_write(&tmp, e));
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        AppError::from_write(path, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn jane() -> UserProfile {
        UserProfile::new("Jane Doe")
    }

    #[test]
    fn test_load_before_store_is_not_found() {
        let dir = TempDir::new().unwrap();
        let vault = Vault::open(dir.path());
        assert!(!vault.has_profile());
        assert!(matches!(vault.load(), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_store_then_load() {
        let dir = TempDir::new().unwrap();
        let vault = Vault::open(dir.path().join("vault"));

        let mode = vault.store(&jane()).unwrap();
        assert_eq!(mode, VaultMode::available());
        assert_eq!(vault.load().unwrap(), jane());
    }

    #[test]
    fn test_store_rejects_empty_name() {
        let dir = TempDir::new().unwrap();
        let vault = Vault::open(dir.path());
        let err = vault.store(&UserProfile::new("")).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(!vault.has_profile());
    }

    #[test]
    fn test_plaintext_mode_is_reported() {
        let dir = TempDir::new().unwrap();
        let vault = Vault::with_mode(dir.path(), VaultMode::Plaintext);
        let mut profile = jane();
        profile.emails = vec!["jane@example.com".into()];

        assert_eq!(vault.store(&profile).unwrap(), VaultMode::Plaintext);
        assert!(vault.plaintext_path().exists());
        assert!(!vault.key_path().exists());
        assert_eq!(vault.load().unwrap(), profile);
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let vault = Vault::with_mode(dir.path(), VaultMode::Plaintext);
        // A non-empty directory where the profile goes cannot be renamed over.
        let blocker = vault.plaintext_path();
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), "x").unwrap();

        assert!(vault.store(&jane()).is_err());
        assert!(!dir.path().join("profile.json.tmp").exists());
        assert!(blocker.join("keep").exists());
    }

    #[cfg(feature = "encryption")]
    mod encrypted {
        use super::*;

        #[test]
        fn test_payload_is_not_plaintext() {
            let dir = TempDir::new().unwrap();
            let vault = Vault::open(dir.path());
            vault.store(&jane()).unwrap();

            let raw = std::fs::read(vault.payload_path()).unwrap();
            assert!(!String::from_utf8_lossy(&raw).contains("Jane"));
        }

        #[test]
        fn test_key_reused_across_stores() {
            let dir = TempDir::new().unwrap();
            let vault = Vault::open(dir.path());
            vault.store(&jane()).unwrap();
            let key = std::fs::read(vault.key_path()).unwrap();

            let mut updated = jane();
            updated.addresses = vec!["1 Main St".into()];
            vault.store(&updated).unwrap();

            assert_eq!(std::fs::read(vault.key_path()).unwrap(), key);
            assert_eq!(vault.load().unwrap(), updated);
        }

        #[test]
        fn test_missing_key_is_integrity_error() {
            let dir = TempDir::new().unwrap();
            let vault = Vault::open(dir.path());
            vault.store(&jane()).unwrap();
            std::fs::remove_file(vault.key_path()).unwrap();

            assert!(matches!(vault.load(), Err(AppError::KeyMissing { .. })));
            // Still an error on retry; no key is regenerated behind our back.
            assert!(matches!(vault.load(), Err(AppError::KeyMissing { .. })));
            assert!(!vault.key_path().exists());
        }

        #[test]
        fn test_store_without_key_keeps_payload() {
            let dir = TempDir::new().unwrap();
            let vault = Vault::open(dir.path());
            vault.store(&jane()).unwrap();
            let sealed = std::fs::read(vault.payload_path()).unwrap();
            std::fs::remove_file(vault.key_path()).unwrap();

            let err = vault.store(&UserProfile::new("Someone Else")).unwrap_err();
            assert!(matches!(err, AppError::KeyMissing { .. }));
            assert!(!vault.key_path().exists());
            assert_eq!(std::fs::read(vault.payload_path()).unwrap(), sealed);
        }

        #[test]
        fn test_plaintext_store_replaces_encrypted_profile() {
            let dir = TempDir::new().unwrap();
            Vault::open(dir.path())
                .store(&UserProfile::new("Old Name"))
                .unwrap();

            let plain = Vault::with_mode(dir.path(), VaultMode::Plaintext);
            let updated = UserProfile::new("New Name");
            assert_eq!(plain.store(&updated).unwrap(), VaultMode::Plaintext);
            assert!(!plain.payload_path().exists());
            assert_eq!(plain.load().unwrap(), updated);
            assert_eq!(Vault::open(dir.path()).load().unwrap(), updated);
        }

        #[test]
        fn test_encrypting_removes_plaintext_copy() {
            let dir = TempDir::new().unwrap();
            Vault::with_mode(dir.path(), VaultMode::Plaintext)
                .store(&jane())
                .unwrap();

            let vault = Vault::open(dir.path());
            assert_eq!(vault.load().unwrap(), jane());
            vault.store(&jane()).unwrap();
            assert!(!vault.plaintext_path().exists());
            assert_eq!(vault.load().unwrap(), jane());
        }

        #[cfg(unix)]
        #[test]
        fn test_key_file_owner_only() {
            use std::os::unix::fs::PermissionsExt;

            let dir = TempDir::new().unwrap();
            let vault = Vault::open(dir.path());
            vault.store(&jane()).unwrap();
            let mode = std::fs::metadata(vault.key_path())
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
