use super::codec::StoreFormat;
use crate::error::{PocketmarkError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Browsers whose bookmark store can be exported into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Edge,
    Chrome,
    Firefox,
}

impl Browser {
    /// Get a user-friendly display name for the browser
    pub fn display_name(&self) -> &str {
        match self {
            Browser::Edge => "Edge",
            Browser::Chrome => "Chrome",
            Browser::Firefox => "Firefox",
        }
    }

    /// Parse browser from string (case-insensitive)
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "edge" => Some(Browser::Edge),
            "chrome" => Some(Browser::Chrome),
            "firefox" => Some(Browser::Firefox),
            _ => None,
        }
    }

    /// Browser offered when the user does not pick one
    pub fn default_for(os: Os) -> Self {
        match os {
            Os::Windows | Os::MacOs => Browser::Edge,
            Os::Linux => Browser::Chrome,
        }
    }

    pub fn store_format(&self) -> StoreFormat {
        match self {
            Browser::Edge | Browser::Chrome => StoreFormat::Chromium,
            Browser::Firefox => StoreFormat::Firefox,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    MacOs,
    Linux,
}

impl Os {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            Os::Linux
        }
    }
}

/// Base directories the browsers keep their profiles under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeDirs {
    pub home: PathBuf,
    /// `%LOCALAPPDATA%`
    pub local_app_data: PathBuf,
    /// `%APPDATA%`
    pub app_data: PathBuf,
}

impl HomeDirs {
    /// Directories for a home folder, with the Windows defaults beneath it
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            local_app_data: home.join("AppData").join("Local"),
            app_data: home.join("AppData").join("Roaming"),
            home,
        }
    }

    pub fn from_env() -> Result<Self> {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .ok_or_else(|| {
                PocketmarkError::ProfileNotFound("home directory is not set".to_string())
            })?;

        let mut dirs = Self::new(home);
        if let Some(local) = std::env::var_os("LOCALAPPDATA") {
            dirs.local_app_data = PathBuf::from(local);
        }
        if let Some(roaming) = std::env::var_os("APPDATA") {
            dirs.app_data = PathBuf::from(roaming);
        }
        Ok(dirs)
    }
}

/// Finds the bookmark store of a browser's default profile
pub struct ProfileLocator {
    dirs: HomeDirs,
}

impl ProfileLocator {
    pub fn new(dirs: HomeDirs) -> Self {
        Self { dirs }
    }

    pub fn locate(&self, os: Os, browser: Browser) -> Result<PathBuf> {
        self.locate_with_profile(os, browser, None)
    }

    /// Like [`locate`](Self::locate), with an explicit Firefox profile (a
    /// directory name under the profiles directory, or an absolute path)
    pub fn locate_with_profile(
        &self,
        os: Os,
        browser: Browser,
        profile: Option<&str>,
    ) -> Result<PathBuf> {
        let path = match browser {
            Browser::Edge | Browser::Chrome => self.locate_chromium(os, browser)?,
            Browser::Firefox => self.locate_firefox(os, profile)?,
        };
        log::debug!("Located {} store at {:?}", browser.display_name(), path);
        Ok(path)
    }

    /// Candidate `Bookmarks` files in lookup order
    pub fn chromium_candidates(&self, os: Os, browser: Browser) -> Vec<PathBuf> {
        let home = &self.dirs.home;
        let local = &self.dirs.local_app_data;
        let bases = match (browser, os) {
            (Browser::Edge, Os::Windows) => vec![local.join("Microsoft").join("Edge").join("User Data")],
            (Browser::Edge, Os::MacOs) => {
                vec![home.join("Library/Application Support/Microsoft Edge")]
            }
            (Browser::Edge, Os::Linux) => vec![home.join(".config/microsoft-edge")],
            (Browser::Chrome, Os::Windows) => {
                vec![local.join("Google").join("Chrome").join("User Data")]
            }
            (Browser::Chrome, Os::MacOs) => {
                vec![home.join("Library/Application Support/Google/Chrome")]
            }
            (Browser::Chrome, Os::Linux) => vec![
                home.join(".config/google-chrome"),
                home.join(".config/chromium"),
            ],
            (Browser::Firefox, _) => Vec::new(),
        };
        bases
            .into_iter()
            .map(|base| base.join("Default").join("Bookmarks"))
            .collect()
    }

    pub fn firefox_profiles_dir(&self, os: Os) -> PathBuf {
        match os {
            Os::Windows => self
                .dirs
                .app_data
                .join("Mozilla")
                .join("Firefox")
                .join("Profiles"),
            Os::MacOs => self.dirs.home.join("Library/Application Support/Firefox/Profiles"),
            Os::Linux => self.dirs.home.join(".mozilla/firefox"),
        }
    }

    fn locate_chromium(&self, os: Os, browser: Browser) -> Result<PathBuf> {
        let candidates = self.chromium_candidates(os, browser);
        candidates
            .iter()
            .find(|path| path.is_file())
            .cloned()
            .ok_or_else(|| {
                PocketmarkError::ProfileNotFound(format!(
                    "no {} bookmarks file at {}",
                    browser.display_name(),
                    candidates
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(" or ")
                ))
            })
    }

    fn locate_firefox(&self, os: Os, profile: Option<&str>) -> Result<PathBuf> {
        let profiles_dir = self.firefox_profiles_dir(os);
        let profile_dir = match profile {
            Some(explicit) => {
                let explicit_path = Path::new(explicit);
                let dir = if explicit_path.is_absolute() {
                    explicit_path.to_path_buf()
                } else {
                    profiles_dir.join(explicit)
                };
                if !dir.is_dir() {
                    return Err(PocketmarkError::ProfileNotFound(format!(
                        "Firefox profile {:?} does not exist",
                        dir
                    )));
                }
                dir
            }
            None => default_firefox_profile(&profiles_dir)?,
        };

        let store = profile_dir.join(FIREFOX_STORE_FILE);
        if store.is_file() {
            Ok(store)
        } else {
            Err(PocketmarkError::ProfileNotFound(format!(
                "Firefox profile {:?} has no {}",
                profile_dir, FIREFOX_STORE_FILE
            )))
        }
    }
}

/// Bookmark backup file read and written inside a Firefox profile
pub const FIREFOX_STORE_FILE: &str = "bookmarks.json";

fn default_firefox_profile(profiles_dir: &Path) -> Result<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(profiles_dir)
        .map_err(|e| {
            PocketmarkError::ProfileNotFound(format!(
                "cannot read Firefox profiles in {:?}: {}",
                profiles_dir, e
            ))
        })?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    let named = |suffix: &str| -> Vec<PathBuf> {
        dirs.iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(suffix))
            })
            .cloned()
            .collect()
    };

    let mut candidates = named(".default-release");
    if candidates.is_empty() {
        candidates = named(".default");
    }

    match candidates.len() {
        0 => Err(PocketmarkError::ProfileNotFound(format!(
            "no default Firefox profile in {:?}",
            profiles_dir
        ))),
        1 => Ok(candidates.remove(0)),
        _ => Err(PocketmarkError::ProfileAmbiguous(candidates)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"{}").unwrap();
    }

    fn locator(home: &TempDir) -> ProfileLocator {
        ProfileLocator::new(HomeDirs::new(home.path()))
    }

    #[rstest]
    #[case(Os::Windows, Browser::Edge, "AppData/Local/Microsoft/Edge/User Data/Default/Bookmarks")]
    #[case(Os::MacOs, Browser::Edge, "Library/Application Support/Microsoft Edge/Default/Bookmarks")]
    #[case(Os::Linux, Browser::Edge, ".config/microsoft-edge/Default/Bookmarks")]
    #[case(Os::Windows, Browser::Chrome, "AppData/Local/Google/Chrome/User Data/Default/Bookmarks")]
    #[case(Os::MacOs, Browser::Chrome, "Library/Application Support/Google/Chrome/Default/Bookmarks")]
    #[case(Os::Linux, Browser::Chrome, ".config/google-chrome/Default/Bookmarks")]
    fn test_locate_chromium_family(#[case] os: Os, #[case] browser: Browser, #[case] rel: &str) {
        let home = TempDir::new().unwrap();
        let expected = home.path().join(rel);
        touch(&expected);

        assert_eq!(locator(&home).locate(os, browser).unwrap(), expected);
    }

    #[test]
    fn test_chrome_falls_back_to_chromium_on_linux() {
        let home = TempDir::new().unwrap();
        let chromium = home.path().join(".config/chromium/Default/Bookmarks");
        touch(&chromium);

        let found = locator(&home).locate(Os::Linux, Browser::Chrome).unwrap();
        assert_eq!(found, chromium);

        let chrome = home.path().join(".config/google-chrome/Default/Bookmarks");
        touch(&chrome);
        let found = locator(&home).locate(Os::Linux, Browser::Chrome).unwrap();
        assert_eq!(found, chrome);
    }

    #[test]
    fn test_missing_chromium_store() {
        let home = TempDir::new().unwrap();
        let err = locator(&home).locate(Os::Linux, Browser::Edge).unwrap_err();
        assert!(matches!(err, PocketmarkError::ProfileNotFound(_)));
        assert_eq!(err.stage(), "locate");
    }

    #[test]
    fn test_local_app_data_override() {
        let home = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        let expected = local.path().join("Microsoft/Edge/User Data/Default/Bookmarks");
        touch(&expected);

        let dirs = HomeDirs {
            local_app_data: local.path().to_path_buf(),
            ..HomeDirs::new(home.path())
        };
        let found = ProfileLocator::new(dirs)
            .locate(Os::Windows, Browser::Edge)
            .unwrap();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_firefox_prefers_default_release() {
        let home = TempDir::new().unwrap();
        let profiles = home.path().join(".mozilla/firefox");
        touch(&profiles.join("abcd1234.default/bookmarks.json"));
        touch(&profiles.join("wxyz9876.default-release/bookmarks.json"));

        let found = locator(&home).locate(Os::Linux, Browser::Firefox).unwrap();
        assert_eq!(found, profiles.join("wxyz9876.default-release/bookmarks.json"));
    }

    #[test]
    fn test_firefox_falls_back_to_default() {
        let home = TempDir::new().unwrap();
        let profiles = home.path().join("Library/Application Support/Firefox/Profiles");
        touch(&profiles.join("abcd1234.default/bookmarks.json"));
        fs::create_dir_all(profiles.join("other.dev-edition")).unwrap();

        let found = locator(&home).locate(Os::MacOs, Browser::Firefox).unwrap();
        assert_eq!(found, profiles.join("abcd1234.default/bookmarks.json"));
    }

    #[test]
    fn test_firefox_ambiguous_profiles() {
        let home = TempDir::new().unwrap();
        let profiles = home.path().join("AppData/Roaming/Mozilla/Firefox/Profiles");
        touch(&profiles.join("aaaa.default-release/bookmarks.json"));
        touch(&profiles.join("bbbb.default-release/bookmarks.json"));

        let err = locator(&home).locate(Os::Windows, Browser::Firefox).unwrap_err();
        match err {
            PocketmarkError::ProfileAmbiguous(candidates) => assert_eq!(
                candidates,
                vec![
                    profiles.join("aaaa.default-release"),
                    profiles.join("bbbb.default-release")
                ]
            ),
            other => panic!("expected ProfileAmbiguous, got {:?}", other),
        }
    }

    #[test]
    fn test_firefox_explicit_profile_disambiguates() {
        let home = TempDir::new().unwrap();
        let profiles = home.path().join(".mozilla/firefox");
        touch(&profiles.join("aaaa.default-release/bookmarks.json"));
        touch(&profiles.join("bbbb.default-release/bookmarks.json"));
        let loc = locator(&home);

        let by_name = loc
            .locate_with_profile(Os::Linux, Browser::Firefox, Some("bbbb.default-release"))
            .unwrap();
        assert_eq!(by_name, profiles.join("bbbb.default-release/bookmarks.json"));

        let absolute = profiles.join("aaaa.default-release");
        let by_path = loc
            .locate_with_profile(Os::Linux, Browser::Firefox, absolute.to_str())
            .unwrap();
        assert_eq!(by_path, absolute.join("bookmarks.json"));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("missing.default-release"))]
    fn test_firefox_profile_not_found(#[case] profile: Option<&str>) {
        let home = TempDir::new().unwrap();
        fs::create_dir_all(home.path().join(".mozilla/firefox/zzzz.dev-edition-default")).unwrap();

        let err = locator(&home)
            .locate_with_profile(Os::Linux, Browser::Firefox, profile)
            .unwrap_err();
        assert!(matches!(err, PocketmarkError::ProfileNotFound(_)));
    }

    #[test]
    fn test_firefox_profile_without_store_file() {
        let home = TempDir::new().unwrap();
        fs::create_dir_all(home.path().join(".mozilla/firefox/abcd.default-release")).unwrap();

        let err = locator(&home).locate(Os::Linux, Browser::Firefox).unwrap_err();
        assert!(matches!(err, PocketmarkError::ProfileNotFound(msg) if msg.contains("bookmarks.json")));
    }

    #[rstest]
    #[case(Os::Windows, Browser::Edge)]
    #[case(Os::MacOs, Browser::Edge)]
    #[case(Os::Linux, Browser::Chrome)]
    fn test_default_browser(#[case] os: Os, #[case] expected: Browser) {
        assert_eq!(Browser::default_for(os), expected);
    }

    #[test]
    fn test_browser_from_string() {
        assert_eq!(Browser::from_string("Firefox"), Some(Browser::Firefox));
        assert_eq!(Browser::from_string(" EDGE "), Some(Browser::Edge));
        assert_eq!(Browser::from_string("safari"), None);
        assert_eq!(Browser::Edge.store_format(), StoreFormat::Chromium);
    }
}
