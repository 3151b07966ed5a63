use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::types::info_json::InfoJson;
use crate::types::models::installed_mod::InstalledMod;
use crate::types::version::Version;

static FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+)_(?P<version>\d+(?:\.\d+){0,3})\.zip$").unwrap()
});

/// Lists every mod archive in `dir`. A missing directory is an empty listing.
pub fn scan_dir(dir: &Path) -> std::io::Result<Vec<InstalledMod>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e),
    };

    let mut mods = vec![];
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // in-flight downloads
        if file_name.starts_with('.') || !file_name.ends_with(".zip") {
            continue;
        }

        match describe(&path, file_name) {
            Some(m) => mods.push(m),
            None => log::warn!("Skipping unrecognized file in mods dir: {}", path.display()),
        }
    }

    mods.sort_by(|a, b| a.name.cmp(&b.name).then(a.version.cmp(&b.version)));
    Ok(mods)
}

fn describe(path: &Path, file_name: &str) -> Option<InstalledMod> {
    let from_archive = File::open(path)
        .map_err(|e| e.to_string())
        .and_then(|f| InfoJson::from_zip(BufReader::new(f)).map_err(|e| e.to_string()));

    match from_archive {
        Ok(info) => Some(InstalledMod {
            name: info.name,
            version: info.version,
            path: PathBuf::from(path),
        }),
        Err(e) => {
            log::debug!("No usable info.json in {}: {}", path.display(), e);
            parse_file_name(file_name).map(|(name, version)| InstalledMod {
                name,
                version,
                path: PathBuf::from(path),
            })
        }
    }
}

/// Splits `<name>_<version>.zip` on the last underscore.
pub fn parse_file_name(file_name: &str) -> Option<(String, Version)> {
    let captures = FILE_NAME.captures(file_name)?;
    let version = captures["version"].parse::<Version>().ok()?;
    Some((captures["name"].to_string(), version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    #[test]
    fn parses_conventional_file_names() {
        assert_eq!(
            parse_file_name("x_1.0.0.zip"),
            Some(("x".to_string(), Version::new(1, 0, 0)))
        );
        assert_eq!(
            parse_file_name("even_more_underscores_0.18.2.zip"),
            Some(("even_more_underscores".to_string(), Version::new(0, 18, 2)))
        );
        assert_eq!(parse_file_name("noversion.zip"), None);
        assert_eq!(parse_file_name("x_1.0.0.tar"), None);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_dir(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn prefers_info_json_and_skips_noise() {
        let dir = tempfile::tempdir().unwrap();

        let file = File::create(dir.path().join("renamed.zip")).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("belts_3.2.1/info.json", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(br#"{"name": "belts", "version": "3.2.1"}"#)
            .unwrap();
        writer.finish().unwrap();

        std::fs::write(dir.path().join("trains_1.1.0.zip"), b"not a real archive").unwrap();
        std::fs::write(dir.path().join(".trains_1.2.0.zip.part"), b"partial").unwrap();
        std::fs::write(dir.path().join("mod-list.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("junk.zip"), b"junk").unwrap();

        let mods = scan_dir(dir.path()).unwrap();
        assert_eq!(mods.len(), 2);
        assert_eq!(mods[0].name, "belts");
        assert_eq!(mods[0].version, Version::new(3, 2, 1));
        assert!(mods[0].path.ends_with("renamed.zip"));
        assert_eq!(mods[1].name, "trains");
        assert_eq!(mods[1].version, Version::new(1, 1, 0));
    }
}
