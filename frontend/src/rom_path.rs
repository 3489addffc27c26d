//! Turns the `<rom-path>` argument into a [`RomSet`].
//!
//! Accepted forms, checked in order:
//! 1. a `.zip` archive;
//! 2. a rompath directory holding `<rom_name>.zip`;
//! 3. a directory of loose ROM files;
//! 4. a single bare program image, registered under `<rom_name>`.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::debug;
use vblank_machines::rom_loader::{RomLoadError, RomSet};

pub fn load_rom_set(rom_name: &str, path: &Path) -> Result<RomSet, RomLoadError> {
    if is_zip(path) {
        return load_from_zip(path);
    }

    if path.is_dir() {
        let archive = path.join(format!("{rom_name}.zip"));
        if archive.is_file() {
            return load_from_zip(&archive);
        }
        return RomSet::from_directory(path);
    }

    if path.is_file() {
        debug!(image = %path.display(), "reading bare program image");
        let data = std::fs::read(path)?;
        return Ok(RomSet::from_entries(vec![(rom_name.to_string(), data)]));
    }

    Err(RomLoadError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("ROM path not found: {}", path.display()),
    )))
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

fn invalid_zip(e: zip::result::ZipError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("invalid ZIP: {e}"))
}

fn load_from_zip(path: &Path) -> Result<RomSet, RomLoadError> {
    debug!(archive = %path.display(), "reading ROM archive");
    let mut archive = zip::ZipArchive::new(BufReader::new(File::open(path)?)).map_err(invalid_zip)?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index).map_err(invalid_zip)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        entries.push((name, data));
    }

    Ok(RomSet::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, data) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn zip_archive_given_directly() {
        let dir = scratch_dir("vblank_rompath_zip");
        let archive = dir.join("anything.ZIP");
        write_zip(&archive, &[("invaders.h", &[0xAA; 16])]);

        let rom_set = load_rom_set("invaders", &archive).unwrap();
        assert_eq!(rom_set.get("invaders.h"), Some(&[0xAA; 16][..]));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rompath_directory_prefers_named_zip() {
        let dir = scratch_dir("vblank_rompath_dir");
        write_zip(
            &dir.join("invaders.zip"),
            &[("invaders/invaders.e", &[0xBB; 8])],
        );
        std::fs::write(dir.join("invaders.e"), [0x00; 8]).unwrap();

        let rom_set = load_rom_set("invaders", &dir).unwrap();
        assert_eq!(rom_set.get("invaders.e"), Some(&[0xBB; 8][..]));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn loose_files_without_zip() {
        let dir = scratch_dir("vblank_rompath_loose");
        std::fs::write(dir.join("invaders.f"), [0xCC; 4]).unwrap();

        let rom_set = load_rom_set("invaders", &dir).unwrap();
        assert_eq!(rom_set.get("invaders.f"), Some(&[0xCC; 4][..]));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn bare_image_is_named_after_the_set() {
        let dir = scratch_dir("vblank_rompath_image");
        let image = dir.join("si.bin");
        std::fs::write(&image, [0xDD; 32]).unwrap();

        let rom_set = load_rom_set("invaders", &image).unwrap();
        assert_eq!(rom_set.file_names(), vec!["invaders"]);
        assert_eq!(rom_set.get("invaders"), Some(&[0xDD; 32][..]));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_path_is_not_found() {
        let path = std::env::temp_dir().join("vblank_rompath_does_not_exist");
        let _ = std::fs::remove_dir_all(&path);
        match load_rom_set("invaders", &path) {
            Err(RomLoadError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn corrupt_zip_is_invalid_data() {
        let dir = scratch_dir("vblank_rompath_corrupt");
        let archive = dir.join("invaders.zip");
        std::fs::write(&archive, b"not a zip").unwrap();

        match load_rom_set("invaders", &archive) {
            Err(RomLoadError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
            other => panic!("expected InvalidData, got {:?}", other.err()),
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
