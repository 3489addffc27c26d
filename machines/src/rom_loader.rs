//! Program image loading and validation.
//!
//! A [`RomSet`] is a bag of named files gathered from a directory, a ZIP
//! archive or test slices. A [`RomRegion`] says how some of those files are
//! laid out in a machine's address space and validates them on the way in.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;

use tracing::debug;

/// Reflected CRC-32 (poly 0xEDB88320), the variant ZIP and MAME use.
fn crc32(data: &[u8]) -> u32 {
    const TABLE: [u32; 256] = build_crc_table();
    let crc = data.iter().fold(u32::MAX, |crc, &byte| {
        TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8)
    });
    !crc
}

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < table.len() {
        let mut value = n as u32;
        let mut bit = 0;
        while bit < 8 {
            value = if value & 1 == 1 {
                0xEDB8_8320 ^ (value >> 1)
            } else {
                value >> 1
            };
            bit += 1;
        }
        table[n] = value;
        n += 1;
    }
    table
}

#[derive(Debug)]
pub enum RomLoadError {
    /// Reading the files failed (missing path, permissions, corrupt archive).
    Io(io::Error),
    /// The set has no file with this name.
    MissingFile(String),
    SizeMismatch {
        file: String,
        expected: usize,
        actual: usize,
    },
    /// The file is the right size but not the known dump.
    ChecksumMismatch {
        file: String,
        expected: u32,
        actual: u32,
    },
}

impl fmt::Display for RomLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MissingFile(name) => write!(f, "missing ROM file: {name}"),
            Self::SizeMismatch {
                file,
                expected,
                actual,
            } => write!(f, "{file} is {actual} bytes, {expected} expected"),
            Self::ChecksumMismatch {
                file,
                expected,
                actual,
            } => write!(
                f,
                "{file} has CRC-32 {actual:08x}, {expected:08x} expected (try --skip-checksums)"
            ),
        }
    }
}

impl std::error::Error for RomLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RomLoadError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Named ROM files, independent of where they were read from.
pub struct RomSet {
    files: HashMap<String, Vec<u8>>,
}

impl RomSet {
    /// Read every regular file directly inside `path`, keyed by file name.
    pub fn from_directory(path: &Path) -> Result<Self, RomLoadError> {
        let mut files = HashMap::new();
        for dir_entry in std::fs::read_dir(path)? {
            let file_path = dir_entry?.path();
            if !file_path.is_file() {
                continue;
            }
            if let Some(name) = file_path.file_name() {
                let name = name.to_string_lossy().into_owned();
                files.insert(name, std::fs::read(&file_path)?);
            }
        }
        debug!(dir = %path.display(), files = files.len(), "read ROM directory");
        Ok(Self { files })
    }

    /// Build a set from owned (name, data) pairs, e.g. extracted from an archive.
    ///
    /// Names are reduced to their final path component so that archives with
    /// a top-level folder still resolve.
    pub fn from_entries(entries: Vec<(String, Vec<u8>)>) -> Self {
        let files = entries
            .into_iter()
            .map(|(name, data)| {
                let base = name.rsplit('/').next().unwrap_or_default();
                (base.to_owned(), data)
            })
            .collect();
        Self { files }
    }

    pub fn from_slices(entries: &[(&str, &[u8])]) -> Self {
        let files = entries
            .iter()
            .map(|&(name, data)| (name.to_owned(), data.to_owned()))
            .collect();
        Self { files }
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn require(&self, name: &str) -> Result<&[u8], RomLoadError> {
        self.get(name)
            .ok_or_else(|| RomLoadError::MissingFile(name.to_owned()))
    }

    /// Like [`require`](Self::require), but the file must be exactly `size` bytes.
    pub fn require_sized(&self, name: &str, size: usize) -> Result<&[u8], RomLoadError> {
        let data = self.require(name)?;
        if data.len() == size {
            Ok(data)
        } else {
            Err(RomLoadError::SizeMismatch {
                file: name.to_owned(),
                expected: size,
                actual: data.len(),
            })
        }
    }

    /// File names in no particular order.
    pub fn file_names(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }
}

/// Whether [`RomRegion::load`] checks CRC-32 values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChecksumPolicy {
    #[default]
    Verify,
    /// Accept any content of the right size (modified or homebrew images).
    Skip,
}

/// One ROM file and where it lands inside a [`RomRegion`].
pub struct RomEntry {
    pub name: &'static str,
    pub size: usize,
    pub offset: usize,
    /// `None` accepts any content; `Some` is checked under [`ChecksumPolicy::Verify`].
    pub crc32: Option<u32>,
}

/// A block of memory assembled from one or more ROM files.
pub struct RomRegion {
    pub size: usize,
    pub entries: &'static [RomEntry],
}

impl RomRegion {
    /// True if every file this region needs is present (sizes unchecked).
    pub fn is_present_in(&self, rom_set: &RomSet) -> bool {
        self.entries.iter().all(|e| rom_set.contains(e.name))
    }

    /// Assemble the region from `rom_set`. Gaps between entries stay zero.
    pub fn load(&self, rom_set: &RomSet, policy: ChecksumPolicy) -> Result<Vec<u8>, RomLoadError> {
        let mut image = vec![0u8; self.size];

        for entry in self.entries {
            let end = entry.offset + entry.size;
            debug_assert!(end <= self.size, "{} overruns its region", entry.name);

            let data = rom_set.require_sized(entry.name, entry.size)?;
            if let (ChecksumPolicy::Verify, Some(expected)) = (policy, entry.crc32) {
                let actual = crc32(data);
                if actual != expected {
                    return Err(RomLoadError::ChecksumMismatch {
                        file: entry.name.to_owned(),
                        expected,
                        actual,
                    });
                }
            }

            debug!(rom = entry.name, offset = entry.offset, size = entry.size, "loaded ROM");
            image[entry.offset..end].copy_from_slice(data);
        }

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_matches_reference_values() {
        assert_eq!(crc32(b""), 0);
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(&[0x00]), 0xD202_EF8D);
    }

    #[test]
    fn require_reports_missing_and_wrong_size() {
        let rom_set = RomSet::from_slices(&[("invaders.h", &[0u8; 100])]);
        assert!(matches!(
            rom_set.require("invaders.g"),
            Err(RomLoadError::MissingFile(name)) if name == "invaders.g"
        ));
        assert!(matches!(
            rom_set.require_sized("invaders.h", 0x800),
            Err(RomLoadError::SizeMismatch { expected: 0x800, actual: 100, .. })
        ));
        assert!(rom_set.require_sized("invaders.h", 100).is_ok());
    }

    #[test]
    fn from_entries_strips_archive_folders() {
        let rom_set = RomSet::from_entries(vec![
            ("invaders/invaders.e".to_string(), vec![1, 2]),
            ("invaders.f".to_string(), vec![3]),
        ]);
        let mut names = rom_set.file_names();
        names.sort_unstable();
        assert_eq!(names, vec!["invaders.e", "invaders.f"]);
        assert_eq!(rom_set.get("invaders.e"), Some(&[1, 2][..]));
    }

    static TWO_HALVES: RomRegion = RomRegion {
        size: 8,
        entries: &[
            RomEntry {
                name: "lo.bin",
                size: 4,
                offset: 0,
                crc32: None,
            },
            RomEntry {
                name: "hi.bin",
                size: 4,
                offset: 4,
                crc32: Some(0xDEAD_BEEF),
            },
        ],
    };

    static WITH_GAP: RomRegion = RomRegion {
        size: 12,
        entries: &[
            RomEntry {
                name: "a.bin",
                size: 4,
                offset: 0,
                crc32: None,
            },
            RomEntry {
                name: "b.bin",
                size: 4,
                offset: 8,
                crc32: None,
            },
        ],
    };

    #[test]
    fn load_places_entries_at_offsets() {
        let rom_set = RomSet::from_slices(&[("a.bin", &[0x11; 4]), ("b.bin", &[0x22; 4])]);
        let image = WITH_GAP.load(&rom_set, ChecksumPolicy::Verify).unwrap();
        assert_eq!(&image[..4], &[0x11; 4]);
        assert_eq!(&image[4..8], &[0x00; 4], "gap stays zero");
        assert_eq!(&image[8..], &[0x22; 4]);
    }

    #[test]
    fn verify_rejects_bad_checksum() {
        let rom_set = RomSet::from_slices(&[("lo.bin", &[0; 4]), ("hi.bin", &[1, 2, 3, 4])]);
        let err = TWO_HALVES.load(&rom_set, ChecksumPolicy::Verify).unwrap_err();
        assert!(matches!(
            err,
            RomLoadError::ChecksumMismatch { expected: 0xDEAD_BEEF, .. }
        ));
    }

    #[test]
    fn skip_accepts_bad_checksum_but_not_bad_size() {
        let rom_set = RomSet::from_slices(&[("lo.bin", &[0; 4]), ("hi.bin", &[1, 2, 3, 4])]);
        let image = TWO_HALVES.load(&rom_set, ChecksumPolicy::Skip).unwrap();
        assert_eq!(image, vec![0, 0, 0, 0, 1, 2, 3, 4]);

        let short = RomSet::from_slices(&[("lo.bin", &[0; 4]), ("hi.bin", &[1, 2])]);
        assert!(matches!(
            TWO_HALVES.load(&short, ChecksumPolicy::Skip),
            Err(RomLoadError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn matching_checksum_is_accepted() {
        static SIGNED: RomRegion = RomRegion {
            size: 9,
            entries: &[RomEntry {
                name: "check.bin",
                size: 9,
                offset: 0,
                crc32: Some(0xCBF4_3926),
            }],
        };
        let rom_set = RomSet::from_slices(&[("check.bin", b"123456789")]);
        let image = SIGNED.load(&rom_set, ChecksumPolicy::Verify).unwrap();
        assert_eq!(image, b"123456789");
    }

    #[test]
    fn presence_check_ignores_sizes() {
        let partial = RomSet::from_slices(&[("lo.bin", &[0; 1])]);
        assert!(!TWO_HALVES.is_present_in(&partial));
        let full = RomSet::from_slices(&[("lo.bin", &[0; 1]), ("hi.bin", &[0; 1])]);
        assert!(TWO_HALVES.is_present_in(&full));
    }

    #[test]
    fn directory_listing_skips_subdirectories() {
        let dir = std::env::temp_dir().join("vblank_rom_loader_dir");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("invaders"), [0xAA, 0xBB]).unwrap();

        let rom_set = RomSet::from_directory(&dir).unwrap();
        assert_eq!(rom_set.get("invaders"), Some(&[0xAA, 0xBB][..]));
        assert_eq!(rom_set.file_names(), vec!["invaders"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
