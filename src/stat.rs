use serde::{Deserialize, Serialize};
use std::{
    io::ErrorKind,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Type bits of a unix mode word
#[derive(Default, Serialize, Deserialize)]
pub struct FileType(u32);

bitflags! {
    impl FileType: u32 {
        const FIFO = 0x1000;
        const CHR = 0x2000;
        const DIR = 0x4000;
        const BLK = 0x6000;
        const REG = 0x8000;
        const LNK = 0xA000;
    }
}

/// Structured stat of one remote path, as reported by the transfer
/// subsystem's stat capability. Produced entirely outside the text-listing
/// path; fields the remote did not report are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStat {
    pub size: Option<u64>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub permissions: Option<u32>,
    pub atime: Option<u32>,
    pub mtime: Option<u32>,
}

impl PathStat {
    fn has_type(&self, r#type: FileType) -> bool {
        self.permissions.map_or(false, |b| {
            FileType::from_bits_truncate(b).contains(r#type)
        })
    }

    /// Returns `true` if the mode word marks a directory
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.has_type(FileType::DIR)
    }

    /// Returns `true` if the mode word marks a regular file
    #[must_use]
    pub fn is_regular(&self) -> bool {
        self.has_type(FileType::REG)
    }

    /// Returns `true` if the mode word marks a symlink
    #[must_use]
    pub fn is_symlink(&self) -> bool {
        self.has_type(FileType::LNK)
    }

    /// Returns the size of the file
    #[must_use]
    pub fn len(&self) -> u64 {
        self.size.unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the last access time
    pub fn accessed(&self) -> std::io::Result<SystemTime> {
        match self.atime {
            Some(time) => Ok(UNIX_EPOCH + Duration::from_secs(u64::from(time))),
            None => Err(ErrorKind::InvalidData.into()),
        }
    }

    /// Returns the last modification time
    pub fn modified(&self) -> std::io::Result<SystemTime> {
        match self.mtime {
            Some(time) => Ok(UNIX_EPOCH + Duration::from_secs(u64::from(time))),
            None => Err(ErrorKind::InvalidData.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_mode(mode: u32) -> PathStat {
        PathStat {
            permissions: Some(mode),
            ..Default::default()
        }
    }

    #[test]
    fn mode_word_type_bits() {
        assert!(with_mode(0o040_755).is_dir());
        assert!(with_mode(0o100_644).is_regular());
        assert!(with_mode(0o120_777).is_symlink());
        assert!(!with_mode(0o100_644).is_dir());
    }

    #[test]
    fn missing_mode_matches_nothing() {
        let stat = PathStat::default();
        assert!(!stat.is_dir() && !stat.is_regular() && !stat.is_symlink());
    }

    #[test]
    fn modified_converts_to_system_time() {
        let stat = PathStat {
            mtime: Some(86_400),
            ..Default::default()
        };
        assert_eq!(
            stat.modified().unwrap(),
            UNIX_EPOCH + Duration::from_secs(86_400)
        );
        assert!(PathStat::default().modified().is_err());
    }
}
