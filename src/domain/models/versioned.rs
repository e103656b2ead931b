pub type Version = u64;

/// A record together with the version it was read at.
///
/// `version` is `None` for records that have not been stored yet; writing such a
/// record must fail with a conflict if someone else stored it in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub record: T,
    pub version: Option<Version>,
}

impl<T> Versioned<T> {
    pub fn stored(record: T, version: Version) -> Self {
        Self {
            record,
            version: Some(version),
        }
    }

    pub fn unsaved(record: T) -> Self {
        Self {
            record,
            version: None,
        }
    }

    /// Version the record carries once the pending write lands
    pub fn next_version(&self) -> Version {
        self.version.map_or(1, |version| version + 1)
    }
}
