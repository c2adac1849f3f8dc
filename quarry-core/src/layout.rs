// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Maven coordinate parsing from repository paths.
//!
//! Default Maven 2 layout:
//! `{org/as/path}/{module}/{baseRev}[-SNAPSHOT]/{module}-{revision}[-{classifier}].{ext}`
//!
//! Coordinates are derived once from a [`RepoPath`] at the boundary and
//! passed around as a structured value; nothing downstream re-splits the
//! string. Module equality (`same_module_as`) ignores revision suffixes and
//! metadata/checksum sidecar extensions - this equality is what snapshot
//! resolution and integration cleanup group by.

use std::fmt;

use crate::repo_path::RepoPath;

/// The unresolved integration placeholder in snapshot revisions.
pub const SNAPSHOT: &str = "SNAPSHOT";

/// File name of Maven repository metadata.
pub const MAVEN_METADATA_NAME: &str = "maven-metadata.xml";

const CHECKSUM_SUFFIXES: &[&str] = &[".sha1", ".md5", ".sha256"];

/// A concrete per-deployment `{yyyyMMdd.HHmmss}-{buildNumber}` revision.
///
/// Ordering is chronological: the timestamp is fixed-width digits, so the
/// derived lexicographic order matches calendar order, with the build
/// counter as tiebreak.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UniqueRevision {
    pub timestamp: String,
    pub build_number: u64,
}

impl fmt::Display for UniqueRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.timestamp, self.build_number)
    }
}

impl UniqueRevision {
    /// Parse a full `{timestamp}-{buildNumber}` string.
    pub fn parse(s: &str) -> Option<Self> {
        match parse_unique_prefix(s) {
            Some((len, rev)) if len == s.len() => Some(rev),
            _ => None,
        }
    }
}

/// Match a unique revision at the start of `s`, returning the consumed
/// length. The shape is strict: 8 digits, `.`, 6 digits, `-`, 1+ digits.
fn parse_unique_prefix(s: &str) -> Option<(usize, UniqueRevision)> {
    let bytes = s.as_bytes();
    if bytes.len() < 8 + 1 + 6 + 2 {
        return None;
    }
    if !bytes[..8].iter().all(u8::is_ascii_digit) || bytes[8] != b'.' {
        return None;
    }
    if !bytes[9..15].iter().all(u8::is_ascii_digit) || bytes[15] != b'-' {
        return None;
    }
    let digits = bytes[16..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let end = 16 + digits;
    let build_number = s[16..end].parse().ok()?;
    Some((
        end,
        UniqueRevision {
            timestamp: s[..15].to_owned(),
            build_number,
        },
    ))
}

/// Artifact coordinates derived from a repository path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleCoordinates {
    /// Dotted group id (`org.example`).
    pub organization: String,
    pub module: String,
    /// Version without any integration suffix (`1.0`).
    pub base_revision: String,
    /// `SNAPSHOT` when the enclosing version folder is unresolved.
    pub folder_integration_revision: Option<String>,
    /// Concrete per-file deployment revision, when present.
    pub file_integration_revision: Option<UniqueRevision>,
    pub classifier: Option<String>,
    /// Extension with any checksum/metadata sidecar suffix already stripped.
    pub extension: String,
}

impl ModuleCoordinates {
    /// Parse coordinates from a repository file path under Maven 2 layout.
    ///
    /// Returns `None` for paths that do not conform to the layout.
    pub fn parse(path: &RepoPath) -> Option<Self> {
        let segments: Vec<&str> = path.segments().collect();
        // group/module/version/file at minimum
        if segments.len() < 4 {
            return None;
        }
        let file_name = segments[segments.len() - 1];
        let version_folder = segments[segments.len() - 2];
        let module = segments[segments.len() - 3];
        let organization = segments[..segments.len() - 3].join(".");

        let (base_revision, folder_integration_revision) = split_version_folder(version_folder);

        let effective = strip_sidecar_suffixes(file_name);
        let rest = effective.strip_prefix(module)?.strip_prefix('-')?;

        // Anchor the revision on the folder's base revision, longest form first.
        let after_revision;
        let mut file_integration_revision = None;
        let unique_prefix = format!("{base_revision}-");
        let snapshot_prefix = format!("{base_revision}-{SNAPSHOT}");
        if let Some(tail) = rest.strip_prefix(&unique_prefix)
            && let Some((len, rev)) = parse_unique_prefix(tail)
        {
            file_integration_revision = Some(rev);
            after_revision = &tail[len..];
        } else if let Some(tail) = rest.strip_prefix(&snapshot_prefix) {
            after_revision = tail;
        } else if let Some(tail) = rest.strip_prefix(base_revision.as_str()) {
            after_revision = tail;
        } else {
            return None;
        }

        let (classifier, extension) = if let Some(ext) = after_revision.strip_prefix('.') {
            (None, ext)
        } else if let Some(tail) = after_revision.strip_prefix('-') {
            let (classifier, ext) = tail.split_once('.')?;
            if classifier.is_empty() {
                return None;
            }
            (Some(classifier.to_owned()), ext)
        } else {
            return None;
        };
        if extension.is_empty() {
            return None;
        }

        Some(Self {
            organization,
            module: module.to_owned(),
            base_revision,
            folder_integration_revision,
            file_integration_revision,
            classifier,
            extension: extension.to_owned(),
        })
    }

    /// Whether the revision is still unresolved or carries a per-deployment
    /// suffix.
    pub fn is_integration(&self) -> bool {
        self.folder_integration_revision.is_some() || self.file_integration_revision.is_some()
    }

    /// Module identity: organization, module, base revision, classifier and
    /// extension match exactly, integration suffixes ignored.
    pub fn same_module_as(&self, other: &ModuleCoordinates) -> bool {
        self.organization == other.organization
            && self.module == other.module
            && self.base_revision == other.base_revision
            && self.classifier == other.classifier
            && self.extension == other.extension
    }

    /// Group id as a path prefix (`org/example`).
    pub fn organization_path(&self) -> String {
        self.organization.replace('.', "/")
    }

    /// Name of the enclosing version folder (`1.0-SNAPSHOT` or `1.0`).
    pub fn version_folder_name(&self) -> String {
        match &self.folder_integration_revision {
            Some(int) => format!("{}-{}", self.base_revision, int),
            None => self.base_revision.clone(),
        }
    }

    /// Repo-relative path of the enclosing version folder.
    pub fn version_folder_path(&self) -> String {
        format!(
            "{}/{}/{}",
            self.organization_path(),
            self.module,
            self.version_folder_name()
        )
    }

    /// Repo-relative path of the module folder containing version folders.
    pub fn module_folder_path(&self) -> String {
        format!("{}/{}", self.organization_path(), self.module)
    }

    /// File name this coordinate renders to.
    pub fn file_name(&self) -> String {
        let mut name = format!("{}-{}", self.module, self.base_revision);
        match &self.file_integration_revision {
            Some(rev) => name.push_str(&format!("-{rev}")),
            None => {
                if self.folder_integration_revision.is_some() {
                    name.push_str(&format!("-{SNAPSHOT}"));
                }
            }
        }
        if let Some(classifier) = &self.classifier {
            name.push_str(&format!("-{classifier}"));
        }
        name.push('.');
        name.push_str(&self.extension);
        name
    }
}

/// Split a version folder name into base revision and integration part.
pub fn split_version_folder(folder: &str) -> (String, Option<String>) {
    if let Some(base) = folder.strip_suffix(&format!("-{SNAPSHOT}")) {
        return (base.to_owned(), Some(SNAPSHOT.to_owned()));
    }
    if folder == SNAPSHOT {
        return (String::new(), Some(SNAPSHOT.to_owned()));
    }
    // Folder-level integration: each deployment in its own folder
    for (i, _) in folder.match_indices('-') {
        if UniqueRevision::parse(&folder[i + 1..]).is_some() {
            return (folder[..i].to_owned(), Some(folder[i + 1..].to_owned()));
        }
    }
    (folder.to_owned(), None)
}

/// Whether `name` is a checksum sidecar file.
pub fn is_checksum_sidecar(name: &str) -> bool {
    CHECKSUM_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Whether `name` is repository metadata, standalone or attached to an
/// artifact (`foo-1.0-SNAPSHOT.jar.maven-metadata.xml`).
pub fn is_maven_metadata(name: &str) -> bool {
    name == MAVEN_METADATA_NAME || name.ends_with(&format!(".{MAVEN_METADATA_NAME}"))
}

/// Strip checksum and metadata suffixes so extensions compare by the
/// underlying artifact.
pub fn strip_sidecar_suffixes(name: &str) -> &str {
    let mut name = name;
    loop {
        if let Some(stripped) = name.strip_suffix(&format!(".{MAVEN_METADATA_NAME}")) {
            name = stripped;
            continue;
        }
        match CHECKSUM_SUFFIXES.iter().find_map(|s| name.strip_suffix(s)) {
            Some(stripped) => name = stripped,
            None => return name,
        }
    }
}

/// Jar-variant extensions whose entry listings get content-indexed.
pub fn is_jar_variant(extension: &str) -> bool {
    matches!(extension, "jar" | "war" | "ear" | "sar" | "har" | "zip")
}
