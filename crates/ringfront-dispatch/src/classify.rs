//! The URL classifier (spec §4.1): maps a request path to one of four
//! resource kinds plus a key tuple, or fails with a classification error the
//! pipeline translates into an HTTP status.

/// The four resource kinds a path can classify as, plus `Unclassifiable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `/info`, regardless of trailing segments.
    Info,
    /// Version and account present, container and object absent.
    Account,
    /// Version, account, and container present, object absent.
    Container,
    /// Version, account, container, and object all present.
    Object,
    /// Path split cleanly but matched none of the above (e.g. version only).
    Unclassifiable,
}

/// The key tuple extracted from a classified path. Absent trailing
/// components are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceKey {
    pub version: Option<String>,
    pub account: Option<String>,
    pub container: Option<String>,
    pub object: Option<String>,
}

impl ResourceKey {
    /// Reconstructs the path this key was parsed from (spec §8's round-trip
    /// property: classifying `/v1/a/c/o` then reconstructing yields the
    /// original string).
    pub fn to_path(&self) -> String {
        let mut segments = Vec::new();
        if let Some(v) = &self.version {
            segments.push(v.as_str());
        }
        if let Some(a) = &self.account {
            segments.push(a.as_str());
        }
        if let Some(c) = &self.container {
            segments.push(c.as_str());
        }
        if let Some(o) = &self.object {
            segments.push(o.as_str());
        }
        format!("/{}", segments.join("/"))
    }
}

/// The outcome of classifying a path: its kind and the extracted key tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: ResourceKind,
    pub key: ResourceKey,
}

/// The path failed the segment grammar entirely — too few or too many
/// non-empty segments after an optional leading slash. The pipeline
/// translates this into 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("path does not split into 1-4 segments")]
pub struct MalformedPath;

/// Splits `path` on `/` and classifies it per spec §4.1.
///
/// `/info` (with or without trailing segments) always classifies as
/// [`ResourceKind::Info`]. Otherwise the path must split into 1-4 non-empty
/// segments (version, account, container, object); more or fewer is
/// [`MalformedPath`].
pub fn classify(path: &str) -> Result<Classification, MalformedPath> {
    if path == "/info" || path.starts_with("/info/") {
        return Ok(Classification {
            kind: ResourceKind::Info,
            key: ResourceKey::default(),
        });
    }

    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.is_empty() || segments.len() > 4 {
        return Err(MalformedPath);
    }

    let mut iter = segments.into_iter();
    let version = iter.next().map(str::to_string);
    let account = iter.next().map(str::to_string);
    let container = iter.next().map(str::to_string);
    let object = iter.next().map(str::to_string);

    let kind = if object.is_some() {
        ResourceKind::Object
    } else if container.is_some() {
        ResourceKind::Container
    } else if account.is_some() {
        ResourceKind::Account
    } else {
        ResourceKind::Unclassifiable
    };

    Ok(Classification {
        kind,
        key: ResourceKey {
            version,
            account,
            container,
            object,
        },
    })
}
