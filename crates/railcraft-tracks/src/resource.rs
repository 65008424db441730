use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Errors from parsing a [`ResourceLocation`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResourceLocationError {
    #[error("invalid character {ch:?} in namespace of {input:?}")]
    InvalidNamespace { input: String, ch: char },
    #[error("invalid character {ch:?} in path of {input:?}")]
    InvalidPath { input: String, ch: char },
    #[error("empty path in {0:?}")]
    EmptyPath(String),
}

/// A namespaced identifier such as `railcraft:one_way`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ResourceLocation {
    pub namespace: Cow<'static, str>,
    pub path: Cow<'static, str>,
}

impl ResourceLocation {
    pub const DEFAULT_NAMESPACE: &'static str = "minecraft";
    pub const RAILCRAFT_NAMESPACE: &'static str = "railcraft";

    pub const fn railcraft(path: &'static str) -> Self {
        Self {
            namespace: Cow::Borrowed(Self::RAILCRAFT_NAMESPACE),
            path: Cow::Borrowed(path),
        }
    }

    pub fn valid_namespace_char(c: char) -> bool {
        c == '_' || c == '-' || c == '.' || c.is_ascii_lowercase() || c.is_ascii_digit()
    }

    pub fn valid_path_char(c: char) -> bool {
        Self::valid_namespace_char(c) || c == '/'
    }
}

impl FromStr for ResourceLocation {
    type Err = ResourceLocationError;

    /// Parse `namespace:path`; a bare `path` gets the default namespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, path) = s.split_once(':').unwrap_or((Self::DEFAULT_NAMESPACE, s));
        if let Some(ch) = namespace.chars().find(|&c| !Self::valid_namespace_char(c)) {
            return Err(ResourceLocationError::InvalidNamespace {
                input: s.to_owned(),
                ch,
            });
        }
        if path.is_empty() {
            return Err(ResourceLocationError::EmptyPath(s.to_owned()));
        }
        if let Some(ch) = path.chars().find(|&c| !Self::valid_path_char(c)) {
            return Err(ResourceLocationError::InvalidPath {
                input: s.to_owned(),
                ch,
            });
        }
        Ok(Self {
            namespace: Cow::Owned(namespace.to_owned()),
            path: Cow::Owned(path.to_owned()),
        })
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}
