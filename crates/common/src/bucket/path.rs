use std::fmt;

use crate::error::BucketError;

/// A slash-separated path inside a bucket, relative to the bucket root.
///
/// One leading and one trailing `/` are tolerated and dropped; the empty
///  string (or `/`) is the root. Empty, `.` and `..` segments are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BucketPath(Vec<String>);

impl BucketPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn parse(path: &str) -> Result<Self, BucketError> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(BucketError::InvalidPath(path.to_string()));
            }
            segments.push(segment.to_string());
        }
        Ok(Self(segments))
    }

    /// Parse a path that must name something below the root,
    ///  e.g. a push destination
    pub fn parse_non_root(path: &str) -> Result<Self, BucketError> {
        let parsed = Self::parse(path)?;
        if parsed.is_root() {
            return Err(BucketError::InvalidPath(path.to_string()));
        }
        Ok(parsed)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<BucketPath> {
        if self.is_root() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn join(&self, name: &str) -> BucketPath {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    /// Whether `self` is `other` or lies below it
    pub fn starts_with(&self, other: &BucketPath) -> bool {
        self.0.starts_with(&other.0)
    }

    /// The root, then every ancestor down to and including `self`
    pub fn lineage(&self) -> impl Iterator<Item = BucketPath> + '_ {
        (0..=self.0.len()).map(move |n| Self(self.0[..n].to_vec()))
    }
}

impl fmt::Display for BucketPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl std::str::FromStr for BucketPath {
    type Err = BucketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        assert!(BucketPath::parse("").unwrap().is_root());
        assert!(BucketPath::parse("/").unwrap().is_root());
        let path = BucketPath::parse("/dir1/file1.jpg").unwrap();
        assert_eq!(path.segments(), &["dir1", "file1.jpg"]);
        assert_eq!(path.to_string(), "dir1/file1.jpg");
        assert_eq!(BucketPath::parse("path/to/").unwrap().to_string(), "path/to");
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(BucketPath::parse("a//b").is_err());
        assert!(BucketPath::parse("//a").is_err());
        assert!(BucketPath::parse("a/../b").is_err());
        assert!(BucketPath::parse_non_root("/").is_err());
        assert!(BucketPath::parse_non_root("index.html").is_ok());
    }

    #[test]
    fn test_relations() {
        let path = BucketPath::parse("path/to/file2.jpg").unwrap();
        assert_eq!(path.name(), Some("file2.jpg"));
        assert_eq!(path.parent().unwrap().to_string(), "path/to");
        assert!(path.starts_with(&BucketPath::parse("path").unwrap()));
        assert!(path.starts_with(&BucketPath::root()));
        assert!(!path.starts_with(&BucketPath::parse("pa").unwrap()));

        let lineage: Vec<String> = path.lineage().map(|p| p.to_string()).collect();
        assert_eq!(lineage, vec!["", "path", "path/to", "path/to/file2.jpg"]);
    }
}
