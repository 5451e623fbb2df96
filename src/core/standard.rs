//! C++ language standards.
//!
//! The `compiler.cppstd` setting names a revision of the C++ standard,
//! optionally as its GNU dialect (`gnu20`). Revisions are ordered on an
//! ordinal scale so a minimum can be checked: `98 < 11 < 14 < 17 < 20 < 23 < 26`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// C++ standard revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CppStandard {
    /// C++98
    Cpp98,
    /// C++11
    Cpp11,
    /// C++14
    Cpp14,
    /// C++17
    Cpp17,
    /// C++20
    Cpp20,
    /// C++23
    Cpp23,
    /// C++26
    Cpp26,
}

impl CppStandard {
    /// All revisions, lowest first.
    pub const ALL: [CppStandard; 7] = [
        CppStandard::Cpp98,
        CppStandard::Cpp11,
        CppStandard::Cpp14,
        CppStandard::Cpp17,
        CppStandard::Cpp20,
        CppStandard::Cpp23,
        CppStandard::Cpp26,
    ];

    /// The two-digit year the revision is known by (e.g. "17").
    pub fn as_str(&self) -> &'static str {
        match self {
            CppStandard::Cpp98 => "98",
            CppStandard::Cpp11 => "11",
            CppStandard::Cpp14 => "14",
            CppStandard::Cpp17 => "17",
            CppStandard::Cpp20 => "20",
            CppStandard::Cpp23 => "23",
            CppStandard::Cpp26 => "26",
        }
    }

    /// Value for `CMAKE_CXX_STANDARD`.
    pub fn cmake_value(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for CppStandard {
    type Err = CppStandardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let year = s
            .strip_prefix("c++")
            .or_else(|| s.strip_prefix("cpp"))
            .unwrap_or(s);

        match year {
            "98" => Ok(CppStandard::Cpp98),
            "11" => Ok(CppStandard::Cpp11),
            "14" => Ok(CppStandard::Cpp14),
            "17" => Ok(CppStandard::Cpp17),
            "20" => Ok(CppStandard::Cpp20),
            "23" => Ok(CppStandard::Cpp23),
            "26" => Ok(CppStandard::Cpp26),
            _ => Err(CppStandardParseError(s.to_string())),
        }
    }
}

impl fmt::Display for CppStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C++{}", self.as_str())
    }
}

/// Error returned when parsing an invalid C++ standard string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CppStandardParseError(pub String);

impl fmt::Display for CppStandardParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid C++ standard '{}', valid values: 98, 11, 14, 17, 20, 23, 26 (optionally gnu-prefixed)",
            self.0
        )
    }
}

impl std::error::Error for CppStandardParseError {}

/// Value of the `compiler.cppstd` setting.
///
/// Ordering only looks at the revision; `gnu20` and `20` are the same level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CppStd {
    /// Standard revision
    pub standard: CppStandard,
    /// GNU dialect (`gnu17`)
    pub gnu_extensions: bool,
}

impl CppStd {
    /// Plain ISO dialect of `standard`.
    pub fn new(standard: CppStandard) -> Self {
        CppStd {
            standard,
            gnu_extensions: false,
        }
    }

    /// GNU dialect of `standard`.
    pub fn gnu(standard: CppStandard) -> Self {
        CppStd {
            standard,
            gnu_extensions: true,
        }
    }

    /// Whether this setting is at least `minimum` on the ordinal scale.
    pub fn satisfies(&self, minimum: CppStandard) -> bool {
        self.standard >= minimum
    }
}

impl From<CppStandard> for CppStd {
    fn from(standard: CppStandard) -> Self {
        CppStd::new(standard)
    }
}

impl FromStr for CppStd {
    type Err = CppStandardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.strip_prefix("gnu") {
            Some(year) => year
                .parse()
                .map(CppStd::gnu)
                .map_err(|_| CppStandardParseError(s.to_string())),
            None => trimmed.parse().map(CppStd::new),
        }
    }
}

impl fmt::Display for CppStd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gnu_extensions {
            write!(f, "gnu{}", self.standard.as_str())
        } else {
            f.write_str(self.standard.as_str())
        }
    }
}

impl Serialize for CppStd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CppStd {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = StringOrInt::deserialize(deserializer)?;
        raw.to_string().parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for CppStandard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CppStandard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = StringOrInt::deserialize(deserializer)?;
        raw.to_string().parse().map_err(serde::de::Error::custom)
    }
}

/// TOML lets users write `cppstd = 20` as well as `cppstd = "20"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrInt {
    Str(String),
    Int(i64),
}

impl fmt::Display for StringOrInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringOrInt::Str(s) => f.write_str(s),
            StringOrInt::Int(i) => write!(f, "{}", i),
        }
    }
}
