//! Build settings: the four axes describing the target environment.
//!
//! Settings are supplied by the caller as `key=value` pairs (`os=Linux`,
//! `compiler.cppstd=20`) or as `[settings]` tables in profile files. They are
//! read-only to the recipe. The only optional axis that changes lifecycle
//! behavior is `compiler.cppstd`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::standard::CppStd;

/// Error for settings the caller must reject before a lifecycle run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown setting `{0}`")]
    UnknownKey(String),

    #[error("setting `{0}` expects `key=value`")]
    MissingValue(String),

    #[error("invalid value `{value}` for setting `{key}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// CMake-style build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    /// Name as CMake spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "minsizerel" => Ok(BuildType::MinSizeRel),
            _ => Err("expected Debug, Release, RelWithDebInfo or MinSizeRel".to_string()),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `compiler` axis and its sub-settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompilerSettings {
    /// Compiler family (`gcc`, `clang`, `apple-clang`, `msvc`)
    pub name: String,

    /// Compiler version, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Language standard. Absent unless the caller sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cppstd: Option<CppStd>,

    /// C++ runtime library (`libstdc++11`, `libc++`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libcxx: Option<String>,
}

impl CompilerSettings {
    /// Compiler with only a family name.
    pub fn new(name: impl Into<String>) -> Self {
        CompilerSettings {
            name: name.into(),
            version: None,
            cppstd: None,
            libcxx: None,
        }
    }

    /// Whether the compiler drives multi-config generators (Visual Studio).
    pub fn is_multi_config(&self) -> bool {
        self.name == "msvc"
    }
}

/// Settings describing the target environment of one lifecycle run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildSettings {
    pub os: String,
    pub arch: String,
    pub build_type: BuildType,
    pub compiler: CompilerSettings,
}

impl BuildSettings {
    /// Settings detected from the host this binary was compiled for.
    pub fn host() -> Self {
        let os = match std::env::consts::OS {
            "linux" => "Linux",
            "macos" => "Macos",
            "windows" => "Windows",
            "freebsd" => "FreeBSD",
            other => other,
        };

        let arch = match std::env::consts::ARCH {
            "x86_64" => "x86_64",
            "aarch64" => "armv8",
            "x86" => "x86",
            "arm" => "armv7",
            other => other,
        };

        let compiler = match std::env::consts::OS {
            "windows" => "msvc",
            "macos" => "apple-clang",
            _ => "gcc",
        };

        BuildSettings {
            os: os.to_string(),
            arch: arch.to_string(),
            build_type: BuildType::Release,
            compiler: CompilerSettings::new(compiler),
        }
    }

    /// The language standard, if the caller specified one.
    pub fn cppstd(&self) -> Option<CppStd> {
        self.compiler.cppstd
    }

    /// Apply a single `key=value` assignment.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let key = key.trim();
        let value = value.trim();
        let invalid = |reason: String| SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        if value.is_empty() {
            return Err(SettingsError::MissingValue(key.to_string()));
        }

        match key {
            "os" => self.os = value.to_string(),
            "arch" => self.arch = value.to_string(),
            "build_type" => self.build_type = value.parse().map_err(invalid)?,
            "compiler" => {
                // A different compiler family invalidates its sub-settings.
                if self.compiler.name != value {
                    self.compiler = CompilerSettings::new(value);
                }
            }
            "compiler.version" => self.compiler.version = Some(value.to_string()),
            "compiler.cppstd" => {
                self.compiler.cppstd = Some(value.parse().map_err(|e| invalid(format!("{}", e)))?)
            }
            "compiler.libcxx" => self.compiler.libcxx = Some(value.to_string()),
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }

        Ok(())
    }

    /// Apply a `key=value` pair as written on the command line.
    pub fn apply_pair(&mut self, pair: &str) -> Result<(), SettingsError> {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| SettingsError::MissingValue(pair.trim().to_string()))?;
        self.set(key, value)
    }

    /// Apply assignments in order. `compiler` is applied before its
    /// sub-settings so a map read from a profile behaves like the CLI.
    pub fn apply_map(&mut self, values: &BTreeMap<String, String>) -> Result<(), SettingsError> {
        if let Some(compiler) = values.get("compiler") {
            self.set("compiler", compiler)?;
        }
        for (key, value) in values {
            if key != "compiler" {
                self.set(key, value)?;
            }
        }
        Ok(())
    }

    /// Canonical `key=value` pairs sorted by key, used for hashing and display.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("arch".to_string(), self.arch.clone()),
            ("build_type".to_string(), self.build_type.to_string()),
            ("compiler".to_string(), self.compiler.name.clone()),
        ];
        if let Some(cppstd) = self.compiler.cppstd {
            pairs.push(("compiler.cppstd".to_string(), cppstd.to_string()));
        }
        if let Some(ref libcxx) = self.compiler.libcxx {
            pairs.push(("compiler.libcxx".to_string(), libcxx.clone()));
        }
        if let Some(ref version) = self.compiler.version {
            pairs.push(("compiler.version".to_string(), version.clone()));
        }
        pairs.push(("os".to_string(), self.os.clone()));
        pairs
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self::host()
    }
}

/// A settings axis the manifest declares it depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingAxis {
    Os,
    Compiler,
    BuildType,
    Arch,
}

impl SettingAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingAxis::Os => "os",
            SettingAxis::Compiler => "compiler",
            SettingAxis::BuildType => "build_type",
            SettingAxis::Arch => "arch",
        }
    }
}
