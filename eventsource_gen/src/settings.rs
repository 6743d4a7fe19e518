// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use crate::source_info::GenerationOptions;
use crate::types::TypeSupport;
use core::fmt;
use core::str::FromStr;

/// A .NET Framework version such as `4.6`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameworkVersion {
    pub major: u32,
    pub minor: u32,
}

impl FrameworkVersion {
    /// First version whose `EventSource` accepts `char`, `IntPtr` and `byte*`.
    pub const V4_6: FrameworkVersion = FrameworkVersion::new(4, 6);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for FrameworkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid framework version `{0}`, expected e.g. `4.6`")]
pub struct ParseVersionError(String);

impl FromStr for FrameworkVersion {
    type Err = ParseVersionError;

    /// Accepts `4.6`, `v4.6`, `4.6.1` (the patch level is ignored) and `4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError(s.to_owned());
        let text = s.trim();
        let text = text
            .strip_prefix('v')
            .or_else(|| text.strip_prefix('V'))
            .unwrap_or(text);

        let mut parts = text.split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(err)?;
        let minor = match parts.next() {
            Some(p) => p.parse().map_err(|_| err())?,
            None => 0,
        };
        if let Some(patch) = parts.next() {
            patch.parse::<u32>().map_err(|_| err())?;
        }
        Ok(FrameworkVersion::new(major, minor))
    }
}

/// Per-invocation settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub framework: FrameworkVersion,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            framework: FrameworkVersion::V4_6,
        }
    }
}

impl GeneratorSettings {
    pub fn new(framework: FrameworkVersion) -> Self {
        Self { framework }
    }

    pub fn type_support(&self, options: &GenerationOptions) -> TypeSupport {
        TypeSupport::new(
            self.framework >= FrameworkVersion::V4_6 && !options.net45_event_source_compatibility,
        )
    }
}
