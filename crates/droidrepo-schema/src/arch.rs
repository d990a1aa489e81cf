//! CPU architecture of a target device.
//!
//! F-Droid repositories describe native code by Android ABI name
//! (`arm64-v8a`, `armeabi-v7a`, ...). [`Arch`] is the closed set of
//! architectures we know how to select builds for, plus an explicit
//! [`Arch::Unknown`] for devices whose ABI list matched nothing.
//!
//! # Example
//!
//! ```
//! use droidrepo_schema::Arch;
//!
//! let arch = Arch::from_abi_list("arm64-v8a,armeabi-v7a,armeabi");
//! assert_eq!(arch, Arch::ArmV8A);
//! assert_eq!(arch.native_tag(), Some("arm64-v8a"));
//! ```

/// Target device architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit ARM (`ARMv8-A`).
    ArmV8A,
    /// 32-bit ARM (`ARMv7-A`).
    ArmV7A,
    /// 64-bit x86, mostly emulators.
    X86_64,
    /// 32-bit x86.
    X86,
    /// The device reported no ABI we recognise.
    Unknown,
}

impl Arch {
    /// Every architecture that has a repository tag, in device-preference order.
    pub const KNOWN: [Arch; 4] = [Self::ArmV8A, Self::ArmV7A, Self::X86_64, Self::X86];

    /// Repository-specific `nativecode` label for this architecture.
    ///
    /// Returns `None` for [`Arch::Unknown`]. There is no fallback label:
    /// callers must treat `None` as "unsupported".
    pub fn native_tag(&self) -> Option<&'static str> {
        match self {
            Self::ArmV8A => Some("arm64-v8a"),
            Self::ArmV7A => Some("armeabi-v7a"),
            Self::X86_64 => Some("x86_64"),
            Self::X86 => Some("x86"),
            Self::Unknown => None,
        }
    }

    /// Parse the output of `getprop ro.product.cpu.abilist`.
    ///
    /// The list is ordered by device preference, so the first ABI that maps
    /// to a known architecture wins. Unrecognised entries such as the legacy
    /// `armeabi` are skipped.
    pub fn from_abi_list(abilist: &str) -> Self {
        abilist
            .split(',')
            .map(str::trim)
            .find_map(|abi| abi.parse::<Self>().ok())
            .unwrap_or(Self::Unknown)
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.native_tag().unwrap_or("unknown"))
    }
}

impl std::str::FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arm64-v8a" | "arm64" | "aarch64" | "armv8-a" => Ok(Self::ArmV8A),
            "armeabi-v7a" | "armv7" | "armv7-a" => Ok(Self::ArmV7A),
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "x86" | "i686" => Ok(Self::X86),
            _ => Err(format!("Unknown architecture: {s}")),
        }
    }
}
