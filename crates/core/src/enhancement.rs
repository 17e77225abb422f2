//! Enhancement type and lifecycle status enums.
//!
//! Both enums are stored as lowercase TEXT in the database and travel as
//! lowercase strings in JSON, so each variant carries its wire name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// The lowercase wire/database name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        $label,
                        [$( $text ),+].join(", ")
                    ))),
                }
            }
        }
    };
}

define_text_enum! {
    /// The kind of enhancement a user asked for.
    EnhancementType, "enhancement type" {
        Upscale = "upscale",
        Denoise = "denoise",
        Sharpen = "sharpen",
        Restore = "restore",
    }
}

define_text_enum! {
    /// Lifecycle of an enhancement record.
    ///
    /// Starts at `Processing` and moves exactly once to a terminal state.
    EnhancementStatus, "enhancement status" {
        Processing = "processing",
        Completed = "completed",
        Failed = "failed",
    }
}

/// Enhancement type applied when an upload omits the field.
pub const DEFAULT_ENHANCEMENT_TYPE: EnhancementType = EnhancementType::Upscale;

impl EnhancementStatus {
    /// `true` for `Completed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, EnhancementStatus::Processing)
    }
}
