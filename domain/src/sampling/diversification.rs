use serde::{Deserialize, Serialize};
use std::fmt;

/// How the base prompt is varied across samples
///
/// Prefix templates live in [`crate::prompt::PromptTemplate::diversify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptDiversification {
    #[default]
    None,
    RoleInjection,
    InstructionVariation,
    PerspectiveShift,
    /// Role, instruction and perspective prefixes combined
    All,
}

impl PromptDiversification {
    pub fn uses_roles(&self) -> bool {
        matches!(self, Self::RoleInjection | Self::All)
    }

    pub fn uses_instructions(&self) -> bool {
        matches!(self, Self::InstructionVariation | Self::All)
    }

    pub fn uses_perspectives(&self) -> bool {
        matches!(self, Self::PerspectiveShift | Self::All)
    }
}

impl fmt::Display for PromptDiversification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::RoleInjection => "role_injection",
            Self::InstructionVariation => "instruction_variation",
            Self::PerspectiveShift => "perspective_shift",
            Self::All => "all",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PromptDiversification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "none" => Ok(Self::None),
            "role" | "role_injection" => Ok(Self::RoleInjection),
            "instruction" | "instruction_variation" => Ok(Self::InstructionVariation),
            "perspective" | "perspective_shift" => Ok(Self::PerspectiveShift),
            "all" => Ok(Self::All),
            _ => Err(format!("Invalid PromptDiversification: {}", s)),
        }
    }
}
