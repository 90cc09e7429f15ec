use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! tag_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

tag_newtype!(PersonaId);

/// Catalog entry describing one audit perspective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub id: PersonaId,
    pub name: &'static str,
    pub focus: &'static str,
}

const BUILTIN_PERSONAS: &[(&str, &str, &str)] = &[
    (
        "ux-designer",
        "UX Designer",
        "Visual hierarchy, layout consistency and interaction patterns",
    ),
    (
        "accessibility-expert",
        "Accessibility Expert",
        "Contrast, legibility, target sizes and assistive technology support",
    ),
    (
        "product-manager",
        "Product Manager",
        "Clarity of value proposition, conversion paths and feature discoverability",
    ),
    (
        "developer",
        "Frontend Developer",
        "Implementation feasibility, component reuse and responsive behavior",
    ),
    (
        "first-time-user",
        "First-Time User",
        "Onboarding friction, comprehension and trust signals",
    ),
];

pub fn builtin_personas() -> Vec<Persona> {
    BUILTIN_PERSONAS
        .iter()
        .map(|&(id, name, focus)| Persona {
            id: PersonaId::new(id),
            name,
            focus,
        })
        .collect()
}

pub fn find_persona(id: &str) -> Option<Persona> {
    builtin_personas()
        .into_iter()
        .find(|persona| persona.id.as_str() == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fidelity {
    Low,
    #[default]
    Medium,
    High,
}

impl Fidelity {
    pub fn as_str(self) -> &'static str {
        match self {
            Fidelity::Low => "low",
            Fidelity::Medium => "medium",
            Fidelity::High => "high",
        }
    }
}

impl fmt::Display for Fidelity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown fidelity '{0}' (expected one of: low, medium, high)")]
pub struct UnknownFidelity(pub String);

impl FromStr for Fidelity {
    type Err = UnknownFidelity;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "lo-fi" | "lofi" => Ok(Fidelity::Low),
            "medium" | "mid" | "mid-fi" => Ok(Fidelity::Medium),
            "high" | "hi-fi" | "hifi" => Ok(Fidelity::High),
            _ => Err(UnknownFidelity(raw.to_string())),
        }
    }
}

/// User-chosen audit options, forwarded to the backend as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    pub fidelity: Fidelity,
    pub purpose: String,
}

impl AuditConfig {
    pub fn new(fidelity: Fidelity, purpose: impl Into<String>) -> Self {
        Self {
            fidelity,
            purpose: purpose.into(),
        }
    }
}

/// One named screen to audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub name: String,
    pub image_url: String,
}

impl Frame {
    pub fn new(name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStep {
    #[default]
    Persona,
    Config,
    Running,
    Results,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
