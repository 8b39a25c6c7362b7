//! Per-project branding overrides.
//!
//! An override is a sparse patch: every field is optional and the merge is
//! field by field, down to individual color slots. The project id and its
//! credential pairs are not representable here, so no override can touch them.

use crate::project::{Color, Project};
use portal_core::PortalError;
use serde::{Deserialize, Serialize};

/// Optional replacement for each theme slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColorsOverride {
    /// Replacement primary color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<Color>,
    /// Replacement secondary color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Color>,
    /// Replacement accent color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<Color>,
    /// Replacement background color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    /// Replacement text color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Color>,
}

impl ThemeColorsOverride {
    /// True if no slot is overridden.
    pub fn is_empty(&self) -> bool {
        self.primary.is_none()
            && self.secondary.is_none()
            && self.accent.is_none()
            && self.background.is_none()
            && self.text.is_none()
    }

    fn layer(&mut self, newer: &ThemeColorsOverride) {
        overlay(&mut self.primary, &newer.primary);
        overlay(&mut self.secondary, &newer.secondary);
        overlay(&mut self.accent, &newer.accent);
        overlay(&mut self.background, &newer.background);
        overlay(&mut self.text, &newer.text);
    }
}

/// Rebranding patch persisted per project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingOverride {
    /// Replacement display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement logo location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Replacement theme slots
    #[serde(skip_serializing_if = "ThemeColorsOverride::is_empty")]
    pub colors: ThemeColorsOverride,
}

impl BrandingOverride {
    /// True if the override changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.logo.is_none() && self.colors.is_empty()
    }

    /// Reject blank names or logos.
    pub fn validate(&self) -> Result<(), PortalError> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(PortalError::invalid("branding name cannot be blank"));
        }
        if self.logo.as_deref().is_some_and(|l| l.trim().is_empty()) {
            return Err(PortalError::invalid("branding logo cannot be blank"));
        }
        Ok(())
    }

    /// Layer `newer` on top of this override; fields set in `newer` win.
    pub fn layer(&mut self, newer: &BrandingOverride) {
        overlay(&mut self.name, &newer.name);
        overlay(&mut self.logo, &newer.logo);
        self.colors.layer(&newer.colors);
    }

    /// The project as seen with this override applied.
    pub fn apply_to(&self, defaults: &Project) -> Project {
        let mut project = defaults.clone();
        if let Some(name) = &self.name {
            project.name.clone_from(name);
        }
        if let Some(logo) = &self.logo {
            project.logo.clone_from(logo);
        }
        let colors = &mut project.colors;
        replace_if_set(&mut colors.primary, &self.colors.primary);
        replace_if_set(&mut colors.secondary, &self.colors.secondary);
        replace_if_set(&mut colors.accent, &self.colors.accent);
        replace_if_set(&mut colors.background, &self.colors.background);
        replace_if_set(&mut colors.text, &self.colors.text);
        project
    }
}

fn overlay<T: Clone>(slot: &mut Option<T>, newer: &Option<T>) {
    if newer.is_some() {
        slot.clone_from(newer);
    }
}

fn replace_if_set(slot: &mut Color, value: &Option<Color>) {
    if let Some(value) = value {
        slot.clone_from(value);
    }
}
