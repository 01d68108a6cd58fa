use std::collections::BTreeSet;
use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EnvNames;

/// An optional set of tokens. `None` means no filtering: everything is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(Option<BTreeSet<String>>);

impl Selection {
    pub fn all() -> Self {
        Self(None)
    }

    pub fn only<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Some(tokens.into_iter().map(Into::into).collect()))
    }

    /// Splits on whitespace the way the installer variables are written (`"gtk cli"`).
    /// An empty value yields an active but empty selection.
    pub fn parse(value: &str) -> Self {
        Self::only(value.split_whitespace())
    }

    pub fn is_filtering(&self) -> bool {
        self.0.is_some()
    }

    /// The selected tokens, or `None` when every token is accepted.
    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        self.0.as_ref()
    }

    pub fn accepts(&self, token: &str) -> bool {
        match &self.0 {
            Some(set) => set.contains(token),
            None => true,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(set) => {
                let tokens = set.iter().map(String::as_str).collect::<Vec<_>>();
                write!(f, "[{}]", tokens.join(", "))
            }
            None => f.write_str("(all)"),
        }
    }
}

/// Read once at process start and passed by reference to every enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCriteria {
    pub uis: Selection,
    pub languages: Selection,
    #[serde(default)]
    pub manpath_no_share: bool,
}

impl SelectionCriteria {
    pub fn everything() -> Self {
        Self::default()
    }
}

pub fn resolve_selection_criteria(names: &EnvNames) -> SelectionCriteria {
    resolve_selection_criteria_with(names, |key| {
        env::var_os(key).map(|value| value.to_string_lossy().to_string())
    })
}

pub fn resolve_selection_criteria_with<F>(names: &EnvNames, lookup: F) -> SelectionCriteria
where
    F: Fn(&str) -> Option<String>,
{
    let uis = lookup(&names.install_uis)
        .map(|value| Selection::parse(&value))
        .unwrap_or_default();
    if uis.is_filtering() {
        info!("Selected UIs (from ${}): {}", names.install_uis, uis);
    }

    let languages = lookup(&names.linguas)
        .map(|value| Selection::parse(&value))
        .unwrap_or_default();
    if languages.is_filtering() {
        info!("Selected languages (from ${}): {}", names.linguas, languages);
    }

    SelectionCriteria {
        uis,
        languages,
        manpath_no_share: lookup(&names.manpath_no_share).is_some(),
    }
}
