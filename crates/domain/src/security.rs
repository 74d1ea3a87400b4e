use std::fmt::{Display, Formatter};
use std::str::FromStr;

use orgauthz_core::{AppError, NonEmptyString};
use serde::{Deserialize, Serialize};

/// CRUD action a permission grants on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Allows creating records in the module.
    Create,
    /// Allows viewing records in the module.
    View,
    /// Allows editing records in the module.
    Edit,
    /// Allows deleting records in the module.
    Delete,
}

impl Action {
    /// Returns the stable transport literal for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::View => "view",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[Action::Create, Action::View, Action::Edit, Action::Delete];

        ALL
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Configuration(format!(
                "unknown action literal '{value}'"
            ))),
        }
    }
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Breadth of data a granted permission covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataScope {
    /// Only the actor's own data.
    Own,
    /// Data inside the actor's organization, widened by the org-level flags.
    Organization,
    /// Data of positions related to the actor's position in the reporting tree.
    PositionTree,
    /// Every record of the module.
    All,
}

impl DataScope {
    /// Returns a stable storage value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Organization => "organization",
            Self::PositionTree => "position_tree",
            Self::All => "all",
        }
    }
}

impl FromStr for DataScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "own" => Ok(Self::Own),
            "organization" => Ok(Self::Organization),
            "position_tree" => Ok(Self::PositionTree),
            "all" => Ok(Self::All),
            _ => Err(AppError::Validation(format!(
                "unknown data scope value '{value}'"
            ))),
        }
    }
}

/// Two-part permission string of the form `Module.action`, e.g. `Document.edit`.
///
/// Parsing failures are configuration errors: they describe a broken route or
/// caller setup, not a denied actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleAction {
    module_name: NonEmptyString,
    action: Action,
}

impl ModuleAction {
    /// Creates a permission from an already parsed module name and action.
    pub fn new(module_name: impl Into<String>, action: Action) -> Result<Self, AppError> {
        let module_name = NonEmptyString::new(module_name).map_err(|_| {
            AppError::Configuration("permission module name must not be empty".to_owned())
        })?;

        Ok(Self {
            module_name,
            action,
        })
    }

    /// Returns the module part.
    #[must_use]
    pub fn module_name(&self) -> &str {
        self.module_name.as_str()
    }

    /// Returns the action part.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }
}

impl FromStr for ModuleAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split('.');
        let (Some(module_name), Some(action), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::Configuration(format!(
                "permission '{value}' must have the form 'Module.action'"
            )));
        };

        if module_name.trim().is_empty() {
            return Err(AppError::Configuration(format!(
                "permission '{value}' is missing the module name"
            )));
        }

        let action = Action::from_str(action).map_err(|_| {
            AppError::Configuration(format!(
                "permission '{value}' names unknown action '{action}'"
            ))
        })?;

        Self::new(module_name, action)
    }
}

impl Display for ModuleAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}.{}", self.module_name.as_str(), self.action)
    }
}
