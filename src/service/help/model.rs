use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelpCategory {
    User,
    Admin,
    Owner,
    Devs,
}

impl HelpCategory {
    pub fn callback_data(&self) -> String {
        format!("help_{}", self)
    }
}

impl fmt::Display for HelpCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HelpCategory::User => "user",
            HelpCategory::Admin => "admin",
            HelpCategory::Owner => "owner",
            HelpCategory::Devs => "devs",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for HelpCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(HelpCategory::User),
            "admin" => Ok(HelpCategory::Admin),
            "owner" => Ok(HelpCategory::Owner),
            "devs" => Ok(HelpCategory::Devs),
            _ => Err(format!("Unknown help category: {}", s)),
        }
    }
}

/// What a callback button press asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpAction {
    Menu,
    Home,
    Category(HelpCategory),
    Close,
    /// `cancel_<unique file id>` from a progress message.
    CancelDownload(String),
    Unknown(String),
}

impl HelpAction {
    pub fn parse(data: &str) -> Self {
        match data {
            "help_all" => return HelpAction::Menu,
            "help_back" => return HelpAction::Home,
            "help_close" => return HelpAction::Close,
            _ => {}
        }

        if let Some(category) = data.strip_prefix("help_").and_then(|name| name.parse().ok()) {
            return HelpAction::Category(category);
        }

        match data.strip_prefix("cancel_") {
            Some(id) if !id.is_empty() => HelpAction::CancelDownload(id.to_string()),
            _ => HelpAction::Unknown(data.to_string()),
        }
    }
}
