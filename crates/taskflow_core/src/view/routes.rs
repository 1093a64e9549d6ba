//! Navigation routes.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    SignUp,
    TaskList,
}

impl Route {
    /// Stable route name used by the navigation host.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::SignUp => "signUp",
            Self::TaskList => "taskList",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "login" => Some(Self::Login),
            "signUp" => Some(Self::SignUp),
            "taskList" => Some(Self::TaskList),
            _ => None,
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed-in users land on the task list, everyone else on login.
pub fn start_route(is_logged_in: bool) -> Route {
    if is_logged_in {
        Route::TaskList
    } else {
        Route::Login
    }
}
