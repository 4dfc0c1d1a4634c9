use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// System roles
// ---------------------------------------------------------------------------

/// Role granted to every request, signed in or not.
pub const ANONYMOUS: &str = "anonymous";

/// Role granted to any signed-in user.
pub const AUTHENTICATED: &str = "authenticated";

/// Role granted to the user who authored the object being acted on.
pub const AUTHOR: &str = "author";

/// Role granted to the owner of the domain.
pub const OWNER: &str = "owner";

// ---------------------------------------------------------------------------
// RoleDef
// ---------------------------------------------------------------------------

/// A custom permission label declared by a template, referenced by name from
/// action access rules. Identity only; membership is computed per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleDef {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
}
