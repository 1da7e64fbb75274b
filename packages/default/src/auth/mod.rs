pub mod scopes;
pub mod token;

pub use scopes::{
    AuthServiceClient, SCOPE_CONTRIBUTE, SCOPE_MANAGE, SCOPE_VIEW, ScopeChecker, ScopeError,
    StaticScopes,
};
pub use token::{Claims, Identity, TokenError, TokenManager};
