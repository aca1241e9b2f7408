// src/policy.rs

//! Access policy for every mutation the API exposes.
//!
//! `evaluate` is a pure function of who is asking, what they want to do and
//! what they want to do it to. Handlers call [`authorize`], which turns a
//! `Deny` into the right HTTP failure: 401 for an anonymous principal, 403
//! for an authenticated one.

use crate::{error::AppError, models::user::Role};

/// The actor behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    User(Identity),
}

/// An authenticated account, as loaded by the token layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Principal::Anonymous => None,
            Principal::User(identity) => Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::User(_))
    }

    /// The identity of an authenticated principal, 401 otherwise.
    pub fn require(&self) -> Result<&Identity, AppError> {
        self.identity().ok_or_else(|| {
            AppError::AuthError("Authentication credentials were not provided.".to_string())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_read(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

/// What an action targets. Authored resources carry their author's id once
/// the record exists; collection-level actions pass `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Category,
    Genre,
    Title,
    Review { author_id: Option<i64> },
    Comment { author_id: Option<i64> },
    /// `/users/` and `/users/{username}/`.
    UserAccounts,
    /// `/users/me/`.
    OwnAccount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed { Decision::Allow } else { Decision::Deny }
    }
}

pub fn evaluate(principal: &Principal, action: Action, resource: Resource) -> Decision {
    let identity = principal.identity();
    let is_admin = identity.is_some_and(|i| i.role == Role::Admin);

    let allowed = match resource {
        Resource::Category | Resource::Genre | Resource::Title => action.is_read() || is_admin,

        Resource::Review { author_id } | Resource::Comment { author_id } => match action {
            Action::List | Action::Retrieve => true,
            Action::Create => identity.is_some(),
            Action::Update | Action::Delete => identity.is_some_and(|i| {
                matches!(i.role, Role::Moderator | Role::Admin) || author_id == Some(i.id)
            }),
        },

        Resource::UserAccounts => is_admin,

        Resource::OwnAccount => {
            identity.is_some() && matches!(action, Action::Retrieve | Action::Update)
        }
    };

    Decision::from(allowed)
}

/// Runs [`evaluate`] and maps a denial onto the error taxonomy.
pub fn authorize(principal: &Principal, action: Action, resource: Resource) -> Result<(), AppError> {
    match evaluate(principal, action, resource) {
        Decision::Allow => Ok(()),
        Decision::Deny if !principal.is_authenticated() => Err(AppError::AuthError(
            "Authentication credentials were not provided.".to_string(),
        )),
        Decision::Deny => {
            tracing::debug!("Denied {:?} on {:?} for {:?}", action, resource, principal);
            Err(AppError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, role: Role) -> Principal {
        Principal::User(Identity {
            id,
            username: format!("user{}", id),
            role,
        })
    }

    const ALL_ACTIONS: [Action; 5] = [
        Action::List,
        Action::Retrieve,
        Action::Create,
        Action::Update,
        Action::Delete,
    ];

    #[test]
    fn reads_are_open_to_everyone() {
        let resources = [
            Resource::Category,
            Resource::Genre,
            Resource::Title,
            Resource::Review { author_id: Some(1) },
            Resource::Comment { author_id: Some(1) },
        ];
        for resource in resources {
            for action in [Action::List, Action::Retrieve] {
                assert_eq!(evaluate(&Principal::Anonymous, action, resource), Decision::Allow);
                assert_eq!(evaluate(&user(2, Role::User), action, resource), Decision::Allow);
            }
        }
    }

    #[test]
    fn catalog_mutations_need_admin() {
        for resource in [Resource::Category, Resource::Genre, Resource::Title] {
            for action in [Action::Create, Action::Update, Action::Delete] {
                assert_eq!(evaluate(&Principal::Anonymous, action, resource), Decision::Deny);
                assert_eq!(evaluate(&user(1, Role::User), action, resource), Decision::Deny);
                assert_eq!(evaluate(&user(1, Role::Moderator), action, resource), Decision::Deny);
                assert_eq!(evaluate(&user(1, Role::Admin), action, resource), Decision::Allow);
            }
        }
    }

    #[test]
    fn creating_reviews_and_comments_needs_a_login() {
        for resource in [
            Resource::Review { author_id: None },
            Resource::Comment { author_id: None },
        ] {
            assert_eq!(evaluate(&Principal::Anonymous, Action::Create, resource), Decision::Deny);
            assert_eq!(evaluate(&user(1, Role::User), Action::Create, resource), Decision::Allow);
        }
    }

    #[test]
    fn only_author_or_staff_may_change_a_review() {
        let review = Resource::Review { author_id: Some(7) };
        for action in [Action::Update, Action::Delete] {
            assert_eq!(evaluate(&user(7, Role::User), action, review), Decision::Allow);
            assert_eq!(evaluate(&user(8, Role::User), action, review), Decision::Deny);
            assert_eq!(evaluate(&user(8, Role::Moderator), action, review), Decision::Allow);
            assert_eq!(evaluate(&user(8, Role::Admin), action, review), Decision::Allow);
            assert_eq!(evaluate(&Principal::Anonymous, action, review), Decision::Deny);
        }

        let comment = Resource::Comment { author_id: Some(7) };
        assert_eq!(evaluate(&user(8, Role::User), Action::Delete, comment), Decision::Deny);
        assert_eq!(evaluate(&user(8, Role::Moderator), Action::Delete, comment), Decision::Allow);
    }

    #[test]
    fn user_management_is_admin_only() {
        for action in ALL_ACTIONS {
            assert_eq!(evaluate(&user(1, Role::Moderator), action, Resource::UserAccounts), Decision::Deny);
            assert_eq!(evaluate(&user(1, Role::Admin), action, Resource::UserAccounts), Decision::Allow);
        }
    }

    #[test]
    fn own_account_allows_read_and_update_only() {
        let me = user(3, Role::User);
        assert_eq!(evaluate(&me, Action::Retrieve, Resource::OwnAccount), Decision::Allow);
        assert_eq!(evaluate(&me, Action::Update, Resource::OwnAccount), Decision::Allow);
        assert_eq!(evaluate(&me, Action::Delete, Resource::OwnAccount), Decision::Deny);
        assert_eq!(
            evaluate(&Principal::Anonymous, Action::Retrieve, Resource::OwnAccount),
            Decision::Deny
        );
    }

    #[test]
    fn denial_maps_to_401_or_403() {
        let anon = authorize(&Principal::Anonymous, Action::Create, Resource::Title);
        assert!(matches!(anon, Err(AppError::AuthError(_))));

        let plain = authorize(&user(1, Role::User), Action::Create, Resource::Title);
        assert!(matches!(plain, Err(AppError::Forbidden(_))));
    }
}
