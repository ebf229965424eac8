//! Role-policy decision functions.
//!
//! Pure functions deciding whether an acting role may perform an operation.
//! Each guard returns `Result<(), Denial>` so callers short-circuit with `?`
//! (or an early return); a denial always terminates the request pipeline
//! before any mutation or later guard runs.

use std::fmt;

use super::role::Role;
use super::user::UserId;

/// Machine-readable reason for a policy denial.
///
/// The display text is the user-visible notice queued by the HTTP adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The acting role is below the tier required for the operation.
    InsufficientRole,
    /// Actors may never delete their own account.
    SelfDeletion,
    /// Actors may never change their own role.
    SelfRoleChange,
    /// Only a super admin may delete a super admin.
    TargetOutranksActor,
    /// Actors may only assign roles at or below their own tier.
    AssignmentAboveActor,
}

impl Denial {
    /// Stable identifier for logs and error details.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientRole => "insufficient_role",
            Self::SelfDeletion => "self_deletion",
            Self::SelfRoleChange => "self_role_change",
            Self::TargetOutranksActor => "target_outranks_actor",
            Self::AssignmentAboveActor => "assignment_above_actor",
        }
    }

    /// User-visible notice text for this denial.
    pub const fn message(&self) -> &'static str {
        match self {
            Self::InsufficientRole => "You are not authorised to perform this action.",
            Self::SelfDeletion => {
                "You cannot delete your own account; ask another super admin."
            }
            Self::SelfRoleChange => {
                "You cannot change your own role; ask another super admin."
            }
            Self::TargetOutranksActor => "You don't have permission to delete a super admin.",
            Self::AssignmentAboveActor => "You don't have permission to assign that role.",
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for Denial {}

/// Admit actors at or above `minimum`.
pub fn can_access(actor: Role, minimum: Role) -> Result<(), Denial> {
    if actor >= minimum {
        Ok(())
    } else {
        Err(Denial::InsufficientRole)
    }
}

/// Admins and super admins may view the user list.
pub fn can_view_user_list(actor: Role) -> Result<(), Denial> {
    can_access(actor, Role::Admin)
}

/// Admins and super admins may register new users.
pub fn can_register_user(actor: Role) -> Result<(), Denial> {
    can_access(actor, Role::Admin)
}

/// An actor may assign a role only at or below their own tier.
///
/// Super admins may assign any role; admins may assign `user` or `admin` but
/// never promote to `super_admin`.
pub fn can_assign_role(actor: Role, target: Role) -> Result<(), Denial> {
    can_access(actor, Role::Admin)?;
    if actor >= target {
        Ok(())
    } else {
        Err(Denial::AssignmentAboveActor)
    }
}

/// Deletion guard.
///
/// Denies self-deletion, denies deleting a super admin unless the actor is a
/// super admin, and otherwise admits admin-or-above actors. Guards evaluate
/// in that order so the most specific denial wins.
pub fn can_delete_user(
    actor_role: Role,
    actor_id: &UserId,
    target_id: &UserId,
    target_role: Role,
) -> Result<(), Denial> {
    can_access(actor_role, Role::Admin)?;
    if actor_id == target_id {
        return Err(Denial::SelfDeletion);
    }
    if target_role == Role::SuperAdmin && actor_role != Role::SuperAdmin {
        return Err(Denial::TargetOutranksActor);
    }
    Ok(())
}

/// Role-update guard: no self-update, then the assignment rule.
pub fn can_update_role(
    actor_role: Role,
    actor_id: &UserId,
    target_id: &UserId,
    new_role: Role,
) -> Result<(), Denial> {
    can_access(actor_role, Role::Admin)?;
    if actor_id == target_id {
        return Err(Denial::SelfRoleChange);
    }
    can_assign_role(actor_role, new_role)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    fn id(n: u8) -> UserId {
        UserId::new(format!("00000000-0000-0000-0000-0000000000{n:02x}")).expect("valid id")
    }

    #[test]
    fn delete_guard_covers_every_role_pair() {
        let actor_id = id(1);
        let target_id = id(2);

        for actor in Role::ALL {
            for target in Role::ALL {
                // Self-deletion denied regardless of roles.
                assert_eq!(
                    can_delete_user(actor, &actor_id, &actor_id, target),
                    Err(if actor < Role::Admin {
                        Denial::InsufficientRole
                    } else {
                        Denial::SelfDeletion
                    }),
                    "self deletion must be denied for {actor:?}/{target:?}"
                );

                let decision = can_delete_user(actor, &actor_id, &target_id, target);
                let expected = if actor < Role::Admin {
                    Err(Denial::InsufficientRole)
                } else if target == Role::SuperAdmin && actor != Role::SuperAdmin {
                    Err(Denial::TargetOutranksActor)
                } else {
                    Ok(())
                };
                assert_eq!(decision, expected, "delete {actor:?} -> {target:?}");
            }
        }
    }

    #[rstest]
    #[case(Role::User, false)]
    #[case(Role::Admin, true)]
    #[case(Role::SuperAdmin, true)]
    fn list_and_register_require_admin(#[case] actor: Role, #[case] admitted: bool) {
        assert_eq!(can_view_user_list(actor).is_ok(), admitted);
        assert_eq!(can_register_user(actor).is_ok(), admitted);
    }

    #[rstest]
    #[case(Role::Admin, Role::User, Ok(()))]
    #[case(Role::Admin, Role::Admin, Ok(()))]
    #[case(Role::Admin, Role::SuperAdmin, Err(Denial::AssignmentAboveActor))]
    #[case(Role::SuperAdmin, Role::User, Ok(()))]
    #[case(Role::SuperAdmin, Role::Admin, Ok(()))]
    #[case(Role::SuperAdmin, Role::SuperAdmin, Ok(()))]
    #[case(Role::User, Role::User, Err(Denial::InsufficientRole))]
    fn assignment_never_exceeds_actor_tier(
        #[case] actor: Role,
        #[case] target: Role,
        #[case] expected: Result<(), Denial>,
    ) {
        assert_eq!(can_assign_role(actor, target), expected);
    }

    #[test]
    fn role_update_denies_self_before_assignment_check() {
        let actor = id(1);
        assert_eq!(
            can_update_role(Role::SuperAdmin, &actor, &actor, Role::User),
            Err(Denial::SelfRoleChange)
        );
    }

    #[test]
    fn role_update_admits_lateral_assignment() {
        assert_eq!(
            can_update_role(Role::Admin, &id(1), &id(2), Role::Admin),
            Ok(())
        );
    }

    #[test]
    fn denial_messages_are_user_facing() {
        assert!(Denial::SelfDeletion.message().contains("your own account"));
        assert_eq!(Denial::SelfDeletion.as_str(), "self_deletion");
    }
}
