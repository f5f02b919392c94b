//! The authorization evaluator.
//!
//! A single pure predicate gates both navigation (whether a route or menu
//! entry renders at all) and mutation (whether a save/delete action is
//! offered). Screens route every privileged affordance through this function
//! instead of comparing role names ad hoc.

use crate::auth::models::User;

/// Answers whether `user` may perform the capability named `permission`.
///
/// Returns `false` when the user is absent, when the user carries no role, or
/// when no permission in the role's set matches the name exactly; `true` only
/// on an exact match. Pure and synchronous, so callers can invoke it inline
/// during rendering and routing decisions.
pub fn has_permission(user: Option<&User>, permission: &str) -> bool {
    user.and_then(|user| user.role.as_ref())
        .map(|role| role.permissions.iter().any(|p| p.name == permission))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::{Permission, Role};

    fn permission(id: i64, name: &str) -> Permission {
        Permission {
            id,
            name: name.to_string(),
            description: None,
        }
    }

    fn user_with_permissions(names: &[&str]) -> User {
        User {
            id: 1,
            username: "admin".to_string(),
            email: None,
            tenant_id: Some(1),
            role: Some(Role {
                id: 1,
                name: "ADMIN".to_string(),
                permissions: names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| permission(i as i64 + 1, name))
                    .collect(),
            }),
        }
    }

    #[test]
    fn absent_user_is_denied() {
        assert!(!has_permission(None, "ler_pacientes"));
    }

    #[test]
    fn user_without_role_is_denied() {
        let user = User {
            id: 2,
            username: "orphan".to_string(),
            email: None,
            tenant_id: None,
            role: None,
        };
        assert!(!has_permission(Some(&user), "ler_pacientes"));
    }

    #[test]
    fn exact_match_is_granted_everything_else_denied() {
        let user = user_with_permissions(&["ler_pacientes", "editar_agendamentos"]);
        assert!(has_permission(Some(&user), "ler_pacientes"));
        assert!(has_permission(Some(&user), "editar_agendamentos"));
        assert!(!has_permission(Some(&user), "excluir_pacientes"));
        // Prefixes and case variants are not matches
        assert!(!has_permission(Some(&user), "ler_paciente"));
        assert!(!has_permission(Some(&user), "LER_PACIENTES"));
    }

    #[test]
    fn empty_permission_set_is_denied() {
        let user = user_with_permissions(&[]);
        assert!(!has_permission(Some(&user), "ler_pacientes"));
    }

    #[test]
    fn duplicate_entries_behave_as_a_set() {
        let user = user_with_permissions(&["ler_pacientes", "ler_pacientes"]);
        assert!(has_permission(Some(&user), "ler_pacientes"));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let user = user_with_permissions(&["ler_pacientes"]);
        for _ in 0..10 {
            assert!(has_permission(Some(&user), "ler_pacientes"));
            assert!(!has_permission(Some(&user), "excluir_pacientes"));
        }
    }
}
