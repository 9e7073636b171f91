use tracing::info;
use uuid::Uuid;

use unite_types::api::{CreateUserRequest, UpdateUserRequest};
use unite_types::models::{User, timestamp_now};

use crate::catalogue::store_conflict;
use crate::error::{ChatError, Result};
use crate::repository::ChatRepository;

fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(ChatError::InvalidInput(format!("'{}' is not an email address", raw))),
    }
}

fn normalize_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ChatError::InvalidInput("name is empty".into()));
    }
    Ok(name.to_string())
}

pub fn list_users<R: ChatRepository + ?Sized>(repo: &R) -> Result<Vec<User>> {
    Ok(repo.list_users()?)
}

pub fn get_user<R: ChatRepository + ?Sized>(repo: &R, id: Uuid) -> Result<User> {
    repo.get_user(id)?.ok_or_else(|| ChatError::not_found("user", id))
}

pub fn create_user<R: ChatRepository + ?Sized>(repo: &R, req: CreateUserRequest) -> Result<User> {
    let user = User {
        id: Uuid::new_v4(),
        name: normalize_name(&req.name)?,
        email: normalize_email(&req.email)?,
        role: req.role,
        sector: req.sector,
        created_at: timestamp_now(),
    };

    if repo.get_user_by_email(&user.email)?.is_some() {
        return Err(ChatError::Conflict(format!("email '{}' is taken", user.email)));
    }
    repo.insert_user(&user).map_err(|e| store_conflict(repo, e, "email is taken"))?;

    info!("Created user {} ({})", user.email, user.role);
    Ok(user)
}

pub fn update_user<R: ChatRepository + ?Sized>(repo: &R, id: Uuid, req: UpdateUserRequest) -> Result<User> {
    let mut user = get_user(repo, id)?;

    if let Some(email) = req.email {
        let email = normalize_email(&email)?;
        if email != user.email {
            if repo.get_user_by_email(&email)?.is_some() {
                return Err(ChatError::Conflict(format!("email '{}' is taken", email)));
            }
            user.email = email;
        }
    }
    if let Some(name) = req.name {
        user.name = normalize_name(&name)?;
    }
    if let Some(role) = req.role {
        user.role = role;
    }
    if let Some(sector) = req.sector {
        user.sector = sector;
    }

    if !repo.update_user(&user).map_err(|e| store_conflict(repo, e, "email is taken"))? {
        return Err(ChatError::not_found("user", id));
    }
    info!("Updated user {}", user.email);
    Ok(user)
}

/// Deleting a user also deletes their conversations.
pub fn delete_user<R: ChatRepository + ?Sized>(repo: &R, id: Uuid) -> Result<()> {
    if !repo.delete_user(id)? {
        return Err(ChatError::not_found("user", id));
    }
    info!("Deleted user {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::send_to_agent;
    use crate::test_support::{seeded_memory, user_id};
    use unite_types::models::{Sector, UserRole};

    fn request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: " Pedro Oliveira ".into(),
            email: email.into(),
            role: UserRole::Admin,
            sector: Sector::RecursosHumanos,
        }
    }

    #[test]
    fn create_normalizes_and_rejects_duplicates() {
        let repo = seeded_memory();
        let pedro = create_user(&repo, request("Pedro@Unite.com.br")).unwrap();
        assert_eq!(pedro.name, "Pedro Oliveira");
        assert_eq!(pedro.email, "pedro@unite.com.br");

        let err = create_user(&repo, request("pedro@unite.com.br")).unwrap_err();
        assert!(matches!(err, ChatError::Conflict(_)));

        let err = create_user(&repo, request("pedro")).unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let repo = seeded_memory();
        let updated = update_user(
            &repo,
            user_id(),
            UpdateUserRequest {
                role: Some(UserRole::SuperAdmin),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.role, UserRole::SuperAdmin);
        assert_eq!(updated.email, "joao@unite.com.br");
        assert_eq!(get_user(&repo, user_id()).unwrap(), updated);
    }

    #[test]
    fn delete_removes_the_users_conversations() {
        let repo = seeded_memory();
        send_to_agent(&repo, user_id(), "incidentes", None, "oi").unwrap();

        delete_user(&repo, user_id()).unwrap();
        assert!(repo.list_conversations_for_user(user_id()).unwrap().is_empty());
        assert!(matches!(delete_user(&repo, user_id()).unwrap_err(), ChatError::NotFound { .. }));
    }
}
