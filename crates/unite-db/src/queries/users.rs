use anyhow::Result;
use rusqlite::Connection;
use uuid::Uuid;

use unite_types::models::User;

use super::OptionalExt;
use crate::Database;
use crate::models::{USER_COLUMNS, UserRow, format_timestamp};

impl Database {
    pub fn list_users(&self) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {} FROM users ORDER BY name", USER_COLUMNS))?;
            let rows = stmt
                .query_map([], UserRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(UserRow::into_user).collect()
        })
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "id", &id.to_string()))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn insert_user(&self, user: &User) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, role, sector, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    user.id.to_string(),
                    user.name,
                    user.email,
                    user.role.as_ref(),
                    user.sector.as_ref(),
                    format_timestamp(user.created_at),
                ],
            )?;
            Ok(())
        })
    }

    /// Returns false when no such user exists.
    pub fn update_user(&self, user: &User) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET name = ?2, email = ?3, role = ?4, sector = ?5 WHERE id = ?1",
                rusqlite::params![
                    user.id.to_string(),
                    user.name,
                    user.email,
                    user.role.as_ref(),
                    user.sector.as_ref(),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Deletes the user; their conversations and messages go with them (ON DELETE CASCADE).
    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM users WHERE id = ?1", [id.to_string()])?;
            Ok(changed > 0)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<User>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column))?;

    let row = stmt.query_row([value], UserRow::from_row).optional()?;

    row.map(UserRow::into_user).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SEED_ADMIN_EMAIL;
    use chrono::Utc;
    use unite_types::models::{Sector, UserRole};

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Maria Souza".into(),
            email: email.into(),
            role: UserRole::User,
            sector: Sector::Financeiro,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn seeded_admin_is_present() {
        let db = Database::open_in_memory().unwrap();
        let admin = db.get_user_by_email(SEED_ADMIN_EMAIL).unwrap().unwrap();
        assert_eq!(admin.role, UserRole::SuperAdmin);
        assert_eq!(admin.sector, Sector::Tecnologia);
    }

    #[test]
    fn demo_users_are_seeded() {
        let db = Database::open_in_memory().unwrap();
        let joao = db.get_user_by_email("joao@unite.com.br").unwrap().unwrap();
        assert_eq!(joao.name, "João Silva");
        assert_eq!(joao.role, UserRole::User);
        assert_eq!(joao.sector, Sector::Marketing);

        let pedro = db.get_user_by_email("pedro@unite.com.br").unwrap().unwrap();
        assert_eq!(pedro.role, UserRole::Admin);
        assert_eq!(pedro.sector, Sector::RecursosHumanos);
        assert_eq!(db.list_users().unwrap().len(), 4);
    }

    #[test]
    fn insert_update_delete() {
        let db = Database::open_in_memory().unwrap();
        let mut maria = user("maria.lima@unite.com.br");
        db.insert_user(&maria).unwrap();
        assert_eq!(db.list_users().unwrap().len(), 5);

        maria.role = UserRole::Admin;
        assert!(db.update_user(&maria).unwrap());
        assert_eq!(db.get_user(maria.id).unwrap().unwrap().role, UserRole::Admin);

        assert!(db.delete_user(maria.id).unwrap());
        assert!(!db.delete_user(maria.id).unwrap());
        assert!(db.get_user(maria.id).unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_a_unique_violation() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&user("dup@unite.com.br")).unwrap();
        let err = db.insert_user(&user("dup@unite.com.br")).unwrap_err();
        assert!(crate::queries::is_unique_violation(&err));
    }
}
