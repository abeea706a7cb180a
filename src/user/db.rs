//! Database operations for the user directory.

use rusqlite::{Connection, Row};

use crate::{
    Error, PasswordHash, is_unique_violation,
    user::{NewUser, User, UserUpdate},
};

/// Create and insert a new user into the database.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateUser] if a user with the same ID number already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_user(user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection
        .execute(
            "INSERT INTO user (id_number, username, password, position, phone_number)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &user.id_number,
                &user.username,
                user.password_hash.as_ref(),
                &user.position,
                &user.phone_number,
            ),
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                tracing::warn!("rejected sign up for existing ID number {}", user.id_number);
                Error::DuplicateUser(user.id_number.clone())
            } else {
                error.into()
            }
        })?;

    tracing::info!("created user {}", user.id_number);

    Ok(User {
        id_number: user.id_number,
        username: user.username,
        password_hash: user.password_hash,
        position: user.position,
        phone_number: user.phone_number,
    })
}

/// Find the first user, in sign up order, with the exact `username` whose
/// password matches `password`.
///
/// # Errors
/// This function will return a:
/// - [Error::HashingError] if a stored password hash is malformed,
/// - or [Error::SqlError] if there is some SQL error.
pub fn authenticate_user(
    username: &str,
    password: &str,
    connection: &Connection,
) -> Result<Option<User>, Error> {
    let candidates: Vec<User> = connection
        .prepare(
            "SELECT id_number, username, password, position, phone_number FROM user
             WHERE username = :username ORDER BY rowid ASC",
        )?
        .query_map(&[(":username", username)], map_row)?
        .collect::<Result<_, _>>()?;

    for user in candidates {
        if user.password_hash.verify(password)? {
            return Ok(Some(user));
        }
    }

    tracing::warn!("failed log in attempt for \"{username}\"");

    Ok(None)
}

/// Get the user with the ID number `id_number`.
///
/// # Errors
/// Returns [Error::NotFound] if no user has the ID number.
pub fn get_user(id_number: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id_number, username, password, position, phone_number FROM user
             WHERE id_number = :id_number",
        )?
        .query_row(&[(":id_number", id_number)], map_row)
        .map_err(|error| error.into())
}

/// Get every user in sign up order.
pub fn get_all_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare(
            "SELECT id_number, username, password, position, phone_number FROM user
             ORDER BY rowid ASC",
        )?
        .query_map([], map_row)?
        .map(|maybe_user| maybe_user.map_err(|error| error.into()))
        .collect()
}

/// Get the number of users in the database.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id_number) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Replace the profile details of the user with the same ID number.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if a field is blank,
/// - [Error::UpdateMissingUser] if no user has the ID number,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_user(update: &UserUpdate, connection: &Connection) -> Result<(), Error> {
    update.validate()?;

    let rows_affected = connection.execute(
        "UPDATE user SET username = ?1, position = ?2, phone_number = ?3 WHERE id_number = ?4",
        (
            update.username.trim(),
            update.position.trim(),
            update.phone_number.trim(),
            &update.id_number,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingUser);
    }

    tracing::info!("updated user {}", update.id_number);

    Ok(())
}

/// Delete the user with the ID number `id_number`.
///
/// # Errors
/// Returns [Error::DeleteMissingUser] if no user has the ID number.
pub fn delete_user(id_number: &str, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM user WHERE id_number = ?1", [id_number])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingUser);
    }

    tracing::info!("deleted user {id_number}");

    Ok(())
}

/// Create the user table.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS user (
            id_number TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL,
            password TEXT NOT NULL,
            position TEXT NOT NULL,
            phone_number TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_user_username ON user(username);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id_number: row.get(0)?,
        username: row.get(1)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        position: row.get(3)?,
        phone_number: row.get(4)?,
    })
}
