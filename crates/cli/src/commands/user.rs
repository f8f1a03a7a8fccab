//! Account management commands.

use law_office::UserDirectory;
use law_office::models::{NewUser, UserChanges};
use law_office_core::{Email, Role};

use super::{CliError, login, new_password};

/// Account details collected from the command line.
pub struct NewAccount {
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub email: Option<Email>,
    pub phone: Option<String>,
}

/// Create an account.
pub async fn create(actor: Option<&str>, account: NewAccount) -> Result<(), CliError> {
    let (db, session) = login(actor).await?;
    let password = new_password(&account.username)?;

    let user = NewUser {
        username: account.username,
        password,
        full_name: account.full_name,
        role: account.role,
        email: account.email,
        phone: account.phone,
    };
    let id = UserDirectory::new(&db).create_user(&session, &user).await?;

    tracing::info!(user_id = %id, username = %user.username, role = %user.role, "Account created");
    db.close().await;
    Ok(())
}

/// Print the active accounts.
pub async fn list(actor: Option<&str>) -> Result<(), CliError> {
    let (db, session) = login(actor).await?;
    let users = UserDirectory::new(&db).list_active(&session).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:>5}  {:<20} {:<10} {:<30} {}", "ID", "USERNAME", "ROLE", "NAME", "EMAIL");
        for user in &users {
            println!(
                "{:>5}  {:<20} {:<10} {:<30} {}",
                user.id.as_i64(),
                user.username,
                user.role.as_str(),
                user.full_name,
                user.email.as_ref().map_or("", Email::as_str)
            );
        }
    }

    db.close().await;
    Ok(())
}

/// Deactivate `username`.
pub async fn deactivate(actor: Option<&str>, username: &str) -> Result<(), CliError> {
    let (db, session) = login(actor).await?;
    let users = UserDirectory::new(&db);

    let user = users
        .find_by_username(&session, username)
        .await?
        .ok_or_else(|| CliError::UnknownUser(username.to_owned()))?;

    if !user.is_active {
        tracing::warn!(username, "Account is already deactivated");
    } else if users.deactivate_user(&session, user.id).await? {
        tracing::info!(username, "Account deactivated");
    }

    db.close().await;
    Ok(())
}

/// Set a new password for `username`.
pub async fn passwd(actor: Option<&str>, username: &str) -> Result<(), CliError> {
    let (db, session) = login(actor).await?;
    let users = UserDirectory::new(&db);

    let user = users
        .find_by_username(&session, username)
        .await?
        .ok_or_else(|| CliError::UnknownUser(username.to_owned()))?;

    let changes = UserChanges {
        password: Some(new_password(username)?),
        ..UserChanges::default()
    };
    if users.update_user(&session, user.id, &changes).await? {
        tracing::info!(username, "Password changed");
    }

    db.close().await;
    Ok(())
}
