//! Account and session commands.

use anyhow::Result;

use coursehub_client::{ApiClient, Session};

pub async fn login(api: &ApiClient, username: &str, password: &str) -> Result<()> {
    let user = api.login(username, password).await?;
    println!("Logged in as {} (user {}).", user.username, user.id);
    Ok(())
}

pub async fn register(api: &ApiClient, username: &str, email: &str, password: &str) -> Result<()> {
    let user = api.register(username, email, password).await?;
    println!(
        "Account created. Logged in as {} (user {}).",
        user.username, user.id
    );
    Ok(())
}

pub async fn logout(session: &Session) -> Result<()> {
    if !session.is_authenticated().await {
        println!("Not logged in.");
        return Ok(());
    }
    session.clear().await?;
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(api: &ApiClient, session: &Session) -> Result<()> {
    match session.user().await {
        Some(user) => {
            println!("Logged in as {} (user {}).", user.username, user.id);
            if let Some(email) = &user.email {
                println!("Email:  {email}");
            }
            println!("Server: {}", api.base_url());
        }
        None => println!("Not logged in."),
    }
    Ok(())
}

pub async fn list_users(api: &ApiClient, json: bool) -> Result<()> {
    let users = api.list_users().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    println!("  {:<8} {:<20} {:<30}", "ID", "USERNAME", "EMAIL");
    for user in &users {
        println!(
            "  {:<8} {:<20} {:<30}",
            user.id,
            user.username,
            user.email.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
