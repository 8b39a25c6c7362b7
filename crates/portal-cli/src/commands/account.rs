// Session commands

use anyhow::Context;
use async_lock::RwLock;
use portal_app::{workflows, AppCore};
use portal_authorization::{Capability, ProjectId};
use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;

pub async fn login(app: &Arc<RwLock<AppCore>>, username: &str, password: &str) -> anyhow::Result<()> {
    let session = workflows::login(app, username, password).await?;
    if let Some(principal) = session.principal() {
        println!("Signed in as {} ({})", principal.display_name, principal.role);
    }
    match session.selected_project() {
        Some(project) => println!("Project: {project}"),
        None => println!("No accessible project"),
    }
    Ok(())
}

/// Password from stdin, prompting on stderr when stdin is a terminal.
pub fn prompt_password() -> anyhow::Result<String> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprint!("Password: ");
        std::io::stderr().flush().context("Failed to write password prompt")?;
    }
    read_password(stdin.lock())
}

fn read_password(mut reader: impl BufRead) -> anyhow::Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\n', '\r']);
    if password.is_empty() {
        anyhow::bail!("No password given");
    }
    Ok(password.to_string())
}

pub async fn logout(app: &Arc<RwLock<AppCore>>) -> anyhow::Result<()> {
    workflows::logout(app).await?;
    println!("Signed out");
    Ok(())
}

pub async fn whoami(app: &Arc<RwLock<AppCore>>) {
    let session = workflows::current_session(app).await;
    let Some(principal) = session.principal() else {
        println!("Not signed in");
        return;
    };

    println!("User:     {} <{}>", principal.display_name, principal.email);
    println!("Role:     {}", principal.role);
    match session.selected_project() {
        Some(project) => println!("Project:  {project}"),
        None => println!("Project:  none"),
    }
    let granted: Vec<&str> = Capability::ALL
        .into_iter()
        .filter(|c| session.allows(*c))
        .map(Capability::as_str)
        .collect();
    println!("Can:      {}", if granted.is_empty() { "nothing".to_string() } else { granted.join(", ") });
}

pub async fn projects(app: &Arc<RwLock<AppCore>>) {
    let selected = workflows::current_session(app).await.selected_project();
    for project in workflows::accessible_projects_branded(app).await {
        let marker = if Some(project.id) == selected { "*" } else { " " };
        println!("{marker} {:<5} {}", project.id, project.name);
    }
}

pub async fn select(app: &Arc<RwLock<AppCore>>, raw: &str) -> anyhow::Result<()> {
    let project: ProjectId = raw.parse()?;
    workflows::select_project(app, project)
        .await
        .with_context(|| format!("selecting {project}"))?;
    println!("Selected {project}");
    Ok(())
}
