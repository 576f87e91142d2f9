//! Pet Manager client - command line entry point.
//!
//! Usage: `petmanager [name]`
//!
//! Restores the saved session (or logs in with `PETMANAGER_USERNAME` and
//! `PETMANAGER_PASSWORD`), then lists the first page of pets, filtered by
//! `name` when given, and the first page of tutors.

use std::path::PathBuf;

use petmanager::PetManager;
use petmanager_application::AuthEvent;
use petmanager_domain::{Credentials, PageRequest};
use petmanager_infrastructure::AppConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_file = std::env::var_os("PETMANAGER_CONFIG").map(PathBuf::from);
    let config = AppConfig::load(config_file.as_deref())?;
    let search = std::env::args().nth(1);

    tracing::info!(
        api_url = %config.api_url,
        "Starting Pet Manager client v{}",
        env!("CARGO_PKG_VERSION")
    );

    let app = PetManager::from_config(&config)?;

    let mut events = app.auth.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let AuthEvent::LoggedOut { redirect_to } = event {
                tracing::warn!(%redirect_to, "session ended, sign in again");
            }
        }
    });

    if !app.guard.require_authenticated("/pets").is_allowed() {
        let username = std::env::var("PETMANAGER_USERNAME")
            .map_err(|_| "not logged in and PETMANAGER_USERNAME is not set")?;
        let password = std::env::var("PETMANAGER_PASSWORD")
            .map_err(|_| "not logged in and PETMANAGER_PASSWORD is not set")?;
        app.auth.login(&Credentials::new(username, password)).await?;
    }

    let mut page = PageRequest::first();
    if let Some(name) = search {
        page = page.with_name(name);
    }

    let pets = app.pets.list(&page).await?;
    println!("Pets ({} total):", pets.total);
    for pet in &pets.content {
        println!("  #{:<5} {} ({}, {} anos)", pet.id, pet.nome, pet.raca, pet.idade);
    }

    let tutors = app.tutors.list(&PageRequest::first()).await?;
    println!("Tutores ({} total):", tutors.total);
    for tutor in &tutors.content {
        println!("  #{:<5} {} {}", tutor.id, tutor.nome, tutor.telefone);
    }

    Ok(())
}
