//! Example: two sessions agreeing on a lunch place
//!
//! Runs two `AppContext`s against one in-memory store. Alice proposes two
//! places, both decide to go, Bob rules one of them out, and both sessions
//! end up showing the same results.
//!
//! Run with: ```bash cargo run -p lunchsync-infra --example lunch_session ```
//!
//! Set `RUST_LOG=debug` to watch the watcher and mirror at work.

use std::sync::Arc;
use std::time::Duration;

use lunchsync_domain::{Place, UserId, UserIdentity};
use lunchsync_infra::{config, init_logging, AppContext, InMemoryStore, PresentationEvent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load()?;
    init_logging(&config.logging)?;

    let backend = Arc::new(InMemoryStore::new());
    let mut alice = AppContext::new(config.clone(), backend.clone());
    let mut bob = AppContext::new(config, backend.clone());

    alice
        .sign_in(UserIdentity::new(UserId::parse("alice")?).with_display_name("Alice"))
        .await?;
    bob.sign_in(UserIdentity::new(UserId::parse("bob")?).with_display_name("Bob")).await?;

    alice.coordinator.submit_place("Noodle Bar").await?;
    alice.coordinator.submit_place("Taqueria").await?;
    alice.coordinator.toggle_attendance().await?;
    bob.coordinator.toggle_attendance().await?;
    bob.coordinator.set_availability(&Place::parse("Taqueria")?, false).await?;

    // Give the watchers and mirrors a moment to settle.
    tokio::time::sleep(Duration::from_millis(200)).await;

    println!("Feasible for everyone going:");
    for (place, feasible) in alice.coordinator.current_feasibility().iter() {
        println!("  {place:<12} {}", if feasible { "yes" } else { "no" });
    }

    println!("\nWhat Bob's screen received:");
    for event in bob.presenter.take() {
        match event {
            PresentationEvent::PlaceListed { place, available } => {
                println!("  list   {place}: {}", if available { "available" } else { "unavailable" });
            }
            PresentationEvent::FeasibilityChanged { place, feasible } => {
                println!("  result {place}: {}", if feasible { "feasible" } else { "not feasible" });
            }
            PresentationEvent::AttendanceChanged { going } => {
                println!("  going  {going}");
            }
            PresentationEvent::SignInRequired => println!("  please sign in"),
        }
    }

    alice.shutdown().await?;
    bob.shutdown().await?;
    Ok(())
}
