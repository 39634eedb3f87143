use clap::Parser;
use tracing::info;
use volunteer_hub::app::{App, AppError};
use volunteer_hub::config::{ClientConfig, FirebaseConfig};
use volunteer_hub::state::notifications::NotificationKind;
use volunteer_hub::store::Action;

#[derive(Parser, Debug)]
#[command(name = "volunteer-hub", about = "Volunteer hub client session runner")]
struct Cli {
    /// Path to open after session restore.
    #[arg(default_value = "/")]
    path: String,

    /// Sign in with VOLUNTEER_HUB_EMAIL / VOLUNTEER_HUB_PASSWORD.
    #[arg(long)]
    login: bool,

    /// Sign out and clear the persisted session.
    #[arg(long, conflicts_with = "login")]
    logout: bool,

    /// Queue a notification and print the queue as JSON.
    #[arg(long)]
    notify: Option<String>,

    /// Notification type: info, success, warning or error.
    #[arg(long, default_value = "info")]
    kind: NotificationKind,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let firebase = FirebaseConfig::from_env()?;
    let client = ClientConfig::from_env()?;
    let app = App::from_config(firebase, &client)?;

    let location = app.start(&cli.path).await;
    if cli.login {
        app.store().dispatch(Action::Login).await;
    } else if cli.logout {
        app.store().dispatch(Action::Logout).await;
    }

    if let Some(message) = cli.notify {
        app.store().notify(message, cli.kind);
        for notification in app.store().notifications().iter() {
            println!("{}", serde_json::to_string(notification).unwrap_or_default());
        }
    }

    let auth = app.store().auth();
    println!("{} -> {:?}", location.path, location.view);
    match &auth.user {
        Some(user) => println!("signed in as {}", user.email.as_deref().unwrap_or(&user.id)),
        None => println!("not signed in"),
    }

    if auth.is_authenticated() {
        info!("session active; press Ctrl-C to exit");
        tokio::signal::ctrl_c().await?;
    }
    Ok(())
}
