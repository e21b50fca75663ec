use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, info};

use photo_session::app::{App, Message, Tab};
use photo_session::auth::{AuthClient, Credentials, Registration};
use photo_session::config::AppConfig;
use photo_session::device::DeviceCapabilities;
use photo_session::logging;
use photo_session::state::{Handle, PhotoStore, SqliteStorage};

const HELP: &str = "\
commands:
  login <username> <password>      register <username> <email> <password>
  register | back                  logout
  home | camera | gallery          open-gallery
  permit | flip | snap             save | share
  delete <handle> | yes | no       help | quit";

/// What a line of input asks for
#[derive(Debug)]
enum Command {
    Send(Message),
    Help,
    Quit,
}

/// Parse one input line. `Err` carries a usage hint.
fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = words.split_first() else {
        return Ok(None);
    };

    let message = match (verb, args) {
        ("login", [username, password]) => Message::Login(Credentials::new(*username, *password)),
        ("login", _) => return Err("usage: login <username> <password>".to_string()),
        ("register", []) => Message::ShowRegister,
        ("register", [username, email, password]) => {
            Message::Register(Registration::new(*username, *email, *password))
        }
        ("register", _) => return Err("usage: register <username> <email> <password>".to_string()),
        ("back", []) => Message::ShowLogin,
        ("logout", []) => Message::Logout,
        ("home", []) => Message::Navigate(Tab::Home),
        ("camera", []) => Message::Navigate(Tab::Camera),
        ("gallery", []) => Message::Navigate(Tab::Gallery),
        ("open-gallery", []) => Message::OpenGallery,
        ("permit", []) => Message::RequestCameraPermission,
        ("flip", []) => Message::ToggleFacing,
        ("snap", []) => Message::TakePicture,
        ("save", []) => Message::SavePhoto,
        ("share", []) => Message::SharePhoto,
        // Handles are file locations and may contain spaces
        ("delete", [_, ..]) => {
            let handle = line.trim_start()[verb.len()..].trim();
            Message::RequestDelete(Handle::from(handle))
        }
        ("delete", []) => return Err("usage: delete <handle>".to_string()),
        ("yes", []) => Message::ConfirmDelete,
        ("no", []) => Message::CancelDelete,
        ("help", _) => return Ok(Some(Command::Help)),
        ("quit" | "exit", _) => return Ok(Some(Command::Quit)),
        _ => return Err(format!("unknown command: {} (try help)", line.trim())),
    };

    Ok(Some(Command::Send(message)))
}

/// Trace every write to the photo list until the store goes away
async fn log_store_changes(mut revisions: watch::Receiver<u64>) {
    while revisions.changed().await.is_ok() {
        let revision = *revisions.borrow_and_update();
        debug!("💾 Photo list changed (revision {})", revision);
    }
}

#[tokio::main]
async fn main() -> photo_session::Result<()> {
    let config = AppConfig::load()?;
    logging::init(&config.log_filter);

    let storage = SqliteStorage::open(config.database_path()?)?;
    let store = PhotoStore::new(Arc::new(storage));
    tokio::spawn(log_store_changes(store.subscribe()));
    let devices = DeviceCapabilities::from_config(&config)?;
    let authority = AuthClient::new(&config.api_url, config.request_timeout())?;

    info!("🎨 Photo session ready, auth at {}", authority.base_url());

    let mut app = App::new(Arc::new(authority), store, devices);
    println!("{}", app.view());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Help)) => println!("{}", HELP),
            Ok(Some(Command::Send(message))) => {
                app.update(message).await;
                println!("{}", app.view());
            }
            Err(hint) => println!("{}", hint),
        }
    }

    Ok(())
}
