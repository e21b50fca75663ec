use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

use crate::auth::{AuthAuthority, AuthGate, Credentials, Registration};
use crate::device::DeviceCapabilities;
use crate::error::SessionError;
use crate::flows::{CameraFlow, DeleteChoice, GalleryFlow};
use crate::state::{Handle, PhotoList, PhotoStore};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Home,
    Camera,
    Gallery,
}

/// Tabs reachable once signed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Camera,
    Gallery,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    ShowLogin,
    ShowRegister,
    Login(Credentials),
    Register(Registration),
    Logout,
    Navigate(Tab),
    /// "View Gallery" from the camera: carries the camera's list as the seed
    OpenGallery,
    RequestCameraPermission,
    ToggleFacing,
    TakePicture,
    SavePhoto,
    SharePhoto,
    RequestDelete(Handle),
    ConfirmDelete,
    CancelDelete,
}

/// Flows mounted for the signed-in user; dropped at logout
#[derive(Default)]
struct MainTabs {
    camera: Option<CameraFlow>,
    gallery: Option<GalleryFlow>,
}

/// Main application state
pub struct App {
    auth: AuthGate,
    store: PhotoStore,
    devices: DeviceCapabilities,
    screen: Screen,
    tabs: Option<MainTabs>,
    /// Status message to display to the user
    status: String,
}

impl App {
    pub fn new(authority: Arc<dyn AuthAuthority>, store: PhotoStore, devices: DeviceCapabilities) -> Self {
        Self {
            auth: AuthGate::new(authority),
            store,
            devices,
            screen: Screen::Login,
            tabs: None,
            status: String::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn auth(&self) -> &AuthGate {
        &self.auth
    }

    pub fn camera(&self) -> Option<&CameraFlow> {
        self.tabs.as_ref()?.camera.as_ref()
    }

    pub fn gallery(&self) -> Option<&GalleryFlow> {
        self.tabs.as_ref()?.gallery.as_ref()
    }

    /// Handle application messages and update state
    pub async fn update(&mut self, message: Message) {
        match message {
            Message::ShowLogin if !self.auth.is_authenticated() => {
                self.screen = Screen::Login;
            }
            Message::ShowRegister if !self.auth.is_authenticated() => {
                self.screen = Screen::Register;
            }
            Message::Login(credentials) if !self.auth.is_authenticated() => {
                match self.auth.login(&credentials).await {
                    Ok(_) => {
                        self.status = "Login successful".to_string();
                        self.tabs = Some(MainTabs::default());
                        self.screen = Screen::Home;
                    }
                    Err(e) => self.status = e.message,
                }
            }
            Message::Register(registration) if !self.auth.is_authenticated() => {
                self.status = match self.auth.register(&registration).await {
                    Ok(msg) => msg,
                    Err(e) => e.message,
                };
            }
            Message::Logout => {
                self.auth.logout();
                self.tabs = None;
                self.screen = Screen::Login;
                self.status.clear();
            }
            message if self.tabs.is_some() => self.update_main(message).await,
            message => debug!("Ignoring {:?} on {:?}", message, self.screen),
        }
    }

    /// Messages that only make sense behind the auth gate
    async fn update_main(&mut self, message: Message) {
        match message {
            Message::Navigate(Tab::Home) => self.screen = Screen::Home,
            Message::Navigate(Tab::Camera) => self.focus_camera().await,
            Message::Navigate(Tab::Gallery) => self.focus_gallery(None).await,
            Message::OpenGallery => {
                let seed = self.camera().map(CameraFlow::gallery_seed);
                self.focus_gallery(seed).await;
            }
            Message::RequestCameraPermission => {
                if let Some(camera) = self.camera_mut() {
                    if !camera.request_permission().await.is_granted() {
                        self.status = "We need your permission to show the camera".to_string();
                    }
                }
            }
            Message::ToggleFacing => {
                if let Some(camera) = self.camera_mut() {
                    camera.toggle_facing();
                }
            }
            Message::TakePicture => {
                if let Some(camera) = self.camera_mut() {
                    match camera.capture().await {
                        Ok(_) => self.status.clear(),
                        Err(SessionError::PermissionDenied(_)) => {
                            self.status = "We need your permission to show the camera".to_string();
                        }
                        Err(_) => self.status = "Failed to take picture".to_string(),
                    }
                }
            }
            Message::SavePhoto => {
                if let Some(camera) = self.camera_mut() {
                    if camera.confirm_save().await.is_some() {
                        self.status = "Photo saved to media library!".to_string();
                    }
                }
            }
            Message::SharePhoto => {
                if let Some(camera) = self.camera_mut() {
                    camera.share().await;
                }
            }
            Message::RequestDelete(handle) => {
                if let Some(gallery) = self.gallery_mut() {
                    gallery.request_delete(handle);
                }
            }
            Message::ConfirmDelete => self.resolve_delete(DeleteChoice::Confirm).await,
            Message::CancelDelete => self.resolve_delete(DeleteChoice::Cancel).await,
            other => debug!("Ignoring {:?} while signed in", other),
        }
    }

    /// Mount the camera on first visit; it loads its list only then
    async fn focus_camera(&mut self) {
        let store = self.store.clone();
        let devices = self.devices.clone();
        if let Some(tabs) = self.tabs.as_mut() {
            if tabs.camera.is_none() {
                tabs.camera = Some(CameraFlow::start(store, &devices).await);
            }
            self.screen = Screen::Camera;
        }
    }

    /// Mount the gallery on first visit, then reconcile on every focus
    async fn focus_gallery(&mut self, seed: Option<PhotoList>) {
        let store = self.store.clone();
        if let Some(tabs) = self.tabs.as_mut() {
            let gallery = tabs
                .gallery
                .get_or_insert_with(|| GalleryFlow::new(store, seed));
            gallery.on_become_visible().await;
            self.screen = Screen::Gallery;
        }
    }

    async fn resolve_delete(&mut self, choice: DeleteChoice) {
        if let Some(gallery) = self.gallery_mut() {
            gallery.resolve_delete(choice).await;
        }
    }

    fn camera_mut(&mut self) -> Option<&mut CameraFlow> {
        self.tabs.as_mut()?.camera.as_mut()
    }

    fn gallery_mut(&mut self) -> Option<&mut GalleryFlow> {
        self.tabs.as_mut()?.gallery.as_mut()
    }

    /// Build a plain-text rendering of the current screen
    pub fn view(&self) -> String {
        let mut out = String::new();

        match self.screen {
            Screen::Login => out.push_str("== Login ==\n  login <username> <password> | register\n"),
            Screen::Register => {
                out.push_str("== Register ==\n  register <username> <email> <password> | back\n")
            }
            Screen::Home => {
                let name = self.auth.current_user().map(|u| u.username.as_str()).unwrap_or_default();
                let _ = writeln!(out, "== Home ==\n  Welcome, {}", name);
                out.push_str("  camera | gallery | logout\n");
            }
            Screen::Camera => {
                if let Some(camera) = self.camera() {
                    if !camera.permission().is_granted() {
                        out.push_str("== Camera ==\n  Camera permission needed: permit\n");
                    } else {
                        let _ = writeln!(
                            out,
                            "== Camera ({}) ==\n  {} photos in session",
                            camera.facing().as_str(),
                            camera.photos().len()
                        );
                        if let Some(preview) = camera.active_preview() {
                            let _ = writeln!(out, "  Preview: {}\n  save | share", preview);
                        }
                        out.push_str("  flip | snap | open-gallery\n");
                    }
                }
            }
            Screen::Gallery => {
                if let Some(gallery) = self.gallery() {
                    let _ = writeln!(out, "== Gallery ({} photos) ==", gallery.photos().len());
                    for row in gallery.rows() {
                        let _ = writeln!(out, "  {}", row.key);
                    }
                    if let Some(prompt) = gallery.pending_delete() {
                        let _ = writeln!(
                            out,
                            "  {}: {} [{}] (yes/no)",
                            prompt.title, prompt.message, prompt.handle
                        );
                    } else {
                        out.push_str("  delete <handle>\n");
                    }
                }
            }
        }

        if !self.status.is_empty() {
            let _ = writeln!(out, "  > {}", self.status);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::fakes::StaticAuthority;
    use crate::device::fakes::FakeDevices;

    fn list(items: &[&str]) -> PhotoList {
        items.iter().map(|s| Handle::from(*s)).collect()
    }

    fn app_with(store: &PhotoStore, devices: &FakeDevices) -> App {
        App::new(
            Arc::new(StaticAuthority::new("ana", "pw")),
            store.clone(),
            devices.capabilities(),
        )
    }

    async fn signed_in(store: &PhotoStore, devices: &FakeDevices) -> App {
        let mut app = app_with(store, devices);
        app.update(Message::Login(Credentials::new("ana", "pw"))).await;
        app
    }

    #[tokio::test]
    async fn test_tabs_unreachable_until_login() {
        let store = PhotoStore::in_memory();
        let devices = FakeDevices::new(&[]);
        let mut app = app_with(&store, &devices);

        app.update(Message::Navigate(Tab::Camera)).await;
        assert_eq!(app.screen(), Screen::Login);
        assert!(app.camera().is_none());

        app.update(Message::Login(Credentials::new("ana", "nope"))).await;
        assert_eq!(app.status(), "Invalid username or password");
        assert_eq!(app.screen(), Screen::Login);

        app.update(Message::Login(Credentials::new("ana", "pw"))).await;
        assert_eq!(app.screen(), Screen::Home);
        assert_eq!(app.status(), "Login successful");
    }

    #[tokio::test]
    async fn test_register_shows_server_message() {
        let store = PhotoStore::in_memory();
        let devices = FakeDevices::new(&[]);
        let mut app = app_with(&store, &devices);

        app.update(Message::ShowRegister).await;
        app.update(Message::Register(Registration::new("ana", "a@x.io", "pw"))).await;
        assert_eq!(app.status(), "User already exists");

        app.update(Message::Register(Registration::new("bo", "b@x.io", "pw"))).await;
        assert_eq!(app.status(), "Registration successful");
        assert_eq!(app.screen(), Screen::Register);
    }

    #[tokio::test]
    async fn test_capture_then_gallery_then_delete() {
        let store = PhotoStore::in_memory();
        let devices = FakeDevices::new(&["file:///t/1.jpg", "file:///t/2.jpg"]);
        let mut app = signed_in(&store, &devices).await;

        app.update(Message::Navigate(Tab::Camera)).await;
        app.update(Message::RequestCameraPermission).await;
        app.update(Message::TakePicture).await;
        app.update(Message::TakePicture).await;
        app.update(Message::OpenGallery).await;

        assert_eq!(app.screen(), Screen::Gallery);
        assert_eq!(
            app.gallery().unwrap().photos(),
            &list(&["file:///t/2.jpg", "file:///t/1.jpg"])
        );

        app.update(Message::RequestDelete(Handle::from("file:///t/1.jpg"))).await;
        assert!(app.view().contains("Delete Photo"));
        app.update(Message::ConfirmDelete).await;

        assert_eq!(store.load().await, list(&["file:///t/2.jpg"]));
        // The camera keeps its stale copy; it only loads at mount
        assert_eq!(app.camera().unwrap().photos().len(), 2);
    }

    #[tokio::test]
    async fn test_gallery_refocus_picks_up_new_captures() {
        let store = PhotoStore::in_memory();
        let devices = FakeDevices::new(&["a", "b"]);
        let mut app = signed_in(&store, &devices).await;

        app.update(Message::Navigate(Tab::Gallery)).await;
        assert!(app.gallery().unwrap().photos().is_empty());

        app.update(Message::Navigate(Tab::Camera)).await;
        app.update(Message::RequestCameraPermission).await;
        app.update(Message::TakePicture).await;
        app.update(Message::Navigate(Tab::Gallery)).await;

        assert_eq!(app.gallery().unwrap().photos(), &list(&["a"]));
    }

    #[tokio::test]
    async fn test_save_photo_reports_success() {
        let store = PhotoStore::in_memory();
        let devices = FakeDevices::new(&["shot"]);
        let mut app = signed_in(&store, &devices).await;

        app.update(Message::Navigate(Tab::Camera)).await;
        app.update(Message::RequestCameraPermission).await;
        app.update(Message::TakePicture).await;
        assert!(app.view().contains("Preview: shot"));

        app.update(Message::SavePhoto).await;
        assert_eq!(app.status(), "Photo saved to media library!");
        assert!(app.camera().unwrap().active_preview().is_none());
    }

    #[tokio::test]
    async fn test_failed_capture_is_reported() {
        let store = PhotoStore::in_memory();
        let devices = FakeDevices::new(&["only"]);
        let mut app = signed_in(&store, &devices).await;
        app.update(Message::Navigate(Tab::Camera)).await;

        app.update(Message::TakePicture).await;
        assert_eq!(app.status(), "We need your permission to show the camera");

        app.update(Message::RequestCameraPermission).await;
        app.update(Message::TakePicture).await;
        assert_eq!(app.status(), "");

        // The scripted camera has run out of frames
        app.update(Message::TakePicture).await;
        assert_eq!(app.status(), "Failed to take picture");
        assert_eq!(store.load().await, list(&["only"]));
    }

    #[tokio::test]
    async fn test_logout_tears_down_flows() {
        let store = PhotoStore::in_memory();
        let devices = FakeDevices::new(&[]);
        let mut app = signed_in(&store, &devices).await;
        app.update(Message::Navigate(Tab::Camera)).await;
        assert!(app.camera().is_some());

        app.update(Message::Logout).await;

        assert_eq!(app.screen(), Screen::Login);
        assert!(app.camera().is_none());
        assert!(app.auth().current_user().is_none());

        app.update(Message::Navigate(Tab::Gallery)).await;
        assert_eq!(app.screen(), Screen::Login);
    }
}
