//! Application state and the actions behind each screen.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use taskdeck_api::auth::{LoginRequest, RegisterRequest};
use taskdeck_api::{Priority, TaskCreate};
use taskdeck_client::{Filter, TaskApiClient, TaskList};
use taskdeck_session::{GuardDecision, RouteGuard};
use tracing::info;

/// Events delivered to the UI loop from outside the key handler.
#[derive(Debug, Clone, Copy)]
pub enum AppEvent {
    /// The backend rejected the session; the stored token is already gone.
    SessionExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Login,
    Register,
    Dashboard,
}

impl AppScreen {
    /// Navigation path, as the route guard sees it.
    pub fn path(&self) -> &'static str {
        match self {
            AppScreen::Login => "/login",
            AppScreen::Register => "/register",
            AppScreen::Dashboard => "/dashboard",
        }
    }

    fn for_path(path: &str) -> AppScreen {
        match path {
            "/register" => AppScreen::Register,
            "/dashboard" => AppScreen::Dashboard,
            _ => AppScreen::Login,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
    DueDate,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::DueDate,
            FormField::DueDate => FormField::Title,
        }
    }
}

/// Input form for a new task.
#[derive(Debug, Clone, Default)]
pub struct NewTaskForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: Priority,
    pub focus: FormField,
}

impl NewTaskForm {
    pub fn focused_field_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::DueDate => &mut self.due_date,
        }
    }

    pub fn cycle_priority(&mut self) {
        self.priority = match self.priority {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        };
    }

    /// Build the create payload, or a user-facing message when the due
    /// date does not parse.
    pub fn to_create(&self) -> Result<TaskCreate, String> {
        let due = self.due_date.trim();
        let due_date = if due.is_empty() {
            None
        } else {
            let date = NaiveDate::parse_from_str(due, "%Y-%m-%d")
                .map_err(|_| "Due date must be YYYY-MM-DD".to_string())?;
            Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
        };

        let description = self.description.trim();
        Ok(TaskCreate {
            title: self.title.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            priority: Some(self.priority),
            due_date,
        })
    }
}

pub struct AppState {
    pub screen: AppScreen,
    guard: RouteGuard,
    pub tasks: TaskList,
    pub selected: usize,
    pub auth_email: String,
    pub auth_password: String,
    pub auth_name: String,
    pub auth_focus: AuthField,
    /// Transient one-line message below the active screen.
    pub status: Option<String>,
    pub form: Option<NewTaskForm>,
    /// Task id awaiting the user's delete confirmation.
    pub confirm_delete: Option<i64>,
    pub user_email: Option<String>,
}

impl AppState {
    pub fn new(client: TaskApiClient, guard: RouteGuard) -> Self {
        // Identity comes straight from the persisted token's claims; no
        // network call happens here.
        let user_email = client.session().current_user().ok().map(|claims| claims.sub);
        Self {
            screen: AppScreen::Login,
            guard,
            tasks: TaskList::new(client),
            selected: 0,
            auth_email: String::new(),
            auth_password: String::new(),
            auth_name: String::new(),
            auth_focus: AuthField::Email,
            status: None,
            form: None,
            confirm_delete: None,
            user_email,
        }
    }

    /// Every screen change goes through the route guard; a redirect
    /// decision lands on the screen owning the redirect path.
    pub fn navigate(&mut self, target: AppScreen) {
        let token = self.tasks.client().session().token();
        match self.guard.check(target.path(), token.as_deref()) {
            GuardDecision::Proceed => self.screen = target,
            GuardDecision::Redirect(path) => {
                info!(from = target.path(), to = %path, "navigation redirected");
                self.screen = AppScreen::for_path(&path);
            }
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SessionExpired => {
                self.user_email = None;
                self.status = Some("Session expired; sign in again".to_string());
                self.navigate(AppScreen::Login);
            }
        }
    }

    pub fn focused_auth_field_mut(&mut self) -> &mut String {
        match self.auth_focus {
            AuthField::Email => &mut self.auth_email,
            AuthField::Password => &mut self.auth_password,
            AuthField::Name => &mut self.auth_name,
        }
    }

    pub fn next_auth_field(&mut self) {
        self.auth_focus = match (self.auth_focus, self.screen) {
            (AuthField::Email, _) => AuthField::Password,
            (AuthField::Password, AppScreen::Register) => AuthField::Name,
            (AuthField::Password, _) => AuthField::Email,
            (AuthField::Name, _) => AuthField::Email,
        };
    }

    pub async fn submit_login(&mut self) {
        let request = LoginRequest {
            email: self.auth_email.trim().to_string(),
            password: self.auth_password.clone(),
        };
        if request.email.is_empty() || request.password.is_empty() {
            self.status = Some("Email and password are required".to_string());
            return;
        }

        let client = self.tasks.client().clone();
        match client.login(&request).await {
            Ok(response) => {
                self.user_email = Some(response.user.email);
                self.status = None;
                self.auth_password.clear();
                self.navigate(AppScreen::Dashboard);
                if self.screen == AppScreen::Dashboard {
                    let _ = self.tasks.load().await;
                    self.clamp_selection();
                }
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    pub async fn submit_register(&mut self) {
        let name = self.auth_name.trim();
        let request = RegisterRequest {
            email: self.auth_email.trim().to_string(),
            password: self.auth_password.clone(),
            name: (!name.is_empty()).then(|| name.to_string()),
        };
        if request.email.is_empty() || request.password.is_empty() {
            self.status = Some("Email and password are required".to_string());
            return;
        }

        let client = self.tasks.client().clone();
        match client.register(&request).await {
            // Registration does not issue a token; sign in with the same
            // credentials right away.
            Ok(_) => self.submit_login().await,
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    pub fn logout(&mut self) {
        if let Err(err) = self.tasks.client().logout() {
            self.status = Some(err.to_string());
        }
        self.user_email = None;
        self.navigate(AppScreen::Login);
    }

    pub async fn reload(&mut self) {
        let _ = self.tasks.load().await;
        self.clamp_selection();
    }

    pub fn selected_task_id(&self) -> Option<i64> {
        self.tasks.visible().get(self.selected).map(|task| task.id)
    }

    pub fn clamp_selection(&mut self) {
        let len = self.tasks.visible().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn select_next(&mut self) {
        let len = self.tasks.visible().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn cycle_filter(&mut self) {
        let next = match self.tasks.filter() {
            Filter::All => Filter::Active,
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
        };
        self.tasks.set_filter(next);
        self.clamp_selection();
    }

    pub async fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            let _ = self.tasks.toggle_complete(id).await;
        }
    }

    pub fn request_delete(&mut self) {
        self.confirm_delete = self.selected_task_id();
    }

    /// Settle a pending delete with the user's answer. Declining sends
    /// nothing and leaves the list untouched.
    pub async fn resolve_delete(&mut self, confirmed: bool) {
        if let Some(id) = self.confirm_delete.take() {
            let _ = self.tasks.remove(id, confirmed).await;
            self.clamp_selection();
        }
    }

    pub fn open_form(&mut self) {
        self.form = Some(NewTaskForm::default());
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub async fn submit_form(&mut self) {
        let parsed = match &self.form {
            Some(form) => form.to_create(),
            None => return,
        };
        match parsed {
            Ok(fields) => {
                if self.tasks.create(fields).await.is_ok() {
                    self.form = None;
                    self.selected = 0;
                }
            }
            Err(message) => self.status = Some(message),
        }
    }

    pub fn dismiss_messages(&mut self) {
        self.tasks.clear_error();
        self.status = None;
    }
}
