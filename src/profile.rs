// Profile editing: form validation, the outgoing update body and the
// avatar upload. The signed-in user lives in the `Session` handed in by the
// caller and is replaced with whatever the backend sends back.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::api::ProfileApi;
use crate::error::ProfileError;
use crate::models::{ProfileUpdate, User};
use crate::session::Session;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProfileField {
    Name,
    Email,
    OldPassword,
    Password,
    PasswordConfirmation,
}

/// Where input focus goes after a field is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(ProfileField),
    Submit,
}

impl ProfileField {
    /// Fields in the order the form visits them.
    pub const ORDER: [ProfileField; 5] = [
        ProfileField::Name,
        ProfileField::Email,
        ProfileField::OldPassword,
        ProfileField::Password,
        ProfileField::PasswordConfirmation,
    ];

    pub fn focus_next(self) -> Focus {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        match Self::ORDER.get(idx + 1) {
            Some(next) => Focus::Field(*next),
            None => Focus::Submit,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Email => "email",
            ProfileField::OldPassword => "old_password",
            ProfileField::Password => "password",
            ProfileField::PasswordConfirmation => "password_confirmation",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            ProfileField::Name => "Name",
            ProfileField::Email => "E-mail",
            ProfileField::OldPassword => "Current password",
            ProfileField::Password => "New password",
            ProfileField::PasswordConfirmation => "Confirm password",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(
            self,
            ProfileField::OldPassword | ProfileField::Password | ProfileField::PasswordConfirmation
        )
    }
}

/// One message per invalid field; the first failing rule wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<ProfileField, String>);

impl FieldErrors {
    fn add(&mut self, field: ProfileField, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProfileField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, message) in self.iter() {
            writeln!(f, "{}: {}", field.key(), message)?;
        }
        Ok(())
    }
}

/// Raw form contents, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub old_password: String,
    pub password: String,
    pub password_confirmation: String,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid e-mail regex")
    })
}

impl ProfileForm {
    /// Prefill name and e-mail from the current user.
    pub fn for_user(user: &User) -> Self {
        ProfileForm {
            name: user.name.clone(),
            email: user.email.clone(),
            ..Default::default()
        }
    }

    pub fn field_mut(&mut self, field: ProfileField) -> &mut String {
        match field {
            ProfileField::Name => &mut self.name,
            ProfileField::Email => &mut self.email,
            ProfileField::OldPassword => &mut self.old_password,
            ProfileField::Password => &mut self.password,
            ProfileField::PasswordConfirmation => &mut self.password_confirmation,
        }
    }

    pub fn field(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Email => &self.email,
            ProfileField::OldPassword => &self.old_password,
            ProfileField::Password => &self.password,
            ProfileField::PasswordConfirmation => &self.password_confirmation,
        }
    }

    fn wants_password_change(&self) -> bool {
        !self.old_password.is_empty()
    }

    /// Check every rule and collect all failures.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.name.trim().is_empty() {
            errors.add(ProfileField::Name, "Name is required");
        }

        if self.email.trim().is_empty() {
            errors.add(ProfileField::Email, "E-mail is required");
        } else if self.email.len() > 254 || !email_regex().is_match(self.email.trim()) {
            errors.add(ProfileField::Email, "Enter a valid e-mail");
        }

        if self.wants_password_change() {
            for field in [ProfileField::Password, ProfileField::PasswordConfirmation] {
                let value = self.field(field);
                if value.is_empty() {
                    errors.add(field, "Required when changing the password");
                } else if value.chars().count() < MIN_PASSWORD_LEN {
                    errors.add(field, "At least 6 characters");
                }
            }
        }

        if self.password_confirmation != self.password {
            errors.add(ProfileField::PasswordConfirmation, "Passwords do not match");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and build the request body. Password fields are only kept
    /// when the current password was filled in.
    pub fn into_update(self) -> Result<ProfileUpdate, FieldErrors> {
        self.validate()?;
        let change_password = self.wants_password_change();
        let keep = |value: String| change_password.then_some(value);
        Ok(ProfileUpdate {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            old_password: keep(self.old_password),
            password: keep(self.password),
            password_confirmation: keep(self.password_confirmation),
        })
    }
}

pub struct ProfileScreen<'a, A: ProfileApi> {
    api: &'a A,
    session: &'a mut Session,
}

impl<'a, A: ProfileApi> ProfileScreen<'a, A> {
    pub fn new(api: &'a A, session: &'a mut Session) -> Self {
        ProfileScreen { api, session }
    }

    pub fn initial_form(&self) -> ProfileForm {
        ProfileForm::for_user(&self.session.user)
    }

    /// Validate, send `PUT /profile` and refresh the session user. No
    /// request is made when validation fails.
    pub fn submit(&mut self, form: ProfileForm) -> Result<&User, ProfileError> {
        let update = form.into_update().map_err(ProfileError::Validation)?;
        let user = self.api.update_profile(&update).map_err(|err| {
            warn!(error = %err, "profile update failed");
            ProfileError::Update(err)
        })?;
        info!(user_id = %user.id, "profile updated");
        self.session.update_user(user);
        Ok(&self.session.user)
    }

    /// Upload a new avatar. `None` means the picker was cancelled.
    pub fn change_avatar(&mut self, image: Option<&Path>) -> Result<Option<&User>, ProfileError> {
        let image = match image {
            Some(path) => path,
            None => return Ok(None),
        };
        let user = self
            .api
            .update_avatar(&self.session.user.id, image)
            .map_err(ProfileError::Avatar)?;
        self.session.update_user(user);
        Ok(Some(&self.session.user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use std::cell::RefCell;
    use std::path::PathBuf;

    fn valid_form() -> ProfileForm {
        ProfileForm {
            name: "Ana Souza".into(),
            email: "ana@example.com".into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_old_password_drops_password_fields() {
        let update = valid_form().into_update().unwrap();
        assert_eq!(update.old_password, None);

        let body = serde_json::to_value(&update).unwrap();
        let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["email", "name"]);
    }

    #[test]
    fn password_change_keeps_all_three_fields() {
        let form = ProfileForm {
            old_password: "old-secret".into(),
            password: "new-secret".into(),
            password_confirmation: "new-secret".into(),
            ..valid_form()
        };
        let body = serde_json::to_value(form.into_update().unwrap()).unwrap();
        assert_eq!(body["old_password"], "old-secret");
        assert_eq!(body["password"], "new-secret");
        assert_eq!(body["password_confirmation"], "new-secret");
    }

    #[test]
    fn reports_every_invalid_field() {
        let form = ProfileForm {
            email: "not-an-email".into(),
            old_password: "old".into(),
            password: "123".into(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();

        assert_eq!(errors.get(ProfileField::Name), Some("Name is required"));
        assert_eq!(errors.get(ProfileField::Email), Some("Enter a valid e-mail"));
        assert_eq!(errors.get(ProfileField::Password), Some("At least 6 characters"));
        assert_eq!(
            errors.get(ProfileField::PasswordConfirmation),
            Some("Required when changing the password")
        );
        assert_eq!(errors.get(ProfileField::OldPassword), None);
    }

    #[test]
    fn validation_error_lists_each_field() {
        let form = ProfileForm {
            name: String::new(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        let message = ProfileError::Validation(errors).to_string();
        assert_eq!(message, "the form has invalid fields:\nname: Name is required\n");
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let form = ProfileForm {
            old_password: "old-secret".into(),
            password: "new-secret".into(),
            password_confirmation: "new-secreT".into(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(ProfileField::PasswordConfirmation),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn missing_email_says_required() {
        let form = ProfileForm {
            email: "  ".into(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get(ProfileField::Email), Some("E-mail is required"));
    }

    #[test]
    fn focus_walks_fields_then_submits() {
        let mut focus = Focus::Field(ProfileField::Name);
        let mut visited = Vec::new();
        while let Focus::Field(field) = focus {
            visited.push(field);
            focus = field.focus_next();
        }
        assert_eq!(visited, ProfileField::ORDER.to_vec());
        assert_eq!(ProfileField::PasswordConfirmation.focus_next(), Focus::Submit);
    }

    #[derive(Default)]
    struct FakeProfileApi {
        updates: RefCell<Vec<ProfileUpdate>>,
        avatars: RefCell<Vec<(String, PathBuf)>>,
    }

    impl ProfileApi for FakeProfileApi {
        fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
            self.updates.borrow_mut().push(update.clone());
            Ok(User {
                id: "u1".into(),
                name: update.name.clone(),
                email: update.email.clone(),
                avatar_url: None,
            })
        }

        fn update_avatar(&self, user_id: &str, image: &Path) -> Result<User, ApiError> {
            self.avatars
                .borrow_mut()
                .push((user_id.to_string(), image.to_path_buf()));
            Ok(User {
                id: user_id.into(),
                name: "Ana".into(),
                email: "ana@example.com".into(),
                avatar_url: Some("http://cdn/u1.jpg".into()),
            })
        }
    }

    fn session() -> Session {
        Session::new(
            User {
                id: "u1".into(),
                name: "Ana".into(),
                email: "ana@example.com".into(),
                avatar_url: None,
            },
            "token",
        )
    }

    #[test]
    fn invalid_form_sends_nothing() {
        let api = FakeProfileApi::default();
        let mut session = session();
        let mut screen = ProfileScreen::new(&api, &mut session);

        let err = screen
            .submit(ProfileForm {
                name: String::new(),
                ..valid_form()
            })
            .unwrap_err();

        assert!(matches!(err, ProfileError::Validation(_)));
        assert!(api.updates.borrow().is_empty());
    }

    #[test]
    fn successful_update_refreshes_session_user() {
        let api = FakeProfileApi::default();
        let mut session = session();
        {
            let mut screen = ProfileScreen::new(&api, &mut session);
            let form = ProfileForm {
                name: "Ana Lima".into(),
                ..screen.initial_form()
            };
            screen.submit(form).unwrap();
        }
        assert_eq!(session.user.name, "Ana Lima");
    }

    #[test]
    fn avatar_upload_uses_session_user_id() {
        let api = FakeProfileApi::default();
        let mut session = session();
        let mut screen = ProfileScreen::new(&api, &mut session);

        assert!(screen.change_avatar(None).unwrap().is_none());
        let user = screen.change_avatar(Some(Path::new("me.jpg"))).unwrap().unwrap();

        assert_eq!(user.avatar_url.as_deref(), Some("http://cdn/u1.jpg"));
        assert_eq!(api.avatars.borrow()[0], ("u1".to_string(), PathBuf::from("me.jpg")));
    }
}
