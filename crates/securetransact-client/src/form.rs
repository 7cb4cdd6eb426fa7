use std::collections::BTreeMap;

use securetransact_types::api::{LoginRequest, RegisterRequest};
use securetransact_types::models::UserType;
use securetransact_types::validation::{
    MIN_PASSWORD_LEN, is_valid_email, is_valid_password, normalize_email,
};

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
    /// Not tied to one input; shown above the form.
    General,
}

/// One message per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<Field, String>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Editing a field clears its error.
    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    fn set(&mut self, field: Field, msg: impl Into<String>) {
        self.0.insert(field, msg.into());
    }

    fn general(msg: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.set(Field::General, msg);
        errors
    }

    fn into_result<T>(self, ok: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(ok) } else { Err(self) }
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub user_type: UserType,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            user_type: UserType::Both,
        }
    }
}

impl RegistrationForm {
    /// Check every field and build the request the server expects: trimmed
    /// name, normalized email, blank phone dropped.
    pub fn validate(&self) -> Result<RegisterRequest, FormErrors> {
        let mut errors = FormErrors::default();

        if self.name.trim().is_empty() {
            errors.set(Field::Name, "Name is required");
        }

        if self.email.trim().is_empty() {
            errors.set(Field::Email, "Email is required");
        } else if !is_valid_email(self.email.trim()) {
            errors.set(Field::Email, "Invalid email format");
        }

        if self.password.is_empty() {
            errors.set(Field::Password, "Password is required");
        } else if !is_valid_password(&self.password) {
            errors.set(
                Field::Password,
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            );
        }

        if self.confirm_password.is_empty() {
            errors.set(Field::ConfirmPassword, "Please confirm the password");
        } else if self.password != self.confirm_password {
            errors.set(Field::ConfirmPassword, "Passwords do not match");
        }

        let phone = self.phone.trim();
        errors.into_result(RegisterRequest {
            email: Some(normalize_email(&self.email)),
            password: Some(self.password.clone()),
            name: Some(self.name.trim().to_string()),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            user_type: Some(self.user_type.as_str().to_string()),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, FormErrors> {
        let mut errors = FormErrors::default();
        if self.email.trim().is_empty() {
            errors.set(Field::Email, "Email is required");
        }
        if self.password.is_empty() {
            errors.set(Field::Password, "Password is required");
        }
        errors.into_result(LoginRequest {
            email: Some(normalize_email(&self.email)),
            password: Some(self.password.clone()),
        })
    }
}

/// Turn a failed registration into something the form can display.
pub fn registration_errors(err: &ClientError) -> FormErrors {
    match err {
        ClientError::Form(errors) => errors.clone(),
        ClientError::Network(_) => FormErrors::general(
            "Cannot reach the server. Check that the backend is running.",
        ),
        ClientError::NotAuthenticated => FormErrors::general("Please sign in again."),
        ClientError::Decode(_) => FormErrors::general("Server problem. Please try again later."),
        ClientError::Api { status, body } => {
            let msg = body.error.as_str();
            let lower = msg.to_lowercase();
            if lower.contains("already exists") {
                let mut errors = FormErrors::default();
                errors.set(Field::Email, msg);
                errors
            } else if *status == 503 || lower.contains("database") {
                FormErrors::general("Database unavailable. Please try again later.")
            } else if *status >= 500 {
                FormErrors::general("Server problem. Please try again later.")
            } else {
                FormErrors::general(msg)
            }
        }
    }
}
