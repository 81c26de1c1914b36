//! Account form validation (login, register, forgot and reset password).
//!
//! Submitting validates every field of the form. After the first submit
//! attempt the form re-validates the edited field on each input, so a
//! shopper is not nagged while typing for the first time.

use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
}

impl FormKind {
    pub const ALL: [FormKind; 4] = [
        FormKind::Login,
        FormKind::Register,
        FormKind::ForgotPassword,
        FormKind::ResetPassword,
    ];

    pub fn from_form_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.form_id() == id)
    }

    pub fn form_id(self) -> &'static str {
        match self {
            FormKind::Login => "loginForm",
            FormKind::Register => "registerForm",
            FormKind::ForgotPassword => "forgotPasswordForm",
            FormKind::ResetPassword => "resetPasswordForm",
        }
    }

    /// Fields this form checks on submit, in display order.
    pub fn fields(self) -> &'static [FieldRole] {
        match self {
            FormKind::Login => &[FieldRole::Email, FieldRole::Password],
            FormKind::Register => &[
                FieldRole::Email,
                FieldRole::Password,
                FieldRole::ConfirmPassword,
                FieldRole::Terms,
            ],
            FormKind::ForgotPassword => &[FieldRole::Email],
            FormKind::ResetPassword => &[FieldRole::Password, FieldRole::ConfirmPassword],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Email,
    Password,
    ConfirmPassword,
    Terms,
}

impl FieldRole {
    pub fn from_input_id(id: &str) -> Option<Self> {
        match id {
            "email" | "forgotEmail" => Some(FieldRole::Email),
            "password" | "resetPassword" => Some(FieldRole::Password),
            "confirmPassword" | "resetConfirmPassword" => Some(FieldRole::ConfirmPassword),
            "agreeTerms" => Some(FieldRole::Terms),
            _ => None,
        }
    }

    pub fn selector(self) -> &'static str {
        match self {
            FieldRole::Email => "#email, #forgotEmail",
            FieldRole::Password => "#password, #resetPassword",
            FieldRole::ConfirmPassword => "#confirmPassword, #resetConfirmPassword",
            FieldRole::Terms => "#agreeTerms",
        }
    }
}

/// Why a field was rejected. `Display` is the message under the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    EmailRequired,
    EmailInvalid,
    PasswordRequired,
    ConfirmRequired,
    PasswordMismatch,
    TermsRequired,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FieldError::EmailRequired => "Email là bắt buộc",
            FieldError::EmailInvalid => "Vui lòng nhập địa chỉ email hợp lệ",
            FieldError::PasswordRequired => "Mật khẩu là bắt buộc",
            FieldError::ConfirmRequired => "Vui lòng xác nhận mật khẩu của bạn",
            FieldError::PasswordMismatch => "Mật khẩu không khớp",
            FieldError::TermsRequired => "Bạn phải đồng ý với điều khoản sử dụng",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for FieldError {}

/// Field contents read from a form; `None` means the form has no such field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub terms_accepted: Option<bool>,
}

impl FormValues {
    fn has(&self, role: FieldRole) -> bool {
        match role {
            FieldRole::Email => self.email.is_some(),
            FieldRole::Password => self.password.is_some(),
            FieldRole::ConfirmPassword => self.confirm_password.is_some(),
            FieldRole::Terms => self.terms_accepted.is_some(),
        }
    }

    fn confirm_has_value(&self) -> bool {
        self.confirm_password.as_deref().is_some_and(|v| !v.is_empty())
    }
}

pub type FieldCheck = (FieldRole, Result<(), FieldError>);

fn email_pattern() -> Option<&'static Regex> {
    static EMAIL: LazyLock<Option<Regex>> =
        LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());
    EMAIL.as_ref()
}

pub fn check_email(raw: &str) -> Result<(), FieldError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(FieldError::EmailRequired);
    }
    if !email_pattern().is_some_and(|re| re.is_match(value)) {
        return Err(FieldError::EmailInvalid);
    }
    Ok(())
}

/// Blank check only; the login form does no format validation.
pub fn check_not_blank(raw: &str, err: FieldError) -> Result<(), FieldError> {
    if raw.trim().is_empty() {
        Err(err)
    } else {
        Ok(())
    }
}

pub fn check_password(raw: &str) -> Result<(), FieldError> {
    if raw.is_empty() {
        Err(FieldError::PasswordRequired)
    } else {
        Ok(())
    }
}

pub fn check_confirm(confirm: &str, password: &str) -> Result<(), FieldError> {
    if confirm.is_empty() {
        Err(FieldError::ConfirmRequired)
    } else if confirm != password {
        Err(FieldError::PasswordMismatch)
    } else {
        Ok(())
    }
}

pub fn check_terms(accepted: bool) -> Result<(), FieldError> {
    if accepted {
        Ok(())
    } else {
        Err(FieldError::TermsRequired)
    }
}

fn check_field(kind: FormKind, role: FieldRole, values: &FormValues) -> Result<(), FieldError> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    match (kind, role) {
        (FormKind::Login, FieldRole::Email) => {
            check_not_blank(&text(&values.email), FieldError::EmailRequired)
        }
        (FormKind::Login, FieldRole::Password) => {
            check_not_blank(&text(&values.password), FieldError::PasswordRequired)
        }
        (_, FieldRole::Email) => check_email(&text(&values.email)),
        (_, FieldRole::Password) => check_password(&text(&values.password)),
        (_, FieldRole::ConfirmPassword) => {
            check_confirm(&text(&values.confirm_password), &text(&values.password))
        }
        (_, FieldRole::Terms) => check_terms(values.terms_accepted.unwrap_or(false)),
    }
}

/// Outcome of validating a whole form on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormReport {
    pub checks: Vec<FieldCheck>,
    /// False when a field the form cannot do without is missing from the markup.
    pub complete: bool,
}

impl FormReport {
    pub fn is_valid(&self) -> bool {
        self.complete && self.checks.iter().all(|(_, r)| r.is_ok())
    }
}

pub fn validate(kind: FormKind, values: &FormValues) -> FormReport {
    let checks = kind
        .fields()
        .iter()
        .copied()
        .filter(|role| values.has(*role))
        .filter(|role| *role != FieldRole::ConfirmPassword || values.password.is_some())
        .map(|role| (role, check_field(kind, role, values)))
        .collect();
    let complete = kind != FormKind::ForgotPassword || values.email.is_some();
    FormReport { checks, complete }
}

/// Remembers which forms had a submit attempt, for lazy re-validation.
#[derive(Debug, Default)]
pub struct FormValidator {
    submitted: HashSet<FormKind>,
}

impl FormValidator {
    pub fn submit(&mut self, kind: FormKind, values: &FormValues) -> FormReport {
        self.submitted.insert(kind);
        let report = validate(kind, values);
        debug!("{} submitted, valid: {}", kind.form_id(), report.is_valid());
        report
    }

    pub fn was_submitted(&self, kind: FormKind) -> bool {
        self.submitted.contains(&kind)
    }

    /// Checks to apply after `changed` was edited. Empty before the first
    /// submit attempt.
    pub fn revalidate(
        &self,
        kind: FormKind,
        changed: FieldRole,
        values: &FormValues,
    ) -> Vec<FieldCheck> {
        if !self.was_submitted(kind) || !kind.fields().contains(&changed) {
            return Vec::new();
        }
        let mut checks = vec![(changed, check_field(kind, changed, values))];
        let retouch_confirm = matches!(kind, FormKind::Register | FormKind::ResetPassword)
            && changed == FieldRole::Password
            && values.confirm_has_value();
        if retouch_confirm {
            checks.push((
                FieldRole::ConfirmPassword,
                check_field(kind, FieldRole::ConfirmPassword, values),
            ));
        }
        checks
    }

    pub fn reset(&mut self, kind: FormKind) {
        self.submitted.remove(&kind);
    }
}

/// State of a password field after its show/hide toggle is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordVisibility {
    pub input_type: &'static str,
    /// True when the crossed-out eye icon should show.
    pub crossed_eye: bool,
    pub aria_label: &'static str,
}

pub fn toggle_password(current_type: &str) -> PasswordVisibility {
    if current_type == "password" {
        PasswordVisibility {
            input_type: "text",
            crossed_eye: true,
            aria_label: "Hide password",
        }
    } else {
        PasswordVisibility {
            input_type: "password",
            crossed_eye: false,
            aria_label: "Show password",
        }
    }
}
