use serde::Deserialize;

use crate::validation::Validator;

#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub csrf_token: String,
    #[serde(skip)]
    pub validator: Validator,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub csrf_token: String,
    #[serde(skip)]
    pub validator: Validator,
}

/// Password change form. None of its values are echoed back on re-render.
#[derive(Debug, Default, Deserialize)]
pub struct ChangePasswordForm {
    #[serde(default, rename = "currentPassword")]
    pub current_password: String,
    #[serde(default, rename = "newPassword")]
    pub new_password: String,
    #[serde(default, rename = "newPasswordConfirmation")]
    pub new_password_confirmation: String,
    #[serde(default)]
    pub csrf_token: String,
    #[serde(skip)]
    pub validator: Validator,
}

#[derive(Debug, Deserialize)]
pub struct LogoutForm {
    #[serde(default)]
    pub csrf_token: String,
}
