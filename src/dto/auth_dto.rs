use serde::{Deserialize, Serialize};
use validator::Validate;

// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Correo electrónico inválido"))]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es requerida"))]
    pub password: String,
}

// Register request; las reglas de contraseña las aplica AuthService
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre es requerido"))]
    pub nombre: String,
    #[validate(length(min = 1, max = 100, message = "El apellido es requerido"))]
    pub apellido: String,
    #[validate(email(message = "Correo electrónico inválido"))]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

// Query del redirect OAuth
#[derive(Debug, Deserialize)]
pub struct OAuthQuery {
    pub redirect_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OAuthUrlResponse {
    pub provider: String,
    pub url: String,
}
