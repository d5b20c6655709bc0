// src/models/user.rs

use serde::Deserialize;
use validator::Validate;

/// DTO for staff login (super-admin or teacher).
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub login: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
