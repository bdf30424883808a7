//! Authentication infrastructure services

pub mod jwt_service;
pub mod password_hasher;
pub mod verification_token;

pub use jwt_service::JwtService;
pub use password_hasher::PasswordHasher;
pub use verification_token::VerificationTokenGenerator;
