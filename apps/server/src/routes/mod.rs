pub mod health;
pub mod issues;
