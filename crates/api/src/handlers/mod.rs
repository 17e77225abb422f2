pub mod enhancement;
pub mod health;
