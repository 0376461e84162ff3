pub mod health;
pub mod logging;
