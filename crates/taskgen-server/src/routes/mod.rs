pub mod health;
pub mod specs;
