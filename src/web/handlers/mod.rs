pub mod channels;
pub mod dashboard;
pub mod groups;
pub mod health;
pub mod packages;
pub mod playlist;
pub mod tariffs;
pub mod users;
