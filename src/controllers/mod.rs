pub mod home_controller;
pub mod prices_controller;
pub mod alerts_controller;
pub mod stats_controller;
pub mod email_controller;
