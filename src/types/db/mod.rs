// Database entities - SeaORM models
pub mod audit_log;
pub mod board_definition;
pub mod cabinet_definition;
pub mod cabinet_position;
pub mod certificate_cabinet;
pub mod certificate_definition;
pub mod controller_definition;
pub mod game_definition;
pub mod initial_hours;
pub mod jackpot_config;
pub mod key;
pub mod key_assignment;
pub mod key_type;
pub mod location;
pub mod location_type;
pub mod technician;
pub mod user;
pub mod user_permission;
pub mod work_log;
