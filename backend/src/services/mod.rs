pub mod fcm_service;
pub mod notification_service;
pub mod trending_cache;
pub mod user_cache;
pub mod video_service;
