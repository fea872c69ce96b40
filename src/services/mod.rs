//! Service layer modules.

pub mod chat_service;
pub mod overdue;
pub mod points;
pub mod profile_service;
pub mod task_service;
pub mod upload_service;
