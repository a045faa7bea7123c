//! Route paths.

pub const GET_API_HEALTH: &str = "/api/health";
pub const POST_AUTH_REGISTER: &str = "/api/auth/register";
pub const POST_AUTH_LOGIN: &str = "/api/auth/login";
pub const GET_AUTH_ME: &str = "/api/auth/me";
pub const GET_ADMIN_USER_ROLES: &str = "/api/admin/users/{id}/roles";
pub const GET_ROLES: &str = "/api/roles";
pub const POST_USERS_ROLES_ASSIGN: &str = "/api/users/roles/assign";
pub const POST_USERS_ROLES_REMOVE: &str = "/api/users/roles/remove";
