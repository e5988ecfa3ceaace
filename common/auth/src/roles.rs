pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Closed set of roles a principal can hold. Exactly one role per principal.
pub const ROLE_SET: &[&str] = &[ROLE_ADMIN, ROLE_USER];

pub fn is_known_role(role: &str) -> bool {
    ROLE_SET.contains(&role)
}
