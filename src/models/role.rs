//! Role and permission domain models

use std::{borrow::Cow, collections::HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

/// Role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// A role -> permission grant, joined with the permission row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RolePermissionGrant {
    pub role_id: i64,
    pub permission_id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Create / update role request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoleRequest {
    #[serde(rename = "nombre", alias = "name")]
    #[validate(
        custom(function = "not_blank", message = "Role name is required"),
        length(max = 50, message = "Role name must be at most 50 characters")
    )]
    pub name: String,

    #[serde(rename = "descripcion", alias = "description", default)]
    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,
}

impl RoleRequest {
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
        }
    }

    /// Validate, reporting errors under the JSON field names
    pub fn validate_request(&self) -> Result<(), ValidationErrors> {
        self.validate().map_err(|mut errors| {
            for (field, wire) in [("name", "nombre"), ("description", "descripcion")] {
                if let Some(kind) = errors.0.remove(field) {
                    errors.0.insert(Cow::Borrowed(wire), kind);
                }
            }
            errors
        })
    }
}

/// Permission summary as embedded in a role response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResponse {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
}

impl From<Permission> for PermissionResponse {
    fn from(p: Permission) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
        }
    }
}

impl From<RolePermissionGrant> for PermissionResponse {
    fn from(g: RolePermissionGrant) -> Self {
        Self {
            id: g.permission_id,
            name: g.name,
            description: g.description,
        }
    }
}

/// Role with its permissions flattened into a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleResponse {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "permisos")]
    pub permissions: Vec<PermissionResponse>,
}

impl RoleResponse {
    /// Project a single role. Grants belonging to other roles are ignored.
    pub fn project(role: Role, grants: Vec<RolePermissionGrant>) -> Self {
        let permissions = grants
            .into_iter()
            .filter(|g| g.role_id == role.id)
            .map(PermissionResponse::from)
            .collect();

        Self {
            id: role.id,
            name: role.name,
            description: role.description,
            permissions,
        }
    }
}

/// Project a batch of roles, distributing grants to their owning role.
/// Role order and per-role grant order are kept as loaded.
pub fn project_roles(roles: Vec<Role>, grants: Vec<RolePermissionGrant>) -> Vec<RoleResponse> {
    let mut by_role: HashMap<i64, Vec<PermissionResponse>> = HashMap::new();
    for grant in grants {
        by_role
            .entry(grant.role_id)
            .or_default()
            .push(PermissionResponse::from(grant));
    }

    roles
        .into_iter()
        .map(|role| RoleResponse {
            permissions: by_role.remove(&role.id).unwrap_or_default(),
            id: role.id,
            name: role.name,
            description: role.description,
        })
        .collect()
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: i64, name: &str) -> Role {
        Role {
            id,
            name: name.to_string(),
            description: Some(format!("{name} role")),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn grant(role_id: i64, permission_id: i64, name: &str) -> RolePermissionGrant {
        RolePermissionGrant {
            role_id,
            permission_id,
            name: name.to_string(),
            description: Some(format!("{name} permission")),
        }
    }

    #[test]
    fn test_project_role_with_permissions() {
        let response = RoleResponse::project(
            role(1, "Dispatcher"),
            vec![grant(1, 10, "ROUTE_READ"), grant(1, 11, "ROUTE_WRITE")],
        );

        assert_eq!(response.id, 1);
        assert_eq!(response.name, "Dispatcher");
        assert_eq!(
            response.permissions,
            vec![
                PermissionResponse {
                    id: 10,
                    name: "ROUTE_READ".to_string(),
                    description: Some("ROUTE_READ permission".to_string()),
                },
                PermissionResponse {
                    id: 11,
                    name: "ROUTE_WRITE".to_string(),
                    description: Some("ROUTE_WRITE permission".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_project_role_ignores_foreign_grants() {
        let response = RoleResponse::project(role(1, "Dispatcher"), vec![grant(2, 10, "X")]);
        assert!(response.permissions.is_empty());
    }

    #[test]
    fn test_project_roles_distributes_grants() {
        let roles = vec![role(1, "Admin"), role(2, "Driver"), role(3, "Empty")];
        let grants = vec![
            grant(1, 10, "USER_MANAGE"),
            grant(2, 11, "ROUTE_READ"),
            grant(1, 11, "ROUTE_READ"),
        ];

        let projected = project_roles(roles, grants);
        assert_eq!(projected.len(), 3);

        let admin_perms: Vec<i64> = projected[0].permissions.iter().map(|p| p.id).collect();
        assert_eq!(admin_perms, vec![10, 11]);
        assert_eq!(projected[1].permissions.len(), 1);
        assert!(projected[2].permissions.is_empty());
    }

    #[test]
    fn test_role_response_wire_names() {
        let response = RoleResponse::project(role(1, "Dispatcher"), vec![]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["nombre"], "Dispatcher");
        assert_eq!(json["descripcion"], "Dispatcher role");
        assert!(json["permisos"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_role_request_accepts_both_field_names() {
        let spanish: RoleRequest =
            serde_json::from_str(r#"{"nombre":"Dispatcher","descripcion":"Handles dispatch"}"#)
                .unwrap();
        let english: RoleRequest =
            serde_json::from_str(r#"{"name":"Dispatcher","description":"Handles dispatch"}"#)
                .unwrap();

        assert_eq!(spanish.name, english.name);
        assert_eq!(spanish.description, english.description);

        let minimal: RoleRequest = serde_json::from_str(r#"{"nombre":"Driver"}"#).unwrap();
        assert!(minimal.description.is_none());
    }

    #[test]
    fn test_role_request_validation() {
        assert!(RoleRequest::new("Dispatcher", Some("Handles dispatch")).validate().is_ok());
        assert!(RoleRequest::new("   ", None).validate().is_err());
        assert!(RoleRequest::new("", None).validate().is_err());
        assert!(RoleRequest::new("x".repeat(51), None).validate().is_err());
        assert!(RoleRequest::new("x".repeat(50), None).validate().is_ok());

        let long_description = "d".repeat(256);
        let errors = RoleRequest::new("Dispatcher", Some(long_description.as_str()))
            .validate()
            .unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);
    }

    #[test]
    fn test_validate_request_uses_wire_names() {
        let errors = RoleRequest::new(" ", Some("d".repeat(256).as_str()))
            .validate_request()
            .unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("nombre"));
        assert!(fields.contains_key("descripcion"));
        assert!(!fields.contains_key("name"));
    }
}
