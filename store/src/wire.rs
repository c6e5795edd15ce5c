//! Inbound wire representations and their normalization into canonical models.
//!
//! The backend has shipped several generations of field names (`id`,
//! `idUsuario`, `id_usuario`) and still does for older resources. All of
//! that tolerance lives here, once: policy and view code never see a raw
//! payload. A reference that cannot be normalized becomes `None` (and the
//! predicates on the models treat that as "no match"); a ticket that cannot
//! be normalized at all is skipped from collections instead of aborting them.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::models::{Asset, Comment, Identity, Priority, Role, Ticket, TicketStatus, UserRef};

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("ticket payload is missing an id")]
    MissingTicketId,
    #[error("ticket {0} is missing created_at")]
    MissingCreatedAt(i64),
    #[error("ticket {id} carries unusable timestamp `{value}`")]
    BadTimestamp { id: i64, value: String },
    #[error("ticket {id} carries unknown status `{value}`")]
    UnknownStatus { id: i64, value: String },
    #[error("comment payload is missing id or ticket reference")]
    MissingCommentId,
    #[error("login payload is missing a usable user")]
    MissingUser,
}

/// User reference as the backend sends it, across all naming generations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserDto {
    #[serde(alias = "idUsuario", alias = "id_usuario")]
    pub id: Option<i64>,
    #[serde(alias = "nombre")]
    pub name: Option<String>,
    #[serde(alias = "correo")]
    pub email: Option<String>,
    #[serde(alias = "rol", deserialize_with = "string_or_seq")]
    pub roles: Vec<String>,
}

impl UserDto {
    pub fn normalize_ref(&self) -> Option<UserRef> {
        let id = self.id?;
        Some(UserRef {
            id,
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
        })
    }

    pub fn normalize_identity(&self) -> Option<Identity> {
        let id = self.id?;
        Some(Identity {
            id,
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            roles: normalize_roles(&self.roles),
        })
    }
}

/// Role tags come as an array on current backends and as a single string on
/// older ones.
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(OneOrMany::One(tag)) => Ok(vec![tag]),
        Some(OneOrMany::Many(tags)) => Ok(tags),
    }
}

pub fn normalize_roles(tags: &[String]) -> Vec<Role> {
    let mut roles = Vec::new();
    for tag in tags {
        match Role::from_tag(tag) {
            Some(role) if !roles.contains(&role) => roles.push(role),
            Some(_) => {}
            None => warn!(tag = %tag, "unrecognized role tag on wire, dropping it"),
        }
    }
    roles
}

/// Priority arrives either as a bare name or as an `{ id, name }` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriorityDto {
    Name(String),
    Entity {
        #[serde(default, alias = "idPrioridad", alias = "id_prioridad")]
        id: Option<i64>,
        #[serde(default, alias = "nombre")]
        name: Option<String>,
    },
}

impl PriorityDto {
    pub fn normalize(&self) -> Option<Priority> {
        match self {
            PriorityDto::Name(name) => {
                let name = name.trim();
                (!name.is_empty()).then(|| Priority {
                    id: None,
                    name: name.to_string(),
                })
            }
            PriorityDto::Entity { id, name } => {
                let name = name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
                Some(Priority {
                    id: *id,
                    name: name.to_string(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssetDto {
    #[serde(alias = "idEquipo", alias = "id_equipo")]
    pub id: Option<i64>,
    #[serde(alias = "nombre")]
    pub name: Option<String>,
    #[serde(alias = "numeroSerie", alias = "numero_serie", alias = "serie")]
    pub serial: Option<String>,
}

impl AssetDto {
    pub fn normalize(&self) -> Option<Asset> {
        if self.id.is_none() && self.name.is_none() && self.serial.is_none() {
            return None;
        }
        Some(Asset {
            id: self.id,
            name: self.name.clone().unwrap_or_default(),
            serial: self.serial.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TicketDto {
    #[serde(alias = "idTicket", alias = "id_ticket")]
    pub id: Option<i64>,
    #[serde(alias = "titulo")]
    pub title: Option<String>,
    #[serde(alias = "descripcion")]
    pub description: Option<String>,
    #[serde(alias = "estado")]
    pub status: Option<String>,
    #[serde(alias = "prioridad")]
    pub priority: Option<PriorityDto>,
    #[serde(alias = "usuario", alias = "creador")]
    pub creator: Option<UserDto>,
    #[serde(alias = "tecnico", alias = "asignado")]
    pub assignee: Option<UserDto>,
    #[serde(alias = "asignadoPor", alias = "asignado_por")]
    pub assigned_by: Option<i64>,
    #[serde(alias = "equipo")]
    pub asset: Option<AssetDto>,
    #[serde(alias = "fechaCreacion", alias = "fecha_creacion")]
    pub created_at: Option<String>,
    #[serde(alias = "fechaActualizacion", alias = "fecha_actualizacion")]
    pub updated_at: Option<String>,
    #[serde(alias = "fechaCierre", alias = "fecha_cierre")]
    pub closed_at: Option<String>,
    #[serde(alias = "calificacion")]
    pub rating: Option<u8>,
}

impl TicketDto {
    pub fn normalize(&self) -> Result<Ticket, NormalizeError> {
        let id = self.id.ok_or(NormalizeError::MissingTicketId)?;

        let status_raw = self.status.as_deref().unwrap_or_default();
        let status =
            TicketStatus::from_wire(status_raw).ok_or_else(|| NormalizeError::UnknownStatus {
                id,
                value: status_raw.to_string(),
            })?;

        let created_raw = self
            .created_at
            .as_deref()
            .ok_or(NormalizeError::MissingCreatedAt(id))?;
        let created_at =
            parse_timestamp(created_raw).ok_or_else(|| NormalizeError::BadTimestamp {
                id,
                value: created_raw.to_string(),
            })?;

        let updated_at = self
            .updated_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(created_at);

        let closed_at = match self.closed_at.as_deref() {
            None | Some("") => None,
            Some(raw) => match parse_timestamp(raw) {
                Some(stamp) => Some(stamp),
                None => {
                    warn!(ticket_id = id, value = raw, "dropping unusable closed_at");
                    None
                }
            },
        };

        Ok(Ticket {
            id,
            title: self.title.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            status,
            priority: self.priority.as_ref().and_then(PriorityDto::normalize),
            creator: self.creator.as_ref().and_then(UserDto::normalize_ref),
            assignee: self.assignee.as_ref().and_then(UserDto::normalize_ref),
            assigned_by: self.assigned_by,
            asset: self.asset.as_ref().and_then(AssetDto::normalize),
            created_at,
            updated_at,
            closed_at,
            rating: self.rating,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentDto {
    #[serde(alias = "idComentario", alias = "id_comentario")]
    pub id: Option<i64>,
    #[serde(alias = "idTicket", alias = "id_ticket", alias = "ticket")]
    pub ticket_id: Option<i64>,
    #[serde(alias = "usuario", alias = "autor")]
    pub author: Option<UserDto>,
    #[serde(alias = "mensaje", alias = "contenido")]
    pub message: Option<String>,
    #[serde(alias = "fechaCreacion", alias = "fecha_creacion", alias = "fecha")]
    pub created_at: Option<String>,
}

impl CommentDto {
    pub fn normalize(&self) -> Result<Comment, NormalizeError> {
        let (Some(id), Some(ticket_id)) = (self.id, self.ticket_id) else {
            return Err(NormalizeError::MissingCommentId);
        };
        let created_at = self
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);

        Ok(Comment {
            id,
            ticket_id,
            author: self.author.as_ref().and_then(UserDto::normalize_ref),
            message: self.message.clone().unwrap_or_default(),
            created_at,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginDto {
    #[serde(alias = "usuario")]
    pub user: Option<UserDto>,
    pub token: Option<String>,
}

impl LoginDto {
    pub fn normalize(&self) -> Result<(Identity, Option<String>), NormalizeError> {
        let identity = self
            .user
            .as_ref()
            .and_then(UserDto::normalize_identity)
            .ok_or(NormalizeError::MissingUser)?;
        Ok((identity, self.token.clone()))
    }
}

/// Collection endpoints are decoded entry by entry so a single malformed
/// record cannot take the whole listing down.
pub fn normalize_tickets(items: Vec<serde_json::Value>) -> Vec<Ticket> {
    let mut tickets = Vec::with_capacity(items.len());
    for item in items {
        let dto: TicketDto = match serde_json::from_value(item) {
            Ok(dto) => dto,
            Err(e) => {
                warn!(error = %e, "skipping undecodable ticket entry");
                continue;
            }
        };
        match dto.normalize() {
            Ok(ticket) => tickets.push(ticket),
            Err(e) => warn!(error = %e, "skipping malformed ticket entry"),
        }
    }
    tickets
}

pub fn normalize_comments(items: Vec<serde_json::Value>) -> Vec<Comment> {
    let mut comments = Vec::with_capacity(items.len());
    for item in items {
        let dto: CommentDto = match serde_json::from_value(item) {
            Ok(dto) => dto,
            Err(e) => {
                warn!(error = %e, "skipping undecodable comment entry");
                continue;
            }
        };
        match dto.normalize() {
            Ok(comment) => comments.push(comment),
            Err(e) => warn!(error = %e, "skipping malformed comment entry"),
        }
    }
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    comments
}

pub fn normalize_identities(items: Vec<serde_json::Value>) -> Vec<Identity> {
    let mut identities = Vec::with_capacity(items.len());
    for item in items {
        let dto: UserDto = match serde_json::from_value(item) {
            Ok(dto) => dto,
            Err(e) => {
                warn!(error = %e, "skipping undecodable user entry");
                continue;
            }
        };
        match dto.normalize_identity() {
            Some(identity) => identities.push(identity),
            None => warn!("skipping user entry without an id"),
        }
    }
    identities
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&Utc));
    }
    // Older backend builds emitted naive `YYYY-MM-DD HH:MM:SS` stamps.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    #[test]
    #[serial]
    fn user_id_aliases_normalize_to_one_field() {
        for key in ["id", "idUsuario", "id_usuario"] {
            let dto: UserDto =
                serde_json::from_value(json!({ key: 7, "nombre": "Ana" })).unwrap();
            let user = dto.normalize_ref().unwrap();
            assert_eq!(user.id, 7);
            assert_eq!(user.name, "Ana");
        }
    }

    #[test]
    #[serial]
    fn roles_accept_string_and_array_forms() {
        let single: UserDto =
            serde_json::from_value(json!({ "id": 1, "rol": "AGENT" })).unwrap();
        assert_eq!(
            single.normalize_identity().unwrap().roles,
            vec![Role::Agent]
        );

        let many: UserDto =
            serde_json::from_value(json!({ "id": 1, "roles": ["CLIENT", "ADMIN", "bogus"] }))
                .unwrap();
        assert_eq!(
            many.normalize_identity().unwrap().roles,
            vec![Role::Client, Role::Admin]
        );

        let none: UserDto = serde_json::from_value(json!({ "id": 1 })).unwrap();
        assert!(none.normalize_identity().unwrap().roles.is_empty());
    }

    #[test]
    #[serial]
    fn ticket_normalizes_spanish_era_payload() {
        let dto: TicketDto = serde_json::from_value(json!({
            "idTicket": 3,
            "titulo": "sin red",
            "descripcion": "el equipo no conecta",
            "estado": "ABIERTO",
            "prioridad": { "id": 2, "nombre": "Alta" },
            "usuario": { "id_usuario": 9, "nombre": "Luis", "correo": "luis@x" },
            "tecnico": { "idUsuario": 4 },
            "equipo": { "nombre": "laptop", "numero_serie": "SN-77" },
            "fecha_creacion": "2024-05-01 09:30:00",
            "calificacion": null
        }))
        .unwrap();

        let ticket = dto.normalize().unwrap();
        assert_eq!(ticket.id, 3);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority.as_ref().unwrap().name, "Alta");
        assert_eq!(ticket.creator.as_ref().unwrap().id, 9);
        assert_eq!(ticket.assignee.as_ref().unwrap().id, 4);
        assert_eq!(ticket.asset.as_ref().unwrap().serial.as_deref(), Some("SN-77"));
        // Naive stamps are taken as UTC; updated_at falls back to created_at.
        assert_eq!(ticket.updated_at, ticket.created_at);
    }

    #[test]
    #[serial]
    fn malformed_creator_downgrades_to_none() {
        let dto: TicketDto = serde_json::from_value(json!({
            "id": 5,
            "estado": "CERRADO",
            "usuario": { "nombre": "sin id" },
            "created_at": "2024-05-01T10:00:00Z",
            "fecha_cierre": "junk"
        }))
        .unwrap();

        let ticket = dto.normalize().unwrap();
        assert!(ticket.creator.is_none());
        assert!(ticket.closed_at.is_none());
        assert_eq!(ticket.status, TicketStatus::Closed);
    }

    #[test]
    #[serial]
    fn collection_normalization_skips_bad_entries() {
        let items = vec![
            json!({ "id": 1, "estado": "ABIERTO", "created_at": "2024-05-01T10:00:00Z" }),
            json!({ "estado": "ABIERTO", "created_at": "2024-05-01T10:00:00Z" }),
            json!({ "id": 2, "estado": "EN_PROCESO", "created_at": "2024-05-01T10:00:00Z" }),
            json!({ "id": 3, "estado": "CERRADO", "created_at": "not a date" }),
            json!("not an object"),
        ];

        let tickets = normalize_tickets(items);
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, 1);
    }

    #[test]
    #[serial]
    fn comments_sort_oldest_first() {
        let items = vec![
            json!({ "id": 2, "id_ticket": 1, "mensaje": "later", "fecha": "2024-05-02T10:00:00Z" }),
            json!({ "id": 1, "idTicket": 1, "contenido": "earlier", "fecha_creacion": "2024-05-01T10:00:00Z" }),
        ];

        let comments = normalize_comments(items);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].message, "earlier");
        assert_eq!(comments[1].message, "later");
    }
}
