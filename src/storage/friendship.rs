//! Machine à états des amitiés, partagée par toutes les implémentations de stockage.
//!
//! Pour un couple (A, B), au plus deux lignes orientées existent:
//!   - aucune ligne                       -> pas de relation
//!   - A->B REQUESTED seule               -> A a fait une demande à B
//!   - A->B APPROVED et B->A APPROVED     -> amitié mutuelle
//!
//! Les fonctions `plan_*` ne touchent à rien: elles lisent les lignes existantes
//! du couple et renvoient la liste des changements à appliquer dans une transaction.

use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendStatus {
    Requested,
    Approved,
}

impl FriendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendStatus::Requested => "REQUESTED",
            FriendStatus::Approved => "APPROVED",
        }
    }
}

impl fmt::Display for FriendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "REQUESTED" => Ok(FriendStatus::Requested),
            "APPROVED" => Ok(FriendStatus::Approved),
            other => Err(AppError::Internal(format!("Unknown friend status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendshipEdge {
    pub user_id: i32,
    pub friend_id: i32,
    pub status: FriendStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeChange {
    Insert(FriendshipEdge),
    SetStatus {
        user_id: i32,
        friend_id: i32,
        status: FriendStatus,
    },
    Delete {
        user_id: i32,
        friend_id: i32,
    },
}

fn find_edge(edges: &[FriendshipEdge], user_id: i32, friend_id: i32) -> Option<&FriendshipEdge> {
    edges
        .iter()
        .find(|edge| edge.user_id == user_id && edge.friend_id == friend_id)
}

/// `edges` = lignes existantes entre les deux utilisateurs, dans les deux sens
pub fn plan_add_friend(
    edges: &[FriendshipEdge],
    user_id: i32,
    friend_id: i32,
) -> Result<Vec<EdgeChange>> {
    if user_id == friend_id {
        return Err(AppError::Validation(format!(
            "UserId {} cannot be friend with himself",
            user_id
        )));
    }

    if find_edge(edges, user_id, friend_id).is_some() {
        return Err(AppError::Validation(format!(
            "UserId {} and friendId {} already in friendship",
            user_id, friend_id
        )));
    }

    match find_edge(edges, friend_id, user_id) {
        // B avait déjà demandé A: confirmation mutuelle
        Some(_) => Ok(vec![
            EdgeChange::SetStatus {
                user_id: friend_id,
                friend_id: user_id,
                status: FriendStatus::Approved,
            },
            EdgeChange::Insert(FriendshipEdge {
                user_id,
                friend_id,
                status: FriendStatus::Approved,
            }),
        ]),
        None => Ok(vec![EdgeChange::Insert(FriendshipEdge {
            user_id,
            friend_id,
            status: FriendStatus::Requested,
        })]),
    }
}

/// Supprimer une amitié mutuelle ne l'efface pas chez l'autre:
/// sa ligne redevient une demande en attente.
pub fn plan_delete_friend(
    edges: &[FriendshipEdge],
    user_id: i32,
    friend_id: i32,
) -> Result<Vec<EdgeChange>> {
    let forward = find_edge(edges, user_id, friend_id).ok_or_else(|| {
        AppError::Validation(format!(
            "UserId {} and friendId {} are not in friendship",
            user_id, friend_id
        ))
    })?;

    let mut changes = vec![EdgeChange::Delete { user_id, friend_id }];

    if forward.status == FriendStatus::Approved && find_edge(edges, friend_id, user_id).is_some() {
        changes.push(EdgeChange::SetStatus {
            user_id: friend_id,
            friend_id: user_id,
            status: FriendStatus::Requested,
        });
    }

    Ok(changes)
}

/// Applique les changements sur une liste de lignes en mémoire
pub fn apply_changes(edges: &mut Vec<FriendshipEdge>, changes: &[EdgeChange]) {
    for change in changes {
        match *change {
            EdgeChange::Insert(edge) => edges.push(edge),
            EdgeChange::SetStatus { user_id, friend_id, status } => {
                if let Some(edge) = edges
                    .iter_mut()
                    .find(|edge| edge.user_id == user_id && edge.friend_id == friend_id)
                {
                    edge.status = status;
                }
            }
            EdgeChange::Delete { user_id, friend_id } => {
                edges.retain(|edge| !(edge.user_id == user_id && edge.friend_id == friend_id));
            }
        }
    }
}
