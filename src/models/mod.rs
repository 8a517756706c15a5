// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Entités SeaORM (une par table) + objets de l'API.
//
// Liste des modules:
//   - users       : utilisateurs
//   - films       : films (clé étrangère vers mpa)
//   - friendship  : arêtes d'amitié orientées avec statut
//   - film_genre  : association film <-> genre
//   - likes       : association utilisateur <-> film aimé
//   - genres, mpa : dictionnaires pré-remplis, lecture seule
//   - dto         : requêtes/réponses de l'API et brouillons validés
//   - health      : health check
//
// Points d'attention:
//   - La popularité d'un film n'est pas stockée: elle est dérivée de `likes`
//
// ============================================================================

pub mod dto;
pub mod film_genre;
pub mod films;
pub mod friendship;
pub mod genres;
pub mod health;
pub mod likes;
pub mod mpa;
pub mod users;
