pub mod dictionary_service;
pub mod film_service;
pub mod user_service;
