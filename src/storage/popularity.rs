use crate::models::dto::Film;

/// Classement des films: nombre de likes décroissant, puis id décroissant
/// (le film le plus récent gagne les égalités).
/// Même ordre que `ORDER BY COUNT(likes) DESC, film_id DESC` côté base.
pub fn rank_most_popular(mut films: Vec<Film>, count: usize) -> Vec<Film> {
    films.sort_by(|a, b| {
        b.likes
            .len()
            .cmp(&a.likes.len())
            .then_with(|| b.id.cmp(&a.id))
    });
    films.truncate(count);
    films
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dto::Mpa;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn film(id: i32, likes: &[i32]) -> Film {
        let likes: BTreeSet<i32> = likes.iter().copied().collect();
        Film {
            id,
            name: format!("film {id}"),
            description: None,
            release_date: NaiveDate::from_ymd_opt(2001, 3, 25).unwrap(),
            duration: 100,
            rate: likes.len(),
            likes,
            genres: Vec::new(),
            mpa: Mpa { id: 1, name: "G".to_string() },
        }
    }

    fn ids(films: &[Film]) -> Vec<i32> {
        films.iter().map(|f| f.id).collect()
    }

    #[test]
    fn most_liked_first_then_newest() {
        let films = vec![film(1, &[1]), film(2, &[]), film(3, &[1, 2]), film(4, &[2])];
        assert_eq!(ids(&rank_most_popular(films, 10)), vec![3, 4, 1, 2]);
    }

    #[test]
    fn ties_go_to_the_highest_id() {
        let films = vec![film(1, &[]), film(2, &[])];
        assert_eq!(ids(&rank_most_popular(films, 2)), vec![2, 1]);
    }

    #[test]
    fn count_limits_the_result() {
        let films = vec![film(1, &[1]), film(2, &[])];
        assert_eq!(ids(&rank_most_popular(films, 1)), vec![1]);
    }
}
