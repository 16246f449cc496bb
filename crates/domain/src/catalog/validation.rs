//! Validator chain for new catalog entries.
//!
//! Each validator checks or normalizes one field and hands the game on.
//! The chain stops at the first rejection.

use chrono::Utc;

use crate::error::CommerceError;
use crate::value_objects::Money;

use super::NewGame;

/// One link of the chain.
pub type GameValidator = fn(NewGame) -> Result<NewGame, CommerceError>;

/// Validators applied to every new game, in order.
pub const GAME_VALIDATORS: &[GameValidator] = &[
    validate_name,
    validate_price,
    validate_image_url,
    normalize_optional_fields,
];

/// Runs `game` through [`GAME_VALIDATORS`].
pub fn validate_new_game(game: NewGame) -> Result<NewGame, CommerceError> {
    run_chain(GAME_VALIDATORS, game)
}

pub fn run_chain(validators: &[GameValidator], game: NewGame) -> Result<NewGame, CommerceError> {
    validators.iter().try_fold(game, |game, validate| validate(game))
}

/// Name is required and stored trimmed.
pub fn validate_name(mut game: NewGame) -> Result<NewGame, CommerceError> {
    let trimmed = game.name.trim();
    if trimmed.is_empty() {
        return Err(CommerceError::invalid_input("game name is required"));
    }
    game.name = trimmed.to_string();
    Ok(game)
}

pub fn validate_price(game: NewGame) -> Result<NewGame, CommerceError> {
    check_price(game.price)?;
    Ok(game)
}

/// A missing or blank image URL becomes empty. Anything else must be http(s).
pub fn validate_image_url(mut game: NewGame) -> Result<NewGame, CommerceError> {
    game.image_url = Some(normalize_image_url(game.image_url.as_deref().unwrap_or(""))?);
    Ok(game)
}

/// Fills in defaults: empty genre and description, a zero rating in place
/// of a negative one, today's date when no release date was given.
pub fn normalize_optional_fields(mut game: NewGame) -> Result<NewGame, CommerceError> {
    game.genre.get_or_insert_with(String::new);
    game.description.get_or_insert_with(String::new);
    game.rating = Some(normalize_rating(game.rating.unwrap_or(0.0)));
    game.release_date.get_or_insert_with(|| Utc::now().date_naive());
    Ok(game)
}

pub(crate) fn check_price(price: Money) -> Result<(), CommerceError> {
    if price.is_negative() {
        return Err(CommerceError::invalid_input(
            "price must be greater than or equal to zero",
        ));
    }
    Ok(())
}

pub(crate) fn normalize_image_url(url: &str) -> Result<String, CommerceError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(CommerceError::invalid_input(
            "invalid image URL: must start with http:// or https://",
        ))
    }
}

pub(crate) fn normalize_rating(rating: f64) -> f64 {
    if rating < 0.0 { 0.0 } else { rating }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_game(name: &str) -> NewGame {
        NewGame {
            name: name.to_string(),
            price: Money::from_cents(5999),
            ..NewGame::default()
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(matches!(
            validate_new_game(new_game("   ")),
            Err(CommerceError::InvalidInput(_))
        ));
    }

    #[test]
    fn name_is_trimmed() {
        let game = validate_new_game(new_game("  Hollow Knight ")).unwrap();
        assert_eq!(game.name, "Hollow Knight");
    }

    #[test]
    fn negative_price_is_rejected_but_free_is_fine() {
        let mut game = new_game("Dota");
        game.price = Money::from_cents(-1);
        assert!(validate_new_game(game.clone()).is_err());

        game.price = Money::zero();
        assert!(validate_new_game(game).is_ok());
    }

    #[test]
    fn image_url_scheme_is_checked_case_insensitively() {
        let mut game = new_game("Hades");
        game.image_url = Some("  HTTPS://cdn.example.com/hades.png ".to_string());
        let game = validate_new_game(game).unwrap();
        assert_eq!(
            game.image_url.as_deref(),
            Some("HTTPS://cdn.example.com/hades.png")
        );

        let mut bad = new_game("Hades");
        bad.image_url = Some("ftp://cdn.example.com/hades.png".to_string());
        assert!(validate_new_game(bad).is_err());
    }

    #[test]
    fn optional_fields_get_defaults() {
        let mut game = new_game("Celeste");
        game.rating = Some(-3.5);
        let game = validate_new_game(game).unwrap();

        assert_eq!(game.genre.as_deref(), Some(""));
        assert_eq!(game.description.as_deref(), Some(""));
        assert_eq!(game.image_url.as_deref(), Some(""));
        assert_eq!(game.rating, Some(0.0));
        assert_eq!(game.release_date, Some(Utc::now().date_naive()));
    }

    #[test]
    fn chain_stops_at_first_failure() {
        fn reject(_: NewGame) -> Result<NewGame, CommerceError> {
            Err(CommerceError::invalid_input("first"))
        }
        fn never(_: NewGame) -> Result<NewGame, CommerceError> {
            panic!("chain should have stopped")
        }
        let result = run_chain(&[reject, never], new_game("Hades"));
        assert_eq!(result.unwrap_err(), CommerceError::invalid_input("first"));
    }
}
