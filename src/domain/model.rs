use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned movie identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub i64);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ticket price in minor currency units. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub fn from_cents(cents: i64) -> Option<Self> {
        (cents >= 0).then_some(Price(cents))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Parses decimal text such as `8.50`, `8.5` or `12`.
    pub fn parse(text: &str) -> Result<Self, &'static str> {
        let text = text.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() && fraction.is_empty() {
            return Err("Price must be a number");
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err("Price must be a number");
        }
        if fraction.len() > 2 {
            return Err("Price cannot have more than two decimal places");
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| "Price is too large")?
        };
        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| "Price must be a number")? * 10,
            _ => fraction.parse().map_err(|_| "Price must be a number")?,
        };
        let cents = whole_value
            .checked_mul(100)
            .and_then(|v| v.checked_add(fraction_value))
            .ok_or("Price is too large")?;

        if negative && cents > 0 {
            return Err("Price cannot be negative");
        }
        Ok(Price(cents))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl TryFrom<String> for Price {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Price::parse(&value).map_err(str::to_string)
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.to_string()
    }
}

/// A persisted catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub release_date: NaiveDate,
    pub genre: String,
    pub price: Price,
    /// Concurrency token; bumped by the store on every successful replace.
    pub version: u64,
}

impl Movie {
    pub fn to_form(&self) -> MovieForm {
        MovieForm {
            id: Some(self.id),
            title: self.title.clone(),
            release_date: self.release_date.format("%Y-%m-%d").to_string(),
            genre: self.genre.clone(),
            price: self.price.to_string(),
            version: Some(self.version),
        }
    }

    pub(crate) fn from_new(id: MovieId, movie: NewMovie) -> Self {
        Self {
            id,
            title: movie.title,
            release_date: movie.release_date,
            genre: movie.genre,
            price: movie.price,
            version: 1,
        }
    }
}

/// A validated movie that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    pub title: String,
    pub release_date: NaiveDate,
    pub genre: String,
    pub price: Price,
}

/// Raw caller input, kept verbatim so it can be handed back when validation fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieForm {
    pub id: Option<MovieId>,
    pub title: String,
    pub release_date: String,
    pub genre: String,
    pub price: String,
    pub version: Option<u64>,
}

impl MovieForm {
    pub fn new(
        title: impl Into<String>,
        release_date: impl Into<String>,
        genre: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            release_date: release_date.into(),
            genre: genre.into(),
            price: price.into(),
            version: None,
        }
    }

    pub fn with_id(mut self, id: MovieId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }
}

/// Rendered catalog report ready to be handed to the caller.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(Price::parse("8.50").unwrap().cents(), 850);
        assert_eq!(Price::parse("8.5").unwrap().cents(), 850);
        assert_eq!(Price::parse(" 12 ").unwrap().cents(), 1200);
        assert_eq!(Price::parse(".75").unwrap().cents(), 75);
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_parse_price_rejects_bad_input() {
        assert_eq!(Price::parse("-1"), Err("Price cannot be negative"));
        assert_eq!(Price::parse("1.234"), Err("Price cannot have more than two decimal places"));
        assert_eq!(Price::parse("abc"), Err("Price must be a number"));
        assert_eq!(Price::parse(""), Err("Price must be a number"));
        assert_eq!(Price::parse("99999999999999999999"), Err("Price is too large"));
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from_cents(850).unwrap().to_string(), "8.50");
        assert_eq!(Price::from_cents(5).unwrap().to_string(), "0.05");
        assert!(Price::from_cents(-1).is_none());
    }

    #[test]
    fn test_movie_json_shape() {
        let movie = Movie {
            id: MovieId(3),
            title: "Dune".to_string(),
            release_date: NaiveDate::from_ymd_opt(2021, 10, 22).unwrap(),
            genre: "Sci-Fi".to_string(),
            price: Price::from_cents(850).unwrap(),
            version: 1,
        };

        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["release_date"], "2021-10-22");
        assert_eq!(json["price"], "8.50");

        let back: Movie = serde_json::from_value(json).unwrap();
        assert_eq!(back, movie);
    }

    #[test]
    fn test_to_form_keeps_token() {
        let movie = Movie {
            id: MovieId(1),
            title: "Alien".to_string(),
            release_date: NaiveDate::from_ymd_opt(1979, 5, 25).unwrap(),
            genre: "Horror".to_string(),
            price: Price::from_cents(700).unwrap(),
            version: 4,
        };

        let form = movie.to_form();
        assert_eq!(form.id, Some(MovieId(1)));
        assert_eq!(form.release_date, "1979-05-25");
        assert_eq!(form.price, "7.00");
        assert_eq!(form.version, Some(4));
    }
}
